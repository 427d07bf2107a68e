//! Surname traditions: how a child's surname follows from the parents'.

use serde::Serialize;

pub const PATERNAL: &str = "paternal";
pub const PATRILINEAL: &str = "patrilineal";
pub const MATRILINEAL: &str = "matrilineal";
pub const PORTUGUESE: &str = "portuguese";
pub const SPANISH: &str = "spanish";
pub const POLISH: &str = "polish";
pub const LITHUANIAN: &str = "lithuanian";
pub const ICELANDIC: &str = "icelandic";
pub const DEFAULT: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub given: String,
    pub surname: String,
}

impl PersonName {
    pub fn new(given: &str, surname: &str) -> Self {
        Self {
            given: given.trim().to_string(),
            surname: surname.trim().to_string(),
        }
    }
}

pub trait SurnameTradition: Send + Sync {
    fn description(&self) -> &str;

    /// Surname proposed for a new child of these parents.
    fn new_child_surname(&self, father: &PersonName, mother: &PersonName, sex: Sex) -> String;
}

struct NoTradition;

impl SurnameTradition for NoTradition {
    fn description(&self) -> &str {
        "None"
    }

    fn new_child_surname(&self, _: &PersonName, _: &PersonName, _: Sex) -> String {
        String::new()
    }
}

struct PaternalTradition;

impl SurnameTradition for PaternalTradition {
    fn description(&self) -> &str {
        "Children take their father’s surname. Wives take their husband’s surname."
    }

    fn new_child_surname(&self, father: &PersonName, _: &PersonName, _: Sex) -> String {
        father.surname.clone()
    }
}

struct PatrilinealTradition;

impl SurnameTradition for PatrilinealTradition {
    fn description(&self) -> &str {
        "Children take their father’s surname."
    }

    fn new_child_surname(&self, father: &PersonName, _: &PersonName, _: Sex) -> String {
        father.surname.clone()
    }
}

struct MatrilinealTradition;

impl SurnameTradition for MatrilinealTradition {
    fn description(&self) -> &str {
        "Children take their mother’s surname."
    }

    fn new_child_surname(&self, _: &PersonName, mother: &PersonName, _: Sex) -> String {
        mother.surname.clone()
    }
}

struct SpanishTradition;

impl SurnameTradition for SpanishTradition {
    fn description(&self) -> &str {
        "Children take one surname from the father and one surname from the mother."
    }

    fn new_child_surname(&self, father: &PersonName, mother: &PersonName, _: Sex) -> String {
        join_surnames(
            father.surname.split_whitespace().next(),
            mother.surname.split_whitespace().next(),
        )
    }
}

struct PortugueseTradition;

impl SurnameTradition for PortugueseTradition {
    fn description(&self) -> &str {
        "Children take one surname from the mother and one surname from the father."
    }

    fn new_child_surname(&self, father: &PersonName, mother: &PersonName, _: Sex) -> String {
        join_surnames(
            mother.surname.split_whitespace().last(),
            father.surname.split_whitespace().last(),
        )
    }
}

struct PolishTradition;

const POLISH_FEMININE: &[(&str, &str)] = &[("ski", "ska"), ("cki", "cka"), ("dzki", "dzka"), ("żki", "żka")];

impl SurnameTradition for PolishTradition {
    fn description(&self) -> &str {
        "Children take their father’s surname. Wives take their husband’s surname. Surnames are inflected to indicate an individual’s gender."
    }

    fn new_child_surname(&self, father: &PersonName, _: &PersonName, sex: Sex) -> String {
        match sex {
            Sex::Female => inflect(&father.surname, POLISH_FEMININE),
            _ => father.surname.clone(),
        }
    }
}

struct LithuanianTradition;

// Longest suffix first: "ius" must win over "us".
const LITHUANIAN_DAUGHTER: &[(&str, &str)] = &[
    ("ius", "iūtė"),
    ("as", "aitė"),
    ("is", "ytė"),
    ("ys", "ytė"),
    ("us", "utė"),
];

impl SurnameTradition for LithuanianTradition {
    fn description(&self) -> &str {
        "Children take their father’s surname. Wives take their husband’s surname. Surnames are inflected to indicate an individual’s gender and marital status."
    }

    fn new_child_surname(&self, father: &PersonName, _: &PersonName, sex: Sex) -> String {
        match sex {
            Sex::Female => inflect(&father.surname, LITHUANIAN_DAUGHTER),
            _ => father.surname.clone(),
        }
    }
}

struct IcelandicTradition;

impl SurnameTradition for IcelandicTradition {
    fn description(&self) -> &str {
        "Children take a patronym instead of a surname."
    }

    fn new_child_surname(&self, father: &PersonName, _: &PersonName, sex: Sex) -> String {
        let Some(given) = father.given.split_whitespace().next() else {
            return String::new();
        };
        match sex {
            Sex::Male => format!("{}sson", given),
            Sex::Female => format!("{}sdóttir", given),
            Sex::Unknown => String::new(),
        }
    }
}

fn join_surnames(first: Option<&str>, second: Option<&str>) -> String {
    [first, second]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

fn inflect(surname: &str, rules: &[(&str, &str)]) -> String {
    for (from, to) in rules {
        if let Some(stem) = surname.strip_suffix(from) {
            return format!("{}{}", stem, to);
        }
    }
    surname.to_string()
}

/// Registry of named traditions, in display order.
pub struct SurnameTraditionFactory {
    traditions: Vec<(String, Box<dyn SurnameTradition>)>,
}

impl Default for SurnameTraditionFactory {
    fn default() -> Self {
        let mut factory = Self {
            traditions: Vec::new(),
        };
        factory.register(PATERNAL, Box::new(PaternalTradition));
        factory.register(PATRILINEAL, Box::new(PatrilinealTradition));
        factory.register(MATRILINEAL, Box::new(MatrilinealTradition));
        factory.register(PORTUGUESE, Box::new(PortugueseTradition));
        factory.register(SPANISH, Box::new(SpanishTradition));
        factory.register(POLISH, Box::new(PolishTradition));
        factory.register(LITHUANIAN, Box::new(LithuanianTradition));
        factory.register(ICELANDIC, Box::new(IcelandicTradition));
        factory.register(DEFAULT, Box::new(NoTradition));
        factory
    }
}

impl SurnameTraditionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(name, description)` for every registered tradition.
    pub fn list(&self) -> Vec<(String, String)> {
        self.traditions
            .iter()
            .map(|(name, t)| (name.clone(), t.description().to_string()))
            .collect()
    }

    /// Unknown names fall back to the default (no tradition).
    pub fn make(&self, name: &str) -> &dyn SurnameTradition {
        self.find(name)
            .or_else(|| self.find(DEFAULT))
            .unwrap_or(&NoTradition)
    }

    /// Add a tradition, replacing any existing one with the same name.
    pub fn register(&mut self, name: &str, tradition: Box<dyn SurnameTradition>) {
        match self.traditions.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = tradition,
            None => self.traditions.push((name.to_string(), tradition)),
        }
    }

    fn find(&self, name: &str) -> Option<&dyn SurnameTradition> {
        self.traditions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(tradition: &str, father: (&str, &str), mother: (&str, &str), sex: Sex) -> String {
        let factory = SurnameTraditionFactory::new();
        factory.make(tradition).new_child_surname(
            &PersonName::new(father.0, father.1),
            &PersonName::new(mother.0, mother.1),
            sex,
        )
    }

    #[test]
    fn list_has_all_builtins_in_order() {
        let names: Vec<String> = SurnameTraditionFactory::new()
            .list()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(
            names,
            vec![
                PATERNAL, PATRILINEAL, MATRILINEAL, PORTUGUESE, SPANISH, POLISH, LITHUANIAN,
                ICELANDIC, DEFAULT
            ]
        );
    }

    #[test]
    fn paternal_and_matrilineal() {
        assert_eq!(child(PATERNAL, ("John", "Smith"), ("Mary", "Jones"), Sex::Male), "Smith");
        assert_eq!(child(MATRILINEAL, ("John", "Smith"), ("Mary", "Jones"), Sex::Male), "Jones");
    }

    #[test]
    fn spanish_and_portuguese() {
        assert_eq!(
            child(SPANISH, ("Juan", "García López"), ("Ana", "Martínez Ruiz"), Sex::Female),
            "García Martínez"
        );
        assert_eq!(
            child(PORTUGUESE, ("João", "Santos Pereira"), ("Maria", "Silva Costa"), Sex::Male),
            "Costa Pereira"
        );
        assert_eq!(child(SPANISH, ("Juan", ""), ("Ana", "Ruiz"), Sex::Male), "Ruiz");
    }

    #[test]
    fn polish_and_lithuanian_inflect_for_daughters() {
        assert_eq!(child(POLISH, ("Jan", "Kowalski"), ("", ""), Sex::Female), "Kowalska");
        assert_eq!(child(POLISH, ("Jan", "Kowalski"), ("", ""), Sex::Male), "Kowalski");
        assert_eq!(child(LITHUANIAN, ("Jonas", "Kazlauskas"), ("", ""), Sex::Female), "Kazlauskaitė");
        assert_eq!(child(LITHUANIAN, ("Jonas", "Paulius"), ("", ""), Sex::Female), "Pauliūtė");
    }

    #[test]
    fn icelandic_patronym() {
        assert_eq!(child(ICELANDIC, ("Jón Karl", ""), ("", ""), Sex::Male), "Jónsson");
        assert_eq!(child(ICELANDIC, ("Jón", ""), ("", ""), Sex::Female), "Jónsdóttir");
        assert_eq!(child(ICELANDIC, ("", ""), ("", ""), Sex::Female), "");
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        assert_eq!(child("klingon", ("John", "Smith"), ("", ""), Sex::Male), "");
    }

    #[test]
    fn register_replaces_existing() {
        struct Fixed;
        impl SurnameTradition for Fixed {
            fn description(&self) -> &str {
                "fixed"
            }
            fn new_child_surname(&self, _: &PersonName, _: &PersonName, _: Sex) -> String {
                "X".into()
            }
        }
        let mut factory = SurnameTraditionFactory::new();
        let before = factory.list().len();
        factory.register(PATERNAL, Box::new(Fixed));
        assert_eq!(factory.list().len(), before);
        let none = PersonName::default();
        assert_eq!(factory.make(PATERNAL).new_child_surname(&none, &none, Sex::Male), "X");
    }
}
