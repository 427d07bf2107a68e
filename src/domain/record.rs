//! GEDCOM records stored as opaque text, with their pending-edit overlay.
//!
//! A record has two versions: `gedcom`, the accepted text (empty for records
//! that exist only as a pending addition), and `pending`, the newest pending
//! edit (`None` when there is none, `Some("")` for a pending deletion).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static XREF_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0 @([^@]+)@").expect("xref regex"));
static NAME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^1 NAME (.+)$").expect("name regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    Location,
}

impl RecordKind {
    /// Tag on the level-0 line, also stored in `other.o_type`.
    pub fn record_type(&self) -> &'static str {
        match self {
            Self::Location => "_LOC",
        }
    }

    /// True when `gedcom` starts with a level-0 line of this record type.
    pub fn matches(&self, gedcom: &str) -> bool {
        let Some(m) = XREF_LINE.find(gedcom) else {
            return false;
        };
        let rest = &gedcom[m.end()..];
        rest.strip_prefix(' ')
            .is_some_and(|r| r.starts_with(self.record_type()))
    }
}

/// Read the xref from a record's first line, or fall back to `default`.
pub fn extract_xref(gedcom: &str, default: &str) -> String {
    XREF_LINE
        .captures(gedcom)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Behaviour shared by every record type.
pub trait GedcomRecord {
    fn kind(&self) -> RecordKind;
    fn xref(&self) -> &str;
    fn tree_id(&self) -> i64;
    fn gedcom(&self) -> &str;
    fn pending(&self) -> Option<&str>;

    /// Exists only as a pending edit.
    fn is_pending_addition(&self) -> bool {
        self.gedcom().is_empty() && self.pending().is_some_and(|p| !p.is_empty())
    }

    fn is_pending_deletion(&self) -> bool {
        self.pending() == Some("")
    }

    /// Pending text when there is an edit, otherwise the accepted text.
    fn latest_gedcom(&self) -> &str {
        match self.pending() {
            Some(p) => p,
            None => self.gedcom(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    xref: String,
    tree_id: i64,
    gedcom: String,
    pending: Option<String>,
}

impl Location {
    pub const KIND: RecordKind = RecordKind::Location;

    pub fn new(xref: &str, gedcom: &str, pending: Option<&str>, tree_id: i64) -> Self {
        Self {
            xref: xref.to_string(),
            tree_id,
            gedcom: gedcom.to_string(),
            pending: pending.map(str::to_string),
        }
    }

    /// First `1 NAME` of the latest version. A pending deletion falls back
    /// to the accepted text so the record can still be labelled.
    pub fn name(&self) -> Option<&str> {
        let text = if self.is_pending_deletion() {
            self.gedcom()
        } else {
            self.latest_gedcom()
        };
        NAME_LINE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_end_matches('\r'))
    }
}

impl GedcomRecord for Location {
    fn kind(&self) -> RecordKind {
        Self::KIND
    }

    fn xref(&self) -> &str {
        &self.xref
    }

    fn tree_id(&self) -> i64 {
        self.tree_id
    }

    fn gedcom(&self) -> &str {
        &self.gedcom
    }

    fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}
