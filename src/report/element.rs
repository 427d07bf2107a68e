//! Elements placed in a report's header, body or footer.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReportElement {
    Text(TextElement),
    Cell(CellElement),
    TextBox(TextBoxElement),
    Line(LineElement),
    Image(ImageElement),
    Footnote(FootnoteElement),
    /// Literal text outside any element.
    Raw(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextElement {
    pub style: String,
    pub color: String,
    pub text: String,
}

impl TextElement {
    pub fn add_text(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

/// A fixed-size box of text. Sizes and positions are in points; a
/// position of `None` means "current position".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellElement {
    pub width: f64,
    pub height: f64,
    pub border: String,
    pub align: String,
    pub bgcolor: String,
    pub style: String,
    /// Where the cursor goes afterwards: 0 right, 1 next line, 2 below.
    pub ln: i32,
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub fill: bool,
    pub stretch: i32,
    pub bocolor: String,
    pub tcolor: String,
    pub reseth: bool,
    pub text: String,
}

impl Default for CellElement {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            border: String::new(),
            align: "L".into(),
            bgcolor: String::new(),
            style: String::new(),
            ln: 0,
            top: None,
            left: None,
            fill: true,
            stretch: 0,
            bocolor: String::new(),
            tcolor: String::new(),
            reseth: true,
            text: String::new(),
        }
    }
}

/// A box that wraps other elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBoxElement {
    pub width: f64,
    pub height: f64,
    pub border: bool,
    pub bgcolor: String,
    pub newline: bool,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub pagecheck: bool,
    pub style: String,
    pub fill: bool,
    pub padding: bool,
    pub reseth: bool,
    pub elements: Vec<ReportElement>,
}

impl Default for TextBoxElement {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            border: false,
            bgcolor: String::new(),
            newline: false,
            left: None,
            top: None,
            pagecheck: true,
            style: String::new(),
            fill: false,
            padding: true,
            reseth: false,
            elements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LineElement {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageElement {
    pub file: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub align: String,
    pub ln: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FootnoteElement {
    pub style: String,
    pub text: String,
    /// Assigned by the renderer, starting at 1.
    pub number: usize,
}
