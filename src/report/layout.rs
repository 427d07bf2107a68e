//! Page geometry, styles and element lists shared by every renderer.

use super::element::{
    CellElement, FootnoteElement, ImageElement, LineElement, ReportElement, TextBoxElement,
    TextElement,
};
use super::{APP_NAME, APP_VERSION};
use crate::error::AppError;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

// Reports layouts are measured in points.
pub const UNITS: &str = "pt";

// A point is 1/72 of an inch
pub const INCH_TO_POINTS: f64 = 72.0;
pub const MM_TO_POINTS: f64 = 72.0 / 25.4;

/// `(name, width, height)` in points, portrait.
pub const PAPER_SIZES: &[(&str, f64, f64)] = &[
    // ISO 216
    ("A0", 841.0 * MM_TO_POINTS, 1189.0 * MM_TO_POINTS),
    ("A1", 594.0 * MM_TO_POINTS, 841.0 * MM_TO_POINTS),
    ("A2", 420.0 * MM_TO_POINTS, 594.0 * MM_TO_POINTS),
    ("A3", 297.0 * MM_TO_POINTS, 420.0 * MM_TO_POINTS),
    ("A4", 210.0 * MM_TO_POINTS, 297.0 * MM_TO_POINTS),
    // US
    ("US-Letter", 8.5 * INCH_TO_POINTS, 11.0 * INCH_TO_POINTS),
    ("US-Legal", 8.5 * INCH_TO_POINTS, 14.0 * INCH_TO_POINTS),
    ("US-Tabloid", 11.0 * INCH_TO_POINTS, 17.0 * INCH_TO_POINTS),
];

pub fn paper_size(name: &str) -> Option<(f64, f64)> {
    PAPER_SIZES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, w, h)| (*w, *h))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Which element list `add_element` appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Header,
    Body,
    Footer,
}

impl Section {
    /// Report definitions use `H`, `B` and `F`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "H" => Some(Self::Header),
            "B" => Some(Self::Body),
            "F" => Some(Self::Footer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStyle {
    pub name: String,
    pub font: String,
    /// Combination of `B`, `I` and `U`.
    pub style: String,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportLayout {
    pub left_margin: f64,
    pub right_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub header_margin: f64,
    pub footer_margin: f64,
    pub orientation: Orientation,
    pub page_format: String,
    /// Set by `setup` from `page_format`.
    pub page_height: f64,
    pub page_width: f64,
    pub styles: HashMap<String, ReportStyle>,
    pub default_font: String,
    pub default_font_size: f64,
    pub processing: Section,
    pub rtl: bool,
    pub show_generated_by: bool,
    pub generated_by: String,
    pub title: String,
    pub rauthor: String,
    pub rkeywords: String,
    /// Report description / subject.
    pub rsubject: String,
    pub header_elements: Vec<ReportElement>,
    pub body_elements: Vec<ReportElement>,
    pub footer_elements: Vec<ReportElement>,
    pub current_style: String,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            left_margin: 18.0 * MM_TO_POINTS,
            right_margin: 9.9 * MM_TO_POINTS,
            top_margin: 26.8 * MM_TO_POINTS,
            bottom_margin: 21.6 * MM_TO_POINTS,
            header_margin: 4.9 * MM_TO_POINTS,
            footer_margin: 9.9 * MM_TO_POINTS,
            orientation: Orientation::Portrait,
            page_format: "A4".into(),
            page_height: 0.0,
            page_width: 0.0,
            styles: HashMap::new(),
            default_font: "dejavusans".into(),
            default_font_size: 12.0,
            processing: Section::Header,
            rtl: false,
            show_generated_by: true,
            generated_by: String::new(),
            title: String::new(),
            rauthor: format!("{} {}", APP_NAME, APP_VERSION),
            rkeywords: String::new(),
            rsubject: String::new(),
            header_elements: Vec::new(),
            body_elements: Vec::new(),
            footer_elements: Vec::new(),
            current_style: String::new(),
        }
    }
}

impl ReportLayout {
    /// Prepare for rendering. Unknown page formats fall back to A4.
    pub fn setup(&mut self, rtl: bool) {
        self.rtl = rtl;
        self.rkeywords.clear();
        self.generated_by = format!("Generated by {} {}", APP_NAME, APP_VERSION);

        let (width, height) = paper_size(&self.page_format)
            .or_else(|| paper_size("A4"))
            .unwrap_or((0.0, 0.0));
        self.page_width = width;
        self.page_height = height;
    }

    /// Page size after applying the orientation.
    pub fn oriented_page_size(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Portrait => (self.page_width, self.page_height),
            Orientation::Landscape => (self.page_height, self.page_width),
        }
    }

    pub fn set_processing(&mut self, section: Section) {
        self.processing = section;
    }

    pub fn add_element(&mut self, element: ReportElement) {
        match self.processing {
            Section::Header => self.add_element_to_header(element),
            Section::Body => self.add_element_to_body(element),
            Section::Footer => self.add_element_to_footer(element),
        }
    }

    pub fn add_element_to_header(&mut self, element: ReportElement) {
        self.header_elements.push(element);
    }

    pub fn add_element_to_body(&mut self, element: ReportElement) {
        self.body_elements.push(element);
    }

    pub fn add_element_to_footer(&mut self, element: ReportElement) {
        self.footer_elements.push(element);
    }

    pub fn add_title(&mut self, data: &str) {
        self.title.push_str(data);
    }

    pub fn add_description(&mut self, data: &str) {
        self.rsubject.push_str(data);
    }

    pub fn add_style(&mut self, style: ReportStyle) {
        self.styles.insert(style.name.clone(), style);
    }

    pub fn get_style(&self, name: &str) -> Option<&ReportStyle> {
        self.styles.get(name)
    }
}

/// A report back end. Element constructors have shared defaults; back ends
/// override them when they need renderer-specific state.
pub trait ReportRenderer {
    fn layout(&self) -> &ReportLayout;

    fn layout_mut(&mut self) -> &mut ReportLayout;

    fn clear_header(&mut self);

    /// Render the whole report.
    fn run(&mut self) -> Result<Vec<u8>, AppError>;

    fn create_cell(&self, cell: CellElement) -> ReportElement {
        ReportElement::Cell(cell)
    }

    fn create_text_box(&self, text_box: TextBoxElement) -> ReportElement {
        ReportElement::TextBox(text_box)
    }

    fn create_text(&self, style: &str, color: &str) -> ReportElement {
        ReportElement::Text(TextElement {
            style: style.to_string(),
            color: color.to_string(),
            text: String::new(),
        })
    }

    fn create_line(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> ReportElement {
        ReportElement::Line(LineElement { x1, y1, x2, y2 })
    }

    fn create_image(&self, image: ImageElement) -> ReportElement {
        ReportElement::Image(image)
    }

    /// Image of a media file; `placement` supplies position and size.
    fn create_image_from_media(&self, media_path: &Path, placement: ImageElement) -> ReportElement {
        ReportElement::Image(ImageElement {
            file: media_path.to_string_lossy().replace('\\', "/"),
            ..placement
        })
    }

    fn create_footnote(&self, style: &str) -> ReportElement {
        ReportElement::Footnote(FootnoteElement {
            style: style.to_string(),
            ..FootnoteElement::default()
        })
    }
}
