//! Report layout model and renderers.
//!
//! Layouts are measured in points. PDF output is delegated to an external
//! engine; this crate ships the HTML renderer.

mod element;
mod html;
mod layout;

pub use element::{
    CellElement, FootnoteElement, ImageElement, LineElement, ReportElement, TextBoxElement,
    TextElement,
};
pub use html::HtmlRenderer;
pub use layout::{
    paper_size, Orientation, ReportLayout, ReportRenderer, ReportStyle, Section, INCH_TO_POINTS,
    MM_TO_POINTS, PAPER_SIZES, UNITS,
};

pub const APP_NAME: &str = "gentree";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
