//! HTML report back end.

use super::element::{CellElement, ReportElement, TextBoxElement};
use super::layout::{ReportLayout, ReportRenderer, UNITS};
use crate::error::AppError;
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct HtmlRenderer {
    layout: ReportLayout,
    footnotes: Vec<String>,
}

impl HtmlRenderer {
    pub fn new(layout: ReportLayout) -> Self {
        Self {
            layout,
            footnotes: Vec::new(),
        }
    }

    /// Render to a string; `run` returns the same bytes.
    pub fn render(&mut self) -> String {
        self.footnotes.clear();
        let layout = &self.layout;
        let (width, height) = layout.oriented_page_size();
        let dir = if layout.rtl { "rtl" } else { "ltr" };

        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html dir=\"{dir}\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n",
            escape(&layout.title)
        );
        let _ = writeln!(out, "<meta name=\"author\" content=\"{}\">", escape(&layout.rauthor));
        if !layout.rsubject.is_empty() {
            let _ = writeln!(
                out,
                "<meta name=\"description\" content=\"{}\">",
                escape(&layout.rsubject)
            );
        }
        if !layout.rkeywords.is_empty() {
            let _ = writeln!(
                out,
                "<meta name=\"keywords\" content=\"{}\">",
                escape(&layout.rkeywords)
            );
        }
        out.push_str("<style>\n");
        let _ = writeln!(
            out,
            "@page {{ size: {w:.2}{u} {h:.2}{u}; margin: {t:.2}{u} {r:.2}{u} {b:.2}{u} {l:.2}{u}; }}",
            w = width,
            h = height,
            t = layout.top_margin,
            r = layout.right_margin,
            b = layout.bottom_margin,
            l = layout.left_margin,
            u = UNITS,
        );
        let _ = writeln!(
            out,
            "body {{ font-family: {}; font-size: {:.1}{}; }}",
            layout.default_font, layout.default_font_size, UNITS
        );
        let mut names: Vec<&String> = layout.styles.keys().collect();
        names.sort();
        for name in names {
            let style = &layout.styles[name];
            let _ = writeln!(
                out,
                ".{} {{ font-family: {}; font-size: {:.1}{}; font-weight: {}; font-style: {}; text-decoration: {}; }}",
                css_class(&style.name),
                style.font,
                style.size,
                UNITS,
                if style.style.contains('B') { "bold" } else { "normal" },
                if style.style.contains('I') { "italic" } else { "normal" },
                if style.style.contains('U') { "underline" } else { "none" },
            );
        }
        out.push_str("</style>\n</head>\n<body>\n");

        let mut footnotes = Vec::new();
        let sections = [
            ("header", &layout.header_elements),
            ("main", &layout.body_elements),
        ];
        for (tag, elements) in sections {
            let _ = writeln!(out, "<{tag}>");
            for element in elements {
                render_element(&mut out, element, &mut footnotes);
            }
            let _ = writeln!(out, "</{tag}>");
        }

        if !footnotes.is_empty() {
            out.push_str("<ol class=\"footnotes\">\n");
            for note in &footnotes {
                let _ = writeln!(out, "<li>{}</li>", escape(note));
            }
            out.push_str("</ol>\n");
        }

        out.push_str("<footer>\n");
        for element in &layout.footer_elements {
            render_element(&mut out, element, &mut footnotes);
        }
        if layout.show_generated_by && !layout.generated_by.is_empty() {
            let _ = writeln!(
                out,
                "<p class=\"generated-by\">{}</p>",
                escape(&layout.generated_by)
            );
        }
        out.push_str("</footer>\n</body>\n</html>\n");

        self.footnotes = footnotes;
        out
    }

    /// Footnote texts in numbering order, from the last render.
    pub fn footnotes(&self) -> &[String] {
        &self.footnotes
    }
}

impl ReportRenderer for HtmlRenderer {
    fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    fn layout_mut(&mut self) -> &mut ReportLayout {
        &mut self.layout
    }

    fn clear_header(&mut self) {
        self.layout.header_elements.clear();
    }

    fn run(&mut self) -> Result<Vec<u8>, AppError> {
        let html = self.render();
        log::debug!(
            "Rendered HTML report '{}' ({} bytes)",
            self.layout.title,
            html.len()
        );
        Ok(html.into_bytes())
    }
}

fn render_element(out: &mut String, element: &ReportElement, footnotes: &mut Vec<String>) {
    match element {
        ReportElement::Raw(text) => out.push_str(&escape(text)),
        ReportElement::Text(t) => {
            let color = color_style(&t.color, "color");
            let _ = write!(
                out,
                "<span class=\"{}\"{}>{}</span>",
                css_class(&t.style),
                style_attr(&color),
                escape(&t.text)
            );
        }
        ReportElement::Cell(cell) => render_cell(out, cell),
        ReportElement::TextBox(text_box) => render_text_box(out, text_box, footnotes),
        ReportElement::Line(line) => {
            let _ = writeln!(
                out,
                "<hr data-x1=\"{:.2}\" data-y1=\"{:.2}\" data-x2=\"{:.2}\" data-y2=\"{:.2}\">",
                line.x1, line.y1, line.x2, line.y2
            );
        }
        ReportElement::Image(image) => {
            let _ = writeln!(
                out,
                "<img src=\"{}\" alt=\"\" style=\"width: {:.2}{u}; height: {:.2}{u};\">",
                escape(&image.file),
                image.width,
                image.height,
                u = UNITS
            );
        }
        ReportElement::Footnote(note) => {
            footnotes.push(note.text.clone());
            let _ = write!(
                out,
                "<sup class=\"{}\">{}</sup>",
                css_class(&note.style),
                footnotes.len()
            );
        }
    }
}

fn render_cell(out: &mut String, cell: &CellElement) {
    let mut css = Vec::new();
    if cell.width > 0.0 {
        css.push(format!("width: {:.2}{}", cell.width, UNITS));
    }
    if cell.height > 0.0 {
        css.push(format!("min-height: {:.2}{}", cell.height, UNITS));
    }
    css.push(format!("text-align: {}", align(&cell.align)));
    if cell.fill {
        css.extend(color_style(&cell.bgcolor, "background-color"));
    }
    css.extend(color_style(&cell.tcolor, "color"));
    if !cell.border.is_empty() && cell.border != "0" {
        let color = if cell.bocolor.is_empty() { "#000" } else { cell.bocolor.as_str() };
        css.push(format!("border: 1px solid {}", color));
    }
    let tag = if cell.ln == 0 { "span" } else { "div" };
    let _ = write!(
        out,
        "<{tag} class=\"{}\"{}>{}</{tag}>",
        css_class(&cell.style),
        style_attr(&css),
        escape(&cell.text)
    );
    if cell.ln != 0 {
        out.push('\n');
    }
}

fn render_text_box(out: &mut String, text_box: &TextBoxElement, footnotes: &mut Vec<String>) {
    let mut css = Vec::new();
    if text_box.width > 0.0 {
        css.push(format!("width: {:.2}{}", text_box.width, UNITS));
    }
    if text_box.border {
        css.push("border: 1px solid #000".to_string());
    }
    if text_box.fill {
        css.extend(color_style(&text_box.bgcolor, "background-color"));
    }
    if text_box.padding {
        css.push("padding: 2pt".to_string());
    }
    let _ = write!(
        out,
        "<div class=\"{}\"{}>",
        css_class(&text_box.style),
        style_attr(&css)
    );
    for child in &text_box.elements {
        render_element(out, child, footnotes);
    }
    out.push_str("</div>\n");
}

fn color_style(color: &str, property: &str) -> Vec<String> {
    if color.is_empty() {
        Vec::new()
    } else {
        vec![format!("{}: {}", property, escape(color))]
    }
}

fn style_attr(css: &[String]) -> String {
    if css.is_empty() {
        String::new()
    } else {
        format!(" style=\"{};\"", css.join("; "))
    }
}

fn align(code: &str) -> &'static str {
    match code {
        "C" => "center",
        "R" => "right",
        "J" => "justify",
        _ => "left",
    }
}

fn css_class(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
