//! HTML Export Generation
//!
//! This module renders a document to HTML, either as a fragment or as a
//! complete standalone page with inlined base CSS.

use crate::attribution::{Attribution, BlockMetadata, BlockType, ListKind, TextAlignment};
use crate::config::Settings;
use crate::document::{BlockContent, Document};
use crate::error::{Error, Result};
use crate::string_utils::char_slice;
use crate::text::AttributedText;
use log::info;
use std::fmt::Write as _;
use std::path::Path;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Options for HTML generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Wrap entity mentions in `<span class="entity ...">`
    pub entity_markup: bool,
    /// Body font size (points) for text without a size attribution
    pub base_font_size: u16,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            entity_markup: true,
            base_font_size: 12,
        }
    }
}

impl HtmlOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            entity_markup: settings.html_entity_markup,
            base_font_size: settings.default_font_size,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document.
///
/// # Arguments
///
/// * `document` - The document to render
/// * `title` - Optional document title
/// * `options` - Rendering options
pub fn generate_html_document(document: &Document, title: Option<&str>, options: &HtmlOptions) -> String {
    let doc_title = title.unwrap_or("Exported Document");
    let body = generate_html_fragment(document, options);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="PlotEngine">
    <title>{title}</title>
    <style>
{base_css}
body {{ font-size: {font_size}pt; }}
    </style>
</head>
<body>
    <article class="plot-body">
{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        base_css = BASE_CSS,
        font_size = options.base_font_size,
        body = body,
    )
}

/// Generate an HTML fragment (no doctype, head, etc.).
pub fn generate_html_fragment(document: &Document, options: &HtmlOptions) -> String {
    let mut html = String::new();
    let mut lists = ListStack::default();

    for block in document.iter() {
        match &block.content {
            BlockContent::HorizontalRule => {
                lists.close_all(&mut html);
                html.push_str("<hr>\n");
            }
            BlockContent::Paragraph { text, metadata } => {
                let inline = render_inline(text, options);
                let style = alignment_style(metadata);
                match metadata.block_type() {
                    BlockType::ListItem(kind) => {
                        let indent = metadata.list.map_or(0, |list| list.indent);
                        lists.open_item(&mut html, kind, indent as usize + 1);
                        let _ = write!(html, "<li{}>{}", style, inline);
                    }
                    other => {
                        lists.close_all(&mut html);
                        render_block(&mut html, other, &style, &inline);
                    }
                }
            }
        }
    }

    lists.close_all(&mut html);
    html
}

/// Export a document to an HTML file.
pub fn export_to_html_file(
    document: &Document,
    output_path: &Path,
    title: Option<&str>,
    options: &HtmlOptions,
) -> Result<()> {
    let html = generate_html_document(document, title, options);
    std::fs::write(output_path, html).map_err(|e| Error::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    info!("Exported HTML to {}", output_path.display());
    Ok(())
}

fn render_block(html: &mut String, block_type: BlockType, style: &str, inline: &str) {
    let _ = match block_type {
        BlockType::Heading(level) => {
            let level = level.level();
            writeln!(html, "<h{level}{style}>{inline}</h{level}>")
        }
        BlockType::BlockQuote => writeln!(html, "<blockquote><p{style}>{inline}</p></blockquote>"),
        _ => writeln!(html, "<p{style}>{inline}</p>"),
    };
}

fn alignment_style(metadata: &BlockMetadata) -> String {
    match metadata.alignment {
        Some(alignment) if alignment != TextAlignment::Left => {
            format!(" style=\"text-align:{}\"", alignment.as_str())
        }
        _ => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Open lists, innermost last. Each open list has an unclosed `<li>`.
#[derive(Default)]
struct ListStack {
    open: Vec<ListKind>,
}

fn list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Unordered => "ul",
        ListKind::Ordered => "ol",
    }
}

impl ListStack {
    fn pop(&mut self, html: &mut String) {
        if let Some(kind) = self.open.pop() {
            let _ = writeln!(html, "</li>\n</{}>", list_tag(kind));
        }
    }

    fn close_all(&mut self, html: &mut String) {
        while !self.open.is_empty() {
            self.pop(html);
        }
    }

    /// Prepare for a list item of `kind` at nesting `depth` (1-based).
    fn open_item(&mut self, html: &mut String, kind: ListKind, depth: usize) {
        while self.open.len() > depth {
            self.pop(html);
        }
        if self.open.len() == depth {
            if self.open[depth - 1] == kind {
                html.push_str("</li>\n");
                return;
            }
            self.pop(html);
        }
        while self.open.len() < depth {
            let _ = writeln!(html, "<{}>", list_tag(kind));
            self.open.push(kind);
            // Skipped levels get an empty item to hold the next list
            if self.open.len() < depth {
                html.push_str("<li>");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Runs
// ─────────────────────────────────────────────────────────────────────────────

fn render_inline(text: &AttributedText, options: &HtmlOptions) -> String {
    let mut html = String::new();
    for run in text.runs() {
        let content = html_escape(char_slice(text.text(), run.range.start, run.range.end_exclusive()));
        let mut closing: Vec<&'static str> = Vec::new();

        if options.entity_markup {
            for entity in run.attributions.iter().filter_map(Attribution::as_entity) {
                let _ = write!(
                    html,
                    "<span class=\"entity entity-{}\" data-entity-id=\"{}\">",
                    entity.kind.as_str(),
                    html_escape(&entity.id)
                );
                closing.push("</span>");
            }
        }

        let css = run_css(&run.attributions);
        if !css.is_empty() {
            let _ = write!(html, "<span style=\"{}\">", css);
            closing.push("</span>");
        }

        for attribution in &run.attributions {
            let (open, close) = match attribution {
                Attribution::Bold => ("<strong>", "</strong>"),
                Attribution::Italic => ("<em>", "</em>"),
                Attribution::Underline => ("<u>", "</u>"),
                Attribution::Strikethrough => ("<s>", "</s>"),
                _ => continue,
            };
            html.push_str(open);
            closing.push(close);
        }

        html.push_str(&content);
        for close in closing.iter().rev() {
            html.push_str(close);
        }
    }
    html
}

fn run_css(attributions: &[Attribution]) -> String {
    let mut declarations = Vec::new();
    for attribution in attributions {
        match attribution {
            Attribution::TextColor(color) => declarations.push(format!("color:{}", color.to_css())),
            Attribution::Background(color) => {
                declarations.push(format!("background-color:{}", color.to_css()))
            }
            Attribution::FontSize(size) => declarations.push(format!("font-size:{}pt", size)),
            _ => {}
        }
    }
    declarations.join(";")
}

// ─────────────────────────────────────────────────────────────────────────────
// Base CSS
// ─────────────────────────────────────────────────────────────────────────────

const BASE_CSS: &str = r#"
/* Reset and base styles */
*, *::before, *::after {
    box-sizing: border-box;
}

body {
    margin: 0;
    padding: 0;
    font-family: Georgia, 'Times New Roman', serif;
    line-height: 1.6;
}

/* Article container */
.plot-body {
    max-width: 800px;
    margin: 0 auto;
    padding: 32px 24px;
}

/* Headings */
.plot-body h1,
.plot-body h2,
.plot-body h3,
.plot-body h4,
.plot-body h5,
.plot-body h6 {
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}

.plot-body h1 { font-size: 2em; }
.plot-body h2 { font-size: 1.5em; }
.plot-body h3 { font-size: 1.25em; }
.plot-body h4 { font-size: 1em; }
.plot-body h5 { font-size: 0.875em; }
.plot-body h6 { font-size: 0.85em; }

/* Paragraphs */
.plot-body p {
    margin-top: 0;
    margin-bottom: 16px;
}

/* Lists */
.plot-body ul,
.plot-body ol {
    margin-top: 0;
    margin-bottom: 16px;
    padding-left: 2em;
}

/* Block quotes */
.plot-body blockquote {
    margin: 0 0 16px 0;
    padding: 0 1em;
    border-left: 0.25em solid #d0d7de;
    color: #57606a;
}

/* Horizontal rules */
.plot-body hr {
    height: 1px;
    margin: 24px 0;
    border: 0;
    background-color: #d0d7de;
}

/* Entity mentions */
.plot-body .entity {
    border-bottom: 2px solid;
}

.plot-body .entity-character { border-color: #1f6feb; }
.plot-body .entity-location { border-color: #2da44e; }
.plot-body .entity-object { border-color: #bf8700; }
.plot-body .entity-event { border-color: #cf222e; }
"#;

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{Color, EntityKind, EntityRef, HeadingLevel, ListMembership};
    use crate::document::Block;
    use crate::text::SpanRange;
    use tempfile::TempDir;

    fn list_item(id: &str, text: &str, kind: ListKind, indent: u8) -> Block {
        let metadata = BlockMetadata {
            list: Some(ListMembership::new(kind, indent)),
            ..BlockMetadata::default()
        };
        Block::paragraph_with(id, text, metadata)
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_blocks() {
        let heading = BlockMetadata::for_type(BlockType::Heading(HeadingLevel::H2));
        let centered = BlockMetadata {
            alignment: Some(TextAlignment::Center),
            ..BlockMetadata::default()
        };
        let quote = BlockMetadata::for_type(BlockType::BlockQuote);
        let document = Document::from_blocks(vec![
            Block::paragraph_with("h", "Part <One>", heading),
            Block::paragraph_with("p", "Centered", centered),
            Block::horizontal_rule("hr"),
            Block::paragraph_with("q", "Quoted", quote),
        ])
        .unwrap();

        let html = generate_html_fragment(&document, &HtmlOptions::default());
        assert_eq!(
            html,
            "<h2>Part &lt;One&gt;</h2>\n\
             <p style=\"text-align:center\">Centered</p>\n\
             <hr>\n\
             <blockquote><p>Quoted</p></blockquote>\n"
        );
    }

    #[test]
    fn test_inline_runs() {
        let mut text = AttributedText::new("bold and red");
        text.add_attribution(Attribution::Bold, SpanRange::new(0, 7)).unwrap();
        text.add_attribution(Attribution::Italic, SpanRange::new(5, 7)).unwrap();
        text.add_attribution(Attribution::TextColor(Color::from_rgb(255, 0, 0)), SpanRange::new(9, 11))
            .unwrap();
        text.add_attribution(Attribution::FontSize(18), SpanRange::new(9, 11)).unwrap();
        let document = Document::from_blocks(vec![Block::paragraph("p", text)]).unwrap();

        let html = generate_html_fragment(&document, &HtmlOptions::default());
        assert_eq!(
            html,
            "<p><strong>bold </strong><strong><em>and</em></strong> \
             <span style=\"color:#ff0000;font-size:18pt\">red</span></p>\n"
        );
    }

    #[test]
    fn test_entity_markup_toggle() {
        let mut text = AttributedText::new("Ask Vell.");
        text.add_entity(EntityRef::new("vell", EntityKind::Character), SpanRange::new(4, 7))
            .unwrap();
        let document = Document::from_blocks(vec![Block::paragraph("p", text)]).unwrap();

        let marked = generate_html_fragment(&document, &HtmlOptions::default());
        assert_eq!(
            marked,
            "<p>Ask <span class=\"entity entity-character\" data-entity-id=\"vell\">Vell</span>.</p>\n"
        );

        let plain = generate_html_fragment(&document, &HtmlOptions {
            entity_markup: false,
            ..HtmlOptions::default()
        });
        assert_eq!(plain, "<p>Ask Vell.</p>\n");
    }

    #[test]
    fn test_nested_lists() {
        let document = Document::from_blocks(vec![
            list_item("a", "one", ListKind::Unordered, 0),
            list_item("b", "one.a", ListKind::Ordered, 1),
            list_item("c", "two", ListKind::Unordered, 0),
            Block::paragraph("p", "after"),
        ])
        .unwrap();

        let html = generate_html_fragment(&document, &HtmlOptions::default());
        assert_eq!(
            html,
            "<ul>\n<li>one<ol>\n<li>one.a</li>\n</ol>\n</li>\n<li>two</li>\n</ul>\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_indent_jump_opens_intermediate_items() {
        let document = Document::from_blocks(vec![
            list_item("a", "top", ListKind::Unordered, 0),
            list_item("b", "deep", ListKind::Unordered, 2),
        ])
        .unwrap();

        let html = generate_html_fragment(&document, &HtmlOptions::default());
        assert_eq!(
            html,
            "<ul>\n<li>top<ul>\n<li><ul>\n<li>deep</li>\n</ul>\n</li>\n</ul>\n</li>\n</ul>\n"
        );
        assert!(!html.contains("<ul>\n<ul>"));
    }

    #[test]
    fn test_list_kind_change_starts_new_list() {
        let document = Document::from_blocks(vec![
            list_item("a", "x", ListKind::Unordered, 0),
            list_item("b", "y", ListKind::Ordered, 0),
        ])
        .unwrap();

        let html = generate_html_fragment(&document, &HtmlOptions::default());
        assert_eq!(html, "<ul>\n<li>x</li>\n</ul>\n<ol>\n<li>y</li>\n</ol>\n");
    }

    #[test]
    fn test_generate_html_document() {
        let document = Document::with_paragraph("Hello");
        let html = generate_html_document(&document, Some("Tale & Sequel"), &HtmlOptions::default());

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>Tale &amp; Sequel</title>"));
        assert!(html.contains("<p>Hello</p>"));
        assert!(html.contains(".plot-body"));
        assert!(html.contains("body { font-size: 12pt; }"));
    }

    #[test]
    fn test_base_font_size_from_settings() {
        let settings = Settings {
            default_font_size: 14,
            html_entity_markup: false,
            ..Settings::default()
        };
        let options = HtmlOptions::from_settings(&settings);
        assert_eq!(options.base_font_size, 14);
        assert!(!options.entity_markup);

        let html = generate_html_document(&Document::with_paragraph("x"), None, &options);
        assert!(html.contains("body { font-size: 14pt; }"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.html");
        export_to_html_file(&Document::with_paragraph("x"), &path, None, &HtmlOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<title>Exported Document</title>"));
    }
}
