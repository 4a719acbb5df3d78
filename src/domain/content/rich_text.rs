//! Rich-text block structure served by the CMS.
//!
//! Blocks are tagged by `type`, e.g.
//! `{"type":"paragraph","children":[{"type":"text","text":"Hi","bold":true}]}`.

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Paragraph {
        #[serde(default)]
        children: Vec<Inline>,
    },
    Heading {
        level: u8,
        #[serde(default)]
        children: Vec<Inline>,
    },
    List {
        #[serde(default)]
        format: ListFormat,
        #[serde(default)]
        children: Vec<Block>,
    },
    ListItem {
        #[serde(default)]
        children: Vec<Inline>,
    },
    Quote {
        #[serde(default)]
        children: Vec<Inline>,
    },
    Code {
        #[serde(default)]
        children: Vec<Inline>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        italic: bool,
        #[serde(default)]
        underline: bool,
        #[serde(default)]
        strikethrough: bool,
        #[serde(default)]
        code: bool,
    },
    Link {
        url: String,
        #[serde(default)]
        children: Vec<Inline>,
    },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            code: false,
        }
    }
}

/// An ordered list of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Block>);

impl RichText {
    /// A single paragraph of unformatted text.
    pub fn plain(text: impl Into<String>) -> Self {
        RichText(vec![Block::Paragraph {
            children: vec![Inline::text(text)],
        }])
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    /// True if there is no visible text.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for block in &self.0 {
            render_block(&mut html, block);
        }
        html
    }

    /// Text content without markup, blocks separated by newlines.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.0 {
            collect_block_text(block, &mut lines);
        }
        lines.join("\n")
    }
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph { children } => wrap(out, "p", children),
        Block::Heading { level, children } => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            wrap(out, &tag, children);
        }
        Block::List { format, children } => {
            let tag = match format {
                ListFormat::Ordered => "ol",
                ListFormat::Unordered => "ul",
            };
            let _ = write!(out, "<{}>", tag);
            for child in children {
                render_block(out, child);
            }
            let _ = write!(out, "</{}>", tag);
        }
        Block::ListItem { children } => wrap(out, "li", children),
        Block::Quote { children } => wrap(out, "blockquote", children),
        Block::Code { children } => {
            out.push_str("<pre><code>");
            render_inlines(out, children);
            out.push_str("</code></pre>");
        }
    }
}

fn wrap(out: &mut String, tag: &str, children: &[Inline]) {
    let _ = write!(out, "<{}>", tag);
    render_inlines(out, children);
    let _ = write!(out, "</{}>", tag);
}

fn render_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text {
                text,
                bold,
                italic,
                underline,
                strikethrough,
                code,
            } => {
                let marks: Vec<&str> = [
                    (*bold, "strong"),
                    (*italic, "em"),
                    (*underline, "u"),
                    (*strikethrough, "s"),
                    (*code, "code"),
                ]
                .into_iter()
                .filter_map(|(on, tag)| on.then_some(tag))
                .collect();
                for tag in &marks {
                    let _ = write!(out, "<{}>", tag);
                }
                out.push_str(&escape(text.as_str()));
                for tag in marks.iter().rev() {
                    let _ = write!(out, "</{}>", tag);
                }
            }
            Inline::Link { url, children } => {
                let _ = write!(out, "<a href=\"{}\">", escape(url.as_str()));
                render_inlines(out, children);
                out.push_str("</a>");
            }
        }
    }
}

fn collect_block_text(block: &Block, lines: &mut Vec<String>) {
    match block {
        Block::List { children, .. } => {
            for child in children {
                collect_block_text(child, lines);
            }
        }
        Block::Paragraph { children }
        | Block::Heading { children, .. }
        | Block::ListItem { children }
        | Block::Quote { children }
        | Block::Code { children } => {
            let mut line = String::new();
            collect_inline_text(children, &mut line);
            lines.push(line);
        }
    }
}

fn collect_inline_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text, .. } => out.push_str(text),
            Inline::Link { children, .. } => collect_inline_text(children, out),
        }
    }
}
