//! Markdown document tree.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        /// Anchor id, unique within the document.
        id: String,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    List {
        /// Start number for ordered lists.
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    Quote(Vec<Block>),
    Code {
        lang: Option<String>,
        code: String,
    },
    /// A paragraph holding nothing but one image.
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    Rule,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Code(String),
    Link {
        href: String,
        title: Option<String>,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    Break,
}

/// One heading in a table of contents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub title: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Level 2 and 3 headings in document order.
    pub fn toc(&self) -> Vec<TocEntry> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, id, content } if (2..=3).contains(level) => Some(TocEntry {
                    level: *level,
                    id: id.clone(),
                    title: plain_text(content),
                }),
                _ => None,
            })
            .collect()
    }

    /// Plain text of the first paragraph, cut at a word boundary within `max_chars`.
    pub fn summary(&self, max_chars: usize) -> Option<String> {
        let text = self.blocks.iter().find_map(|b| match b {
            Block::Paragraph(inlines) => Some(plain_text(inlines)),
            _ => None,
        })?;
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.chars().count() <= max_chars {
            return Some(text);
        }
        let cut: String = text.chars().take(max_chars).collect();
        let cut = match cut.rfind(' ') {
            Some(i) if i > 0 => &cut[..i],
            _ => cut.as_str(),
        };
        Some(format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation())))
    }
}

/// Concatenated text of inline content, markup dropped.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(inlines, &mut out);
    out
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for i in inlines {
        match i {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(c) | Inline::Strong(c) | Inline::Link { content: c, .. } => collect_text(c, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Break => out.push(' '),
        }
    }
}
