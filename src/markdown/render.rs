//! `Document` to HTML. All text and attributes are escaped; script URLs are neutralised.

use super::ast::{Block, Document, Inline};
use std::fmt::Write;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `#` for URLs whose scheme could run script; the URL itself otherwise.
pub fn safe_url(url: &str) -> &str {
    let compact = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"].iter().any(|p| compact.starts_with(p)) {
        "#"
    } else {
        url
    }
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    render_blocks(&doc.blocks, &mut out);
    out
}

fn render_blocks(blocks: &[Block], out: &mut String) {
    for b in blocks {
        render_block(b, out);
    }
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, id, content } => {
            let _ = write!(out, "<h{} id=\"{}\">", level, escape_html(id));
            render_inlines(content, out);
            let _ = writeln!(out, "</h{}>", level);
        }
        Block::Paragraph(inlines) => {
            out.push_str("<p>");
            render_inlines(inlines, out);
            out.push_str("</p>\n");
        }
        Block::List { start, items } => {
            match start {
                Some(1) => out.push_str("<ol>\n"),
                Some(n) => {
                    let _ = writeln!(out, "<ol start=\"{}\">", n);
                }
                None => out.push_str("<ul>\n"),
            }
            for item in items {
                out.push_str("<li>");
                match item.as_slice() {
                    [Block::Paragraph(inlines)] => render_inlines(inlines, out),
                    blocks => render_blocks(blocks, out),
                }
                out.push_str("</li>\n");
            }
            out.push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
        }
        Block::Quote(blocks) => {
            out.push_str("<blockquote>\n");
            render_blocks(blocks, out);
            out.push_str("</blockquote>\n");
        }
        Block::Code { lang, code } => {
            match lang {
                Some(l) => {
                    let _ = write!(out, "<pre><code class=\"language-{}\">", escape_html(l));
                }
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&escape_html(code));
            out.push_str("</code></pre>\n");
        }
        Block::Image { src, alt, title } => {
            out.push_str("<figure>");
            image(src, alt, title.as_deref(), out);
            if let Some(t) = title {
                let _ = write!(out, "<figcaption>{}</figcaption>", escape_html(t));
            }
            out.push_str("</figure>\n");
        }
        Block::Rule => out.push_str("<hr>\n"),
    }
}

fn image(src: &str, alt: &str, title: Option<&str>, out: &mut String) {
    let _ = write!(
        out,
        "<img src=\"{}\" alt=\"{}\" loading=\"lazy\"",
        escape_html(safe_url(src)),
        escape_html(alt)
    );
    if let Some(t) = title {
        let _ = write!(out, " title=\"{}\"", escape_html(t));
    }
    out.push('>');
}

fn render_inlines(inlines: &[Inline], out: &mut String) {
    for i in inlines {
        match i {
            Inline::Text(t) => out.push_str(&escape_html(t)),
            Inline::Emphasis(c) => {
                out.push_str("<em>");
                render_inlines(c, out);
                out.push_str("</em>");
            }
            Inline::Strong(c) => {
                out.push_str("<strong>");
                render_inlines(c, out);
                out.push_str("</strong>");
            }
            Inline::Code(t) => {
                let _ = write!(out, "<code>{}</code>", escape_html(t));
            }
            Inline::Link { href, title, content } => {
                let _ = write!(out, "<a href=\"{}\"", escape_html(safe_url(href)));
                if let Some(t) = title {
                    let _ = write!(out, " title=\"{}\"", escape_html(t));
                }
                if is_external(href) {
                    out.push_str(" rel=\"noopener noreferrer\" target=\"_blank\"");
                }
                out.push('>');
                render_inlines(content, out);
                out.push_str("</a>");
            }
            Inline::Image { src, alt, title } => image(src, alt, title.as_deref(), out),
            Inline::Break => out.push_str("<br>\n"),
        }
    }
}
