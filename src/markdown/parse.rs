//! pulldown-cmark event stream to `Document`.

use super::ast::{plain_text, Block, Document, Inline};
use crate::content::validation::slugify;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};
use std::collections::HashMap;

enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    Quote,
    List(Option<u64>),
    Item,
    CodeBlock(Option<String>),
    Emphasis,
    Strong,
    Link { href: String, title: Option<String> },
    Image { src: String, title: Option<String> },
    /// Unsupported container; its content is merged into the parent.
    Passthrough,
}

struct Frame {
    kind: FrameKind,
    blocks: Vec<Block>,
    inlines: Vec<Inline>,
    items: Vec<Vec<Block>>,
    text: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Frame {
            kind,
            blocks: Vec::new(),
            inlines: Vec::new(),
            items: Vec::new(),
            text: String::new(),
        }
    }

    /// Loose inline content in a block container (tight list items) becomes a paragraph.
    fn flush_inlines(&mut self) {
        if !self.inlines.is_empty() {
            let inlines = std::mem::take(&mut self.inlines);
            self.blocks.push(Block::Paragraph(inlines));
        }
    }

    fn push_block(&mut self, block: Block) {
        self.flush_inlines();
        self.blocks.push(block);
    }

    fn push_text(&mut self, text: &str) {
        if let FrameKind::CodeBlock(_) = self.kind {
            self.text.push_str(text);
            return;
        }
        if let Some(Inline::Text(last)) = self.inlines.last_mut() {
            last.push_str(text);
        } else {
            self.inlines.push(Inline::Text(text.to_string()));
        }
    }
}

fn frame_for(tag: Tag<'_>) -> FrameKind {
    match tag {
        Tag::Paragraph => FrameKind::Paragraph,
        Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
        Tag::BlockQuote(..) => FrameKind::Quote,
        Tag::List(start) => FrameKind::List(start),
        Tag::Item => FrameKind::Item,
        Tag::CodeBlock(kind) => {
            let lang = match kind {
                CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                CodeBlockKind::Indented => None,
            };
            FrameKind::CodeBlock(lang)
        }
        Tag::Emphasis => FrameKind::Emphasis,
        Tag::Strong => FrameKind::Strong,
        Tag::Link { dest_url, title, .. } => FrameKind::Link {
            href: dest_url.to_string(),
            title: non_empty(&title),
        },
        Tag::Image { dest_url, title, .. } => FrameKind::Image {
            src: dest_url.to_string(),
            title: non_empty(&title),
        },
        _ => FrameKind::Passthrough,
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Hands out heading anchors, suffixing repeats: `intro`, `intro-1`, `intro-2`.
#[derive(Default)]
struct Anchors {
    seen: HashMap<String, usize>,
}

impl Anchors {
    fn next(&mut self, title: &str) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = "section".into();
        }
        let n = self.seen.entry(base.clone()).or_insert(0);
        let id = if *n == 0 { base } else { format!("{}-{}", base, n) };
        *n += 1;
        id
    }
}

struct Builder {
    stack: Vec<Frame>,
    anchors: Anchors,
}

impl Builder {
    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(mut frame) = self.stack.pop() else { return };
        let parent = self.top();
        match frame.kind {
            FrameKind::Root => {}
            FrameKind::Paragraph => {
                let lone_image = frame.inlines.len() == 1 && matches!(frame.inlines[0], Inline::Image { .. });
                let block = match frame.inlines.pop() {
                    Some(Inline::Image { src, alt, title }) if lone_image => Block::Image { src, alt, title },
                    Some(last) => {
                        frame.inlines.push(last);
                        Block::Paragraph(frame.inlines)
                    }
                    None => Block::Paragraph(Vec::new()),
                };
                parent.push_block(block);
            }
            FrameKind::Heading(level) => {
                let title = plain_text(&frame.inlines);
                let id = self.anchors.next(&title);
                self.top().push_block(Block::Heading {
                    level,
                    id,
                    content: frame.inlines,
                });
            }
            FrameKind::Quote => {
                frame.flush_inlines();
                parent.push_block(Block::Quote(frame.blocks));
            }
            FrameKind::List(start) => parent.push_block(Block::List {
                start,
                items: frame.items,
            }),
            FrameKind::Item => {
                frame.flush_inlines();
                parent.items.push(frame.blocks);
            }
            FrameKind::CodeBlock(lang) => parent.push_block(Block::Code { lang, code: frame.text }),
            FrameKind::Emphasis => parent.inlines.push(Inline::Emphasis(frame.inlines)),
            FrameKind::Strong => parent.inlines.push(Inline::Strong(frame.inlines)),
            FrameKind::Link { href, title } => parent.inlines.push(Inline::Link {
                href,
                title,
                content: frame.inlines,
            }),
            FrameKind::Image { src, title } => parent.inlines.push(Inline::Image {
                src,
                alt: plain_text(&frame.inlines),
                title,
            }),
            FrameKind::Passthrough => {
                parent.inlines.append(&mut frame.inlines);
                for block in frame.blocks {
                    parent.push_block(block);
                }
            }
        }
    }
}

pub fn parse(src: &str) -> Document {
    let mut b = Builder {
        stack: vec![Frame::new(FrameKind::Root)],
        anchors: Anchors::default(),
    };
    for event in Parser::new(src) {
        match event {
            Event::Start(tag) => b.stack.push(Frame::new(frame_for(tag))),
            Event::End(_) => b.close(),
            Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) => b.top().push_text(&t),
            Event::Code(t) => b.top().inlines.push(Inline::Code(t.to_string())),
            Event::SoftBreak => b.top().push_text(" "),
            Event::HardBreak => b.top().inlines.push(Inline::Break),
            Event::Rule => b.top().push_block(Block::Rule),
            _ => {}
        }
    }
    while b.stack.len() > 1 {
        b.close();
    }
    let root = b.top();
    root.flush_inlines();
    Document {
        blocks: std::mem::take(&mut root.blocks),
    }
}
