//! Markdown → block conversion.
//!
//! Walks pulldown-cmark events and emits one block per markdown block
//! element:
//!
//! ```text
//! "# Intro\n\n- [x] done\n- **bold** item"
//!     ↓ pulldown-cmark events
//! heading_1("Intro"), to_do(checked, "done"), bulleted_list_item(bold "bold", " item")
//! ```
//!
//! Nested lists are flattened: a child item becomes its own block after its
//! parent. Headings deeper than `###` clamp to `heading_3`, which is the
//! deepest level the store supports.

use mdsync_core::ContentBlock;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde_json::{json, Map, Value};

use crate::error::RenderError;
use crate::{split_at_utf16, BlockRenderer};

/// Longest text content accepted in one rich-text segment, in UTF-16 code
/// units.
pub const MAX_SEGMENT_CHARS: usize = 2000;

/// Most rich-text segments accepted in one block.
pub const MAX_SEGMENTS_PER_BLOCK: usize = 100;

/// Code languages the store accepts; anything else is sent as `plain text`.
const CODE_LANGUAGES: &[&str] = &[
    "bash", "c", "c#", "c++", "css", "diff", "docker", "go", "graphql", "html", "java",
    "javascript", "json", "kotlin", "makefile", "markdown", "php", "python", "ruby", "rust",
    "scss", "shell", "sql", "swift", "typescript", "yaml",
];

/// The default [`BlockRenderer`], backed by pulldown-cmark.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS,
        }
    }
}

impl BlockRenderer for MarkdownRenderer {
    fn try_render(&self, body: &str) -> Result<Vec<ContentBlock>, RenderError> {
        let mut state = State::default();
        for event in Parser::new_ext(body, self.options) {
            state.handle(event)?;
        }
        state.finish()
    }
}

// ---------------------------------------------------------------------------
// Conversion state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Heading(u8),
    Bulleted,
    Numbered,
    ToDo(bool),
    Quote,
    Code,
}

impl BlockKind {
    fn type_name(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(1) => "heading_1",
            BlockKind::Heading(2) => "heading_2",
            BlockKind::Heading(_) => "heading_3",
            BlockKind::Bulleted => "bulleted_list_item",
            BlockKind::Numbered => "numbered_list_item",
            BlockKind::ToDo(_) => "to_do",
            BlockKind::Quote => "quote",
            BlockKind::Code => "code",
        }
    }

    /// Text-only kinds are dropped when they end up with no content.
    fn skip_when_empty(self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph | BlockKind::Heading(_) | BlockKind::Quote
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    bold: bool,
    italic: bool,
    strikethrough: bool,
    code: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    text: String,
    style: Style,
    link: Option<String>,
}

impl Segment {
    fn to_json(&self) -> Value {
        let mut text = Map::new();
        text.insert("content".into(), Value::String(self.text.clone()));
        if let Some(url) = &self.link {
            text.insert("link".into(), json!({ "url": url }));
        }
        json!({
            "type": "text",
            "text": text,
            "annotations": {
                "bold": self.style.bold,
                "italic": self.style.italic,
                "strikethrough": self.style.strikethrough,
                "underline": false,
                "code": self.style.code,
                "color": "default",
            }
        })
    }
}

#[derive(Debug)]
struct PendingBlock {
    kind: BlockKind,
    segments: Vec<Segment>,
    language: Option<String>,
}

impl PendingBlock {
    fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            segments: Vec::new(),
            language: None,
        }
    }

    fn push(&mut self, text: &str, style: Style, link: Option<&str>) {
        let mut rest = text;
        if let Some(last) = self.segments.last_mut() {
            if last.style == style && last.link.as_deref() == link {
                let room = MAX_SEGMENT_CHARS.saturating_sub(last.text.encode_utf16().count());
                let (head, tail) = split_at_utf16(rest, room);
                last.text.push_str(head);
                rest = tail;
            }
        }
        while !rest.is_empty() {
            let (head, tail) = split_at_utf16(rest, MAX_SEGMENT_CHARS);
            self.segments.push(Segment {
                text: head.to_string(),
                style,
                link: link.map(str::to_string),
            });
            rest = tail;
        }
    }

    fn into_block(mut self) -> Result<Option<ContentBlock>, RenderError> {
        if self.kind == BlockKind::Code {
            if let Some(last) = self.segments.last_mut() {
                if last.text.ends_with('\n') {
                    last.text.pop();
                }
            }
            self.segments.retain(|s| !s.text.is_empty());
        }
        if self.segments.is_empty() && self.kind.skip_when_empty() {
            return Ok(None);
        }
        let type_name = self.kind.type_name();
        if self.segments.len() > MAX_SEGMENTS_PER_BLOCK {
            return Err(RenderError::RichTextLimit {
                block: type_name,
                count: self.segments.len(),
                limit: MAX_SEGMENTS_PER_BLOCK,
            });
        }

        let rich_text: Vec<Value> = self.segments.iter().map(Segment::to_json).collect();
        let mut body = Map::new();
        body.insert("rich_text".into(), Value::Array(rich_text));
        match self.kind {
            BlockKind::ToDo(checked) => {
                body.insert("checked".into(), Value::Bool(checked));
            }
            BlockKind::Code => {
                let language = self.language.as_deref().map_or("plain text", code_language);
                body.insert("language".into(), Value::String(language.to_string()));
            }
            _ => {}
        }

        let mut block = Map::new();
        block.insert("object".into(), Value::String("block".into()));
        block.insert("type".into(), Value::String(type_name.into()));
        block.insert(type_name.into(), Value::Object(body));
        Ok(Some(ContentBlock(Value::Object(block))))
    }
}

#[derive(Debug, Default)]
struct State {
    blocks: Vec<ContentBlock>,
    current: Option<PendingBlock>,
    /// One entry per open list; `true` for ordered lists.
    lists: Vec<bool>,
    quote_depth: usize,
    bold: u32,
    italic: u32,
    strikethrough: u32,
    link: Option<String>,
}

impl State {
    fn handle(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(Tag::Paragraph) => match &mut self.current {
                Some(block) if !block.segments.is_empty() => {
                    block.push("\n", Style::default(), None);
                }
                Some(_) => {}
                None => {
                    let kind = if self.quote_depth > 0 {
                        BlockKind::Quote
                    } else {
                        BlockKind::Paragraph
                    };
                    self.open(kind)?;
                }
            },
            Event::End(TagEnd::Paragraph) => {
                if matches!(&self.current, Some(b) if b.kind == BlockKind::Paragraph) {
                    self.flush()?;
                }
            }

            Event::Start(Tag::Heading { level, .. }) => self.open(heading_kind(level))?,
            Event::End(TagEnd::Heading(_)) => self.close("heading")?,

            Event::Start(Tag::BlockQuote(_)) => {
                self.quote_depth += 1;
                self.open(BlockKind::Quote)?;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                if self.quote_depth == 0 {
                    return Err(malformed("block quote closed without being opened"));
                }
                self.quote_depth -= 1;
                self.flush()?;
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                self.open(BlockKind::Code)?;
                if let (Some(block), CodeBlockKind::Fenced(info)) = (&mut self.current, kind) {
                    let lang = info.split_whitespace().next().unwrap_or_default();
                    if !lang.is_empty() {
                        block.language = Some(lang.to_string());
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => self.close("code block")?,

            Event::Start(Tag::HtmlBlock) => self.open(BlockKind::Paragraph)?,
            Event::End(TagEnd::HtmlBlock) => self.flush()?,

            Event::Start(Tag::List(start)) => {
                self.flush()?;
                self.lists.push(start.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.flush()?;
                if self.lists.pop().is_none() {
                    return Err(malformed("list closed without being opened"));
                }
            }
            Event::Start(Tag::Item) => {
                let ordered = *self
                    .lists
                    .last()
                    .ok_or_else(|| malformed("list item outside of a list"))?;
                let kind = if ordered {
                    BlockKind::Numbered
                } else {
                    BlockKind::Bulleted
                };
                self.open(kind)?;
            }
            Event::End(TagEnd::Item) => self.flush()?,
            Event::TaskListMarker(checked) => {
                if let Some(block) = &mut self.current {
                    block.kind = BlockKind::ToDo(checked);
                }
            }

            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                self.strikethrough = self.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::Link { dest_url, .. }) | Event::Start(Tag::Image { dest_url, .. }) => {
                self.link = link_target(&dest_url);
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => self.link = None,

            Event::Text(text) => self.text(&text, false)?,
            Event::Code(text) => self.text(&text, true)?,
            Event::Html(text) | Event::InlineHtml(text) => self.text(&text, false)?,
            Event::SoftBreak => self.text(" ", false)?,
            Event::HardBreak => self.text("\n", false)?,
            Event::Rule => {
                self.flush()?;
                self.blocks.push(ContentBlock(json!({
                    "object": "block",
                    "type": "divider",
                    "divider": {},
                })));
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<ContentBlock>, RenderError> {
        self.flush()?;
        Ok(self.blocks)
    }

    fn open(&mut self, kind: BlockKind) -> Result<(), RenderError> {
        self.flush()?;
        self.current = Some(PendingBlock::new(kind));
        Ok(())
    }

    fn close(&mut self, what: &str) -> Result<(), RenderError> {
        if self.current.is_none() {
            return Err(malformed(&format!("{what} closed without being opened")));
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        if let Some(block) = self.current.take() {
            if let Some(block) = block.into_block()? {
                self.blocks.push(block);
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str, inline_code: bool) -> Result<(), RenderError> {
        if self.current.is_none() {
            self.open(BlockKind::Paragraph)?;
        }
        let style = Style {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strikethrough: self.strikethrough > 0,
            code: inline_code,
        };
        let link = self.link.clone();
        if let Some(block) = &mut self.current {
            if block.kind == BlockKind::Code {
                block.push(text, Style::default(), None);
            } else {
                block.push(text, style, link.as_deref());
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn malformed(reason: &str) -> RenderError {
    RenderError::Malformed {
        reason: reason.to_string(),
    }
}

fn heading_kind(level: HeadingLevel) -> BlockKind {
    match level {
        HeadingLevel::H1 => BlockKind::Heading(1),
        HeadingLevel::H2 => BlockKind::Heading(2),
        _ => BlockKind::Heading(3),
    }
}

fn code_language(lang: &str) -> &'static str {
    let lower = lang.to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "rs" => "rust",
        "sh" | "zsh" | "console" => "shell",
        "yml" => "yaml",
        "md" => "markdown",
        "cpp" | "cxx" => "c++",
        "cs" | "csharp" => "c#",
        "dockerfile" => "docker",
        "make" => "makefile",
        other => other,
    };
    CODE_LANGUAGES
        .iter()
        .find(|known| **known == canonical)
        .copied()
        .unwrap_or("plain text")
}

/// Link destination the store will accept, if any.
///
/// Only absolute `http`, `https` and `mailto` URLs pass; relative paths,
/// anchors and empty destinations leave the text unlinked.
fn link_target(dest: &str) -> Option<String> {
    let dest = dest.trim();
    if dest.chars().any(char::is_whitespace) {
        return None;
    }
    let (scheme, rest) = dest.split_once(':')?;
    let valid = match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" => rest
            .strip_prefix("//")
            .and_then(|r| r.split(['/', '?', '#']).next())
            .is_some_and(|host| !host.is_empty()),
        "mailto" => !rest.is_empty(),
        _ => false,
    };
    valid.then(|| dest.to_string())
}
