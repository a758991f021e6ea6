mod html_block;
mod leaf_blocks;
mod link_ref_def;
mod parser;

use html_block::*;
use leaf_blocks::*;
use link_ref_def::*;

use crate::ast::{Block, Document, List, ListItem, ListKind};
use crate::error::Result;
use crate::inline::{LinkRefMap, LinkReference, normalize_reference_label, parse_inlines};
use std::borrow::Cow;

/// Block quotes and list items nested deeper than this are not opened; their
/// markers stay in the text of the innermost block.
const MAX_CONTAINER_DEPTH: usize = 128;

/// Parse a Markdown string into a [`Document`].
///
/// Parsing never fails: constructs that do not close properly are kept as
/// literal text.
///
/// # Examples
///
/// ```
/// use mdrender::{Block, Inline, parse};
///
/// let doc = parse("# Hello");
/// assert_eq!(
///     doc.blocks,
///     vec![Block::Heading {
///         level: 1,
///         content: vec![Inline::text("Hello")],
///     }]
/// );
/// ```
pub fn parse(markdown: &str) -> Document {
    let input: Cow<'_, str> = if memchr::memchr(0, markdown.as_bytes()).is_some() {
        Cow::Owned(markdown.replace('\0', "\u{FFFD}"))
    } else {
        Cow::Borrowed(markdown)
    };
    let mut parser = BlockParser::new(&input);
    let skeleton = parser.parse();
    let refs = parser.ref_defs;
    Document {
        blocks: convert_all(skeleton, &refs),
    }
}

/// Parse raw bytes into a [`Document`], failing only when the bytes are not
/// valid UTF-8.
///
/// ```
/// use mdrender::{RenderError, parse_bytes};
///
/// assert!(parse_bytes(b"*ok*").is_ok());
/// assert_eq!(
///     parse_bytes(b"ab\xc3"),
///     Err(RenderError::InvalidUtf8 { valid_up_to: 2 })
/// );
/// ```
pub fn parse_bytes(input: &[u8]) -> Result<Document> {
    let text = std::str::from_utf8(input)?;
    Ok(parse(text))
}

/// A finished block whose inline content has not been parsed yet.
#[derive(Clone, Debug)]
struct RawBlock {
    kind: RawKind,
    start_line: usize,
    end_line: usize,
}

#[derive(Clone, Debug)]
enum RawKind {
    BlockQuote(Vec<RawBlock>),
    List {
        kind: ListKind,
        start: u32,
        tight: bool,
        items: Vec<RawBlock>,
    },
    ListItem(Vec<RawBlock>),
    Paragraph(String),
    Heading { level: u8, raw: String },
    CodeBlock { info: String, literal: String },
    HtmlBlock(String),
    ThematicBreak,
}

fn convert_all(blocks: Vec<RawBlock>, refs: &LinkRefMap) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|block| block.into_block(refs))
        .collect()
}

impl RawBlock {
    fn into_block(self, refs: &LinkRefMap) -> Block {
        match self.kind {
            RawKind::BlockQuote(children) => Block::BlockQuote {
                children: convert_all(children, refs),
            },
            RawKind::List {
                kind,
                start,
                tight,
                items,
            } => Block::List(List {
                kind,
                start,
                tight,
                items: items
                    .into_iter()
                    .map(|item| match item.kind {
                        RawKind::ListItem(children) => ListItem {
                            children: convert_all(children, refs),
                        },
                        _ => ListItem {
                            children: vec![item.into_block(refs)],
                        },
                    })
                    .collect(),
            }),
            // Items are always finalized into a list; never reached.
            RawKind::ListItem(children) => Block::BlockQuote {
                children: convert_all(children, refs),
            },
            RawKind::Paragraph(raw) => Block::Paragraph {
                content: parse_inlines(&raw, refs),
            },
            RawKind::Heading { level, raw } => Block::Heading {
                level,
                content: parse_inlines(&raw, refs),
            },
            RawKind::CodeBlock { info, literal } => Block::CodeBlock { info, literal },
            RawKind::HtmlBlock(literal) => Block::HtmlBlock { literal },
            RawKind::ThematicBreak => Block::ThematicBreak,
        }
    }
}

/// Cursor over one input line. Columns account for tabs (tab stops of 4);
/// `partially_consumed_tab` is set when a container consumed only part of a
/// tab's width.
#[derive(Clone, Debug)]
struct Line<'a> {
    raw: &'a str,
    offset: usize,
    column: usize,
    next_nonspace: usize,
    next_nonspace_column: usize,
    indent: usize,
    indented: bool,
    blank: bool,
    partially_consumed_tab: bool,
}

impl<'a> Line<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            offset: 0,
            column: 0,
            next_nonspace: 0,
            next_nonspace_column: 0,
            indent: 0,
            indented: false,
            blank: false,
            partially_consumed_tab: false,
        }
    }

    #[inline]
    fn find_next_nonspace(&mut self) {
        let bytes = self.raw.as_bytes();
        let mut i = self.offset;
        let mut cols = self.column;
        while i < bytes.len() {
            match bytes[i] {
                b' ' => {
                    i += 1;
                    cols += 1;
                }
                b'\t' => {
                    i += 1;
                    cols += 4 - (cols % 4);
                }
                _ => break,
            }
        }
        self.blank = i >= bytes.len();
        self.next_nonspace = i;
        self.next_nonspace_column = cols;
        self.indent = cols - self.column;
        self.indented = self.indent >= 4;
    }

    #[inline]
    fn advance_next_nonspace(&mut self) {
        self.offset = self.next_nonspace;
        self.column = self.next_nonspace_column;
        self.partially_consumed_tab = false;
    }

    /// Advances by `count` bytes, or by `count` columns when `columns` is
    /// set (a tab may then be consumed partially).
    fn advance_offset(&mut self, mut count: usize, columns: bool) {
        let bytes = self.raw.as_bytes();
        while count > 0 && self.offset < bytes.len() {
            if bytes[self.offset] == b'\t' {
                let chars_to_tab = 4 - (self.column % 4);
                if columns {
                    self.partially_consumed_tab = chars_to_tab > count;
                    let chars_to_advance = chars_to_tab.min(count);
                    self.column += chars_to_advance;
                    if !self.partially_consumed_tab {
                        self.offset += 1;
                    }
                    count -= chars_to_advance;
                } else {
                    self.partially_consumed_tab = false;
                    self.column += chars_to_tab;
                    self.offset += 1;
                    count -= 1;
                }
            } else {
                self.partially_consumed_tab = false;
                self.offset += 1;
                self.column += 1;
                count -= 1;
            }
        }
    }

    #[inline]
    fn peek_nonspace(&self) -> Option<u8> {
        self.raw.as_bytes().get(self.next_nonspace).copied()
    }

    #[inline]
    fn space_or_tab_at_offset(&self) -> bool {
        matches!(self.raw.as_bytes().get(self.offset), Some(b' ' | b'\t'))
    }

    /// Text from the first non-space character on.
    #[inline]
    fn rest(&self) -> &'a str {
        &self.raw[self.next_nonspace.min(self.raw.len())..]
    }

    /// Text from the current offset on.
    #[inline]
    fn remainder(&self) -> &'a str {
        &self.raw[self.offset.min(self.raw.len())..]
    }
}

#[derive(Clone, Debug)]
struct FencedCodeData {
    fence_char: u8,
    fence_len: usize,
    fence_offset: usize,
}

#[derive(Clone, Debug)]
enum OpenBlockType {
    Document,
    BlockQuote,
    List { kind: ListKind, start: u32 },
    ListItem { content_indent: usize },
    FencedCode(Box<FencedCodeData>),
    IndentedCode,
    HtmlBlock { end_condition: HtmlBlockEnd },
    Paragraph,
}

impl OpenBlockType {
    fn can_contain(&self, child_is_item: bool) -> bool {
        match self {
            OpenBlockType::Document | OpenBlockType::BlockQuote | OpenBlockType::ListItem { .. } => {
                !child_is_item
            }
            OpenBlockType::List { .. } => child_is_item,
            _ => false,
        }
    }

    fn accepts_lines(&self) -> bool {
        matches!(
            self,
            OpenBlockType::Paragraph
                | OpenBlockType::FencedCode(_)
                | OpenBlockType::IndentedCode
                | OpenBlockType::HtmlBlock { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum HtmlBlockEnd {
    RawTextEndTag,
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    BlankLine,
}

#[derive(Clone, Debug)]
struct OpenBlock {
    block_type: OpenBlockType,
    start_line: usize,
    content: String,
    children: Vec<RawBlock>,
}

impl OpenBlock {
    #[inline]
    fn new(block_type: OpenBlockType, start_line: usize) -> Self {
        Self {
            block_type,
            start_line,
            content: String::new(),
            children: Vec::new(),
        }
    }
}

pub(crate) struct BlockParser<'a> {
    input: &'a str,
    pub(crate) ref_defs: LinkRefMap,
    open: Vec<OpenBlock>,
    line_number: usize,
    all_closed: bool,
    last_matched: usize,
}

impl<'a> BlockParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut open = Vec::with_capacity(16);
        open.push(OpenBlock::new(OpenBlockType::Document, 0));
        Self {
            input,
            ref_defs: LinkRefMap::default(),
            open,
            line_number: 0,
            all_closed: true,
            last_matched: 1,
        }
    }

    fn parse(&mut self) -> Vec<RawBlock> {
        let input = self.input;
        let bytes = input.as_bytes();
        let len = bytes.len();
        let mut start = 0;
        while start < len {
            let end = memchr::memchr2(b'\n', b'\r', &bytes[start..]).map_or(len, |off| start + off);
            self.process_line(&input[start..end]);
            start = if end + 1 < len && bytes[end] == b'\r' && bytes[end + 1] == b'\n' {
                end + 2
            } else {
                end + 1
            };
        }
        while self.open.len() > 1 {
            self.close_top_block(self.line_number);
        }
        self.open
            .pop()
            .map(|doc| doc.children)
            .unwrap_or_default()
    }

    #[inline]
    fn tip(&self) -> &OpenBlock {
        &self.open[self.open.len() - 1]
    }

    #[inline]
    fn tip_mut(&mut self) -> &mut OpenBlock {
        let last = self.open.len() - 1;
        &mut self.open[last]
    }

    fn close_top_block(&mut self, end_line: usize) {
        if self.open.len() <= 1 {
            return;
        }
        let Some(block) = self.open.pop() else {
            return;
        };
        if let Some(finished) = self.finalize_block(block, end_line) {
            self.tip_mut().children.push(finished);
        }
    }

    /// Closes the blocks that did not match the current line, once.
    fn close_unmatched_blocks(&mut self) {
        if !self.all_closed {
            while self.open.len() > self.last_matched {
                self.close_top_block(self.line_number - 1);
            }
            self.all_closed = true;
        }
    }

    fn add_child(&mut self, block_type: OpenBlockType) {
        let is_item = matches!(block_type, OpenBlockType::ListItem { .. });
        while !self.tip().block_type.can_contain(is_item) {
            self.close_top_block(self.line_number - 1);
        }
        self.open.push(OpenBlock::new(block_type, self.line_number));
    }

    /// Adds a single-line leaf block (heading, thematic break) that is
    /// complete as soon as it is seen.
    fn add_leaf(&mut self, kind: RawKind) {
        while !self.tip().block_type.can_contain(false) {
            self.close_top_block(self.line_number - 1);
        }
        let line = self.line_number;
        self.tip_mut().children.push(RawBlock {
            kind,
            start_line: line,
            end_line: line,
        });
    }

    fn add_line(&mut self, line: &mut Line<'a>) {
        let tip = self.open.len() - 1;
        let content = &mut self.open[tip].content;
        if line.partially_consumed_tab {
            line.offset += 1;
            let chars_to_tab = 4 - (line.column % 4);
            content.extend(std::iter::repeat_n(' ', chars_to_tab));
        }
        content.push_str(line.remainder());
        content.push('\n');
    }

    fn finalize_block(&mut self, block: OpenBlock, end_line: usize) -> Option<RawBlock> {
        let start_line = block.start_line;
        let mut end_line = end_line;
        let kind = match block.block_type {
            OpenBlockType::Document => return None,
            OpenBlockType::BlockQuote => RawKind::BlockQuote(block.children),
            OpenBlockType::List { kind, start } => {
                end_line = block.children.last().map_or(start_line, |c| c.end_line);
                let tight = is_tight_list(&block.children);
                RawKind::List {
                    kind,
                    start,
                    tight,
                    items: block.children,
                }
            }
            OpenBlockType::ListItem { .. } => {
                end_line = block.children.last().map_or(start_line, |c| c.end_line);
                RawKind::ListItem(block.children)
            }
            OpenBlockType::FencedCode(_) => {
                let (first, rest) = block
                    .content
                    .split_once('\n')
                    .unwrap_or((block.content.as_str(), ""));
                RawKind::CodeBlock {
                    info: crate::inline::unescape_string(trim_spaces_tabs(first)).into_owned(),
                    literal: rest.to_string(),
                }
            }
            OpenBlockType::IndentedCode => {
                let mut literal = block.content;
                strip_trailing_blank_lines(&mut literal);
                literal.push('\n');
                end_line = start_line + literal.matches('\n').count() - 1;
                RawKind::CodeBlock {
                    info: String::new(),
                    literal,
                }
            }
            OpenBlockType::HtmlBlock { .. } => {
                let mut literal = block.content;
                strip_trailing_blank_lines(&mut literal);
                end_line = start_line + literal.matches('\n').count();
                RawKind::HtmlBlock(literal)
            }
            OpenBlockType::Paragraph => {
                let content = block.content;
                let consumed = self.extract_ref_defs(&content);
                let rest = &content[consumed..];
                if rest.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n')) {
                    return None;
                }
                RawKind::Paragraph(if consumed == 0 {
                    content
                } else {
                    rest.to_string()
                })
            }
        };
        Some(RawBlock {
            kind,
            start_line,
            end_line,
        })
    }

    /// Registers the link reference definitions at the start of a paragraph's
    /// text. Returns the number of bytes they occupy.
    fn extract_ref_defs(&mut self, content: &str) -> usize {
        let mut pos = 0;
        while content.as_bytes().get(pos) == Some(&b'[') {
            let Some(def) = parse_link_ref_def(&content[pos..]) else {
                break;
            };
            let key = normalize_reference_label(&def.label).into_owned();
            self.ref_defs.entry(key).or_insert(LinkReference {
                href: def.destination,
                title: def.title,
            });
            pos += def.consumed;
        }
        pos
    }
}

/// A list is loose when any item, or any block directly inside an item, is
/// followed by a blank line before its next sibling.
fn is_tight_list(items: &[RawBlock]) -> bool {
    for (i, item) in items.iter().enumerate() {
        if let Some(next) = items.get(i + 1)
            && item.end_line + 1 != next.start_line
        {
            return false;
        }
        if let RawKind::ListItem(children) = &item.kind {
            let gap = children
                .windows(2)
                .any(|pair| pair[0].end_line + 1 != pair[1].start_line);
            if gap {
                return false;
            }
        }
    }
    true
}

/// Removes a trailing run of lines that contain only spaces, along with the
/// final line ending.
fn strip_trailing_blank_lines(s: &mut String) {
    let bytes = s.as_bytes();
    let mut cut = None;
    let mut i = bytes.len();
    loop {
        let mut j = i;
        while j > 0 && bytes[j - 1] == b' ' {
            j -= 1;
        }
        if j > 0 && bytes[j - 1] == b'\n' {
            i = j - 1;
            cut = Some(i);
        } else {
            break;
        }
    }
    if let Some(cut) = cut {
        s.truncate(cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton(input: &str) -> Vec<RawBlock> {
        BlockParser::new(input).parse()
    }

    #[test]
    fn line_cursor_expands_tabs() {
        let mut line = Line::new(" \tfoo");
        line.find_next_nonspace();
        assert_eq!(line.indent, 4);
        assert!(line.indented);
        assert_eq!(line.rest(), "foo");
    }

    #[test]
    fn line_cursor_consumes_partial_tab() {
        let mut line = Line::new("\tfoo");
        line.advance_offset(2, true);
        assert!(line.partially_consumed_tab);
        assert_eq!(line.column, 2);
        assert_eq!(line.offset, 0);
        line.find_next_nonspace();
        assert_eq!(line.indent, 2);
    }

    #[test]
    fn strips_trailing_blank_lines() {
        let mut s = String::from("a\n  \n\n");
        strip_trailing_blank_lines(&mut s);
        assert_eq!(s, "a");
        let mut s = String::from("a  ");
        strip_trailing_blank_lines(&mut s);
        assert_eq!(s, "a  ");
    }

    #[test]
    fn records_line_spans() {
        let blocks = skeleton("para\nstill para\n\n# head\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (4, 4));
    }

    #[test]
    fn blank_line_between_items_makes_list_loose() {
        let blocks = skeleton("- a\n\n- b\n");
        match &blocks[0].kind {
            RawKind::List { tight, items, .. } => {
                assert!(!tight);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
        let blocks = skeleton("- a\n- b\n\n");
        assert!(matches!(blocks[0].kind, RawKind::List { tight: true, .. }));
    }

    #[test]
    fn indented_code_ends_before_trailing_blank_lines() {
        let blocks = skeleton("-     code\n\n- b\n");
        match &blocks[0].kind {
            RawKind::List { tight, items, .. } => {
                assert!(!tight);
                assert_eq!(items[0].end_line, 1);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn reference_only_paragraph_disappears() {
        let mut parser = BlockParser::new("[foo]: /url \"title\"\n");
        let blocks = parser.parse();
        assert!(blocks.is_empty());
        let def = parser.ref_defs.get("foo").cloned();
        assert_eq!(
            def,
            Some(LinkReference {
                href: "/url".to_string(),
                title: Some("title".to_string()),
            })
        );
    }

    #[test]
    fn deep_nesting_is_capped() {
        let input = ">".repeat(MAX_CONTAINER_DEPTH * 2) + " x";
        let doc = parse(&input);
        let mut depth = 0;
        let mut blocks = &doc.blocks;
        while let Some(Block::BlockQuote { children }) = blocks.first() {
            depth += 1;
            blocks = children;
        }
        assert!(depth < MAX_CONTAINER_DEPTH);
        assert!(matches!(blocks.first(), Some(Block::Paragraph { .. })));
    }
}
