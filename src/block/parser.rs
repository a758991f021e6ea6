use super::*;

enum Continuation {
    Matched,
    Unmatched,
    /// The line was fully handled (a closing code fence).
    Consumed,
}

enum BlockStart {
    None,
    Container,
    Leaf,
    /// A single-line block was added; nothing else happens on this line.
    Done,
}

#[inline]
fn may_start_block(b: Option<u8>) -> bool {
    matches!(
        b,
        Some(b'#' | b'`' | b'~' | b'*' | b'+' | b'_' | b'=' | b'<' | b'>' | b'-' | b'0'..=b'9')
    )
}

impl<'a> BlockParser<'a> {
    pub(super) fn process_line(&mut self, raw: &'a str) {
        self.line_number += 1;
        let mut line = Line::new(raw);
        let num_open = self.open.len();

        let mut matched = 1;
        let mut all_matched = true;
        for i in 1..num_open {
            line.find_next_nonspace();
            match self.continue_block(i, &mut line) {
                Continuation::Matched => matched = i + 1,
                Continuation::Unmatched => {
                    all_matched = false;
                    break;
                }
                Continuation::Consumed => return,
            }
        }
        self.all_closed = all_matched;
        self.last_matched = matched;

        let mut container = matched;
        let mut matched_leaf = {
            let block_type = &self.open[container - 1].block_type;
            block_type.accepts_lines() && !matches!(block_type, OpenBlockType::Paragraph)
        };

        while !matched_leaf {
            line.find_next_nonspace();
            if !line.indented && !may_start_block(line.peek_nonspace()) {
                line.advance_next_nonspace();
                break;
            }
            match self.try_block_starts(&mut line, container) {
                BlockStart::Container => container = self.open.len(),
                BlockStart::Leaf => {
                    container = self.open.len();
                    matched_leaf = true;
                }
                BlockStart::Done => return,
                BlockStart::None => {
                    line.advance_next_nonspace();
                    break;
                }
            }
        }

        // Lazy continuation of a paragraph that lost its containers.
        if !self.all_closed
            && !line.blank
            && matches!(self.tip().block_type, OpenBlockType::Paragraph)
        {
            self.add_line(&mut line);
            return;
        }

        self.close_unmatched_blocks();
        if self.tip().block_type.accepts_lines() {
            let rest = line.remainder();
            self.add_line(&mut line);
            if let OpenBlockType::HtmlBlock { end_condition } = self.tip().block_type
                && end_condition != HtmlBlockEnd::BlankLine
                && html_block_ends(end_condition, rest)
            {
                self.close_top_block(self.line_number);
            }
        } else if line.offset < raw.len() && !line.blank {
            self.add_child(OpenBlockType::Paragraph);
            line.advance_next_nonspace();
            self.add_line(&mut line);
        }
    }

    fn continue_block(&mut self, i: usize, line: &mut Line<'a>) -> Continuation {
        match &self.open[i].block_type {
            OpenBlockType::Document | OpenBlockType::List { .. } => Continuation::Matched,
            OpenBlockType::BlockQuote => {
                if !line.indented && line.peek_nonspace() == Some(b'>') {
                    line.advance_next_nonspace();
                    line.advance_offset(1, false);
                    if line.space_or_tab_at_offset() {
                        line.advance_offset(1, true);
                    }
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            OpenBlockType::ListItem { content_indent } => {
                let content_indent = *content_indent;
                if line.blank {
                    let has_child = !self.open[i].children.is_empty() || i + 1 < self.open.len();
                    if has_child {
                        line.advance_next_nonspace();
                        Continuation::Matched
                    } else {
                        Continuation::Unmatched
                    }
                } else if line.indent >= content_indent {
                    line.advance_offset(content_indent, true);
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            OpenBlockType::FencedCode(data) => {
                let (fence_char, fence_len, fence_offset) =
                    (data.fence_char, data.fence_len, data.fence_offset);
                if !line.indented && is_closing_fence(line.rest(), fence_char, fence_len) {
                    self.close_top_block(self.line_number);
                    return Continuation::Consumed;
                }
                let mut remaining = fence_offset;
                while remaining > 0 && line.space_or_tab_at_offset() {
                    line.advance_offset(1, true);
                    remaining -= 1;
                }
                Continuation::Matched
            }
            OpenBlockType::IndentedCode => {
                if line.indented {
                    line.advance_offset(4, true);
                    Continuation::Matched
                } else if line.blank {
                    line.advance_next_nonspace();
                    Continuation::Matched
                } else {
                    Continuation::Unmatched
                }
            }
            OpenBlockType::HtmlBlock { end_condition } => {
                if line.blank && *end_condition == HtmlBlockEnd::BlankLine {
                    Continuation::Unmatched
                } else {
                    Continuation::Matched
                }
            }
            OpenBlockType::Paragraph => {
                if line.blank {
                    Continuation::Unmatched
                } else {
                    Continuation::Matched
                }
            }
        }
    }

    fn try_block_starts(&mut self, line: &mut Line<'a>, container: usize) -> BlockStart {
        let container_is_paragraph =
            matches!(self.open[container - 1].block_type, OpenBlockType::Paragraph);
        let next = line.peek_nonspace();
        let rest = line.rest();
        let room_for_container = self.open.len() < MAX_CONTAINER_DEPTH;

        if !line.indented {
            if next == Some(b'>') && room_for_container {
                line.advance_next_nonspace();
                line.advance_offset(1, false);
                if line.space_or_tab_at_offset() {
                    line.advance_offset(1, true);
                }
                self.close_unmatched_blocks();
                self.add_child(OpenBlockType::BlockQuote);
                return BlockStart::Container;
            }

            if let Some((level, content)) = parse_atx_heading(rest) {
                self.close_unmatched_blocks();
                self.add_leaf(RawKind::Heading {
                    level,
                    raw: content.to_string(),
                });
                return BlockStart::Done;
            }

            if let Some((fence_char, fence_len)) = parse_fence_start(rest) {
                let fence_offset = line.indent;
                self.close_unmatched_blocks();
                self.add_child(OpenBlockType::FencedCode(Box::new(FencedCodeData {
                    fence_char,
                    fence_len,
                    fence_offset,
                })));
                line.advance_next_nonspace();
                line.advance_offset(fence_len, false);
                return BlockStart::Leaf;
            }

            if next == Some(b'<') {
                let lazy_paragraph = !self.all_closed
                    && !line.blank
                    && matches!(self.tip().block_type, OpenBlockType::Paragraph);
                let interrupts_paragraph = container_is_paragraph || lazy_paragraph;
                if let Some(end_condition) = parse_html_block_start(rest, interrupts_paragraph) {
                    self.close_unmatched_blocks();
                    self.add_child(OpenBlockType::HtmlBlock { end_condition });
                    return BlockStart::Leaf;
                }
            }

            if container_is_paragraph
                && let Some(level) = parse_setext_underline(rest)
            {
                self.close_unmatched_blocks();
                if self.convert_paragraph_to_heading(level) {
                    return BlockStart::Done;
                }
            }

            if is_thematic_break(rest) {
                self.close_unmatched_blocks();
                self.add_leaf(RawKind::ThematicBreak);
                return BlockStart::Done;
            }

            if room_for_container
                && let Some(marker) = parse_list_marker(rest)
                && self.open_list_item(line, marker, container_is_paragraph)
            {
                return BlockStart::Container;
            }
        } else if !line.blank && !matches!(self.tip().block_type, OpenBlockType::Paragraph) {
            line.advance_offset(4, true);
            self.close_unmatched_blocks();
            self.add_child(OpenBlockType::IndentedCode);
            return BlockStart::Leaf;
        }

        BlockStart::None
    }

    /// Turns the open paragraph into a setext heading. Returns `false` when
    /// the paragraph held nothing but link reference definitions.
    fn convert_paragraph_to_heading(&mut self, level: u8) -> bool {
        let content = std::mem::take(&mut self.tip_mut().content);
        let consumed = self.extract_ref_defs(&content);
        let heading_text = &content[consumed..];
        if heading_text.is_empty() {
            return false;
        }
        let Some(paragraph) = self.open.pop() else {
            return false;
        };
        let end_line = self.line_number;
        self.tip_mut().children.push(RawBlock {
            kind: RawKind::Heading {
                level,
                raw: heading_text.to_string(),
            },
            start_line: paragraph.start_line,
            end_line,
        });
        true
    }

    fn open_list_item(
        &mut self,
        line: &mut Line<'a>,
        marker: ListMarker,
        container_is_paragraph: bool,
    ) -> bool {
        if container_is_paragraph && !can_interrupt_paragraph(&marker) {
            return false;
        }

        let marker_offset = line.indent;
        line.advance_next_nonspace();
        line.advance_offset(marker.len, true);
        let spaces_start_col = line.column;
        let spaces_start_offset = line.offset;
        loop {
            line.advance_offset(1, true);
            let more = line.column - spaces_start_col < 5 && line.space_or_tab_at_offset();
            if !more {
                break;
            }
        }
        let blank_item = line.offset >= line.raw.len();
        let spaces_after_marker = line.column - spaces_start_col;
        let padding = if !(1..5).contains(&spaces_after_marker) || blank_item {
            line.column = spaces_start_col;
            line.offset = spaces_start_offset;
            line.partially_consumed_tab = false;
            if line.space_or_tab_at_offset() {
                line.advance_offset(1, true);
            }
            marker.len + 1
        } else {
            marker.len + spaces_after_marker
        };

        self.close_unmatched_blocks();
        let continues_list = matches!(
            self.tip().block_type,
            OpenBlockType::List { kind, .. } if kind == marker.kind
        );
        if !continues_list {
            self.add_child(OpenBlockType::List {
                kind: marker.kind,
                start: marker.start,
            });
        }
        self.add_child(OpenBlockType::ListItem {
            content_indent: marker_offset + padding,
        });
        true
    }
}
