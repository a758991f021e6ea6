use super::*;

/// Maximal backtick runs of `bytes`, grouped by length, positions ascending.
fn index_backtick_runs(bytes: &[u8]) -> HashMap<usize, Vec<usize>> {
    let mut runs: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut i = 0;
    while let Some(off) = memchr::memchr(b'`', &bytes[i..]) {
        let start = i + off;
        let mut end = start;
        while end < bytes.len() && bytes[end] == b'`' {
            end += 1;
        }
        runs.entry(end - start).or_default().push(start);
        i = end;
    }
    runs
}

impl<'a> InlineScanner<'a> {
    pub(super) fn scan_all(&mut self) {
        let mut text_start = self.pos;

        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if !SPECIAL[b as usize] {
                self.pos += 1;
                while self.pos < self.bytes.len() && !SPECIAL[self.bytes[self.pos] as usize] {
                    self.pos += 1;
                }
                continue;
            }

            match b {
                b'\\' => {
                    match self.bytes.get(self.pos + 1) {
                        Some(b'\n') => {
                            self.flush_text_range(text_start, self.pos);
                            self.items.push(InlineItem::HardBreak);
                            self.pos += 2;
                            self.skip_line_start_spaces();
                            text_start = self.pos;
                        }
                        Some(&next) if is_ascii_punctuation(next) => {
                            self.flush_text_range(text_start, self.pos);
                            self.items
                                .push(InlineItem::TextRange(self.pos + 1, self.pos + 2));
                            self.pos += 2;
                            text_start = self.pos;
                        }
                        _ => self.pos += 1,
                    }
                }
                b'`' => {
                    self.flush_text_range(text_start, self.pos);
                    self.scan_code_span();
                    text_start = self.pos;
                }
                b'*' | b'_' => {
                    self.flush_text_range(text_start, self.pos);
                    self.scan_delim_run(b);
                    text_start = self.pos;
                }
                b'!' => {
                    if self.bytes.get(self.pos + 1) == Some(&b'[') {
                        self.flush_text_range(text_start, self.pos);
                        self.pos += 2;
                        self.push_bracket(true);
                        text_start = self.pos;
                    } else {
                        self.pos += 1;
                    }
                }
                b'[' => {
                    self.flush_text_range(text_start, self.pos);
                    self.pos += 1;
                    self.push_bracket(false);
                    text_start = self.pos;
                }
                b']' => {
                    self.flush_text_range(text_start, self.pos);
                    self.handle_close_bracket();
                    text_start = self.pos;
                }
                b'<' => {
                    self.flush_text_range(text_start, self.pos);
                    text_start = self.pos;
                    if self.try_autolink() || self.try_html_inline() {
                        text_start = self.pos;
                    } else {
                        self.pos += 1;
                    }
                }
                b'&' => {
                    self.flush_text_range(text_start, self.pos);
                    text_start = self.pos;
                    let mut decoded = String::new();
                    match entities::resolve_entity_in_bytes(self.bytes, self.pos, &mut decoded) {
                        Some(end) => {
                            self.items.push(InlineItem::TextOwned(decoded));
                            self.pos = end;
                            text_start = end;
                        }
                        None => self.pos += 1,
                    }
                }
                b'\n' => {
                    let mut text_end = self.pos;
                    while text_end > text_start && self.bytes[text_end - 1] == b' ' {
                        text_end -= 1;
                    }
                    let trailing_spaces = self.pos - text_end;
                    self.flush_text_range(text_start, text_end);
                    self.items.push(if trailing_spaces >= 2 {
                        InlineItem::HardBreak
                    } else {
                        InlineItem::SoftBreak
                    });
                    self.pos += 1;
                    self.skip_line_start_spaces();
                    text_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
        self.flush_text_range(text_start, self.pos);
    }

    #[inline]
    fn flush_text_range(&mut self, start: usize, end: usize) {
        if start < end {
            self.items.push(InlineItem::TextRange(start, end));
        }
    }

    #[inline]
    fn skip_line_start_spaces(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] == b' ' {
            self.pos += 1;
        }
    }

    fn scan_code_span(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] == b'`' {
            self.pos += 1;
        }
        let after_open = self.pos;
        let ticks = after_open - start;

        let Some(close) = self.find_backtick_closer(after_open, ticks) else {
            self.items.push(InlineItem::TextRange(start, after_open));
            return;
        };

        let raw = &self.input[after_open..close];
        let mut content = raw.replace('\n', " ");
        let bytes = content.as_bytes();
        if bytes.len() >= 2
            && bytes[0] == b' '
            && bytes[bytes.len() - 1] == b' '
            && bytes.iter().any(|&b| b != b' ')
        {
            content = content[1..content.len() - 1].to_string();
        }
        self.items.push(InlineItem::Code(content));
        self.pos = close + ticks;
    }

    /// Start of the first backtick run of exactly `ticks` characters at or
    /// after `from`.
    fn find_backtick_closer(&mut self, from: usize, ticks: usize) -> Option<usize> {
        let bytes = self.bytes;
        let runs = self
            .backtick_runs
            .get_or_insert_with(|| index_backtick_runs(bytes));
        let positions = runs.get(&ticks)?;
        let idx = positions.partition_point(|&p| p < from);
        positions.get(idx).copied()
    }

    fn scan_delim_run(&mut self, marker: u8) {
        let run_start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] == marker {
            self.pos += 1;
        }
        let count = self.pos - run_start;
        let before = char_before(self.input, run_start);
        let after = char_at(self.input, self.pos);
        let (can_open, can_close) = flanking(marker, before, after);
        if !can_open && !can_close {
            self.items.push(InlineItem::TextRange(run_start, self.pos));
            return;
        }

        let delim = self.delims.len();
        self.delims.push(Delimiter {
            marker,
            orig_count: count,
            count,
            can_open,
            can_close,
            prev: self.delims_top,
            next: None,
            open_em: Vec::new(),
            close_em: Vec::new(),
        });
        if let Some(top) = self.delims_top {
            self.delims[top].next = Some(delim);
        }
        self.delims_top = Some(delim);
        self.items.push(InlineItem::DelimRun { delim });
    }

    fn remove_delimiter(&mut self, idx: usize) {
        let (prev, next) = (self.delims[idx].prev, self.delims[idx].next);
        if let Some(p) = prev {
            self.delims[p].next = next;
        }
        match next {
            Some(n) => self.delims[n].prev = prev,
            None => self.delims_top = prev,
        }
    }

    fn push_bracket(&mut self, is_image: bool) {
        if let Some(top) = self.brackets.last_mut() {
            top.bracket_after = true;
        }
        self.brackets.push(BracketInfo {
            item_idx: self.items.len(),
            is_image,
            prev_delim: self.delims_top,
            bracket_after: false,
            text_pos: self.pos,
        });
        self.items.push(InlineItem::BracketOpen { is_image });
    }

    fn pop_bracket(&mut self) {
        self.brackets.pop();
        self.link_barrier = self.link_barrier.min(self.brackets.len());
    }

    /// `self.pos` is at `]`.
    fn handle_close_bracket(&mut self) {
        let close_pos = self.pos;
        self.pos += 1;

        let Some(opener) = self.brackets.last().cloned() else {
            self.items.push(InlineItem::TextStatic("]"));
            return;
        };
        if !opener.is_image && self.brackets.len() - 1 < self.link_barrier {
            self.pop_bracket();
            self.items.push(InlineItem::TextStatic("]"));
            return;
        }

        let target = match self.try_inline_link() {
            Some(target) => Some(target),
            None => self.try_reference_link(&opener, close_pos),
        };
        let Some((dest, title)) = target else {
            self.pop_bracket();
            self.pos = close_pos + 1;
            self.items.push(InlineItem::TextStatic("]"));
            return;
        };

        let link_idx = self.links.len();
        self.links.push(LinkInfo {
            dest,
            title,
            is_image: opener.is_image,
        });
        self.items[opener.item_idx] = InlineItem::LinkStart(link_idx);
        self.items.push(InlineItem::LinkEnd);
        self.process_emphasis(opener.prev_delim);
        self.pop_bracket();
        if !opener.is_image {
            // No links inside links.
            self.link_barrier = self.brackets.len();
        }
    }

    /// Matches emphasis openers and closers above `stack_bottom`, then drops
    /// every delimiter above it.
    pub(super) fn process_emphasis(&mut self, stack_bottom: Option<usize>) {
        // Per marker, closer-can-open flag and original length mod 3: the
        // delimiter below which no opener can exist.
        let mut openers_bottom = [[[stack_bottom; 3]; 2]; 2];

        let mut closer = if self.delims_top == stack_bottom {
            None
        } else {
            let mut c = self.delims_top;
            while let Some(idx) = c {
                if self.delims[idx].prev == stack_bottom {
                    break;
                }
                c = self.delims[idx].prev;
            }
            c
        };

        while let Some(c) = closer {
            if !self.delims[c].can_close {
                closer = self.delims[c].next;
                continue;
            }
            let marker_slot = usize::from(self.delims[c].marker == b'*');
            let open_slot = usize::from(self.delims[c].can_open);
            let len_slot = self.delims[c].orig_count % 3;
            let bottom = openers_bottom[marker_slot][open_slot][len_slot];

            let mut opener = self.delims[c].prev;
            let mut found = None;
            while let Some(o) = opener {
                if Some(o) == stack_bottom || Some(o) == bottom {
                    break;
                }
                let (od, cd) = (&self.delims[o], &self.delims[c]);
                let odd_match = (cd.can_open || od.can_close)
                    && cd.orig_count % 3 != 0
                    && (od.orig_count + cd.orig_count) % 3 == 0;
                if od.marker == cd.marker && od.can_open && !odd_match {
                    found = Some(o);
                    break;
                }
                opener = od.prev;
            }

            match found {
                Some(o) => {
                    let used = if self.delims[c].count >= 2 && self.delims[o].count >= 2 {
                        2
                    } else {
                        1
                    };
                    self.delims[o].count -= used;
                    self.delims[c].count -= used;
                    self.delims[o].open_em.push(used as u8);
                    self.delims[c].close_em.push(used as u8);
                    // Delimiters between the pair can no longer match.
                    self.delims[o].next = Some(c);
                    self.delims[c].prev = Some(o);
                    if self.delims[o].count == 0 {
                        self.remove_delimiter(o);
                    }
                    if self.delims[c].count == 0 {
                        let next = self.delims[c].next;
                        self.remove_delimiter(c);
                        closer = next;
                    }
                }
                None => {
                    closer = self.delims[c].next;
                    openers_bottom[marker_slot][open_slot][len_slot] = self.delims[c].prev;
                    if !self.delims[c].can_open {
                        self.remove_delimiter(c);
                    }
                }
            }
        }

        while self.delims_top != stack_bottom {
            let Some(top) = self.delims_top else {
                break;
            };
            self.remove_delimiter(top);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_runs_are_indexed_by_length() {
        let runs = index_backtick_runs(b"a ``b` c``` `");
        assert_eq!(runs.get(&2), Some(&vec![2]));
        assert_eq!(runs.get(&1), Some(&vec![5, 12]));
        assert_eq!(runs.get(&3), Some(&vec![8]));
    }

    #[test]
    fn closer_search_skips_shorter_and_longer_runs() {
        let refs = LinkRefMap::new();
        let mut scanner = InlineScanner::new("``a```b``", &refs);
        assert_eq!(scanner.find_backtick_closer(2, 2), Some(7));
        assert_eq!(scanner.find_backtick_closer(2, 1), None);
    }

    #[test]
    fn unmatched_closer_that_cannot_open_is_dropped() {
        let refs = LinkRefMap::new();
        let mut scanner = InlineScanner::new("a* b*", &refs);
        scanner.scan_all();
        scanner.process_emphasis(None);
        assert_eq!(scanner.delims_top, None);
        assert!(scanner.delims.iter().all(|d| d.open_em.is_empty() && d.close_em.is_empty()));
    }

    #[test]
    fn rule_of_three_uses_original_lengths() {
        let refs = LinkRefMap::new();
        let mut scanner = InlineScanner::new("*foo**bar*", &refs);
        scanner.scan_all();
        scanner.process_emphasis(None);
        // `**` both opens and closes; 1 + 2 is a multiple of three, so it
        // stays literal and the outer pair matches.
        assert_eq!(scanner.delims[0].open_em, vec![1]);
        assert_eq!(scanner.delims[1].count, 2);
        assert_eq!(scanner.delims[2].close_em, vec![1]);
    }
}
