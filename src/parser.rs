// Copyright 2020 Folyd
// Copyright 1999 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Streams a `robots.txt` body into `(line_number, key, value)` triples and
//! dispatches them to a [`RobotsParseHandler`]. Handles the BOM, all three
//! line-ending styles, trailing comments, and both the strict `key: value`
//! and the Google-specific `key value` separators.

use bstr::ByteSlice;

use crate::key::DirectiveKind;
use crate::{canonical, ParserOptions, RobotsParseHandler};

const BOM: &[u8] = b"\xef\xbb\xbf";

/// Parses `body` and drives `handler` with `RobotsParseHandler` events.
///
/// This is the entry point alternate consumers of the tokenizer's output
/// (anything other than the default [`crate::matcher::RobotsMatcher`]) use.
pub fn parse_robotstxt<H: RobotsParseHandler>(body: &[u8], handler: &mut H, options: &ParserOptions) {
    handler.handle_robots_start();

    let body = body.strip_prefix(BOM).unwrap_or(body);
    let mut line_num = 0u32;
    for raw_line in LineIter::new(body, options.max_line_len) {
        line_num += 1;
        parse_and_emit_line(line_num, raw_line, handler, options);
    }

    handler.handle_robots_end();
}

/// Splits `body` into lines honoring LF, CR, and CRLF terminators, silently
/// dropping bytes beyond `max_line_len` on an overlong line while still
/// emitting the (truncated) line for the rest of the content up to the next
/// terminator. The final, possibly unterminated, line is emitted on
/// exhaustion.
struct LineIter<'a> {
    rest: &'a [u8],
    max_line_len: usize,
    done: bool,
}

impl<'a> LineIter<'a> {
    fn new(body: &'a [u8], max_line_len: usize) -> Self {
        LineIter { rest: body, max_line_len, done: false }
    }
}

impl<'a> Iterator for LineIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.done {
            return None;
        }
        let mut term_start = None;
        let mut term_len = 0usize;
        let mut i = 0usize;
        while i < self.rest.len() {
            match self.rest[i] {
                b'\n' => {
                    term_start = Some(i);
                    term_len = 1;
                    break;
                }
                b'\r' => {
                    term_start = Some(i);
                    // A bare CR immediately followed by LF is a single CRLF
                    // terminator, not an empty line followed by a terminated one.
                    term_len = if self.rest.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                    break;
                }
                _ => i += 1,
            }
        }

        match term_start {
            Some(term_at) => {
                let line_end = term_at.min(self.max_line_len);
                if term_at > self.max_line_len {
                    log::debug!(
                        "robots.txt line exceeded {} bytes; truncating",
                        self.max_line_len
                    );
                }
                let line = &self.rest[..line_end];
                self.rest = &self.rest[term_at + term_len..];
                Some(line)
            }
            None => {
                // Final, unterminated line.
                self.done = true;
                if self.rest.is_empty() {
                    None
                } else {
                    let line_end = self.rest.len().min(self.max_line_len);
                    Some(&self.rest[..line_end])
                }
            }
        }
    }
}

fn parse_and_emit_line<H: RobotsParseHandler>(
    line_num: u32,
    line: &[u8],
    handler: &mut H,
    options: &ParserOptions,
) {
    let line = strip_comment(line);
    let line = line.trim_with(|c| c.is_ascii_whitespace());

    let (key, value) = match split_key_value(line) {
        Some(kv) => kv,
        None => {
            log::trace!("discarding unparseable robots.txt line {}", line_num);
            return;
        }
    };
    let key = key.trim_with(|c| c.is_ascii_whitespace());
    let value = value.trim_with(|c| c.is_ascii_whitespace());
    if key.is_empty() {
        log::trace!("discarding robots.txt line {} with empty key", line_num);
        return;
    }

    let kind = DirectiveKind::classify(key, options);
    let value: std::borrow::Cow<[u8]> = if kind.needs_value_canonicalization() {
        canonical::canonicalize_pattern(value)
    } else {
        std::borrow::Cow::Borrowed(value)
    };

    match kind {
        DirectiveKind::UserAgent => handler.handle_user_agent(line_num, &value),
        DirectiveKind::Allow => handler.handle_allow(line_num, &value),
        DirectiveKind::Disallow => handler.handle_disallow(line_num, &value),
        DirectiveKind::Sitemap => handler.handle_sitemap(line_num, &value),
        DirectiveKind::CrawlDelay => handler.handle_crawl_delay(line_num, &value),
        DirectiveKind::Unknown(action) => {
            log::trace!(
                "unrecognized robots.txt directive {:?} on line {}",
                action.as_bstr(),
                line_num
            );
            handler.handle_unknown_action(line_num, action, &value);
        }
    }
}

fn strip_comment(line: &[u8]) -> &[u8] {
    match memchr::memchr(b'#', line) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Locates the key/value separator per the tokenizer's rules: a `:` wins if
/// present; otherwise a run of spaces/tabs may serve as separator, but only
/// if the line is made up of exactly two non-whitespace sequences.
fn split_key_value(line: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(idx) = memchr::memchr(b':', line) {
        return Some((&line[..idx], &line[idx + 1..]));
    }

    let mut tokens = line.split(|&b| b == b' ' || b == b'\t').filter(|t| !t.is_empty());
    let key = tokens.next()?;
    let value = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((key, value))
}
