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

//! A native Rust implementation of the `robots.txt` exclusion protocol,
//! following the widely deployed operator extensions (`*`/`$` wildcards,
//! longest-match precedence, typo tolerance, percent-encoding
//! canonicalization) rather than a strict reading of the expired Internet
//! draft.
//!
//! ```
//! let allowed = robotstxt::is_allowed_one(
//!     b"User-Agent: *\nDisallow: /private\n",
//!     "FooBot",
//!     "http://example.com/private/page",
//! );
//! assert!(!allowed);
//! ```
//!
//! Fetching and caching `robots.txt` itself, full URL parsing, and
//! time-based crawl scheduling from `Crawl-Delay` are all out of scope:
//! this crate only answers "is this URL allowed".

mod canonical;
mod key;
mod matcher;
mod parser;

pub use key::DirectiveKind;
pub use matcher::{LongestMatchRobotsMatchStrategy, RobotsMatchStrategy, RobotsMatcher};
pub use parser::parse_robotstxt;

/// Construction-time parser configuration.
///
/// Replaces what upstream implementations have historically kept as a
/// process-wide mutable flag: typo tolerance and the tokenizer's bounded
/// line-buffer size are both decided when a parse begins, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Tolerate common misspellings of directive keys (`dissallow`,
    /// `useragent`, `crawl delay`, ...). On by default.
    pub allow_typos: bool,
    /// Upper bound, in bytes, on a single tokenized line. Bytes beyond this
    /// are silently dropped; the truncated line is still parsed. Defaults
    /// to `2083 * 8`, a conservative multiple of a common browser URL-length
    /// limit.
    pub max_line_len: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions { allow_typos: true, max_line_len: 2083 * 8 }
    }
}

/// Handler for directives found in a `robots.txt` body, as produced by
/// [`parse_robotstxt`]. Implement this to build an alternate consumer of the
/// tokenizer's output; [`RobotsMatcher`] is the default consumer used by
/// [`is_allowed`]/[`is_allowed_one`].
pub trait RobotsParseHandler {
    fn handle_robots_start(&mut self);
    fn handle_robots_end(&mut self);
    fn handle_user_agent(&mut self, line_num: u32, value: &[u8]);
    fn handle_allow(&mut self, line_num: u32, value: &[u8]);
    fn handle_disallow(&mut self, line_num: u32, value: &[u8]);
    fn handle_sitemap(&mut self, line_num: u32, value: &[u8]);
    fn handle_crawl_delay(&mut self, line_num: u32, value: &[u8]);
    /// Any other unrecognized name/value pair.
    fn handle_unknown_action(&mut self, line_num: u32, action: &[u8], value: &[u8]);
}

/// Returns true if `url` is allowed to be fetched by any of `user_agents`
/// according to `robots_body`.
pub fn is_allowed<T: AsRef<str>>(robots_body: &[u8], user_agents: &[T], url: &str) -> bool {
    let mut matcher = RobotsMatcher::default();
    matcher.allowed_by_robots(robots_body, user_agents, url)
}

/// Convenience wrapper for a single user agent.
pub fn is_allowed_one(robots_body: &[u8], user_agent: &str, url: &str) -> bool {
    is_allowed(robots_body, &[user_agent], url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_allows_everything() {
        assert!(is_allowed_one(b"", "FooBot", "http://x.test/anything"));
    }

    #[test]
    fn global_fallback_when_no_specific_group_exists() {
        let body = b"User-Agent: *\nDisallow: /a\n";
        assert!(!is_allowed_one(body, "FooBot", "http://x.test/a"));
        assert!(is_allowed_one(body, "FooBot", "http://x.test/b"));
    }

    #[test]
    fn no_global_and_no_matching_specific_group_allows_everything() {
        let body = b"User-Agent: BarBot\nDisallow: /\n";
        assert!(is_allowed_one(body, "FooBot", "http://x.test/anything"));
    }
}
