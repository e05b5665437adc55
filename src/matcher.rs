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

//! The pattern matcher and decision engine: decides whether a canonicalized
//! pattern matches a request path, and arbitrates the `Allow`/`Disallow`
//! directives a [`crate::parser::parse_robotstxt`] stream produces into a
//! single verdict.

use crate::{canonical, ParserOptions, RobotsParseHandler};

/// Instead of just maintaining a Boolean indicating whether a given line has
/// matched, we maintain a count of the maximum number of characters matched by
/// that pattern.
///
/// This structure stores the information associated with a match (e.g. when a
/// Disallow is matched) as priority of the match and line matching.
///
/// The priority is initialized with a negative value to make sure that a match
/// of priority 0 is higher priority than no match at all.
#[derive(Debug, Clone, Copy)]
struct Match {
    priority: i32,
    line: u32,
}

impl Default for Match {
    fn default() -> Self {
        Match { priority: Self::NO_MATCH_PRIORITY, line: 0 }
    }
}

impl Match {
    const NO_MATCH_PRIORITY: i32 = -1;

    fn set(&mut self, priority: i32, line: u32) {
        self.priority = priority;
        self.line = line;
    }

    fn clear(&mut self) {
        self.set(Self::NO_MATCH_PRIORITY, 0);
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[derive(Default)]
struct MatchHierarchy {
    global: Match,
    specific: Match,
}

impl MatchHierarchy {
    fn clear(&mut self) {
        self.global.clear();
        self.specific.clear();
    }
}

/// Pluggable pattern-matching strategy for `Allow`/`Disallow` patterns.
///
/// `DecisionEngine` (`RobotsMatcher`) is generic over this trait so that
/// alternate arbitration policies (e.g. a first-match strategy) can be
/// substituted without touching the state machine that drives the verdict.
pub trait RobotsMatchStrategy {
    /// Priority of `pattern` matching `path` as an `Allow` rule, or a
    /// negative number if it doesn't match at all.
    fn match_allow(&self, path: &[u8], pattern: &[u8]) -> i32;

    /// Priority of `pattern` matching `path` as a `Disallow` rule, or a
    /// negative number if it doesn't match at all.
    fn match_disallow(&self, path: &[u8], pattern: &[u8]) -> i32;
}

/// Implements the default robots.txt matching strategy. The maximum number of
/// characters matched by a pattern is returned as its match priority.
#[derive(Debug, Default, Clone, Copy)]
pub struct LongestMatchRobotsMatchStrategy;

impl RobotsMatchStrategy for LongestMatchRobotsMatchStrategy {
    fn match_allow(&self, path: &[u8], pattern: &[u8]) -> i32 {
        if matches(path, pattern) {
            pattern.len() as i32
        } else {
            -1
        }
    }

    fn match_disallow(&self, path: &[u8], pattern: &[u8]) -> i32 {
        if matches(path, pattern) {
            pattern.len() as i32
        } else {
            -1
        }
    }
}

/// Returns true if `path` matches `pattern`. `pattern` is anchored at the
/// beginning of `path`; `*` matches any (possibly empty) byte sequence, and
/// `$` is special only at the end of `pattern`, where it anchors the match to
/// end-of-path (elsewhere it is a literal byte).
///
/// `pos` holds the sorted, deduplicated set of positions in `path` reachable
/// by the prefix of `pattern` consumed so far; it is reused as a single
/// preallocated buffer of length `path.len() + 1` across the whole scan, so
/// a `*` (which can make every remaining position reachable) costs no more
/// than writing that buffer once, keeping the whole match within
/// `O(path.len() * pattern.len())`. Since `path` and `pattern` both come from
/// the webmaster, this bound is what keeps pathological patterns such as
/// `*a*a*a*a*...` cheap on long paths.
fn matches(path: &[u8], pattern: &[u8]) -> bool {
    let pathlen = path.len();
    let mut pos: Vec<usize> = Vec::with_capacity(pathlen + 1);
    pos.push(0);

    let mut chars = pattern.iter().enumerate();
    while let Some((i, &c)) = chars.next() {
        if c == b'$' && i == pattern.len() - 1 {
            return pos.last() == Some(&pathlen);
        }
        if c == b'*' {
            let min = pos[0];
            pos.clear();
            pos.extend(min..=pathlen);
        } else {
            let mut write = 0;
            for read in 0..pos.len() {
                let p = pos[read];
                if p < pathlen && path[p] == c {
                    pos[write] = p + 1;
                    write += 1;
                }
            }
            pos.truncate(write);
            if pos.is_empty() {
                return false;
            }
        }
    }

    !pos.is_empty()
}

/// `DecisionEngine` — matches robots.txt against URLs.
///
/// The engine uses a default match strategy for Allow/Disallow patterns which
/// is the widely deployed way crawlers match robots.txt. It is also possible
/// to provide a custom match strategy via `S: RobotsMatchStrategy`.
///
/// The entry point for the user is to call one of the `*allowed_by_robots`
/// methods that return directly if a URL is allowed according to the
/// robots.txt and the crawl agent(s). `RobotsMatcher` can be re-used across
/// robots.txt bodies/URLs but is not thread-safe (and not `Sync`).
pub struct RobotsMatcher<S: RobotsMatchStrategy = LongestMatchRobotsMatchStrategy> {
    /// Characters of `path` matching Allow.
    allow: MatchHierarchy,
    /// Characters of `path` matching Disallow.
    disallow: MatchHierarchy,
    /// True if processing global (`*`) agent rules.
    seen_global_agent: bool,
    /// True if processing one of our specific agents.
    seen_specific_agent: bool,
    /// True if we ever saw a block for one of our agents.
    ever_seen_specific_agent: bool,
    /// True if we saw any key: value pair since the last `User-Agent` run.
    seen_separator: bool,
    /// The path being matched. Only valid during an `allowed_by_robots` call.
    path: String,
    /// The user agents being checked. Only valid during an
    /// `allowed_by_robots` call.
    user_agents: Vec<String>,
    options: ParserOptions,
    match_strategy: S,
}

impl Default for RobotsMatcher<LongestMatchRobotsMatchStrategy> {
    fn default() -> Self {
        RobotsMatcher::with_strategy(LongestMatchRobotsMatchStrategy)
    }
}

impl<S: RobotsMatchStrategy> RobotsMatcher<S> {
    pub fn with_strategy(match_strategy: S) -> Self {
        RobotsMatcher {
            allow: MatchHierarchy::default(),
            disallow: MatchHierarchy::default(),
            seen_global_agent: false,
            seen_specific_agent: false,
            ever_seen_specific_agent: false,
            seen_separator: false,
            path: String::new(),
            user_agents: Vec::new(),
            options: ParserOptions::default(),
            match_strategy,
        }
    }

    pub fn with_options(options: ParserOptions, match_strategy: S) -> Self {
        RobotsMatcher { options, ..Self::with_strategy(match_strategy) }
    }

    /// Returns true if `url` is allowed to be fetched by any member of
    /// `user_agents`. `url` does not need to be pre-normalized: the
    /// crate-provided `PathCanonicalizer` extracts and canonicalizes its
    /// path+params+query portion.
    pub fn allowed_by_robots<T: AsRef<str>>(
        &mut self,
        robots_body: &[u8],
        user_agents: &[T],
        url: &str,
    ) -> bool {
        self.path = canonical::path_params_query(url);
        self.user_agents = user_agents.iter().map(|a| a.as_ref().to_string()).collect();
        let options = self.options;
        crate::parser::parse_robotstxt(robots_body, self, &options);
        !self.disallow()
    }

    /// Convenience wrapper for a single user agent.
    pub fn one_agent_allowed_by_robots(&mut self, robots_body: &[u8], user_agent: &str, url: &str) -> bool {
        self.allowed_by_robots(robots_body, &[user_agent], url)
    }

    /// Line number of the directive that decided the last call's verdict.
    pub fn matching_line(&self) -> u32 {
        let (allow, disallow) = if self.ever_seen_specific_agent {
            (&self.allow.specific, &self.disallow.specific)
        } else {
            (&self.allow.global, &self.disallow.global)
        };
        // Mirrors disallow()'s tie-break: disallow only wins on strictly
        // higher priority, so ties (and allow winning) report allow's line.
        if disallow.priority() > allow.priority() {
            disallow.line()
        } else {
            allow.line()
        }
    }

    /// True if any directive referenced one of the caller's user agents.
    pub fn ever_seen_specific_agent(&self) -> bool {
        self.ever_seen_specific_agent
    }

    /// Returns true if we are disallowed from crawling a matching URI.
    fn disallow(&self) -> bool {
        if self.allow.specific.priority() > 0 || self.disallow.specific.priority() > 0 {
            return self.disallow.specific.priority() > self.allow.specific.priority();
        }

        if self.ever_seen_specific_agent {
            // Matching group for our user-agent but either without a
            // Disallow, or an empty one (priority == 0): treat as allowed.
            return false;
        }

        if self.disallow.global.priority() > 0 || self.allow.global.priority() > 0 {
            return self.disallow.global.priority() > self.allow.global.priority();
        }

        false
    }

    /// Returns true if any user-agent block is currently active.
    fn seen_any_agent(&self) -> bool {
        self.seen_global_agent || self.seen_specific_agent
    }

    fn record_allow(&mut self, priority: i32, line_num: u32) {
        let slot = if self.seen_specific_agent { &mut self.allow.specific } else { &mut self.allow.global };
        if slot.priority() < priority {
            slot.set(priority, line_num);
        }
    }

    fn record_disallow(&mut self, priority: i32, line_num: u32) {
        let slot =
            if self.seen_specific_agent { &mut self.disallow.specific } else { &mut self.disallow.global };
        if slot.priority() < priority {
            slot.set(priority, line_num);
        }
    }
}

/// Leading run of `[A-Za-z_-]` bytes, used for User-Agent product token
/// identity comparisons.
fn extract_user_agent(value: &[u8]) -> &[u8] {
    let end = value
        .iter()
        .position(|&b| !(b.is_ascii_alphabetic() || b == b'_' || b == b'-'))
        .unwrap_or(value.len());
    &value[..end]
}

/// If `pattern`'s last path segment is a literal `index.htm`/`index.html`,
/// returns the synthesized directory-root pattern (prefix up to and
/// including the last `/`, anchored with `$`) that treats it as an alias for
/// the directory itself. Applied only once per directive (no recursion).
fn synthesize_index_pattern(pattern: &[u8]) -> Option<Vec<u8>> {
    let last_slash = pattern.iter().rposition(|&b| b == b'/')?;
    let rest = &pattern[last_slash + 1..];
    if rest == b"index.htm" || rest == b"index.html" {
        let mut synthesized = pattern[..=last_slash].to_vec();
        synthesized.push(b'$');
        Some(synthesized)
    } else {
        None
    }
}

impl<S: RobotsMatchStrategy> RobotsParseHandler for RobotsMatcher<S> {
    fn handle_robots_start(&mut self) {
        // New robots.txt file: reset everything, in declaration order.
        self.allow.clear();
        self.disallow.clear();

        self.seen_global_agent = false;
        self.seen_specific_agent = false;
        self.ever_seen_specific_agent = false;
        self.seen_separator = false;
    }

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, value: &[u8]) {
        if self.seen_separator {
            // A User-Agent line after a separator starts a new group.
            self.seen_specific_agent = false;
            self.seen_global_agent = false;
            self.seen_separator = false;
        }

        // Google-specific extension: a '*' followed by whitespace and more
        // characters is still a global rule (e.g. "User-Agent: * comment").
        if !value.is_empty() && value[0] == b'*' && (value.len() == 1 || value[1].is_ascii_whitespace()) {
            self.seen_global_agent = true;
        } else {
            let token = extract_user_agent(value);
            for agent in &self.user_agents {
                if token.eq_ignore_ascii_case(agent.as_bytes()) {
                    self.ever_seen_specific_agent = true;
                    self.seen_specific_agent = true;
                    break;
                }
            }
        }
    }

    fn handle_allow(&mut self, line_num: u32, value: &[u8]) {
        if !self.seen_any_agent() {
            return;
        }
        self.seen_separator = true;

        let priority = self.match_strategy.match_allow(self.path.as_bytes(), value);
        if priority >= 0 {
            self.record_allow(priority, line_num);
            return;
        }

        // Google-specific extension: "…/index.htm(l)" is an alias for "…/$".
        // Applied at most once; the synthesized pattern is never itself
        // re-checked for an index.htm suffix.
        if let Some(synthesized) = synthesize_index_pattern(value) {
            let priority = self.match_strategy.match_allow(self.path.as_bytes(), &synthesized);
            if priority >= 0 {
                self.record_allow(priority, line_num);
            }
        }
    }

    fn handle_disallow(&mut self, line_num: u32, value: &[u8]) {
        if !self.seen_any_agent() {
            return;
        }
        self.seen_separator = true;

        let priority = self.match_strategy.match_disallow(self.path.as_bytes(), value);
        if priority >= 0 {
            self.record_disallow(priority, line_num);
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &[u8]) {
        self.seen_separator = true;
    }

    fn handle_crawl_delay(&mut self, _line_num: u32, _value: &[u8]) {
        self.seen_separator = true;
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &[u8], _value: &[u8]) {
        self.seen_separator = true;
    }
}
