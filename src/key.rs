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

//! Classifies the raw key text of a `robots.txt` line into a [`DirectiveKind`],
//! tolerating the common typos seen in the wild.

use crate::ParserOptions;

/// A robots.txt has lines of key/value pairs. `DirectiveKind` is the parsed
/// representation of the key half of such a pair. The `Unknown` variant keeps
/// the original key text, so a caller's [`RobotsParseHandler`](crate::RobotsParseHandler)
/// can still dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind<'a> {
    UserAgent,
    Allow,
    Disallow,
    Sitemap,
    CrawlDelay,
    /// Unrecognized key; carries the original (untrimmed-of-case) key slice.
    Unknown(&'a [u8]),
}

impl<'a> DirectiveKind<'a> {
    /// Classify a raw, already-trimmed key slice.
    ///
    /// Matching is case-insensitive ASCII prefix matching, checked in a fixed
    /// order so that, e.g., a key of `"user-agent-extended"` is still
    /// recognized as `UserAgent`. Typo tolerance is gated by `options`.
    pub fn classify(key: &'a [u8], options: &ParserOptions) -> DirectiveKind<'a> {
        if starts_with_ci(key, &[b"user-agent"])
            || (options.allow_typos && starts_with_ci(key, &[b"useragent", b"user agent"]))
        {
            DirectiveKind::UserAgent
        } else if starts_with_ci(key, &[b"allow"]) {
            DirectiveKind::Allow
        } else if starts_with_ci(key, &[b"disallow"])
            || (options.allow_typos
                && starts_with_ci(
                    key,
                    &[b"dissallow", b"dissalow", b"disalow", b"diasllow", b"disallaw"],
                ))
        {
            DirectiveKind::Disallow
        } else if starts_with_ci(key, &[b"sitemap", b"site-map"]) {
            DirectiveKind::Sitemap
        } else if starts_with_ci(key, &[b"crawl-delay"])
            || (options.allow_typos && starts_with_ci(key, &[b"crawldelay", b"crawl delay"]))
        {
            DirectiveKind::CrawlDelay
        } else {
            DirectiveKind::Unknown(key)
        }
    }

    /// Values for `UserAgent`/`Sitemap` are passed through verbatim; every
    /// other kind's value is a path pattern and must be percent-encoding
    /// canonicalized (see [`crate::canonical`]).
    pub fn needs_value_canonicalization(&self) -> bool {
        !matches!(self, DirectiveKind::UserAgent | DirectiveKind::Sitemap)
    }
}

/// True if `key` case-insensitively (ASCII-only) starts with any of `targets`.
fn starts_with_ci(key: &[u8], targets: &[&[u8]]) -> bool {
    targets.iter().any(|target| {
        key.len() >= target.len() && key[..target.len()].eq_ignore_ascii_case(target)
    })
}
