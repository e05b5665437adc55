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

//! Extracts and canonicalizes the part of a URL that matching runs against,
//! and canonicalizes `Allow`/`Disallow` patterns the same way.

use std::borrow::Cow;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Returns the path+params+query portion of `url`, always starting with `/`.
///
/// `url` is not otherwise parsed or validated: this mirrors the upstream
/// algorithm's pragmatic scan rather than a strict URL grammar, which is what
/// makes it tolerant of malformed or relative input (see §7 of the crate's
/// design notes: invalid input degrades to `/`, matching proceeds).
pub fn path_params_query(url: &str) -> String {
    let bytes = url.as_bytes();

    // Initial two slashes (protocol-relative URL) are ignored.
    let search_start = if bytes.len() >= 2 && bytes[0] == b'/' && bytes[1] == b'/' {
        2
    } else {
        0
    };

    let early_path = find_first_of(bytes, search_start, b"/?;");
    let mut protocol_end = find_subslice(bytes, search_start, b"://");
    if let (Some(early), Some(proto)) = (early_path, protocol_end) {
        if early < proto {
            // A path/param/query marker before "://" means there's no scheme.
            protocol_end = None;
        }
    }
    let search_from = match protocol_end {
        Some(idx) => idx + 3,
        None => search_start,
    };

    let path_start = match find_first_of(bytes, search_from, b"/?;") {
        Some(idx) => idx,
        None => {
            log::trace!("path extraction found no path marker in {:?}; defaulting to /", url);
            return "/".to_string();
        }
    };

    if let Some(hash) = find_byte(bytes, search_start, b'#') {
        if hash < path_start {
            log::trace!("path extraction found fragment before path in {:?}; defaulting to /", url);
            return "/".to_string();
        }
    }

    let end = find_byte(bytes, path_start, b'#').unwrap_or(bytes.len());
    let path = &url[path_start..end];
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn find_byte(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    memchr::memchr(needle, &haystack[from.min(haystack.len())..]).map(|i| i + from)
}

fn find_first_of(haystack: &[u8], from: usize, needles: &[u8]) -> Option<usize> {
    memchr::memchr3(
        needles[0],
        needles[1],
        needles[2],
        &haystack[from.min(haystack.len())..],
    )
    .map(|i| i + from)
}

fn find_subslice(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    memchr::memmem::find(&haystack[from..], needle).map(|i| i + from)
}

/// Canonicalizes a directive value that is a path pattern: any byte with the
/// high bit set becomes an uppercase `%HH` escape, and any existing `%HH`
/// escape is re-cased to uppercase. Already-canonical bytes are left alone,
/// and the original slice is returned unchanged (no allocation) when nothing
/// needs rewriting, so `canonicalize(canonicalize(p)) == canonicalize(p)`.
pub fn canonicalize_pattern(src: &[u8]) -> Cow<'_, [u8]> {
    let mut needs_escaping = 0usize;
    let mut needs_recase = false;
    let mut i = 0;
    while i < src.len() {
        if src[i] == b'%' && is_hex_pair(src, i + 1) {
            if src[i + 1].is_ascii_lowercase() || src[i + 2].is_ascii_lowercase() {
                needs_recase = true;
            }
            i += 3;
        } else if src[i] & 0x80 != 0 {
            needs_escaping += 1;
            i += 1;
        } else {
            i += 1;
        }
    }

    if needs_escaping == 0 && !needs_recase {
        return Cow::Borrowed(src);
    }

    let mut dst = Vec::with_capacity(src.len() + needs_escaping * 2);
    let mut i = 0;
    while i < src.len() {
        if src[i] == b'%' && is_hex_pair(src, i + 1) {
            dst.push(b'%');
            dst.push(src[i + 1].to_ascii_uppercase());
            dst.push(src[i + 2].to_ascii_uppercase());
            i += 3;
        } else if src[i] & 0x80 != 0 {
            dst.push(b'%');
            dst.push(HEX_DIGITS[(src[i] >> 4) as usize]);
            dst.push(HEX_DIGITS[(src[i] & 0xf) as usize]);
            i += 1;
        } else {
            dst.push(src[i]);
            i += 1;
        }
    }
    Cow::Owned(dst)
}

fn is_hex_pair(src: &[u8], at: usize) -> bool {
    at + 1 < src.len() && src[at].is_ascii_hexdigit() && src[at + 1].is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_plain_path() {
        assert_eq!(path_params_query("http://x.test/a/b?c=d"), "/a/b?c=d");
    }

    #[test]
    fn handles_protocol_relative() {
        assert_eq!(path_params_query("//x.test/a"), "/a");
    }

    #[test]
    fn no_scheme_is_relative() {
        assert_eq!(path_params_query("/a/b;p?q"), "/a/b;p?q");
    }

    #[test]
    fn fragment_before_path_yields_root() {
        assert_eq!(path_params_query("http://x.test#frag/a"), "/");
    }

    #[test]
    fn fragment_after_path_is_stripped() {
        assert_eq!(path_params_query("http://x.test/a#frag"), "/a");
    }

    #[test]
    fn no_path_marker_at_all_yields_root() {
        assert_eq!(path_params_query("http://x.test"), "/");
    }

    #[test]
    fn query_without_leading_slash_gets_prefixed() {
        assert_eq!(path_params_query("http://x.test?q=1"), "/?q=1");
    }

    #[test]
    fn empty_url_yields_root() {
        assert_eq!(path_params_query(""), "/");
    }

    #[test]
    fn canonicalize_is_noop_on_plain_ascii() {
        let p: &[u8] = b"/foo/bar*baz$";
        assert!(matches!(canonicalize_pattern(p), Cow::Borrowed(_)));
    }

    #[test]
    fn canonicalize_escapes_high_bit_bytes() {
        let got = canonicalize_pattern(b"/Sanjos\xc3\xa9Sellers");
        assert_eq!(&*got, b"/Sanjos%C3%A9Sellers".as_ref());
    }

    #[test]
    fn canonicalize_recases_existing_escapes() {
        let got = canonicalize_pattern(b"/%aa/%2f");
        assert_eq!(&*got, b"/%AA/%2F".as_ref());
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize_pattern(b"/Sanjos\xc3\xa9%aa");
        let twice = canonicalize_pattern(&once);
        assert_eq!(once, twice);
    }

    proptest! {
        /// canonicalize(canonicalize(p)) == canonicalize(p) for arbitrary
        /// byte patterns, not just the one hand-picked example above.
        #[test]
        fn canonicalize_pattern_is_idempotent_for_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let once = canonicalize_pattern(&bytes);
            let twice = canonicalize_pattern(&once);
            prop_assert_eq!(once, twice);
        }

        /// If a '#' precedes any of '/', '?', ';', the extracted path is
        /// always "/", regardless of what scheme/host prefix or fragment
        /// text surrounds it.
        #[test]
        fn fragment_before_any_path_marker_always_yields_root(
            scheme in "(http|https)://",
            host in "[a-z]{1,10}\\.test",
            fragment in "[a-z0-9]{0,10}",
            rest in "[a-z/?;]{0,10}",
        ) {
            let url = format!("{}{}#{}{}", scheme, host, fragment, rest);
            prop_assert_eq!(path_params_query(&url), "/");
        }
    }
}
