//! Integration-level checks for the library's public surface: the seed
//! scenarios a conforming robots.txt implementation must get right, run
//! through `is_allowed`/`is_allowed_one` rather than the internal matcher
//! state directly.

use robotstxt::{is_allowed, is_allowed_one};

#[test]
fn specific_group_disallow_wins_over_silence() {
    let body = b"User-Agent: FooBot\nDisallow: /private\n";
    assert!(!is_allowed_one(body, "FooBot", "http://x.test/private/page"));
    assert!(is_allowed_one(body, "FooBot", "http://x.test/public/page"));
}

#[test]
fn longest_matching_pattern_wins_regardless_of_directive_order() {
    let body = b"User-Agent: FooBot\nAllow: /foo\nDisallow: /\n";
    assert!(is_allowed_one(body, "FooBot", "http://x.test/foo/bar"));
    assert!(!is_allowed_one(body, "FooBot", "http://x.test/other"));
}

#[test]
fn specific_group_shadows_global_group() {
    let body = b"User-Agent: *\nDisallow: /\nUser-Agent: FooBot\nAllow: /\n";
    assert!(is_allowed_one(body, "FooBot", "http://x.test/anything"));
    assert!(!is_allowed_one(body, "BarBot", "http://x.test/anything"));
}

#[test]
fn first_matching_agent_among_several_is_enough() {
    let body = b"User-Agent: *\nDisallow: /a\n";
    assert!(!is_allowed(body, &["FooBot", "BarBot"], "http://x.test/a"));
    assert!(is_allowed(body, &["FooBot", "BarBot"], "http://x.test/b"));
}

#[test]
fn typo_tolerant_keys_still_parse() {
    let body = b"useragent: FooBot\ndisalow: /x\n";
    assert!(!is_allowed_one(body, "FooBot", "http://x.test/x"));
}

#[test]
fn index_htm_is_treated_as_directory_root() {
    let body = b"User-Agent: *\nAllow: /index.htm\nDisallow: /\n";
    assert!(is_allowed_one(body, "FooBot", "http://x.test/"));
}

#[test]
fn bom_prefixed_file_parses_normally() {
    let mut body = b"\xEF\xBB\xBF".to_vec();
    body.extend_from_slice(b"User-Agent: *\nDisallow: /a\n");
    assert!(!is_allowed_one(&body, "FooBot", "http://x.test/a"));
    assert!(is_allowed_one(&body, "FooBot", "http://x.test/b"));
}

#[test]
fn missing_robots_txt_allows_everything() {
    assert!(is_allowed_one(b"", "FooBot", "http://x.test/anything"));
}

#[test]
fn disallow_with_empty_value_disallows_nothing() {
    let body = b"User-Agent: *\nDisallow:\n";
    assert!(is_allowed_one(body, "FooBot", "http://x.test/anything"));
}

#[test]
fn fragment_is_excluded_from_matched_path() {
    let body = b"User-Agent: *\nDisallow: /a\n";
    assert!(!is_allowed_one(body, "FooBot", "http://x.test/a#section"));
    assert!(is_allowed_one(body, "FooBot", "http://x.test/b#a"));
}

#[test]
fn percent_encoding_is_canonicalized_before_matching() {
    // The pattern's literal Unicode byte and the URL's already-escaped form
    // of the same byte must match after canonicalization.
    let body = "User-Agent: *\nDisallow: /Sanjos\u{e9}\n".as_bytes().to_vec();
    assert!(!is_allowed_one(&body, "FooBot", "http://x.test/Sanjos%C3%A9"));
}

#[test]
fn wildcard_and_end_anchor_combine() {
    let body = b"User-Agent: *\nDisallow: /*.gif$\n";
    assert!(!is_allowed_one(body, "FooBot", "http://x.test/photos/cat.gif"));
    assert!(is_allowed_one(body, "FooBot", "http://x.test/photos/cat.gif.html"));
}
