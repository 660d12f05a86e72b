//! The node state file: flat `KEY = VALUE` lines.
//!
//! Pure functions only; callers do the reading and writing.

use std::collections::BTreeMap;

/// Template used to seed the state file when the shipped `.env.example`
/// is missing from the install directory.
pub const FALLBACK_TEMPLATE: &str = "\
# OV-Node configuration
SERVICE_PORT = 9090
API_KEY = change-me
TUNNEL_ADDRESS = 127.0.0.1
PROTOCOL = udp
OVPN_PORT = 1194
";

/// Parse `KEY = VALUE` lines into a map.
///
/// Blank lines, `#` comments and lines without `=` are ignored. Each line is
/// split on its first `=`; key and value are trimmed.
#[must_use]
pub fn parse(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Rewrite assignment lines for the given keys, leaving every other line
/// (and every line terminator) untouched.
///
/// A line matches a key when its trimmed form starts with the key and the
/// next non-blank character is `=`. The first matching key wins. Keys that
/// are not present in `content` are not appended.
#[must_use]
pub fn patch_assignments(content: &str, replacements: &[(String, String)]) -> String {
    let mut out = String::with_capacity(content.len());
    for raw in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(raw);
        let hit = replacements
            .iter()
            .find(|(key, _)| assigns_key(body, key));
        match hit {
            Some((key, value)) => {
                out.push_str(&format!("{key} = {value}"));
                out.push_str(terminator);
            }
            None => out.push_str(raw),
        }
    }
    out
}

/// True when `line` is `KEY = ...`. Only blanks may sit between the key and
/// `=`, so `OVPN_PORT_RANGE=` is not an assignment of `OVPN_PORT`; a plain
/// prefix test plus "contains `=`" is deliberately not enough.
fn assigns_key(line: &str, key: &str) -> bool {
    line.trim()
        .strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Split a line produced by `split_inclusive('\n')` into body and terminator.
pub(crate) fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}
