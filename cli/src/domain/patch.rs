//! Line-oriented edits of the daemon's directive files.
//!
//! Every function here is pure and idempotent: applying the same edit twice
//! yields the same text, and lines that are not targeted are preserved
//! byte-for-byte, including their order and line terminators.

use std::borrow::Cow;

use regex::{NoExpand, Regex};

use crate::domain::env_file::split_terminator;
use crate::domain::node::Protocol;

/// Replacement text for a directive match.
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Inserted verbatim.
    Literal(String),
    /// Capture-group template such as `remote ${1} 1194`.
    Template(String),
}

/// Rewrite of every line whose start matches `pattern`.
///
/// Only the matched prefix is replaced; anything after it on the line (for
/// example a trailing comment) is kept.
#[derive(Debug, Clone)]
pub struct DirectiveUpdate {
    pattern: Regex,
    replacement: Replacement,
}

impl DirectiveUpdate {
    /// Build an update that replaces the match with `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn literal(pattern: &str, line: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: anchored(pattern)?,
            replacement: Replacement::Literal(line.into()),
        })
    }

    /// Build an update whose replacement may reference capture groups.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn template(pattern: &str, template: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: anchored(pattern)?,
            replacement: Replacement::Template(template.into()),
        })
    }

    fn apply<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match &self.replacement {
            Replacement::Literal(text) => self.pattern.replacen(line, 1, NoExpand(text)),
            Replacement::Template(tpl) => self.pattern.replacen(line, 1, tpl.as_str()),
        }
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    if pattern.starts_with('^') {
        Regex::new(pattern)
    } else {
        Regex::new(&format!("^{pattern}"))
    }
}

/// Apply `updates` in order to every line of `content`.
#[must_use]
pub fn patch_directives(content: &str, updates: &[DirectiveUpdate]) -> String {
    let mut out = String::with_capacity(content.len());
    for raw in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(raw);
        let mut line = Cow::Borrowed(body);
        for update in updates {
            if update.pattern.is_match(&line) {
                line = Cow::Owned(update.apply(&line).into_owned());
            }
        }
        out.push_str(&line);
        out.push_str(terminator);
    }
    out
}

/// Append each of `required` that is not already present as a line.
///
/// Presence is judged on trimmed line content. When something is appended
/// and the text does not end in a newline, one is added first.
#[must_use]
pub fn ensure_lines(content: &str, required: &[String]) -> String {
    let missing: Vec<&String> = required
        .iter()
        .filter(|req| !content.lines().any(|line| line.trim() == req.trim()))
        .collect();
    if missing.is_empty() {
        return content.to_string();
    }
    let mut out = content.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for line in missing {
        out.push_str(line.trim());
        out.push('\n');
    }
    out
}

/// First whitespace-separated argument of the first `directive` line.
#[must_use]
pub fn directive_argument<'a>(content: &'a str, directive: &str) -> Option<&'a str> {
    content.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        (tokens.next() == Some(directive))
            .then(|| tokens.next())
            .flatten()
    })
}

// ── Daemon-specific edit sets ────────────────────────────────────────────────

/// Edits for the server config: listening port and protocol.
///
/// # Errors
///
/// Never in practice; the patterns are constants.
pub fn server_updates(protocol: Protocol, vpn_port: u16) -> Result<Vec<DirectiveUpdate>, regex::Error> {
    Ok(vec![
        DirectiveUpdate::literal(r"^port\s+\d+", format!("port {vpn_port}"))?,
        DirectiveUpdate::literal(r"^proto\s+[\w-]+", format!("proto {}", protocol.server_token()))?,
    ])
}

/// Edits for the client template: `remote` endpoint and protocol.
///
/// With an address override the whole `remote` endpoint is rewritten;
/// otherwise the existing host token is kept and only the port changes.
///
/// # Errors
///
/// Never in practice; the patterns are constants.
pub fn client_updates(
    address: Option<&str>,
    protocol: Protocol,
    vpn_port: u16,
) -> Result<Vec<DirectiveUpdate>, regex::Error> {
    let remote = match address.map(str::trim).filter(|a| !a.is_empty()) {
        Some(addr) => {
            DirectiveUpdate::literal(r"^remote\s+\S+\s+\d+", format!("remote {addr} {vpn_port}"))?
        }
        None => DirectiveUpdate::template(r"^remote\s+(\S+)\s+\d+", format!("remote ${{1}} {vpn_port}"))?,
    };
    Ok(vec![
        remote,
        DirectiveUpdate::literal(r"^proto\s+[\w-]+", format!("proto {}", protocol.client_token()))?,
    ])
}

/// Lines that enable per-client config for the daemon.
#[must_use]
pub fn ccd_directives(ccd_dir: &str) -> Vec<String> {
    vec![format!("client-config-dir {ccd_dir}"), "ccd-exclusive".to_string()]
}
