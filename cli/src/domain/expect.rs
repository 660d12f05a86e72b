//! Declarative expect/respond scripts for interactive installers.

use std::time::Duration;

use regex::Regex;

/// One prompt the driver waits for and the answer it types.
#[derive(Debug, Clone)]
pub struct ExpectStep {
    pub pattern: Regex,
    /// Written followed by a newline. Empty means "just press Enter".
    pub response: String,
    pub timeout: Duration,
}

impl ExpectStep {
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str, response: &str, timeout: Duration) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            response: response.to_string(),
            timeout,
        })
    }
}

/// Ordered prompt table. Steps are answered strictly in order.
#[derive(Debug, Clone, Default)]
pub struct ExpectScript {
    pub steps: Vec<ExpectStep>,
}

impl ExpectScript {
    /// Build a script from `(pattern, response)` pairs sharing one timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern is not a valid regular expression.
    pub fn from_table(table: &[(&str, &str)], timeout: Duration) -> Result<Self, regex::Error> {
        let steps = table
            .iter()
            .map(|(pattern, response)| ExpectStep::new(pattern, response, timeout))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Answers for a fresh OpenVPN install: first IPv4, TCP, port 1194, first
/// DNS option, a first client named `first_client`.
pub const INSTALL_TABLE: &[(&str, &str)] = &[
    (r"Which IPv4 address should be used.*:", "1"),
    (r"Protocol.*:", "2"),
    (r"Port.*:", "1194"),
    (r"Select a DNS server for the clients.*:", "1"),
    (r"Enter a name for the first client.*:", "first_client"),
    (r"Press any key to continue", ""),
];

/// Answers for the installer's removal path.
pub const UNINSTALL_TABLE: &[(&str, &str)] = &[
    (r"Option:", "3"),
    (r"Confirm OpenVPN removal", "y"),
];

/// # Errors
///
/// Never in practice; the table patterns are constants.
pub fn install_script(step_timeout: Duration) -> Result<ExpectScript, regex::Error> {
    ExpectScript::from_table(INSTALL_TABLE, step_timeout)
}

/// # Errors
///
/// Never in practice; the table patterns are constants.
pub fn uninstall_script(step_timeout: Duration) -> Result<ExpectScript, regex::Error> {
    ExpectScript::from_table(UNINSTALL_TABLE, step_timeout)
}

/// Output accumulated from the child since the last answered prompt.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    text: String,
    /// Leading bytes of a UTF-8 sequence cut off at the end of a read.
    pending: Vec<u8>,
}

impl OutputBuffer {
    /// Append a raw read. Invalid bytes become U+FFFD; an incomplete
    /// trailing sequence waits for the next chunk.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let mut rest = std::mem::take(&mut self.pending);
        let mut start = 0;
        loop {
            match std::str::from_utf8(&rest[start..]) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let end = start + err.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&rest[start..end]));
                    match err.error_len() {
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            start = end + len;
                        }
                        None => {
                            rest.drain(..end);
                            self.pending = rest;
                            break;
                        }
                    }
                }
            }
        }
    }

    /// If `pattern` occurs, drop everything up to the end of the match.
    pub fn consume_match(&mut self, pattern: &Regex) -> bool {
        match pattern.find(&self.text) {
            Some(m) => {
                self.text.drain(..m.end());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}
