//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"`, or shows a spinner when animated
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
///
/// All output is suppressed when `ctx.quiet`. Animated reporters must not be
/// used while the operator is being prompted.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    animate: bool,
    current: RefCell<Option<(ProgressBar, String)>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a line-oriented reporter.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            animate: false,
            current: RefCell::new(None),
        }
    }

    /// Create a reporter that shows each step as a spinner on a terminal.
    #[must_use]
    pub fn animated(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            animate: ctx.show_progress(),
            current: RefCell::new(None),
        }
    }

    /// Mark the running step as done.
    fn settle(&self) {
        if let Some((pb, label)) = self.current.borrow_mut().take() {
            progress::finish_ok(&pb, &label);
        }
    }

    fn print(&self, line: String) {
        match self.current.borrow().as_ref() {
            Some((pb, _)) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.animate {
            self.settle();
            *self.current.borrow_mut() = Some((progress::spinner(message), message.to_string()));
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        self.settle();
        println!("  {} {message}", "✓".style(self.ctx.styles.success));
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            self.print(format!("  {} {message}", "!".style(self.ctx.styles.warning)));
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        // A spinner still running here belongs to a failed step.
        if let Some((pb, label)) = self.current.get_mut().take() {
            progress::finish_clear(&pb);
            println!("  {} {label}", "✗".style(self.ctx.styles.error));
        }
    }
}
