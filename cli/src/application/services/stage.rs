//! Stage sequencing shared by every procedure.
//!
//! A `Session` numbers stages, reports `[i/N] name` through the progress
//! port, records what completed, and wraps a failing stage's error with
//! [`StageFailed`]. It uses interior mutability so stage futures can borrow
//! the session to emit warnings while the session itself drives them.

use std::cell::{Cell, RefCell};
use std::future::Future;

use anyhow::Result;

use crate::application::ports::ProgressReporter;
use crate::domain::StageFailed;

/// Stages completed and warnings raised by a finished procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub completed: Vec<String>,
    pub warnings: Vec<String>,
}

pub struct Session<'a, R: ProgressReporter> {
    procedure: &'static str,
    total: usize,
    index: Cell<usize>,
    completed: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
    reporter: &'a R,
}

impl<'a, R: ProgressReporter> Session<'a, R> {
    #[must_use]
    pub fn new(procedure: &'static str, total: usize, reporter: &'a R) -> Self {
        Self {
            procedure,
            total,
            index: Cell::new(0),
            completed: RefCell::new(Vec::new()),
            warnings: RefCell::new(Vec::new()),
            reporter,
        }
    }

    fn begin(&self, name: &str) -> usize {
        let index = self.index.get() + 1;
        self.index.set(index);
        tracing::info!(procedure = self.procedure, stage = name, index, total = self.total, "stage started");
        self.reporter
            .step(&format!("[{index}/{}] {name}", self.total));
        index
    }

    /// Run a mandatory stage.
    ///
    /// # Errors
    ///
    /// Returns the stage's error with a [`StageFailed`] context listing the
    /// stages completed before it.
    pub async fn run<T>(&self, name: &str, stage: impl Future<Output = Result<T>>) -> Result<T> {
        let index = self.begin(name);
        match stage.await {
            Ok(value) => {
                self.completed.borrow_mut().push(name.to_string());
                Ok(value)
            }
            Err(err) => {
                let completed = self.completed.borrow().clone();
                tracing::error!(procedure = self.procedure, stage = name, error = %format!("{err:#}"), "stage failed");
                Err(err.context(StageFailed {
                    procedure: self.procedure.to_string(),
                    stage: name.to_string(),
                    index,
                    total: self.total,
                    completed,
                }))
            }
        }
    }

    /// Run a stage whose failure is downgraded to a warning.
    ///
    /// Returns whether the stage succeeded.
    pub async fn best_effort(&self, name: &str, stage: impl Future<Output = Result<()>>) -> bool {
        self.begin(name);
        match stage.await {
            Ok(()) => {
                self.completed.borrow_mut().push(name.to_string());
                true
            }
            Err(err) => {
                self.warn(format!("{name}: {err:#}"));
                false
            }
        }
    }

    /// Record a warning, log it and show it to the operator.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(procedure = self.procedure, "{message}");
        self.reporter.warn(&message);
        self.warnings.borrow_mut().push(message);
    }

    /// Run a fallible step inside a best-effort stage, warning on failure.
    pub async fn attempt(&self, what: &str, step: impl Future<Output = Result<()>>) {
        if let Err(err) = step.await {
            self.warn(format!("{what}: {err:#}"));
        }
    }

    pub fn reporter(&self) -> &R {
        self.reporter
    }

    #[must_use]
    pub fn finish(self) -> SessionReport {
        SessionReport {
            completed: self.completed.into_inner(),
            warnings: self.warnings.into_inner(),
        }
    }
}
