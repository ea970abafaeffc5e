//! Non-fatal advisories raised while preparing a solve.
//!
//! The route solver reports through a [`Diagnostics`] value it is handed
//! instead of a process-wide channel, so callers decide where advisories go.

use std::{fmt, sync::Mutex};

/// Something worth telling the caller about that does not stop the solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advisory {
    /// The problem does not have the shape LKH expects.
    MalformedProblem(String),
    /// LKH-3 has no multi-depot problem type; it may not find a solution.
    MultiDepot { depots: Vec<usize> },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedProblem(issue) => {
                write!(f, "problem looks malformed, proceed at your own risk: {issue}")
            }
            Self::MultiDepot { depots } => write!(
                f,
                "LKH-3 cannot solve multi-depot problems (depots={depots:?})"
            ),
        }
    }
}

pub trait Diagnostics {
    fn advise(&self, advisory: Advisory);
}

/// Forwards advisories to `log::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn advise(&self, advisory: Advisory) {
        log::warn!("solver.advisory: {advisory}");
    }
}

/// Keeps every advisory in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    advisories: Mutex<Vec<Advisory>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        match self.advisories.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn advise(&self, advisory: Advisory) {
        match self.advisories.lock() {
            Ok(mut guard) => guard.push(advisory),
            Err(poisoned) => poisoned.into_inner().push(advisory),
        }
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn advise(&self, advisory: Advisory) {
        (**self).advise(advisory);
    }
}
