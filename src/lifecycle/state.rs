//! Registration lifecycle guard.
//!
//! # State Transitions
//! ```text
//! Configuring → Sealed: routes resolved, chains frozen
//! Sealed → Serving: listener accepting requests
//! ```
//!
//! # Design Decisions
//! - Transitions are one-way; nothing returns to Configuring
//! - Every mutating registry call checks the state first
//! - Misuse is a programming error and ends in [`fault`]

use std::fmt;

use thiserror::Error;

/// Where the registry is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Configuring,
    Sealed,
    Serving,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Configuring => "configuring",
            LifecycleState::Sealed => "sealed",
            LifecycleState::Serving => "serving",
        };
        f.write_str(name)
    }
}

/// Lifecycle misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("{operation} must be called before the registry is sealed (state: {state})")]
    NotConfiguring {
        operation: &'static str,
        state: LifecycleState,
    },
    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

/// One-way state machine guarding registration.
#[derive(Debug)]
pub struct LifecycleGuard {
    state: LifecycleState,
}

impl LifecycleGuard {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Configuring,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// True once routes have been resolved (also while serving).
    pub fn is_sealed(&self) -> bool {
        self.state != LifecycleState::Configuring
    }

    pub fn is_serving(&self) -> bool {
        self.state == LifecycleState::Serving
    }

    /// Fails unless still configuring. `operation` names the rejected call.
    pub fn ensure_configuring(&self, operation: &'static str) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Configuring => Ok(()),
            state => Err(LifecycleError::NotConfiguring { operation, state }),
        }
    }

    pub fn seal(&mut self) -> Result<(), LifecycleError> {
        self.advance(LifecycleState::Configuring, LifecycleState::Sealed)
    }

    pub fn serve(&mut self) -> Result<(), LifecycleError> {
        self.advance(LifecycleState::Sealed, LifecycleState::Serving)
    }

    fn advance(&mut self, from: LifecycleState, to: LifecycleState) -> Result<(), LifecycleError> {
        if self.state != from {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = %from, to = %to, "Lifecycle transition");
        self.state = to;
        Ok(())
    }
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Abort on a configuration-time programming error.
///
/// These are meant to surface during development and startup, so they are logged and
/// turned into a panic rather than returned.
#[track_caller]
pub fn fault(error: impl std::error::Error) -> ! {
    tracing::error!(error = %error, "Configuration fault");
    panic!("{error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let mut guard = LifecycleGuard::new();
        assert!(guard.ensure_configuring("register").is_ok());
        assert!(!guard.is_sealed());

        guard.seal().unwrap();
        assert!(guard.is_sealed());
        assert!(!guard.is_serving());

        guard.serve().unwrap();
        assert!(guard.is_sealed());
        assert!(guard.is_serving());
    }

    #[test]
    fn test_no_going_back() {
        let mut guard = LifecycleGuard::new();
        assert_eq!(
            guard.serve(),
            Err(LifecycleError::InvalidTransition {
                from: LifecycleState::Configuring,
                to: LifecycleState::Serving,
            })
        );

        guard.seal().unwrap();
        assert!(guard.seal().is_err());
        assert_eq!(
            guard.ensure_configuring("register"),
            Err(LifecycleError::NotConfiguring {
                operation: "register",
                state: LifecycleState::Sealed,
            })
        );
    }

    #[test]
    #[should_panic(expected = "must be called before the registry is sealed")]
    fn test_fault_panics() {
        let mut guard = LifecycleGuard::new();
        guard.seal().unwrap();
        if let Err(e) = guard.ensure_configuring("add_pre_callback") {
            fault(e);
        }
    }
}
