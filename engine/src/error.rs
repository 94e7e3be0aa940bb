use std::fmt;

use thiserror::Error;

use crate::ledger::UpgradeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Gold,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Gold => f.write_str("gold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Shortfall the player can fix; nothing was mutated.
    #[error("not enough {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: Resource,
        needed: u32,
        available: u32,
    },
    /// Caller misconfiguration (empty deck, out-of-order phase calls).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
    #[error("{kind} is already at max capacity {capacity}")]
    InvalidUpgrade { kind: UpgradeKind, capacity: u32 },
    #[error("battle did not finish within {ticks} ticks")]
    TickLimit { ticks: u64 },
    #[error("invalid content: {0}")]
    Content(String),
    #[error("invalid battle config: {0}")]
    Config(String),
}

impl EngineError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        EngineError::PreconditionViolation(msg.into())
    }

    /// Whether the UI can surface this to the player and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientResource { .. } | EngineError::InvalidUpgrade { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
