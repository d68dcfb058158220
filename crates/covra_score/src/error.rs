//! Kernel error type.

use crate::time::SimTime;
use covra_common::InternalError;
use covra_model::{BindError, StmtId};
use covra_source::Span;
use thiserror::Error;

/// Errors that abort a scoring run.
///
/// A fatal error discards the scheduler queues; nothing partially
/// scored is ever marked as such.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// A reference named a signal that does not exist.
    #[error("reference to undefined signal '{name}' at {span}")]
    UndefinedSignal {
        /// The unresolved name as written.
        name: String,
        /// Location of the reference.
        span: Span,
    },

    /// An expression was bound twice; the model is corrupted.
    #[error("expression at {span} is already bound")]
    AlreadyBound {
        /// Location of the reference.
        span: Span,
    },

    /// Division or modulus by a known-zero divisor.
    #[error("division by zero at {span}")]
    DivisionByZero {
        /// Location of the offending operator.
        span: Span,
    },

    /// A replication count containing X or Z bits.
    #[error("replication count is unknown at {span}")]
    UnknownReplicationCount {
        /// Location of the replication.
        span: Span,
    },

    /// A trace event that cannot be applied to the design.
    #[error("malformed trace event: {reason}")]
    MalformedEvent {
        /// What was wrong with the event.
        reason: String,
    },

    /// An event timestamp earlier than one already applied.
    #[error("out-of-order trace event: {event} arrived after {prev}")]
    OutOfOrderEvent {
        /// The latest timestamp seen before the offender.
        prev: SimTime,
        /// The offending timestamp.
        event: SimTime,
    },

    /// Race validation at fatal severity found unsafe blocks.
    #[error("aborting: {count} statement block(s) failed race validation")]
    RaceAbort {
        /// Number of blocks that failed.
        count: usize,
    },

    /// A statement block looped past the per-activation step limit.
    #[error("statement {} exceeded the activation step limit of {max_steps}", .stmt.as_raw())]
    ExecutionLimit {
        /// The statement that was executing when the limit tripped.
        stmt: StmtId,
        /// The configured limit.
        max_steps: u32,
    },

    /// An internal invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<BindError> for ScoreError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::UndefinedSignal { name, span } => ScoreError::UndefinedSignal { name, span },
            BindError::AlreadyBound { span } => ScoreError::AlreadyBound { span },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ScoreError::OutOfOrderEvent {
            prev: SimTime::new(10),
            event: SimTime::new(4),
        };
        assert_eq!(err.to_string(), "out-of-order trace event: t4 arrived after t10");

        let err = ScoreError::ExecutionLimit {
            stmt: StmtId::from_raw(3),
            max_steps: 100,
        };
        assert!(err.to_string().contains("statement 3"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn bind_error_converts() {
        let err: ScoreError = BindError::UndefinedSignal {
            name: "clk".into(),
            span: Span::DUMMY,
        }
        .into();
        assert!(matches!(err, ScoreError::UndefinedSignal { .. }));
    }

    #[test]
    fn internal_error_converts() {
        let err: ScoreError = InternalError::new("bad state").into();
        assert!(err.to_string().contains("bad state"));
    }
}
