//! javm Thread Lifecycle Core
//!
//! This crate provides the threading half of the runtime core:
//! - Thread records with a linearizable `created → runnable → running → terminated` lifecycle
//! - Blocking join, with or without a timeout
//! - Uncaught-failure capture, named through the type registry
//! - A scheduler seam, with a native OS-thread implementation

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod scheduler;
pub mod thread;

pub use config::{ThreadOptions, MAX_PRIORITY, MIN_PRIORITY, NORM_PRIORITY};
pub use scheduler::{NativeScheduler, Scheduler, WorkUnit};
pub use thread::{
    CapturedFailure, JoinOutcome, ThreadId, ThreadManager, ThreadRecord, ThreadState, Throwable,
};

use javm_types::TypeError;

/// Thread lifecycle errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ThreadError {
    /// Operation not allowed in the record's current state
    #[error("Illegal thread state: cannot {operation} thread \"{name}\" in state {state}")]
    IllegalThreadState {
        /// Thread name
        name: String,
        /// State the record was in
        state: ThreadState,
        /// Rejected operation
        operation: &'static str,
    },

    /// Priority outside the configured bounds
    #[error("Invalid priority {priority}: must be within {min}..={max}")]
    InvalidPriority {
        /// Rejected priority
        priority: i32,
        /// Lowest allowed priority
        min: i32,
        /// Highest allowed priority
        max: i32,
    },

    /// The scheduler could not dispatch the work
    #[error("Failed to spawn thread \"{name}\": {reason}")]
    SpawnFailed {
        /// Thread name
        name: String,
        /// Platform error
        reason: String,
    },

    /// Inconsistent thread options
    #[error("Invalid thread options: {0}")]
    InvalidOptions(String),

    /// Type registry error
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Thread lifecycle result
pub type ThreadResult<T> = Result<T, ThreadError>;
