//! Thread configuration

use crate::{ThreadError, ThreadResult};
use serde::Deserialize;
use std::ops::RangeInclusive;

/// Lowest thread priority
pub const MIN_PRIORITY: i32 = 1;

/// Priority of the main thread and of threads created without a parent
pub const NORM_PRIORITY: i32 = 5;

/// Highest thread priority
pub const MAX_PRIORITY: i32 = 10;

/// Options for a [`ThreadManager`](crate::ThreadManager)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreadOptions {
    /// Lowest accepted priority
    pub min_priority: i32,

    /// Priority of threads that have no creating record to inherit from
    pub default_priority: i32,

    /// Highest accepted priority
    pub max_priority: i32,

    /// Name of the record attached to the thread that creates the manager
    pub main_thread_name: String,

    /// Prefix of generated names (`Thread-0`, `Thread-1`, ...)
    pub name_prefix: String,

    /// Native stack size in bytes (None = platform default)
    pub stack_size: Option<usize>,
}

impl Default for ThreadOptions {
    fn default() -> Self {
        Self {
            min_priority: MIN_PRIORITY,
            default_priority: NORM_PRIORITY,
            max_priority: MAX_PRIORITY,
            main_thread_name: "main".to_string(),
            name_prefix: "Thread-".to_string(),
            stack_size: None,
        }
    }
}

impl ThreadOptions {
    /// Accepted priority range
    pub fn priority_range(&self) -> RangeInclusive<i32> {
        self.min_priority..=self.max_priority
    }

    /// Check that a priority is within bounds
    pub fn check_priority(&self, priority: i32) -> ThreadResult<()> {
        if self.priority_range().contains(&priority) {
            return Ok(());
        }
        Err(ThreadError::InvalidPriority {
            priority,
            min: self.min_priority,
            max: self.max_priority,
        })
    }

    /// Validate option consistency
    pub fn validate(&self) -> ThreadResult<()> {
        if self.min_priority > self.max_priority {
            return Err(ThreadError::InvalidOptions(format!(
                "min_priority {} is greater than max_priority {}",
                self.min_priority, self.max_priority
            )));
        }
        if !self.priority_range().contains(&self.default_priority) {
            return Err(ThreadError::InvalidOptions(format!(
                "default_priority {} is outside {}..={}",
                self.default_priority, self.min_priority, self.max_priority
            )));
        }
        if self.main_thread_name.is_empty() {
            return Err(ThreadError::InvalidOptions(
                "main_thread_name must not be empty".to_string(),
            ));
        }
        if self.stack_size == Some(0) {
            return Err(ThreadError::InvalidOptions(
                "stack_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
