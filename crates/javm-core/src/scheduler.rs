//! Scheduler seam
//!
//! The core never creates platform threads itself. It hands each started
//! record to a [`Scheduler`] as a [`WorkUnit`]; running the unit drives the
//! record to `Terminated` and captures any uncaught failure.

use crate::thread::ThreadId;
use crate::{ThreadError, ThreadResult};
use std::fmt;
use std::thread;

/// One unit of work ready to run as a new thread of control
pub struct WorkUnit {
    /// Record identity
    pub id: ThreadId,

    /// Record name at the time of `start`
    pub name: String,

    /// Record priority at the time of `start`
    pub priority: i32,

    /// Requested native stack size
    pub stack_size: Option<usize>,

    /// Entry point (runs the closure and completes the record)
    entry: Box<dyn FnOnce() + Send + 'static>,
}

impl WorkUnit {
    pub(crate) fn new(
        id: ThreadId,
        name: String,
        priority: i32,
        stack_size: Option<usize>,
        entry: Box<dyn FnOnce() + Send + 'static>,
    ) -> Self {
        Self {
            id,
            name,
            priority,
            stack_size,
            entry,
        }
    }

    /// Run the unit on the calling thread of control
    pub fn run(self) {
        (self.entry)()
    }
}

impl fmt::Debug for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkUnit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("stack_size", &self.stack_size)
            .finish()
    }
}

/// Platform scheduler that runs work units concurrently
pub trait Scheduler: Send + Sync {
    /// Run `unit` as a new, independent thread of control
    ///
    /// Must not block waiting for the unit to finish.
    fn dispatch(&self, unit: WorkUnit) -> ThreadResult<()>;

    /// A running record's priority changed
    fn priority_changed(&self, _id: ThreadId, _priority: i32) {}
}

/// Scheduler backed by one native OS thread per unit (preemptive, parallel)
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeScheduler;

impl NativeScheduler {
    /// Create a native scheduler
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for NativeScheduler {
    fn dispatch(&self, unit: WorkUnit) -> ThreadResult<()> {
        // Native thread names may not contain NUL bytes
        let native_name = unit.name.replace('\0', "");
        let mut builder = thread::Builder::new().name(native_name);
        if let Some(size) = unit.stack_size {
            builder = builder.stack_size(size);
        }

        let name = unit.name.clone();
        builder
            .spawn(move || unit.run())
            .map(|_detached| ())
            .map_err(|e| ThreadError::SpawnFailed {
                name,
                reason: e.to_string(),
            })
    }

    fn priority_changed(&self, id: ThreadId, priority: i32) {
        // std exposes no portable priority control; the value stays advisory
        tracing::trace!(thread = id.as_u64(), priority, "native priority change ignored");
    }
}
