//! Thread records and their lifecycle
//!
//! A [`ThreadRecord`] is the runtime's view of one thread of control. Records
//! are created by a [`ThreadManager`] in the `Created` state, dispatched to a
//! [`Scheduler`](crate::Scheduler) by [`ThreadRecord::start`], and move to
//! `Terminated` exactly once, after any uncaught failure has been recorded.

mod failure;
mod manager;
mod record;

pub use failure::{CapturedFailure, Throwable};
pub use manager::{ThreadManager, UncaughtHandler};
pub use record::{JoinOutcome, ThreadId, ThreadRecord, ThreadState};

use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static CURRENT: RefCell<Option<Arc<ThreadRecord>>> = const { RefCell::new(None) };
}

/// Record of the calling thread of control
///
/// Returns `None` when the calling native thread was neither started by a
/// manager nor attached to one.
pub fn current() -> Option<Arc<ThreadRecord>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Bind `record` to the calling native thread, returning the previous binding
pub(crate) fn set_current(record: Option<Arc<ThreadRecord>>) -> Option<Arc<ThreadRecord>> {
    CURRENT.with(|current| std::mem::replace(&mut *current.borrow_mut(), record))
}
