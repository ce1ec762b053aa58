//! Thread record and lifecycle state

use super::failure::{CapturedFailure, Throwable};
use super::manager::Shared;
use crate::scheduler::WorkUnit;
use crate::{ThreadError, ThreadResult};
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Closure run by a started thread
pub(crate) type Work = Box<dyn FnOnce() -> Result<(), Throwable> + Send + 'static>;

/// Unique identifier for a thread record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(u64);

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

impl ThreadId {
    /// Generate a new unique ThreadId
    pub fn new() -> Self {
        ThreadId(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Create a ThreadId from a u64 value
    pub fn from_u64(id: u64) -> Self {
        ThreadId(id)
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a thread record
///
/// States only move forward: `Created → Runnable → Running → Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ThreadState {
    /// Created but not started
    Created = 0,
    /// Started, waiting for the scheduler to run it
    Runnable = 1,
    /// Executing its work
    Running = 2,
    /// Finished, normally or with an uncaught failure
    Terminated = 3,
}

impl ThreadState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ThreadState::Created,
            1 => ThreadState::Runnable,
            2 => ThreadState::Running,
            _ => ThreadState::Terminated,
        }
    }

    /// Whether the thread has started and not yet terminated
    pub fn is_alive(self) -> bool {
        matches!(self, ThreadState::Runnable | ThreadState::Running)
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThreadState::Created => "created",
            ThreadState::Runnable => "runnable",
            ThreadState::Running => "running",
            ThreadState::Terminated => "terminated",
        })
    }
}

/// Result of a bounded join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The thread terminated before the timeout
    Terminated,
    /// The timeout elapsed; carries the state observed at that moment
    TimedOut(ThreadState),
}

impl JoinOutcome {
    /// Whether the join observed termination
    pub fn is_terminated(self) -> bool {
        matches!(self, JoinOutcome::Terminated)
    }
}

/// Runtime record for one thread of control
pub struct ThreadRecord {
    id: ThreadId,
    name: RwLock<String>,
    priority: AtomicI32,
    daemon: AtomicBool,

    /// Bound to a native thread the manager did not start
    attached: bool,

    state: AtomicU8,

    /// Taken exactly once by `start`; also guards daemon changes against it
    work: Mutex<Option<Work>>,

    failure: Mutex<Option<CapturedFailure>>,

    /// Completion flag for join (parking_lot Mutex for Condvar compatibility)
    completion_lock: Mutex<bool>,

    /// Condvar signalled on termination
    completion_condvar: Condvar,

    shared: Arc<Shared>,
}

impl ThreadRecord {
    /// New record in the `Created` state
    pub(crate) fn created(
        shared: Arc<Shared>,
        name: String,
        priority: i32,
        daemon: bool,
        work: Work,
    ) -> Self {
        Self::with_state(shared, name, priority, daemon, false, ThreadState::Created, Some(work))
    }

    /// New record for a native thread that is already running
    pub(crate) fn attached(shared: Arc<Shared>, name: String, priority: i32) -> Self {
        Self::with_state(shared, name, priority, false, true, ThreadState::Running, None)
    }

    fn with_state(
        shared: Arc<Shared>,
        name: String,
        priority: i32,
        daemon: bool,
        attached: bool,
        state: ThreadState,
        work: Option<Work>,
    ) -> Self {
        Self {
            id: ThreadId::new(),
            name: RwLock::new(name),
            priority: AtomicI32::new(priority),
            daemon: AtomicBool::new(daemon),
            attached,
            state: AtomicU8::new(state as u8),
            work: Mutex::new(work),
            failure: Mutex::new(None),
            completion_lock: Mutex::new(false),
            completion_condvar: Condvar::new(),
            shared,
        }
    }

    /// Get the record ID
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Current name
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Rename the thread (allowed in any state)
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// Current priority
    pub fn priority(&self) -> i32 {
        self.priority.load(Ordering::Acquire)
    }

    /// Change the priority
    ///
    /// Out-of-range values are rejected, not clamped. A live thread's
    /// scheduler is notified immediately.
    pub fn set_priority(&self, priority: i32) -> ThreadResult<()> {
        self.shared.options.check_priority(priority)?;
        self.priority.store(priority, Ordering::Release);
        if self.is_alive() {
            self.shared.scheduler.priority_changed(self.id, priority);
        }
        Ok(())
    }

    /// Whether the thread is a daemon
    pub fn is_daemon(&self) -> bool {
        self.daemon.load(Ordering::Acquire)
    }

    /// Mark the thread as daemon or user thread (only before `start`)
    pub fn set_daemon(&self, daemon: bool) -> ThreadResult<()> {
        let _guard = self.work.lock();
        let state = self.state();
        if state != ThreadState::Created {
            return Err(self.illegal_state(state, "change daemon status of"));
        }
        self.daemon.store(daemon, Ordering::Release);
        Ok(())
    }

    /// Whether the record is bound to a native thread it did not start
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Current lifecycle state
    pub fn state(&self) -> ThreadState {
        ThreadState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the thread has started and not yet terminated
    pub fn is_alive(&self) -> bool {
        self.state().is_alive()
    }

    /// Uncaught failure, recorded before the state became `Terminated`
    pub fn uncaught_failure(&self) -> Option<CapturedFailure> {
        self.failure.lock().clone()
    }

    /// Start the thread
    ///
    /// Exactly one `start` call succeeds. Later calls, or a call on an
    /// attached record, fail with [`ThreadError::IllegalThreadState`].
    /// If the scheduler cannot dispatch the work the record is moved to
    /// `Terminated` so joiners are released.
    pub fn start(self: &Arc<Self>) -> ThreadResult<()> {
        let work = {
            let mut slot = self.work.lock();
            self.transition(ThreadState::Created, ThreadState::Runnable, "start")?;
            slot.take()
        };

        let record = Arc::clone(self);
        let unit = WorkUnit::new(
            self.id,
            self.name(),
            self.priority(),
            self.shared.options.stack_size,
            Box::new(move || record.run(work)),
        );

        self.shared.register(self);
        tracing::debug!(thread = %unit.name, id = self.id.as_u64(), priority = unit.priority, "starting thread");

        if let Err(e) = self.shared.scheduler.dispatch(unit) {
            tracing::warn!(thread = %self.name(), error = %e, "thread dispatch failed");
            self.shared.unregister(self.id);
            self.complete(None);
            return Err(e);
        }
        Ok(())
    }

    /// Block until the thread terminates
    ///
    /// Returns immediately for an already terminated thread. Fails with
    /// [`ThreadError::IllegalThreadState`] for an unstarted or attached
    /// record.
    pub fn join(&self) -> ThreadResult<()> {
        self.ensure_joinable()?;
        let mut done = self.completion_lock.lock();
        while !*done {
            self.completion_condvar.wait(&mut done);
        }
        Ok(())
    }

    /// Block until the thread terminates or `timeout` elapses
    pub fn join_timeout(&self, timeout: Duration) -> ThreadResult<JoinOutcome> {
        self.ensure_joinable()?;
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return self.join().map(|()| JoinOutcome::Terminated),
        };

        let mut done = self.completion_lock.lock();
        while !*done {
            if self
                .completion_condvar
                .wait_until(&mut done, deadline)
                .timed_out()
            {
                break;
            }
        }

        if *done {
            Ok(JoinOutcome::Terminated)
        } else {
            Ok(JoinOutcome::TimedOut(self.state()))
        }
    }

    /// Entry point of a dispatched work unit
    fn run(self: Arc<Self>, work: Option<Work>) {
        let previous = super::set_current(Some(Arc::clone(&self)));
        if let Err(e) = self.transition(ThreadState::Runnable, ThreadState::Running, "run") {
            tracing::error!(error = %e, "dispatched thread was not runnable");
        }

        let outcome = match work {
            Some(work) => panic::catch_unwind(AssertUnwindSafe(work)),
            None => Ok(Ok(())),
        };

        let registry = &self.shared.registry;
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(thrown)) => Some(CapturedFailure::capture(registry, thrown)),
            Err(payload) => Some(CapturedFailure::from_panic(registry, payload)),
        };

        if let Some(failure) = &failure {
            self.shared.report_uncaught(&self, failure);
        }

        self.shared.unregister(self.id);
        self.complete(failure);
        tracing::debug!(thread = %self.name(), id = self.id.as_u64(), "thread terminated");
        super::set_current(previous);
    }

    /// Record the failure, publish `Terminated` and wake every joiner
    fn complete(&self, failure: Option<CapturedFailure>) {
        let mut done = self.completion_lock.lock();
        *self.failure.lock() = failure;
        self.state
            .store(ThreadState::Terminated as u8, Ordering::Release);
        *done = true;
        self.completion_condvar.notify_all();
    }

    fn transition(
        &self,
        from: ThreadState,
        to: ThreadState,
        operation: &'static str,
    ) -> ThreadResult<()> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| self.illegal_state(ThreadState::from_u8(actual), operation))
    }

    /// Unstarted records have nothing to wait for and attached ones never terminate
    fn ensure_joinable(&self) -> ThreadResult<()> {
        match self.state() {
            ThreadState::Created => Err(self.illegal_state(ThreadState::Created, "join")),
            state if self.attached => Err(self.illegal_state(state, "join")),
            _ => Ok(()),
        }
    }

    fn illegal_state(&self, state: ThreadState, operation: &'static str) -> ThreadError {
        ThreadError::IllegalThreadState {
            name: self.name(),
            state,
            operation,
        }
    }
}

impl fmt::Debug for ThreadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadRecord")
            .field("id", &self.id)
            .field("name", &*self.name.read())
            .field("state", &self.state())
            .field("priority", &self.priority())
            .field("daemon", &self.is_daemon())
            .finish()
    }
}
