//! Thread manager: record creation, the live-thread table and uncaught failures

use super::failure::{CapturedFailure, Throwable};
use super::record::{ThreadId, ThreadRecord};
use crate::config::ThreadOptions;
use crate::scheduler::{NativeScheduler, Scheduler};
use crate::ThreadResult;
use javm_types::TypeRegistry;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Counter behind generated names, shared by every manager in the process
static NEXT_THREAD_NUMBER: AtomicU64 = AtomicU64::new(0);

/// Callback invoked on the dying thread when its work fails
pub type UncaughtHandler = Arc<dyn Fn(&ThreadRecord, &CapturedFailure) + Send + Sync>;

/// State shared between a manager and every record it created
pub(crate) struct Shared {
    pub(crate) registry: Arc<TypeRegistry>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) options: ThreadOptions,

    /// Started and attached records that have not terminated
    live: RwLock<FxHashMap<ThreadId, Weak<ThreadRecord>>>,

    uncaught_handler: RwLock<Option<UncaughtHandler>>,
}

impl Shared {
    fn next_default_name(&self) -> String {
        let n = NEXT_THREAD_NUMBER.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.options.name_prefix, n)
    }

    pub(crate) fn register(&self, record: &Arc<ThreadRecord>) {
        let mut live = self.live.write();
        live.retain(|_, weak| weak.strong_count() > 0);
        live.insert(record.id(), Arc::downgrade(record));
    }

    pub(crate) fn unregister(&self, id: ThreadId) {
        self.live.write().remove(&id);
    }

    fn live_records(&self) -> Vec<Arc<ThreadRecord>> {
        self.live.read().values().filter_map(Weak::upgrade).collect()
    }

    /// Hand an uncaught failure to the installed handler, or log it
    pub(crate) fn report_uncaught(&self, record: &ThreadRecord, failure: &CapturedFailure) {
        let handler = self.uncaught_handler.read().clone();
        match handler {
            Some(handler) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| handler(record, failure)));
                if result.is_err() {
                    tracing::error!(thread = %record.name(), "uncaught-failure handler panicked");
                }
            }
            None => {
                let name = record.name();
                tracing::warn!(thread = %name, failure = %failure, "{}", failure.report(&name));
            }
        }
    }
}

/// Owner of a set of thread records
///
/// Creating a manager attaches the calling native thread as the main
/// record; dropping it restores whatever record the thread had before.
/// Records hold a reference to the manager's shared state, so they stay
/// usable after the manager is dropped.
///
/// Generated names (`Thread-N`) draw from one process-wide counter, so
/// they are unique across managers.
pub struct ThreadManager {
    shared: Arc<Shared>,
    main: Arc<ThreadRecord>,

    /// Binding of the creating thread before `main` replaced it
    previous: Option<Arc<ThreadRecord>>,
}

impl ThreadManager {
    /// Manager with default options and the native scheduler
    pub fn new(registry: Arc<TypeRegistry>) -> ThreadResult<Self> {
        Self::with_options(registry, ThreadOptions::default())
    }

    /// Manager with custom options and the native scheduler
    pub fn with_options(registry: Arc<TypeRegistry>, options: ThreadOptions) -> ThreadResult<Self> {
        Self::with_scheduler(registry, Arc::new(NativeScheduler::new()), options)
    }

    /// Manager with a custom scheduler
    pub fn with_scheduler(
        registry: Arc<TypeRegistry>,
        scheduler: Arc<dyn Scheduler>,
        options: ThreadOptions,
    ) -> ThreadResult<Self> {
        options.validate()?;

        let shared = Arc::new(Shared {
            registry,
            scheduler,
            options,
            live: RwLock::new(FxHashMap::default()),
            uncaught_handler: RwLock::new(None),
        });

        let main = Arc::new(ThreadRecord::attached(
            Arc::clone(&shared),
            shared.options.main_thread_name.clone(),
            shared.options.default_priority,
        ));
        shared.register(&main);
        let previous = super::set_current(Some(Arc::clone(&main)));

        tracing::debug!(
            main = %shared.options.main_thread_name,
            min_priority = shared.options.min_priority,
            max_priority = shared.options.max_priority,
            "thread manager created"
        );

        Ok(Self {
            shared,
            main,
            previous,
        })
    }

    /// Type registry used to name failures
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.shared.registry
    }

    /// Options in effect
    pub fn options(&self) -> &ThreadOptions {
        &self.shared.options
    }

    /// Record attached to the thread that created the manager
    pub fn main_thread(&self) -> &Arc<ThreadRecord> {
        &self.main
    }

    /// Create an unstarted record with a generated name (`Thread-N`)
    ///
    /// Priority and daemon status are inherited from the calling thread's
    /// record, if it has one.
    pub fn create<F>(&self, work: F) -> Arc<ThreadRecord>
    where
        F: FnOnce() -> Result<(), Throwable> + Send + 'static,
    {
        let name = self.shared.next_default_name();
        self.create_named(name, work)
    }

    /// Create an unstarted record with an explicit name
    pub fn create_named<F>(&self, name: impl Into<String>, work: F) -> Arc<ThreadRecord>
    where
        F: FnOnce() -> Result<(), Throwable> + Send + 'static,
    {
        let options = &self.shared.options;
        let parent = super::current();
        let priority = parent
            .as_ref()
            .map(|p| p.priority())
            .unwrap_or(options.default_priority)
            .clamp(options.min_priority, options.max_priority);
        let daemon = parent.as_ref().map(|p| p.is_daemon()).unwrap_or(false);

        Arc::new(ThreadRecord::created(
            Arc::clone(&self.shared),
            name.into(),
            priority,
            daemon,
            Box::new(work),
        ))
    }

    /// Record of the calling thread, attaching it if it has none
    ///
    /// Attached records stay `Running` for as long as the native thread
    /// lives; [`ThreadRecord::join`] on one fails with
    /// [`ThreadError::IllegalThreadState`](crate::ThreadError::IllegalThreadState).
    pub fn current_thread(&self) -> Arc<ThreadRecord> {
        if let Some(record) = super::current() {
            return record;
        }

        let record = Arc::new(ThreadRecord::attached(
            Arc::clone(&self.shared),
            self.shared.next_default_name(),
            self.shared.options.default_priority,
        ));
        self.shared.register(&record);
        super::set_current(Some(Arc::clone(&record)));
        tracing::debug!(thread = %record.name(), "attached native thread");
        record
    }

    /// Find a live record by ID
    pub fn find(&self, id: ThreadId) -> Option<Arc<ThreadRecord>> {
        self.shared.live.read().get(&id).and_then(Weak::upgrade)
    }

    /// Number of live records, the main record included
    pub fn thread_count(&self) -> usize {
        self.shared.live_records().len()
    }

    /// Snapshot of the live records
    pub fn live_threads(&self) -> Vec<Arc<ThreadRecord>> {
        self.shared.live_records()
    }

    /// Install the handler called for every uncaught failure
    ///
    /// Without a handler, failures are logged at warn level.
    pub fn set_uncaught_handler<H>(&self, handler: H)
    where
        H: Fn(&ThreadRecord, &CapturedFailure) + Send + Sync + 'static,
    {
        *self.shared.uncaught_handler.write() = Some(Arc::new(handler));
    }

    /// Remove the uncaught-failure handler
    pub fn clear_uncaught_handler(&self) {
        *self.shared.uncaught_handler.write() = None;
    }

    /// Block until every started non-daemon record has terminated
    ///
    /// Attached records and the calling thread's own record are skipped.
    /// Threads started while waiting are waited for as well.
    pub fn join_non_daemon(&self) -> ThreadResult<()> {
        let me = super::current().map(|r| r.id());
        loop {
            let pending: Vec<_> = self
                .shared
                .live_records()
                .into_iter()
                .filter(|r| !r.is_daemon() && !r.is_attached() && Some(r.id()) != me)
                .filter(|r| r.is_alive())
                .collect();

            if pending.is_empty() {
                return Ok(());
            }
            for record in pending {
                record.join()?;
            }
        }
    }
}

impl Drop for ThreadManager {
    fn drop(&mut self) {
        self.shared.unregister(self.main.id());
        if super::current().is_some_and(|r| Arc::ptr_eq(&r, &self.main)) {
            super::set_current(self.previous.take());
        }
    }
}

impl std::fmt::Debug for ThreadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadManager")
            .field("main", &self.main)
            .field("options", &self.shared.options)
            .field("live", &self.shared.live.read().len())
            .finish()
    }
}
