//! `javm thread-exception`: a thread that counts and then dies
//!
//! The worker prints `<name>: <i>` lines, then fails with an uncaught
//! `java.lang.RuntimeException`. The uncaught report goes to the error
//! stream; the joining thread completes normally.

use super::SharedWriter;
use javm_core::{thread, ThreadManager, ThreadOptions, Throwable};
use javm_types::TypeRegistry;
use std::sync::Arc;

/// Program parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadExceptionArgs {
    /// Lines printed before failing
    pub count: u32,
    /// Worker name (generated when absent)
    pub name: Option<String>,
    /// Worker priority (inherited when absent)
    pub priority: Option<i32>,
}

impl Default for ThreadExceptionArgs {
    fn default() -> Self {
        Self {
            count: 10,
            name: None,
            priority: None,
        }
    }
}

/// Run the program on a fresh thread manager
pub fn execute(
    registry: Arc<TypeRegistry>,
    options: ThreadOptions,
    args: &ThreadExceptionArgs,
    out: SharedWriter,
    err: SharedWriter,
) -> anyhow::Result<()> {
    let manager = ThreadManager::with_options(Arc::clone(&registry), options)?;
    manager.set_uncaught_handler(move |record, failure| {
        let mut err = err.lock();
        if let Err(e) = writeln!(err, "{}", failure.report(&record.name())) {
            tracing::error!(error = %e, "failed to write uncaught report");
        }
    });

    let failure = Throwable::without_message(&registry, "java.lang.RuntimeException")?;
    let write_failure = Throwable::without_message(&registry, "java.lang.Error")?;
    let count = args.count;
    let work = move || -> Result<(), Throwable> {
        let name = thread::current().map(|t| t.name()).unwrap_or_default();
        for i in 0..count {
            writeln!(out.lock(), "{}: {}", name, i)
                .map_err(|e| write_failure.with_message(e.to_string()))?;
        }
        Err(failure.with_message(format!("exception thrown from my thread: {}", name)))
    };

    let worker = match &args.name {
        Some(name) => manager.create_named(name.clone(), work),
        None => manager.create(work),
    };
    if let Some(priority) = args.priority {
        worker.set_priority(priority)?;
    }

    worker.start()?;
    worker.join()?;
    tracing::info!(
        thread = %worker.name(),
        state = %worker.state(),
        failed = worker.uncaught_failure().is_some(),
        "worker joined"
    );
    Ok(())
}
