//! Integration tests for the thread lifecycle
//!
//! Covers start/join ordering, bounded joins, concurrent joiners,
//! and custom schedulers.

use javm_core::thread::current;
use javm_core::{
    JoinOutcome, Scheduler, ThreadError, ThreadId, ThreadManager, ThreadOptions, ThreadState,
    WorkUnit,
};
use javm_types::standard_registry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

fn manager() -> ThreadManager {
    ThreadManager::new(standard_registry()).unwrap()
}

// ============================================================================
// Start and join
// ============================================================================

#[test]
fn test_start_runs_work_once() {
    let manager = manager();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let record = manager.create(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    record.start().unwrap();
    record.join().unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(record.state(), ThreadState::Terminated);
    assert!(!record.is_alive());
    assert!(record.uncaught_failure().is_none());
}

#[test]
fn test_second_start_fails() {
    let manager = manager();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let (running_tx, running_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let record = manager.create(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        running_tx.send(()).unwrap();
        let _ = release_rx.recv();
        Ok(())
    });
    record.start().unwrap();
    running_rx.recv().unwrap();

    // Rejected while running: the state is left alone
    assert_eq!(record.state(), ThreadState::Running);
    let err = record.start().unwrap_err();
    assert!(matches!(
        err,
        ThreadError::IllegalThreadState {
            state: ThreadState::Running,
            operation: "start",
            ..
        }
    ));
    assert_eq!(record.state(), ThreadState::Running);
    assert!(record.is_alive());

    release_tx.send(()).unwrap();
    record.join().unwrap();

    // Rejected after termination: still terminated, work ran once
    let err = record.start().unwrap_err();
    assert!(matches!(
        err,
        ThreadError::IllegalThreadState {
            state: ThreadState::Terminated,
            operation: "start",
            ..
        }
    ));
    assert_eq!(record.state(), ThreadState::Terminated);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_starts_exactly_one_wins() {
    let manager = manager();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let record = manager.create(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let record = Arc::clone(&record);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                record.start().is_ok()
            })
        })
        .collect();

    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(wins, 1);

    record.join().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_join_on_terminated_returns_immediately() {
    let manager = manager();
    let record = manager.create(|| Ok(()));
    record.start().unwrap();
    record.join().unwrap();

    record.join().unwrap();
    assert_eq!(
        record.join_timeout(Duration::ZERO).unwrap(),
        JoinOutcome::Terminated
    );
}

#[test]
fn test_join_timeout_while_running() {
    let manager = manager();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let record = manager.create(move || {
        let _ = release_rx.recv();
        Ok(())
    });
    record.start().unwrap();

    let outcome = record.join_timeout(Duration::from_millis(20)).unwrap();
    match outcome {
        JoinOutcome::TimedOut(state) => assert!(state.is_alive()),
        JoinOutcome::Terminated => panic!("thread finished while blocked"),
    }
    assert!(record.is_alive());

    release_tx.send(()).unwrap();
    assert!(record
        .join_timeout(Duration::from_secs(10))
        .unwrap()
        .is_terminated());
}

#[test]
fn test_all_joiners_released() {
    let manager = manager();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let record = manager.create(move || {
        let _ = release_rx.recv();
        Ok(())
    });
    record.start().unwrap();

    let joiners: Vec<_> = (0..6)
        .map(|_| {
            let record = Arc::clone(&record);
            thread::spawn(move || {
                record.join().unwrap();
                record.state()
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(10));
    release_tx.send(()).unwrap();

    for joiner in joiners {
        assert_eq!(joiner.join().unwrap(), ThreadState::Terminated);
    }
}

// ============================================================================
// Names and the current record
// ============================================================================

#[test]
fn test_current_inside_work() {
    let manager = manager();
    let (tx, rx) = mpsc::channel();
    let record = manager.create_named("worker", move || {
        let me = current().expect("started thread has a record");
        tx.send((me.name(), me.state(), thread::current().name().map(str::to_string)))
            .unwrap();
        Ok(())
    });
    let id = record.id();
    record.start().unwrap();
    record.join().unwrap();

    let (name, state, native) = rx.recv().unwrap();
    assert_eq!(name, "worker");
    assert_eq!(state, ThreadState::Running);
    assert_eq!(native.as_deref(), Some("worker"));
    assert_ne!(id, manager.main_thread().id());
}

#[test]
fn test_nested_threads_inherit_priority() {
    let manager = Arc::new(manager());
    let (tx, rx) = mpsc::channel();
    let m = Arc::clone(&manager);
    let outer = manager.create_named("outer", move || {
        let inner = m.create(|| Ok(()));
        tx.send((inner.name(), inner.priority())).unwrap();
        Ok(())
    });
    outer.set_priority(9).unwrap();
    outer.start().unwrap();
    outer.join().unwrap();

    let (name, priority) = rx.recv().unwrap();
    assert!(name.strip_prefix("Thread-").is_some_and(|n| n.parse::<u64>().is_ok()), "{}", name);
    assert_eq!(priority, 9);
}

// ============================================================================
// Custom schedulers
// ============================================================================

/// Runs every unit on the caller's thread
#[derive(Default)]
struct InlineScheduler {
    priority_changes: Mutex<Vec<(ThreadId, i32)>>,
}

impl Scheduler for InlineScheduler {
    fn dispatch(&self, unit: WorkUnit) -> Result<(), ThreadError> {
        unit.run();
        Ok(())
    }

    fn priority_changed(&self, id: ThreadId, priority: i32) {
        self.priority_changes.lock().unwrap().push((id, priority));
    }
}

/// Refuses every unit
struct FailingScheduler;

impl Scheduler for FailingScheduler {
    fn dispatch(&self, unit: WorkUnit) -> Result<(), ThreadError> {
        Err(ThreadError::SpawnFailed {
            name: unit.name,
            reason: "out of threads".to_string(),
        })
    }
}

#[test]
fn test_inline_scheduler_restores_current() {
    let scheduler = Arc::new(InlineScheduler::default());
    let manager =
        ThreadManager::with_scheduler(standard_registry(), scheduler, ThreadOptions::default())
            .unwrap();

    let (tx, rx) = mpsc::channel();
    let record = manager.create_named("inline", move || {
        tx.send(current().map(|r| r.name())).unwrap();
        Ok(())
    });
    record.start().unwrap();

    assert_eq!(record.state(), ThreadState::Terminated);
    assert_eq!(rx.recv().unwrap().as_deref(), Some("inline"));
    assert_eq!(current().map(|r| r.name()).as_deref(), Some("main"));
}

#[test]
fn test_priority_change_notifies_scheduler_only_while_alive() {
    let scheduler = Arc::new(InlineScheduler::default());
    let manager = ThreadManager::with_scheduler(
        standard_registry(),
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
        ThreadOptions::default(),
    )
    .unwrap();

    let record = manager.create(|| Ok(()));
    record.set_priority(2).unwrap();
    assert!(scheduler.priority_changes.lock().unwrap().is_empty());

    let main = manager.main_thread();
    main.set_priority(6).unwrap();
    assert_eq!(*scheduler.priority_changes.lock().unwrap(), [(main.id(), 6)]);
}

#[test]
fn test_spawn_failure_terminates_record() {
    let manager = ThreadManager::with_scheduler(
        standard_registry(),
        Arc::new(FailingScheduler),
        ThreadOptions::default(),
    )
    .unwrap();

    let record = manager.create_named("doomed", || Ok(()));
    let err = record.start().unwrap_err();
    assert_eq!(
        err,
        ThreadError::SpawnFailed {
            name: "doomed".to_string(),
            reason: "out of threads".to_string()
        }
    );
    assert_eq!(record.state(), ThreadState::Terminated);
    record.join().unwrap();
    assert!(record.start().is_err());
    assert_eq!(manager.thread_count(), 1);
}

#[test]
fn test_stack_size_passed_to_native_thread() {
    let options = ThreadOptions {
        stack_size: Some(4 * 1024 * 1024),
        ..Default::default()
    };
    let manager = ThreadManager::with_options(standard_registry(), options).unwrap();

    let (tx, rx) = mpsc::channel();
    let record = manager.create(move || {
        let buffer = [7u8; 512 * 1024];
        tx.send(std::hint::black_box(&buffer).iter().map(|b| *b as usize).sum::<usize>())
            .unwrap();
        Ok(())
    });
    record.start().unwrap();
    record.join().unwrap();
    assert!(record.uncaught_failure().is_none());
    assert_eq!(rx.recv().unwrap(), 7 * 512 * 1024);
}
