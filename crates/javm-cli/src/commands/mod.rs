//! Driver programs

pub mod class_cast;
pub mod class_name;
pub mod thread_exception;

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Output stream shared with threads started by a program
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;
