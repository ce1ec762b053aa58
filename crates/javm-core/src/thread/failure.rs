//! Throwables and captured uncaught failures

use javm_types::{TypeError, TypeKey, TypeRegistry, THROWABLE};
use std::any::Any;
use std::fmt;

/// Class recorded for a closure that panicked instead of returning a throwable
const PANIC_KIND: &str = "java.lang.Error";

/// A thrown value: a throwable type and an optional message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throwable {
    kind: TypeKey,
    message: Option<String>,
}

impl Throwable {
    /// Create a throwable of the named class
    ///
    /// The class must be registered and assignable to `java.lang.Throwable`.
    pub fn new(
        registry: &TypeRegistry,
        kind: &str,
        message: impl Into<String>,
    ) -> Result<Self, TypeError> {
        let key = registry.lookup(kind)?;
        Self::from_key(registry, key, Some(message.into()))
    }

    /// Create a throwable of the named class with no message
    pub fn without_message(registry: &TypeRegistry, kind: &str) -> Result<Self, TypeError> {
        let key = registry.lookup(kind)?;
        Self::from_key(registry, key, None)
    }

    /// Create a throwable from an already resolved type
    pub fn from_key(
        registry: &TypeRegistry,
        kind: TypeKey,
        message: Option<String>,
    ) -> Result<Self, TypeError> {
        let throwable = registry.lookup(THROWABLE).ok();
        let valid = match throwable {
            Some(root) => registry.is_assignable(kind, root),
            // Registries without the throwable hierarchy accept any class
            None => kind.is_reference() && !kind.is_array() && registry.describe(kind).is_ok(),
        };
        if !valid {
            let name = registry
                .canonical_name(kind)
                .unwrap_or_else(|_| format!("{:?}", kind));
            return Err(TypeError::NotThrowable { name });
        }
        Ok(Self { kind, message })
    }

    /// Same throwable type with a different message
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            message: Some(message.into()),
        }
    }

    /// Throwable type
    pub fn kind(&self) -> TypeKey {
        self.kind
    }

    /// Message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether a handler for `catch_type` would catch this throwable
    pub fn matches(&self, registry: &TypeRegistry, catch_type: TypeKey) -> bool {
        registry.is_assignable(self.kind, catch_type)
    }
}

/// Uncaught failure recorded on a terminated thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFailure {
    kind: TypeKey,
    kind_name: String,
    message: Option<String>,
}

impl CapturedFailure {
    pub(crate) fn capture(registry: &TypeRegistry, throwable: Throwable) -> Self {
        let kind_name = registry.canonical_name(throwable.kind).unwrap_or_else(|e| {
            tracing::error!(error = %e, "uncaught throwable has an unnamed type");
            format!("{:?}", throwable.kind)
        });
        Self {
            kind: throwable.kind,
            kind_name,
            message: throwable.message,
        }
    }

    pub(crate) fn from_panic(registry: &TypeRegistry, payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());

        let kind = registry
            .lookup(PANIC_KIND)
            .or_else(|_| registry.lookup(THROWABLE))
            .unwrap_or_else(|_| registry.root());

        Self::capture(registry, Throwable { kind, message })
    }

    /// Type of the uncaught throwable
    pub fn kind(&self) -> TypeKey {
        self.kind
    }

    /// Canonical name of the uncaught throwable's type
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    /// Message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// One-line uncaught exception report for a thread
    ///
    /// `Exception in thread "worker" java.lang.RuntimeException: boom`
    pub fn report(&self, thread_name: &str) -> String {
        format!("Exception in thread \"{}\" {}", thread_name, self)
    }
}

impl fmt::Display for CapturedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind_name, message),
            None => f.write_str(&self.kind_name),
        }
    }
}
