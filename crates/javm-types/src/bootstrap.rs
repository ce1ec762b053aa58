//! Core class graph
//!
//! The `java.lang` / `java.io` classes the runtime itself depends on:
//! the root object, strings and boxed numbers, the throwable hierarchy and
//! the threading types. Embedders extend [`standard_builder`] with their own
//! classes before building.

use crate::registry::{TypeRegistry, TypeRegistryBuilder};
use once_cell::sync::Lazy;
use std::sync::Arc;

static STANDARD: Lazy<Arc<TypeRegistry>> = Lazy::new(|| {
    Arc::new(
        standard_builder()
            .build()
            .expect("core class graph is well-formed"),
    )
});

/// Builder pre-populated with the core classes
pub fn standard_builder() -> TypeRegistryBuilder {
    const OBJECT: Option<&str> = Some("java.lang.Object");
    const NUMBER: Option<&str> = Some("java.lang.Number");
    const SER: &[&str] = &["java.io.Serializable"];
    const BOXED: &[&str] = &["java.io.Serializable", "java.lang.Comparable"];

    TypeRegistry::builder()
        .class("java.lang.Object", None, &[])
        // Interfaces
        .interface("java.io.Serializable", &[])
        .interface("java.lang.Cloneable", &[])
        .interface("java.lang.Comparable", &[])
        .interface("java.lang.CharSequence", &[])
        .interface("java.lang.Runnable", &[])
        // Strings and boxed primitives
        .class(
            "java.lang.String",
            OBJECT,
            &["java.io.Serializable", "java.lang.Comparable", "java.lang.CharSequence"],
        )
        .class("java.lang.Number", OBJECT, SER)
        .class("java.lang.Byte", NUMBER, &["java.lang.Comparable"])
        .class("java.lang.Short", NUMBER, &["java.lang.Comparable"])
        .class("java.lang.Integer", NUMBER, &["java.lang.Comparable"])
        .class("java.lang.Long", NUMBER, &["java.lang.Comparable"])
        .class("java.lang.Float", NUMBER, &["java.lang.Comparable"])
        .class("java.lang.Double", NUMBER, &["java.lang.Comparable"])
        .class("java.lang.Boolean", OBJECT, BOXED)
        .class("java.lang.Character", OBJECT, BOXED)
        // Throwables
        .class("java.lang.Throwable", OBJECT, SER)
        .class("java.lang.Exception", Some("java.lang.Throwable"), &[])
        .class("java.lang.Error", Some("java.lang.Throwable"), &[])
        .class("java.lang.RuntimeException", Some("java.lang.Exception"), &[])
        .class("java.lang.InterruptedException", Some("java.lang.Exception"), &[])
        .class("java.lang.IllegalStateException", Some("java.lang.RuntimeException"), &[])
        .class("java.lang.IllegalArgumentException", Some("java.lang.RuntimeException"), &[])
        .class(
            "java.lang.IllegalThreadStateException",
            Some("java.lang.IllegalArgumentException"),
            &[],
        )
        .class("java.lang.ClassCastException", Some("java.lang.RuntimeException"), &[])
        .class("java.lang.NullPointerException", Some("java.lang.RuntimeException"), &[])
        // Threads
        .class("java.lang.Thread", OBJECT, &["java.lang.Runnable"])
}

/// Shared registry of the core classes
pub fn standard_registry() -> Arc<TypeRegistry> {
    STANDARD.clone()
}
