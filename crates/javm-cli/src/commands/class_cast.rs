//! `javm class-cast`: checked casts through the root type

use javm_types::{TypeError, TypeKey, TypeRegistry};
use std::io::Write;

/// Built-in program: an instance class and the casts applied to it in turn
const CHAINS: &[(&str, &[&str])] = &[
    ("java.lang.String", &["java.lang.Object"]),
    ("java.lang.String", &["java.lang.Object", "java.lang.Integer"]),
    ("java.lang.RuntimeException", &["java.lang.Object", "java.lang.Exception"]),
    ("java.lang.RuntimeException", &["java.lang.Object", "java.lang.RuntimeException"]),
    ("java.lang.RuntimeException", &["java.lang.Object", "java.lang.IllegalStateException"]),
    (
        "java.lang.RuntimeException",
        &["java.lang.Object", "java.lang.Throwable", "java.lang.RuntimeException"],
    ),
];

/// Run the built-in chains, or a single chain of type names
///
/// A chain is an instance type followed by one or more cast targets; any
/// name accepted by [`TypeRegistry::resolve`] may be used.
pub fn execute(registry: &TypeRegistry, chain: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
    if chain.is_empty() {
        for (instance, targets) in CHAINS {
            let keys = resolve_chain(registry, instance, targets.iter().copied())?;
            let label = describe(instance, targets.iter().copied(), simple_name);
            match cast_chain(registry, &keys)? {
                None => writeln!(out, "Casted {}", label)?,
                Some(_) => writeln!(out, "Couldn't cast {}", label)?,
            }
        }
        writeln!(out, "Done!")?;
        return Ok(());
    }

    let Some((instance, targets)) = chain.split_first().filter(|(_, t)| !t.is_empty()) else {
        anyhow::bail!("a cast chain needs an instance type and at least one target");
    };
    let keys = resolve_chain(registry, instance, targets.iter().map(String::as_str))?;
    let label = describe(instance, targets.iter().map(String::as_str), |name| name);
    match cast_chain(registry, &keys)? {
        None => writeln!(out, "Casted {}", label)?,
        Some(message) => {
            writeln!(out, "Couldn't cast {}", label)?;
            writeln!(out, "java.lang.ClassCastException: {}", message)?;
        }
    }
    Ok(())
}

fn resolve_chain<'a>(
    registry: &TypeRegistry,
    instance: &'a str,
    targets: impl Iterator<Item = &'a str>,
) -> anyhow::Result<Vec<TypeKey>> {
    std::iter::once(instance)
        .chain(targets)
        .map(|name| registry.resolve(name).map_err(anyhow::Error::from))
        .collect()
}

/// Cast the instance (first key) to each target in turn
///
/// A cast never changes the runtime type, so every step checks the
/// instance itself. Returns the first ClassCast message, if any.
fn cast_chain(registry: &TypeRegistry, keys: &[TypeKey]) -> anyhow::Result<Option<String>> {
    let Some((&instance, targets)) = keys.split_first() else {
        return Ok(None);
    };
    for &target in targets {
        match registry.check_cast(instance, target) {
            Ok(()) => {}
            Err(e @ TypeError::ClassCast { .. }) => {
                tracing::debug!(error = %e, "cast rejected");
                return Ok(Some(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}

fn describe<'a>(
    instance: &'a str,
    targets: impl Iterator<Item = &'a str>,
    short: impl Fn(&'a str) -> &'a str,
) -> String {
    std::iter::once(instance)
        .chain(targets)
        .map(short)
        .collect::<Vec<_>>()
        .join(" to ")
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use javm_types::standard_registry;

    fn run(chain: &[&str]) -> anyhow::Result<String> {
        let registry = standard_registry();
        let chain: Vec<String> = chain.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        execute(&registry, &chain, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_builtin_program_output() {
        assert_eq!(
            run(&[]).unwrap(),
            "Casted String to Object\n\
             Couldn't cast String to Object to Integer\n\
             Casted RuntimeException to Object to Exception\n\
             Casted RuntimeException to Object to RuntimeException\n\
             Couldn't cast RuntimeException to Object to IllegalStateException\n\
             Casted RuntimeException to Object to Throwable to RuntimeException\n\
             Done!\n"
        );
    }

    #[test]
    fn test_custom_chain_reports_exception() {
        let output = run(&["java.lang.Integer", "java.lang.Number", "java.lang.String"]).unwrap();
        assert_eq!(
            output,
            "Couldn't cast java.lang.Integer to java.lang.Number to java.lang.String\n\
             java.lang.ClassCastException: java.lang.Integer cannot be cast to java.lang.String\n"
        );
    }

    #[test]
    fn test_custom_array_chain() {
        let output = run(&["[[Ljava.lang.String;", "[[Ljava.lang.Object;", "java.lang.Cloneable"]).unwrap();
        assert_eq!(
            output,
            "Casted [[Ljava.lang.String; to [[Ljava.lang.Object; to java.lang.Cloneable\n"
        );
    }

    #[test]
    fn test_chain_errors() {
        assert!(run(&["java.lang.String"]).is_err());
        assert!(run(&["java.lang.String", "com.example.Missing"]).is_err());
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("java.lang.String"), "String");
        assert_eq!(simple_name("Bare"), "Bare");
    }
}
