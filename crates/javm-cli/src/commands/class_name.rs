//! `javm class-name`: canonical names of classes, primitives and arrays

use javm_types::{PrimitiveKind, TypeKey, TypeRegistry};
use std::io::Write;

/// Types named by the built-in program, in print order
fn program_types(registry: &TypeRegistry) -> anyhow::Result<Vec<TypeKey>> {
    let string = registry.lookup("java.lang.String")?;
    Ok(vec![
        string,
        PrimitiveKind::Byte.into(),
        TypeKey::array_of(registry.root(), 1),
        TypeKey::array_of(PrimitiveKind::Long.into(), 1),
        TypeKey::array_of(PrimitiveKind::Int.into(), 7),
        TypeKey::array_of(string, 7),
    ])
}

/// Print one canonical name per line
///
/// With no names, prints the built-in program's types. Otherwise each name
/// is resolved, wrapped in `dimensions` extra array dimensions and printed.
pub fn execute(
    registry: &TypeRegistry,
    names: &[String],
    dimensions: u32,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let keys = if names.is_empty() {
        program_types(registry)?
    } else {
        names
            .iter()
            .map(|name| registry.resolve(name))
            .collect::<Result<Vec<_>, _>>()?
    };

    for key in keys {
        let key = TypeKey::checked_array_of(key, dimensions).ok_or_else(|| {
            anyhow::anyhow!(
                "too many array dimensions: {} + {} exceeds {}",
                key.dimensions(),
                dimensions,
                u32::MAX
            )
        })?;
        writeln!(out, "{}", registry.canonical_name(key)?)?;
    }
    Ok(())
}
