use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::*;

use super::Schema;
use crate::{Error, Result};

/// Namespace tried when a class name does not resolve verbatim.
pub const DEFAULT_NAMESPACE: &str = "podio";

type SchemaFn = fn() -> &'static Schema;

static REGISTRY: LazyLock<HashMap<String, SchemaFn>> = LazyLock::new(|| {
    crate::models::CATALOGUE
        .iter()
        .map(|(name, schema)| (format!("{DEFAULT_NAMESPACE}::{name}"), *schema))
        .collect()
});

/// Resolves an association's class name to the target schema.
pub fn resolve(class: &str) -> Result<&'static Schema> {
    if class.trim().is_empty() {
        return Err(Error::UnresolvedModel(String::from(class)));
    }

    let schema = REGISTRY
        .get(class)
        .or_else(|| REGISTRY.get(&format!("{DEFAULT_NAMESPACE}::{class}")))
        .map(|schema| schema());

    match schema {
        Some(schema) => Ok(schema),
        None => {
            error!(%class, "Cannot resolve model class");
            Err(Error::UnresolvedModel(String::from(class)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_and_namespaced_names() {
        assert_eq!(resolve("User").unwrap().name(), "User");
        assert_eq!(resolve("podio::Meeting").unwrap().name(), "Meeting");
    }

    #[test]
    fn unknown_names_are_configuration_errors() {
        assert!(matches!(resolve("Nope"), Err(Error::UnresolvedModel(name)) if name == "Nope"));
        assert!(matches!(resolve(""), Err(Error::UnresolvedModel(_))));
    }
}
