//! Operation catalog loading
//!
//! The built-in Omics catalog is embedded in the binary; a catalog file can
//! replace it. Catalogs are validated when loaded so a bad definition fails
//! before any request is built.

use super::types::{OperationCatalog, OperationDefinition, ParamLocation};
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Embedded Omics catalog
pub const BUILTIN_CATALOG: &str = include_str!("../../operations/omics.yaml");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid placeholder pattern"));

/// Load the built-in catalog
pub fn builtin_catalog() -> Result<OperationCatalog> {
    load_catalog_from_str(BUILTIN_CATALOG)
}

/// Load a catalog from a YAML file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<OperationCatalog> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read operation catalog '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_catalog_from_str(&content)
}

/// Load a catalog from a YAML string
pub fn load_catalog_from_str(yaml: &str) -> Result<OperationCatalog> {
    let catalog: OperationCatalog = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse operation catalog: {e}")))?;

    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Find an operation by name, ignoring ASCII case
pub fn lookup<'a>(catalog: &'a OperationCatalog, name: &str) -> Result<&'a OperationDefinition> {
    catalog.get(name).ok_or_else(|| Error::UnknownOperation {
        name: name.to_string(),
    })
}

/// Placeholder names in a route, in order
pub fn path_placeholders(path: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn validate_catalog(catalog: &OperationCatalog) -> Result<()> {
    if catalog.kind != "operations" {
        return Err(Error::config(format!(
            "Expected kind 'operations', got '{}'",
            catalog.kind
        )));
    }

    let mut seen = HashSet::new();
    for op in &catalog.operations {
        if !seen.insert(op.name.to_ascii_lowercase()) {
            return Err(Error::config(format!("Duplicate operation '{}'", op.name)));
        }
        validate_operation(op)?;
    }
    Ok(())
}

fn validate_operation(op: &OperationDefinition) -> Result<()> {
    let invalid = |message: String| Error::config(format!("Operation '{}': {message}", op.name));

    if op.name.is_empty() {
        return Err(Error::config("Operation name cannot be empty"));
    }
    for (field, value) in [
        ("endpoint_prefix", &op.endpoint_prefix),
        ("items_field", &op.items_field),
        ("token_param", &op.token_param),
        ("max_results_param", &op.max_results_param),
        ("next_token_field", &op.next_token_field),
    ] {
        if value.is_empty() {
            return Err(invalid(format!("{field} cannot be empty")));
        }
    }
    if !op.path.starts_with('/') {
        return Err(invalid(format!("path '{}' must start with '/'", op.path)));
    }

    let mut names = HashSet::new();
    for param in &op.params {
        if !names.insert(param.name.as_str()) {
            return Err(invalid(format!("duplicate parameter '{}'", param.name)));
        }
        if param.name == op.token_param || param.name == op.max_results_param {
            return Err(invalid(format!(
                "parameter '{}' clashes with the paging parameters",
                param.name
            )));
        }
    }

    let placeholders: HashSet<&str> = path_placeholders(&op.path).into_iter().collect();
    for placeholder in &placeholders {
        match op.param(placeholder) {
            Some(p) if p.location == ParamLocation::Path && p.required => {}
            Some(_) => {
                return Err(invalid(format!(
                    "'{placeholder}' must be a required path parameter"
                )))
            }
            None => {
                return Err(invalid(format!(
                    "path placeholder '{placeholder}' has no parameter"
                )))
            }
        }
    }
    for param in op.params_at(ParamLocation::Path) {
        if !placeholders.contains(param.name.as_str()) {
            return Err(invalid(format!(
                "path parameter '{}' does not appear in '{}'",
                param.name, op.path
            )));
        }
    }

    if let Some(pass_thru) = &op.pass_thru {
        if op.param(pass_thru).is_none() {
            return Err(invalid(format!(
                "pass_thru '{pass_thru}' is not a declared parameter"
            )));
        }
    }

    Ok(())
}
