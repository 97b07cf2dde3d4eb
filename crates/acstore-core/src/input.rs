//! Input value resolution
//!
//! Build step inputs may reference an environment variable with the
//! `$(NAME)` form instead of a literal value.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, StoreError};

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\$\(([A-Za-z_][A-Za-z0-9_]*)\)$").expect("variable pattern is valid")
    })
}

/// Resolve an input against the process environment
pub fn resolve_input(value: &str, field: &str) -> Result<String> {
    resolve_input_with(value, field, |name| std::env::var(name).ok())
}

/// Resolve an input, reading variables through `lookup`.
///
/// A value of the form `$(NAME)` is replaced by the variable's value; any
/// other value is returned unchanged. Empty results are rejected.
pub fn resolve_input_with<F>(value: &str, field: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let trimmed = value.trim();

    let resolved = match variable_pattern().captures(trimmed) {
        Some(caps) => {
            let name = &caps[1];
            lookup(name).ok_or_else(|| {
                StoreError::Validation(format!(
                    "{} is empty. Environment variable {} is not set",
                    field, name
                ))
            })?
        }
        None => value.to_string(),
    };

    if resolved.trim().is_empty() {
        return Err(StoreError::Validation(format!(
            "{} is empty. Please fulfill the input",
            field
        )));
    }

    Ok(resolved)
}
