// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{ValidationError, ValidationResult};
use std::collections::HashSet;

/// Controls how much checking `validate` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// When false, every `validate` call succeeds without checking anything. Importers may
    /// switch this off while building up a temporarily inconsistent tree.
    pub enabled: bool,
    /// When false, constant names are not checked for conflicts and unresolved constants are
    /// accepted. Needed while template instantiation has not assigned all values yet.
    pub validate_constants: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            validate_constants: true,
        }
    }
}

impl ValidationOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn without_constants() -> Self {
        Self {
            validate_constants: false,
            ..Default::default()
        }
    }
}

/// Checks that `name` is a C-style identifier: non-empty, starts with a letter or underscore
/// and continues with letters, digits or underscores.
pub fn validate_name(name: &str, component: &str) -> ValidationResult {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName {
            name: name.to_string(),
            component: component.to_string(),
        })
    }
}

pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Accumulates `names` into `all_names`, failing on the first malformed or repeated name.
pub fn check_name_conflicts<'a>(
    all_names: &mut HashSet<&'a str>,
    names: impl IntoIterator<Item = &'a String>,
    component: &str,
) -> ValidationResult {
    for name in names {
        if !all_names.insert(name.as_str()) {
            return Err(ValidationError::RepeatedName {
                name: name.clone(),
                component: component.to_string(),
            });
        }
        validate_name(name, component)?;
    }
    Ok(())
}
