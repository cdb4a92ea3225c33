// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::analysis::{best_guesses, mode_exists};
use crate::ir::{
    AutomatonSettings, Component, ComponentTree, ExportResult, Expression, Interval,
    ValidationError, ValidationOptions, ValidationResult,
};
use indexmap::{IndexMap, IndexSet};

/// A hybrid automaton together with its initial and forbidden states. This is the unit that
/// importers produce, passes transform and printers consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub root: ComponentTree,
    /// Mode name to the condition on the continuous state in that mode.
    /// `Expression::TRUE` leaves the state unconstrained.
    pub init: IndexMap<String, Expression>,
    pub forbidden: IndexMap<String, Expression>,
    pub settings: AutomatonSettings,
    pub validation: ValidationOptions,
}

impl Configuration {
    pub fn new(root: Component) -> Self {
        Self::from_tree(ComponentTree::new(root))
    }

    pub fn from_tree(root: ComponentTree) -> Self {
        Self {
            root,
            init: IndexMap::new(),
            forbidden: IndexMap::new(),
            settings: AutomatonSettings::default(),
            validation: ValidationOptions::default(),
        }
    }

    /// Fully qualified variables of the whole automaton.
    pub fn all_variables(&self) -> ExportResult<IndexSet<String>> {
        self.root.all_variables(self.root.root())
    }

    /// Constants of the whole automaton by qualified name.
    pub fn all_constants(&self) -> IndexMap<String, Option<Interval>> {
        self.root.all_constants(self.root.root())
    }

    pub fn validate(&self) -> ValidationResult {
        if !self.validation.enabled {
            return Ok(());
        }
        let root = self.root.root_component();
        if let Some(name) = &root.instance_name {
            return Err(ValidationError::RootHasInstanceName { name: name.clone() });
        }
        if root.parent.is_some() {
            return Err(ValidationError::RootHasParent);
        }
        self.root.validate(&self.validation)?;

        let variables = self.all_variables()?;
        let mut valid_names: IndexSet<&str> = variables.iter().map(|v| v.as_str()).collect();
        let constants = self.all_constants();
        valid_names.extend(constants.keys().map(|c| c.as_str()));

        self.validate_states(&self.init, "init", &valid_names)?;
        self.validate_states(&self.forbidden, "forbidden", &valid_names)?;
        self.settings.validate(&variables)?;

        if root.is_network() {
            for (states, map) in [("init", &self.init), ("forbidden", &self.forbidden)] {
                if let Some(mode) = map.keys().find(|m| !m.contains('.')) {
                    return Err(ValidationError::UndottedModeInNetwork {
                        states,
                        mode: mode.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_states(
        &self,
        map: &IndexMap<String, Expression>,
        states: &'static str,
        valid_names: &IndexSet<&str>,
    ) -> ValidationResult {
        if map.is_empty() && states == "init" {
            return Err(ValidationError::EmptyInitialStates);
        }
        for (mode, condition) in map.iter() {
            if !mode_exists(&self.root, self.root.root(), mode) {
                return Err(ValidationError::UnknownMode {
                    states,
                    mode: mode.clone(),
                });
            }
            let unknown = condition
                .variables()
                .into_iter()
                .find(|v| !valid_names.contains(v.as_str()));
            if let Some(variable) = unknown {
                let suggestion = best_variable_guess(&variable, valid_names);
                return Err(ValidationError::UnknownVariableInStates {
                    states,
                    variable,
                    suggestion,
                });
            }
        }
        Ok(())
    }

    /// Deep copy. The component tree is compacted, value maps of template instances are
    /// resolved on the way.
    pub fn copy(&self) -> ExportResult<Configuration> {
        Ok(Configuration {
            root: self.root.copy()?,
            init: self.init.clone(),
            forbidden: self.forbidden.clone(),
            settings: self.settings.clone(),
            validation: self.validation,
        })
    }
}

/// Prefers a qualified name ending in `var`, e.g. `A.x` for `x`, over a fuzzy match.
fn best_variable_guess(var: &str, valid_names: &IndexSet<&str>) -> Option<String> {
    let suffix = valid_names
        .iter()
        .find(|name| name.ends_with(var))
        .map(|name| name.to_string());
    suffix.or_else(|| {
        best_guesses(valid_names.iter().copied(), var, 1)
            .first()
            .map(|name| name.to_string())
    })
}
