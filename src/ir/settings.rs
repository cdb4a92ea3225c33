// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{ValidationError, ValidationResult};
use indexmap::IndexSet;

/// Analysis options imported together with the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub output_vars: Vec<String>,
    pub time_horizon: f64,
    pub max_iterations: u32,
    pub sampling_time: f64,
    pub system_id: Option<String>,
    pub output_format: String,
    pub scenario: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            output_vars: vec![],
            time_horizon: 10.0,
            max_iterations: 10,
            sampling_time: 0.1,
            system_id: None,
            output_format: "GEN".to_string(),
            scenario: "stc".to_string(),
        }
    }
}

/// Per-configuration metadata. The settings belong to exactly one configuration, which passes
/// its variables in when validating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutomatonSettings {
    /// Variables on the x and y axis of plots. Either both or none are set.
    pub plot_variable_names: [Option<String>; 2],
    pub tool_settings: ToolSettings,
}

impl AutomatonSettings {
    pub fn with_plot_variables(x: &str, y: &str) -> Self {
        Self {
            plot_variable_names: [Some(x.to_string()), Some(y.to_string())],
            ..Default::default()
        }
    }

    /// `variables` are the fully qualified variables of the automaton root.
    pub fn validate(&self, variables: &IndexSet<String>) -> ValidationResult {
        for name in self.plot_variable_names.iter().flatten() {
            if !variables.contains(name) {
                return Err(ValidationError::PlotVariableNotInAutomaton {
                    variable: name.clone(),
                });
            }
        }
        let complete = self.plot_variable_names.iter().all(|n| n.is_some());
        if !variables.is_empty() && !complete {
            return Err(ValidationError::MissingPlotVariables {
                variables: variables.iter().cloned().collect(),
            });
        }
        Ok(())
    }

    /// Replaces plot variable names according to `rename`.
    pub fn rename_plot_variables(&mut self, rename: impl Fn(&str) -> Option<String>) {
        for name in self.plot_variable_names.iter_mut().flatten() {
            if let Some(new_name) = rename(name) {
                *name = new_name;
            }
        }
    }
}
