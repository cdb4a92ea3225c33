// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{BaseComponent, Configuration, ExportError, Expression};
use crate::passes::{NoParams, PassInfo, TransformationPass};

/// Makes every reset explicit about variables that keep their value.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddIdentityResetPass;

impl PassInfo for AddIdentityResetPass {
    fn command_line_flag(&self) -> &'static str {
        "pass_identity"
    }

    fn name(&self) -> &'static str {
        "Add Identity Resets Pass"
    }
}

impl TransformationPass for AddIdentityResetPass {
    type Options = NoParams;

    fn run_pass(&self, config: &mut Configuration, _options: NoParams) -> Result<(), ExportError> {
        let root = config.root.root_component_mut();
        let variables = root.variables.clone();
        let base = root
            .as_base_mut()
            .ok_or_else(|| ExportError::Unsupported("identity resets in a network".to_string()))?;
        add_identity_resets(base, &variables);
        Ok(())
    }
}

/// Adds `v := v` to each transition that does not assign `v`.
fn add_identity_resets(base: &mut BaseComponent, variables: &[String]) {
    for t in base.transitions.iter_mut() {
        for v in variables.iter() {
            if !t.reset.contains_key(v) {
                t.reset.insert(v.clone(), Expression::var(v).into());
            }
        }
    }
}
