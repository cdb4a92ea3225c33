// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{Configuration, ExportError, Expression};
use crate::passes::{NoParams, PassInfo, TransformationPass};
use indexmap::IndexMap;

/// Renames every mode of a flat automaton to `mode_<n>`, numbered in declaration order.
/// The renaming is logged at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortenModeNamesPass;

impl PassInfo for ShortenModeNamesPass {
    fn command_line_flag(&self) -> &'static str {
        "shorten"
    }

    fn name(&self) -> &'static str {
        "Shorten Mode Names Pass"
    }
}

impl TransformationPass for ShortenModeNamesPass {
    type Options = NoParams;

    fn run_pass(&self, config: &mut Configuration, _options: NoParams) -> Result<(), ExportError> {
        let base = config
            .root
            .root_component_mut()
            .as_base_mut()
            .ok_or_else(|| ExportError::Unsupported("shortening mode names of a network".to_string()))?;

        let names: IndexMap<String, String> = base
            .modes
            .keys()
            .enumerate()
            .map(|(ii, old)| (old.clone(), format!("mode_{ii}")))
            .collect();
        for (old, new) in names.iter() {
            log::info!("Shortened mode name to {new} from {old}");
        }

        let modes = std::mem::take(&mut base.modes);
        base.modes = modes
            .into_iter()
            .map(|(old, mut mode)| {
                let new = names[&old].clone();
                mode.name = new.clone();
                (new, mode)
            })
            .collect();
        for t in base.transitions.iter_mut() {
            for endpoint in [&mut t.from, &mut t.to] {
                if let Some(new) = names.get(endpoint.as_str()) {
                    *endpoint = new.clone();
                }
            }
        }

        config.init = rename_keys(&names, std::mem::take(&mut config.init));
        config.forbidden = rename_keys(&names, std::mem::take(&mut config.forbidden));
        Ok(())
    }
}

fn rename_keys(
    names: &IndexMap<String, String>,
    states: IndexMap<String, Expression>,
) -> IndexMap<String, Expression> {
    states
        .into_iter()
        .map(|(mode, e)| match names.get(&mode) {
            Some(new) => (new.clone(), e),
            None => (mode, e),
        })
        .collect()
}
