// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::analysis::fresh_name;
use crate::ir::{BaseComponent, Configuration, ExportError, Expression};
use crate::passes::{PassInfo, Preconditions, PreconditionsFlag, TransformationPass};
use clap::Parser;
use indexmap::IndexMap;

/// `old:new` name pairs, in the order given.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamePairs(pub Vec<(String, String)>);

fn parse_name_pairs(value: &str) -> Result<NamePairs, String> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() % 2 != 0 {
        return Err(format!(
            "expected pairs of names separated by ':', got {} names",
            parts.len()
        ));
    }
    if let Some(empty) = parts.iter().position(|p| p.is_empty()) {
        return Err(format!("name #{} is empty", empty + 1));
    }
    let pairs = parts
        .chunks(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect();
    Ok(NamePairs(pairs))
}

#[derive(Parser, Debug)]
pub struct RenameParamOptions {
    /// colon separated list of names: oldname1:newname1:oldname2:newname2
    #[arg(value_parser = parse_name_pairs, value_name = "NAMES")]
    pub names: NamePairs,
}

/// Renames variables, constants and labels of a flat automaton. A new name that is already
/// taken gets a numeric suffix, starting at 2.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenameParamPass;

impl PassInfo for RenameParamPass {
    fn command_line_flag(&self) -> &'static str {
        "rename"
    }

    fn name(&self) -> &'static str {
        "Rename Parameters Pass"
    }

    fn long_help(&self) -> Option<&'static str> {
        Some("Swaps variable, constant and label names, e.g. 'x:pos:v:vel'")
    }
}

impl TransformationPass for RenameParamPass {
    type Options = RenameParamOptions;

    fn preconditions(&self) -> Preconditions {
        Preconditions::none().with(PreconditionsFlag::NeedsFlat)
    }

    fn run_pass(&self, config: &mut Configuration, options: Self::Options) -> Result<(), ExportError> {
        let root = config.root.root_component_mut();
        if !root.is_base() {
            return Err(ExportError::Unsupported(
                "renaming parameters of a network".to_string(),
            ));
        }
        let mut names: IndexMap<String, String> = IndexMap::new();
        for (old, new) in options.names.0 {
            let new = fresh_name(&new, |n| {
                root.variables.iter().any(|v| v == n)
                    || root.has_constant(n)
                    || root.labels.iter().any(|l| l == n)
                    || names.values().any(|chosen| chosen == n)
            });
            log::info!("Renaming {old} to {new}");
            names.insert(old, new);
        }
        let rename = |name: &mut String| {
            if let Some(new) = names.get(name.as_str()) {
                *name = new.clone();
            }
        };

        root.variables.iter_mut().for_each(rename);
        root.labels.iter_mut().for_each(rename);
        root.constants = std::mem::take(&mut root.constants)
            .into_iter()
            .map(|(name, value)| (names.get(&name).cloned().unwrap_or(name), value))
            .collect();

        if let Some(base) = root.as_base_mut() {
            rename_in_base(base, &names);
        }

        for states in [&mut config.init, &mut config.forbidden] {
            for e in states.values_mut() {
                *e = std::mem::replace(e, Expression::TRUE).rename_variables(&names);
            }
        }
        config
            .settings
            .rename_plot_variables(|name| names.get(name).cloned());
        Ok(())
    }
}

fn rename_in_base(base: &mut BaseComponent, names: &IndexMap<String, String>) {
    base.for_each_expression_mut(|e| {
        *e = std::mem::replace(e, Expression::TRUE).rename_variables(names);
    });
    for mode in base.modes.values_mut() {
        if let Some(flows) = mode.flow_dynamics.as_mut() {
            *flows = rename_keys(names, std::mem::take(flows));
        }
    }
    for t in base.transitions.iter_mut() {
        t.reset = rename_keys(names, std::mem::take(&mut t.reset));
        if let Some(label) = t.label.as_mut() {
            if let Some(new) = names.get(label.as_str()) {
                *label = new.clone();
            }
        }
    }
}

fn rename_keys<V>(names: &IndexMap<String, String>, map: IndexMap<String, V>) -> IndexMap<String, V> {
    map.into_iter()
        .map(|(name, value)| (names.get(&name).cloned().unwrap_or(name), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{
        flows, AutomatonSettings, Component, ComponentTree, Interval, MappingKind, Operator,
    };
    use crate::passes::{Pass, PassError};

    fn oscillator() -> Configuration {
        let mut c = Component::new_base()
            .with_variables(&["x", "v"])
            .with_labels(&["bounce"])
            .with_constant("k", Some(Interval::point(2.0)));
        let base = c.as_base_mut().unwrap();
        let dynamics = flows([
            ("x", Expression::var("v")),
            (
                "v",
                Expression::binary(Operator::Multiply, Expression::var("k"), Expression::var("x")),
            ),
        ]);
        base.create_mode("on", Expression::TRUE, dynamics, "osc").unwrap();
        let t = base.create_transition("on", "on", "osc").unwrap();
        t.label = Some("bounce".to_string());
        t.reset.insert("v".to_string(), Expression::var("x").into());
        let mut config = Configuration::new(c);
        config.settings = AutomatonSettings::with_plot_variables("x", "v");
        config.init.insert(
            "on".to_string(),
            Expression::binary(Operator::Equal, Expression::var("v"), Expression::var("k")),
        );
        config
    }

    #[test]
    fn rename_everywhere() {
        let mut config = oscillator();
        RenameParamPass
            .run_transformation_pass(&mut config, "x:pos:k:x:bounce:hit")
            .unwrap();
        let root = config.root.root_component();
        // "x" is still taken while the names are chosen
        assert_eq!(root.variables, ["pos", "v"]);
        assert!(root.has_constant("x2"));
        assert_eq!(root.labels, ["hit"]);
        let base = root.as_base().unwrap();
        let flows: Vec<_> = base.modes["on"]
            .flows()
            .map(|(v, f)| format!("{v}' = {f}"))
            .collect();
        assert_eq!(flows, ["pos' = v", "v' = x2 * pos"]);
        let t = &base.transitions[0];
        assert_eq!(t.label.as_deref(), Some("hit"));
        assert_eq!(t.reset["v"].to_string(), "pos");
        assert_eq!(config.init["on"].to_string(), "v == x2");
        assert_eq!(
            config.settings.plot_variable_names,
            [Some("pos".to_string()), Some("v".to_string())]
        );
    }

    #[test]
    fn swaps_are_fresh() {
        let mut config = oscillator();
        RenameParamPass
            .run_transformation_pass(&mut config, "x:v:v:x")
            .unwrap();
        let root = config.root.root_component();
        assert_eq!(root.variables, ["v2", "x2"]);
    }

    #[test]
    fn odd_pairs_are_rejected() {
        let mut config = oscillator();
        let before = config.clone();
        let err = RenameParamPass
            .run_transformation_pass(&mut config, "x:y:z")
            .unwrap_err();
        assert!(matches!(err, PassError::CommandLineArgument { .. }), "{err}");
        assert_eq!(config, before);
    }

    #[test]
    fn network_root_is_left_alone() {
        let mut tree = ComponentTree::new(Component::new_network().with_variables(&["x"]));
        let root = tree.root();
        let child = tree
            .add_instance(root, "A", Component::new_base().with_variables(&["x"]))
            .unwrap();
        tree.instance_mut(child)
            .unwrap()
            .map(MappingKind::Variable, "x", "x");
        let mut config = Configuration::from_tree(tree);
        let before = config.clone();
        // the vanilla run skips the flatness check
        let err = RenameParamPass
            .run_vanilla_pass(&mut config, "x:y")
            .unwrap_err();
        assert!(
            matches!(err, PassError::Export(ExportError::Unsupported(_))),
            "{err}"
        );
        assert_eq!(config, before);
        assert_eq!(config.root.root_component().variables, ["x"]);
    }
}
