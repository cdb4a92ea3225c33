// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{
    ComponentKind, ComponentRef, ComponentTree, Configuration, ExportError, ExportResult,
    Expression,
};
use crate::passes::{NoParams, PassInfo, Preconditions, PreconditionsFlag, TransformationPass};
use indexmap::IndexMap;

/// Replaces named constants by their values everywhere and removes them from the automaton.
/// Initial and forbidden states may refer to constants of any component by their qualified
/// name, e.g. `A.k`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstituteConstantsPass;

impl PassInfo for SubstituteConstantsPass {
    fn command_line_flag(&self) -> &'static str {
        "sub_constants"
    }

    fn name(&self) -> &'static str {
        "Substitute Named Constants for Values Pass"
    }
}

impl TransformationPass for SubstituteConstantsPass {
    type Options = NoParams;

    fn preconditions(&self) -> Preconditions {
        Preconditions::none().with(PreconditionsFlag::NoIntervalConstants)
    }

    fn run_pass(&self, config: &mut Configuration, _options: NoParams) -> Result<(), ExportError> {
        let tree = &config.root;
        // all values are resolved before anything is modified
        let components = tree.descendants(tree.root());
        let values = components
            .iter()
            .map(|&c| constant_values(tree, c))
            .collect::<ExportResult<Vec<_>>>()?;
        let mut state_values = IndexMap::new();
        for (&c, values) in components.iter().zip(values.iter()) {
            let path = tree.fully_qualified_instance_name(c);
            for (name, value) in values.iter() {
                let qualified = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                state_values.insert(qualified, value.clone());
            }
        }

        for states in [&mut config.init, &mut config.forbidden] {
            for e in states.values_mut() {
                *e = std::mem::replace(e, Expression::TRUE)
                    .substitute(&state_values)
                    .simplify();
            }
        }

        for (c, values) in components.into_iter().zip(values) {
            let component = config.root.get_mut(c);
            component.constants.clear();
            match &mut component.kind {
                ComponentKind::Base(base) => base.for_each_expression_mut(|e| {
                    *e = std::mem::replace(e, Expression::TRUE).substitute(&values);
                }),
                ComponentKind::Network(network) => {
                    for instance in network.children.values_mut() {
                        instance.const_mapping.clear();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Point values of all constants declared in `c`.
fn constant_values(tree: &ComponentTree, c: ComponentRef) -> ExportResult<IndexMap<String, Expression>> {
    let mut out = IndexMap::new();
    for name in tree.get(c).constants.keys() {
        let value = tree.constant_value(c, name)?;
        let Some(constant) = value.as_constant() else {
            return Err(ExportError::NonConstantInterval {
                name: name.clone(),
                value,
            });
        };
        out.insert(name.clone(), Expression::constant(constant));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{flows, AutomatonSettings, Component, Interval, MappingKind, Operator};
    use crate::passes::{Pass, PassError};

    fn ball(g: Option<Interval>) -> Component {
        let mut c = Component::new_base()
            .with_variables(&["x", "v"])
            .with_constant("g", g);
        let dynamics = flows([
            ("x", Expression::var("v")),
            ("v", Expression::unary(Operator::Negative, Expression::var("g"))),
        ]);
        c.as_base_mut()
            .unwrap()
            .create_mode("fall", Expression::TRUE, dynamics, "ball")
            .unwrap();
        c
    }

    #[test]
    fn flat() {
        let mut config = Configuration::new(ball(Some(Interval::point(9.81))));
        config.settings = AutomatonSettings::with_plot_variables("x", "v");
        config.init.insert(
            "fall".to_string(),
            Expression::and(
                Expression::binary(Operator::Equal, Expression::var("g"), Expression::constant(9.81)),
                Expression::binary(Operator::Equal, Expression::var("x"), Expression::constant(10.0)),
            ),
        );
        SubstituteConstantsPass
            .run_transformation_pass(&mut config, "")
            .unwrap();
        let root = config.root.root_component();
        assert!(root.constants.is_empty());
        let mode = &root.as_base().unwrap().modes["fall"];
        assert_eq!(mode.flows().nth(1).unwrap().1.to_string(), "-9.81");
        assert_eq!(config.init["fall"].to_string(), "x == 10");
    }

    #[test]
    fn network_mappings_are_cleared() {
        let mut tree = ComponentTree::new(
            Component::new_network()
                .with_variables(&["x", "v"])
                .with_constant("gravity", Some(Interval::point(1.62))),
        );
        let root = tree.root();
        let a = tree.add_instance(root, "A", ball(None)).unwrap();
        tree.instance_mut(a)
            .unwrap()
            .map(MappingKind::Variable, "x", "x")
            .map(MappingKind::Variable, "v", "v")
            .map(MappingKind::Constant, "g", "gravity");
        let mut config = Configuration::from_tree(tree);
        config.settings = AutomatonSettings::with_plot_variables("x", "v");
        config.init.insert("A.fall".to_string(), Expression::TRUE);
        config.validate().unwrap();

        SubstituteConstantsPass
            .run_transformation_pass(&mut config, "")
            .unwrap();
        assert!(config.all_constants().is_empty());
        assert!(config.root.instance(a).unwrap().const_mapping.is_empty());
        let mode = &config.root.get(a).as_base().unwrap().modes["fall"];
        assert_eq!(mode.flows().nth(1).unwrap().1.to_string(), "-1.62");
    }

    #[test]
    fn qualified_constants_in_initial_states() {
        let mut tree = ComponentTree::new(Component::new_network().with_variables(&["x", "v"]));
        let root = tree.root();
        let a = tree
            .add_instance(root, "A", ball(Some(Interval::point(2.0))))
            .unwrap();
        tree.instance_mut(a)
            .unwrap()
            .map(MappingKind::Variable, "x", "x")
            .map(MappingKind::Variable, "v", "v");
        let mut config = Configuration::from_tree(tree);
        config.settings = AutomatonSettings::with_plot_variables("x", "v");
        config.init.insert(
            "A.fall".to_string(),
            Expression::binary(Operator::Equal, Expression::var("x"), Expression::var("A.g")),
        );
        config.validate().unwrap();

        SubstituteConstantsPass
            .run_transformation_pass(&mut config, "")
            .unwrap();
        assert_eq!(config.init["A.fall"].to_string(), "x == 2");
    }

    #[test]
    fn interval_constants_are_rejected() {
        let mut config = Configuration::new(ball(Some(Interval::new(9.7, 9.9))));
        config.settings = AutomatonSettings::with_plot_variables("x", "v");
        config.init.insert("fall".to_string(), Expression::TRUE);
        let before = config.clone();
        let err = SubstituteConstantsPass
            .run_transformation_pass(&mut config, "")
            .unwrap_err();
        assert!(matches!(err, PassError::PreconditionsNotMet { .. }));
        assert_eq!(config, before);
    }
}
