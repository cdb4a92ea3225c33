// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{
    ComponentInstance, ComponentMapping, ComponentTree, Configuration, ExportError, ExportResult,
    Expression, MappingKind,
};
use crate::passes::{PassInfo, Preconditions, PreconditionsFlag, TransformationPass};
use clap::Parser;
use indexmap::IndexMap;

#[derive(Parser, Debug, Default)]
pub struct CopyInstanceOptions {
    /// name of instance to copy, may be omitted if the network has a single child
    #[arg(long, visible_alias = "instance", default_value = "", value_name = "NAME")]
    pub name: String,
    /// the number of copies at the end (1 = no copy)
    #[arg(long, short = 'n', visible_alias = "number", default_value_t = 2, value_name = "NUM")]
    pub num: i64,
    /// prefix to use for the copies
    #[arg(long, default_value = "copy", value_name = "NAME")]
    pub prefix: String,
}

/// Replicates a base component instance of the root network. Copy `i` is called
/// `<prefix><i>_<instance>` and its variables and labels are mapped to fresh names with the
/// same prefix in the root.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyInstancePass;

impl PassInfo for CopyInstancePass {
    fn command_line_flag(&self) -> &'static str {
        "copy"
    }

    fn name(&self) -> &'static str {
        "Copy Base Component Instance Pass"
    }
}

impl TransformationPass for CopyInstancePass {
    type Options = CopyInstanceOptions;

    fn preconditions(&self) -> Preconditions {
        Preconditions::none().with(PreconditionsFlag::NoDisjunctiveInitForbidden)
    }

    fn check_preconditions(&self, config: &Configuration) -> Result<(), String> {
        self.preconditions().check(config)?;
        let Some(network) = config.root.root_component().as_network() else {
            return Err("Root must be a network component".to_string());
        };
        if let Some((name, _)) = network
            .children
            .iter()
            .find(|(_, instance)| !config.root.get(instance.child).is_base())
        {
            return Err(format!(
                "Expected each child component of root to be a base component. '{name}' was not."
            ));
        }
        if config.init.len() != 1 {
            return Err(format!(
                "Must have single initial mode. Count was: {}",
                config.init.len()
            ));
        }
        if config.forbidden.len() > 1 {
            return Err("Max single forbidden mode.".to_string());
        }
        Ok(())
    }

    fn run_pass(&self, config: &mut Configuration, options: Self::Options) -> Result<(), ExportError> {
        let tree = &config.root;
        let root = tree.root();
        let instances = instance_names(tree);
        let name = match options.name.as_str() {
            "" if instances.len() == 1 => instances[0].clone(),
            "" => {
                return Err(ExportError::Unsupported(
                    "Root component has multiple children and '--name' was not provided."
                        .to_string(),
                ))
            }
            name => name.to_string(),
        };
        let Some(position) = instances.iter().position(|i| *i == name) else {
            return Err(ExportError::Unsupported(format!(
                "Root component did not contain named child instance: '{name}'. Valid options are: {}",
                instances.join(", ")
            )));
        };
        if options.num < 1 {
            return Err(ExportError::Unsupported(format!(
                "Num instances must be >= 1. got: {}",
                options.num
            )));
        }

        let init = single_state(tree, &config.init)?;
        let forbidden = if config.forbidden.is_empty() {
            None
        } else {
            Some(single_state(tree, &config.forbidden)?)
        };
        if options.num == 1 {
            return Ok(());
        }

        let original = original_instance(tree, &name)?;
        let copies: Vec<InstanceCopy> = (2..=options.num)
            .map(|ii| InstanceCopy::new(&original, &name, &format!("{}{ii}_", options.prefix)))
            .collect();

        // every fresh name is checked before the tree is modified
        let root_component = tree.root_component();
        let mut variables = root_component.variables.clone();
        let mut labels = root_component.labels.clone();
        for copy in copies.iter() {
            if instances.contains(&copy.name) {
                return Err(ExportError::DuplicateInstance {
                    name: copy.name.clone(),
                    component: root_component.printable_instance_name().to_string(),
                });
            }
            for (kind, mappings, names) in [
                (MappingKind::Variable, &copy.var_mapping, &mut variables),
                (MappingKind::Label, &copy.label_mapping, &mut labels),
            ] {
                for m in mappings.iter() {
                    if names.contains(&m.parent_param) {
                        return Err(ExportError::Unsupported(format!(
                            "Root contains conflicting {kind} name: {}",
                            m.parent_param
                        )));
                    }
                    names.push(m.parent_param.clone());
                }
            }
        }
        let root_component = config.root.root_component_mut();
        root_component.variables = variables;
        root_component.labels = labels;

        let mut renamings = Vec::with_capacity(copies.len());
        for copy in copies {
            let child = config.root.copy_component(original.child)?;
            let instance = config.root.attach_copy(root, &copy.name, child)?;
            instance.var_mapping = copy.var_mapping;
            instance.label_mapping = copy.label_mapping;
            instance.const_mapping = original.const_mapping.clone();
            log::info!("Created copy {} of instance {name}", copy.name);
            renamings.push(copy.renames);
        }

        let (modes, condition) = init;
        let mut combined = condition.clone();
        for renames in renamings.iter() {
            combined = Expression::and(combined, condition.clone().rename_variables(renames));
        }
        config.init.clear();
        config.init.insert(extended_key(&modes, position, renamings.len()), combined);

        if let Some((modes, condition)) = forbidden {
            let mut combined = condition.clone();
            for renames in renamings.iter() {
                combined = Expression::or(combined, condition.clone().rename_variables(renames));
            }
            config.forbidden.clear();
            config
                .forbidden
                .insert(extended_key(&modes, position, renamings.len()), combined);
        }
        Ok(())
    }
}

fn instance_names(tree: &ComponentTree) -> Vec<String> {
    tree.root_component()
        .as_network()
        .map(|n| n.children.keys().cloned().collect())
        .unwrap_or_default()
}

fn original_instance(tree: &ComponentTree, name: &str) -> ExportResult<ComponentInstance> {
    let root = tree.root_component();
    root.as_network()
        .and_then(|n| n.children.get(name))
        .cloned()
        .ok_or_else(|| ExportError::UnknownInstance {
            name: name.to_string(),
            component: root.printable_instance_name().to_string(),
        })
}

/// Instance name and parent side names of one copy.
struct InstanceCopy {
    name: String,
    var_mapping: Vec<ComponentMapping>,
    label_mapping: Vec<ComponentMapping>,
    /// root variables of the original to their counterpart in the copy
    renames: IndexMap<String, String>,
}

impl InstanceCopy {
    fn new(original: &ComponentInstance, name: &str, prefix: &str) -> Self {
        let fresh = |m: &ComponentMapping| {
            ComponentMapping::new(&m.child_param, &format!("{prefix}{}", m.parent_param))
        };
        Self {
            name: format!("{prefix}{name}"),
            var_mapping: original.var_mapping.iter().map(fresh).collect(),
            label_mapping: original.label_mapping.iter().map(fresh).collect(),
            renames: original
                .var_mapping
                .iter()
                .map(|m| (m.parent_param.clone(), format!("{prefix}{}", m.parent_param)))
                .collect(),
        }
    }
}

/// Splits the only entry of `states` into one mode per root child. Besides the leaf form
/// `m1.m2`, a network with a single child also accepts `instance.mode`.
fn single_state(
    tree: &ComponentTree,
    states: &IndexMap<String, Expression>,
) -> ExportResult<(Vec<String>, Expression)> {
    let Some((key, condition)) = states.first() else {
        return Err(ExportError::Unsupported("expected a single mode".to_string()));
    };
    let instances = instance_names(tree);
    let mut modes: Vec<String> = key.split('.').map(|m| m.to_string()).collect();
    if instances.len() == 1 && modes.len() == 2 && modes[0] == instances[0] {
        modes.remove(0);
    }
    if modes.len() != instances.len() {
        return Err(ExportError::Unsupported(format!(
            "mode '{key}' does not name one mode for each of the {} base components",
            instances.len()
        )));
    }
    for (instance, mode) in instances.iter().zip(modes.iter()) {
        let child = original_instance(tree, instance)?.child;
        let known = tree
            .get(child)
            .as_base()
            .map(|b| b.modes.contains_key(mode))
            .unwrap_or(false);
        if !known {
            return Err(ExportError::UnknownMode {
                mode: mode.clone(),
                component: instance.clone(),
            });
        }
    }
    Ok((modes, condition.clone()))
}

/// Leaf form key with the copied instance's mode appended once per copy.
fn extended_key(modes: &[String], position: usize, copies: usize) -> String {
    let copied = modes[position].clone();
    let mut out = modes.to_vec();
    out.extend(std::iter::repeat(copied).take(copies));
    out.join(".")
}
