// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{
    AutomatonMode, AutomatonTransition, ComponentKind, ComponentMapping, ComponentRef,
    ComponentTree, Configuration, Expression,
};
use indexmap::IndexMap;
use std::io::Write;

/// Human readable rendering, used for logging and in tests.
pub trait SerializableIrNode {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;
    fn serialize_to_str(&self) -> String {
        let mut buf = Vec::new();
        self.serialize(&mut buf)
            .expect("Failed to write to string!");
        String::from_utf8(buf).expect("Failed to read string we wrote!")
    }
}

impl SerializableIrNode for Configuration {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_states(writer, "init", &self.init)?;
        serialize_states(writer, "forbidden", &self.forbidden)?;
        if let [Some(x), Some(y)] = &self.settings.plot_variable_names {
            writeln!(writer, "plot: {x}, {y}")?;
        }
        self.root.serialize(writer)
    }
}

impl SerializableIrNode for ComponentTree {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serialize_component(self, self.root(), writer, 0)
    }
}

fn serialize_states<W: Write>(
    writer: &mut W,
    name: &str,
    states: &IndexMap<String, Expression>,
) -> std::io::Result<()> {
    if states.is_empty() {
        return Ok(());
    }
    writeln!(writer, "{name}:")?;
    for (mode, condition) in states.iter() {
        writeln!(writer, "  {mode}: {condition}")?;
    }
    Ok(())
}

fn indent<W: Write>(writer: &mut W, depth: usize) -> std::io::Result<()> {
    write!(writer, "{:width$}", "", width = depth * 2)
}

fn serialize_list<W: Write>(
    writer: &mut W,
    depth: usize,
    name: &str,
    items: &[String],
) -> std::io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    indent(writer, depth)?;
    writeln!(writer, "{name}: {}", items.join(", "))
}

fn serialize_component<W: Write>(
    tree: &ComponentTree,
    c: ComponentRef,
    writer: &mut W,
    depth: usize,
) -> std::io::Result<()> {
    let component = tree.get(c);
    let kind = if component.is_base() { "base" } else { "network" };
    indent(writer, depth)?;
    writeln!(
        writer,
        "component {} ({kind})",
        component.printable_instance_name()
    )?;
    let depth = depth + 1;
    serialize_list(writer, depth, "variables", &component.variables)?;
    let constants: Vec<String> = component
        .constants
        .iter()
        .map(|(name, value)| match value {
            Some(value) => format!("{name} = {value}"),
            None => name.clone(),
        })
        .collect();
    serialize_list(writer, depth, "constants", &constants)?;
    serialize_list(writer, depth, "labels", &component.labels)?;

    match &component.kind {
        ComponentKind::Base(base) => {
            for mode in base.modes.values() {
                serialize_mode(writer, depth, mode)?;
            }
            for transition in base.transitions.iter() {
                serialize_transition(writer, depth, transition)?;
            }
        }
        ComponentKind::Network(network) => {
            for (name, instance) in network.children.iter() {
                indent(writer, depth)?;
                writeln!(writer, "instance {name}")?;
                serialize_mappings(writer, depth + 1, "var", &instance.var_mapping)?;
                serialize_mappings(writer, depth + 1, "const", &instance.const_mapping)?;
                serialize_mappings(writer, depth + 1, "label", &instance.label_mapping)?;
                serialize_component(tree, instance.child, writer, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn serialize_mappings<W: Write>(
    writer: &mut W,
    depth: usize,
    kind: &str,
    mappings: &[ComponentMapping],
) -> std::io::Result<()> {
    for m in mappings.iter() {
        indent(writer, depth)?;
        writeln!(writer, "{kind} {} -> {}", m.child_param, m.parent_param)?;
    }
    Ok(())
}

fn serialize_mode<W: Write>(writer: &mut W, depth: usize, mode: &AutomatonMode) -> std::io::Result<()> {
    indent(writer, depth)?;
    if mode.urgent {
        writeln!(writer, "mode {} (urgent)", mode.name)?;
    } else {
        writeln!(writer, "mode {}", mode.name)?;
    }
    if !mode.invariant.is_true() {
        indent(writer, depth + 1)?;
        writeln!(writer, "invariant: {}", mode.invariant)?;
    }
    for (variable, flow) in mode.flows() {
        indent(writer, depth + 1)?;
        writeln!(writer, "{variable}' = {flow}")?;
    }
    Ok(())
}

fn serialize_transition<W: Write>(
    writer: &mut W,
    depth: usize,
    transition: &AutomatonTransition,
) -> std::io::Result<()> {
    indent(writer, depth)?;
    write!(writer, "transition {} -> {}", transition.from, transition.to)?;
    match &transition.label {
        Some(label) => writeln!(writer, " [{label}]")?,
        None => writeln!(writer)?,
    }
    if !transition.guard.is_true() {
        indent(writer, depth + 1)?;
        writeln!(writer, "guard: {}", transition.guard)?;
    }
    for (variable, value) in transition.reset.iter() {
        indent(writer, depth + 1)?;
        writeln!(writer, "{variable} := {value}")?;
    }
    Ok(())
}
