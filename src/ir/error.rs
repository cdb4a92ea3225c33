// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::Interval;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which of the three namespaces a mapping or name belongs to.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum MappingKind {
    Variable,
    Constant,
    Label,
}

impl Display for MappingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingKind::Variable => write!(f, "variable"),
            MappingKind::Constant => write!(f, "constant"),
            MappingKind::Label => write!(f, "label"),
        }
    }
}

/// An invariant of the IR does not hold. This always indicates a defect, either in an importer
/// or in a transformation pass, and is not meant to be recovered from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("forbidden name '{name}' in '{component}'")]
    InvalidName { name: String, component: String },
    #[error("repeated name '{name}' in component '{component}'")]
    RepeatedName { name: String, component: String },
    #[error("instance name and parent of '{component}' must either both be set or both be absent (parent set: {has_parent})")]
    InstanceParentMismatch { component: String, has_parent: bool },
    #[error("constant '{name}' in automaton {component} is unmapped")]
    UnmappedConstant {
        name: String,
        component: String,
        #[source]
        source: Box<ExportError>,
    },
    #[error("network component '{component}' has no children")]
    EmptyNetwork { component: String },
    #[error("instance name '{declared}' in child does not match the name '{key}' in the network component")]
    InstanceKeyMismatch { key: String, declared: String },
    #[error("parent of child '{instance}' is not the network component '{component}' that contains it")]
    ChildParentMismatch { instance: String, component: String },
    #[error("{kind} mapping with an empty side in component {component}")]
    NullMapping { kind: MappingKind, component: String },
    #[error("parent component doesn't contain mapped {kind} '{name}' in parent component named {component}")]
    UnknownParentParam {
        kind: MappingKind,
        name: String,
        component: String,
    },
    #[error("child component doesn't contain mapped {kind} '{name}' in parent component named {component}")]
    UnknownChildParam {
        kind: MappingKind,
        name: String,
        component: String,
    },
    #[error("base component '{component}' has no modes")]
    NoModes { component: String },
    #[error("mode map name mismatch in '{component}': key is '{key}' but the mode is named '{name}'")]
    ModeKeyMismatch {
        key: String,
        name: String,
        component: String,
    },
    #[error("invariant of mode '{mode}' in '{component}' is false")]
    FalseInvariant { mode: String, component: String },
    #[error("mode '{mode}' in '{component}' is urgent, but dynamics were also defined")]
    UrgentModeWithFlows { mode: String, component: String },
    #[error("mode '{mode}' in '{component}' is not urgent, but has no dynamics")]
    MissingFlows { mode: String, component: String },
    #[error("dynamics were defined for variable '{variable}' in mode '{mode}', but the variable does not exist in '{component}'")]
    FlowForUnknownVariable {
        variable: String,
        mode: String,
        component: String,
    },
    #[error("{component}: variables with defined flows in mode '{first_mode}' ({first_variables:?}) differ from mode '{mode}' ({variables:?})")]
    InconsistentFlowVariables {
        first_mode: String,
        first_variables: Vec<String>,
        mode: String,
        variables: Vec<String>,
        component: String,
    },
    #[error("{component}: flow in mode '{mode}' for variable '{variable}' uses '{symbol}', which is not a variable or constant of the component")]
    UnknownSymbolInFlow {
        symbol: String,
        variable: String,
        mode: String,
        component: String,
    },
    #[error("mode '{mode}' in transition '{from}'->'{to}' does not exist in '{component}'")]
    UnknownTransitionMode {
        mode: String,
        from: String,
        to: String,
        component: String,
    },
    #[error("blank label on transition '{from}'->'{to}' in '{component}'")]
    BlankLabel {
        from: String,
        to: String,
        component: String,
    },
    #[error("exported label '{label}' was not used in base component '{component}'")]
    UnusedLabel { label: String, component: String },
    #[error("init states were empty")]
    EmptyInitialStates,
    #[error("{states} states contain mode {mode}, which is not in the automaton")]
    UnknownMode { states: &'static str, mode: String },
    #[error("{states} states use variable '{variable}', which is not in the automaton.{}", suggestion_text(.suggestion))]
    UnknownVariableInStates {
        states: &'static str,
        variable: String,
        suggestion: Option<String>,
    },
    #[error("{states} mode in network component must contain '.': {mode}")]
    UndottedModeInNetwork { states: &'static str, mode: String },
    #[error("root component cannot have an instance name ('{name}')")]
    RootHasInstanceName { name: String },
    #[error("root component cannot have a parent")]
    RootHasParent,
    #[error("plot variable not in automaton: {variable}")]
    PlotVariableNotInAutomaton { variable: String },
    #[error("plot variables were not set, but the automaton contains continuous variables: {variables:?}")]
    MissingPlotVariables { variables: Vec<String> },
    #[error("name lookup failed during validation")]
    Lookup {
        #[source]
        source: Box<ExportError>,
    },
}

impl From<ExportError> for ValidationError {
    fn from(value: ExportError) -> Self {
        ValidationError::Lookup {
            source: Box::new(value),
        }
    }
}

fn suggestion_text(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" Did you mean '{s}'?"),
        None => String::new(),
    }
}

/// A query or mutation could not be satisfied against well-formed IR. Callers may recover by
/// choosing different inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("constant not found: '{name}' in '{component}'")]
    UnknownConstant { name: String, component: String },
    #[error("constant was both assigned and mapped in parent: '{name}' in instance '{component}'")]
    ConflictingConstantBinding { name: String, component: String },
    #[error("unassigned constant: '{name}' in instance '{component}'")]
    UnassignedConstant { name: String, component: String },
    #[error("no instance named '{name}' in '{component}'")]
    UnknownInstance { name: String, component: String },
    #[error("instance '{name}' already exists in '{component}'")]
    DuplicateInstance { name: String, component: String },
    #[error("'{component}' is not a network component")]
    NotANetwork { component: String },
    #[error("couldn't parse constant in value map of parameter '{param}': {literal}")]
    MalformedLiteral { param: String, literal: String },
    #[error("constant '{name}' has non-constant value {value}")]
    NonConstantInterval { name: String, value: Interval },
    #[error("mode with name '{mode}' already exists in '{component}'")]
    DuplicateMode { mode: String, component: String },
    #[error("mode '{mode}' not found in '{component}'")]
    UnknownMode { mode: String, component: String },
    #[error("hybrid automaton IR structure was corrupted after running pass {pass}")]
    CorruptedByPass {
        pass: String,
        #[source]
        source: Box<ValidationError>,
    },
    #[error("{0}")]
    Unsupported(String),
}

pub type ExportResult<T> = Result<T, ExportError>;
pub type ValidationResult<T = ()> = Result<T, ValidationError>;
