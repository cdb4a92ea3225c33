// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
pub mod analysis;
mod base;
mod component;
mod configuration;
mod error;
mod expr;
mod interval;
mod network;
mod serialize;
mod settings;
mod tree;
mod validate;

pub use base::{flows, AutomatonMode, AutomatonTransition, BaseComponent, ExpressionInterval};
pub use component::{Component, ComponentKind, ComponentRef, TemplateLink};
pub use configuration::Configuration;
pub use error::{ExportError, ExportResult, MappingKind, ValidationError, ValidationResult};
pub use expr::{Expression, Operator};
pub use interval::{Interval, COMPARE_TOL};
pub use network::{
    ComponentInstance, ComponentMapping, NetworkComponent, TEMPLATE_VALUE_MAP_PREFIX,
};
pub use serialize::SerializableIrNode;
pub use settings::{AutomatonSettings, ToolSettings};
pub use tree::ComponentTree;
pub use validate::{is_valid_name, validate_name, ValidationOptions};
