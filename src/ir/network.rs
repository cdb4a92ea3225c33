// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{ComponentRef, MappingKind, ValidationError, ValidationResult};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};

/// Marks a constant mapping whose parent side is a literal value instead of a parent constant,
/// e.g. `~2.5`. Such mappings only exist between template import and the first copy.
pub const TEMPLATE_VALUE_MAP_PREFIX: &str = "~";

/// Binds a name in the child's namespace to a name in the parent's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMapping {
    pub child_param: String,
    pub parent_param: String,
}

impl ComponentMapping {
    pub fn new(child_param: &str, parent_param: &str) -> Self {
        Self {
            child_param: child_param.to_string(),
            parent_param: parent_param.to_string(),
        }
    }

    /// Literal payload of a value mapping, e.g. `2.5` for `~2.5`.
    pub fn literal_value(&self) -> Option<&str> {
        self.parent_param.strip_prefix(TEMPLATE_VALUE_MAP_PREFIX)
    }

    pub fn validate(
        &self,
        parent_has: impl Fn(&str) -> bool,
        child_has: impl Fn(&str) -> bool,
        kind: MappingKind,
        component: &str,
        validate_constants: bool,
    ) -> ValidationResult {
        if self.child_param.is_empty() || self.parent_param.is_empty() {
            return Err(ValidationError::NullMapping {
                kind,
                component: component.to_string(),
            });
        }
        let skip_parent = !validate_constants && self.literal_value().is_some();
        if !skip_parent && !parent_has(&self.parent_param) {
            return Err(ValidationError::UnknownParentParam {
                kind,
                name: self.parent_param.clone(),
                component: component.to_string(),
            });
        }
        if !child_has(&self.child_param) {
            return Err(ValidationError::UnknownChildParam {
                kind,
                name: self.child_param.clone(),
                component: component.to_string(),
            });
        }
        Ok(())
    }
}

impl Display for ComponentMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "child.{}->{}", self.child_param, self.parent_param)
    }
}

/// A child component placed inside a network together with its name bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    pub parent: ComponentRef,
    pub child: ComponentRef,
    pub var_mapping: Vec<ComponentMapping>,
    pub const_mapping: Vec<ComponentMapping>,
    pub label_mapping: Vec<ComponentMapping>,
}

impl ComponentInstance {
    pub fn new(parent: ComponentRef, child: ComponentRef) -> Self {
        Self {
            parent,
            child,
            var_mapping: Vec::new(),
            const_mapping: Vec::new(),
            label_mapping: Vec::new(),
        }
    }

    pub fn mappings(&self, kind: MappingKind) -> &[ComponentMapping] {
        match kind {
            MappingKind::Variable => &self.var_mapping,
            MappingKind::Constant => &self.const_mapping,
            MappingKind::Label => &self.label_mapping,
        }
    }

    pub fn mappings_mut(&mut self, kind: MappingKind) -> &mut Vec<ComponentMapping> {
        match kind {
            MappingKind::Variable => &mut self.var_mapping,
            MappingKind::Constant => &mut self.const_mapping,
            MappingKind::Label => &mut self.label_mapping,
        }
    }

    /// Parent-side name that `child_param` is bound to, if any.
    pub fn parent_name(&self, kind: MappingKind, child_param: &str) -> Option<&str> {
        self.mappings(kind)
            .iter()
            .find(|m| m.child_param == child_param)
            .map(|m| m.parent_param.as_str())
    }

    pub fn map(&mut self, kind: MappingKind, child_param: &str, parent_param: &str) -> &mut Self {
        self.mappings_mut(kind)
            .push(ComponentMapping::new(child_param, parent_param));
        self
    }
}

/// Composition of named component instances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkComponent {
    pub children: IndexMap<String, ComponentInstance>,
}

impl NetworkComponent {
    pub fn child(&self, instance: &str) -> Option<ComponentRef> {
        self.children.get(instance).map(|i| i.child)
    }
}
