// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::{BaseComponent, Interval, NetworkComponent};
use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Handle of a component inside a [`crate::ir::ComponentTree`].
#[derive(PartialEq, Eq, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ComponentRef(NonZeroU32);

impl Debug for ComponentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // show the zero based index
        write!(f, "ComponentRef({})", self.index())
    }
}

impl ComponentRef {
    pub(crate) fn from_index(index: usize) -> Self {
        ComponentRef(NonZeroU32::new((index + 1) as u32).unwrap())
    }

    pub(crate) fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Where a component came from. Copies share the `Arc`, so template identity survives a
/// deep copy.
#[derive(Debug, Clone)]
pub enum TemplateLink {
    /// The component is itself a template definition.
    Definition,
    /// The component was instantiated from the named template.
    InstanceOf(Arc<str>),
}

impl TemplateLink {
    pub fn instance_of(name: &str) -> Self {
        TemplateLink::InstanceOf(Arc::from(name))
    }

    pub fn same_template(&self, other: &TemplateLink) -> bool {
        match (self, other) {
            (TemplateLink::Definition, TemplateLink::Definition) => true,
            (TemplateLink::InstanceOf(a), TemplateLink::InstanceOf(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for TemplateLink {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TemplateLink::InstanceOf(a), TemplateLink::InstanceOf(b)) => a == b,
            _ => self.same_template(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Base(BaseComponent),
    Network(NetworkComponent),
}

/// A namespace bearing automaton unit. The names stored here are the ones visible at this level
/// only, not the locals of sub-components.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Owning network component; `None` for the root.
    pub parent: Option<ComponentRef>,
    /// Name under which the component is installed in its parent; `None` for the root.
    pub instance_name: Option<String>,
    pub variables: Vec<String>,
    /// A constant without a value expects it to be supplied through a parent mapping.
    pub constants: IndexMap<String, Option<Interval>>,
    pub labels: Vec<String>,
    pub template: Option<TemplateLink>,
    pub kind: ComponentKind,
}

impl Component {
    fn new(kind: ComponentKind) -> Self {
        Self {
            parent: None,
            instance_name: None,
            variables: Vec::new(),
            constants: IndexMap::new(),
            labels: Vec::new(),
            template: None,
            kind,
        }
    }

    pub fn new_base() -> Self {
        Self::new(ComponentKind::Base(BaseComponent::default()))
    }

    pub fn new_network() -> Self {
        Self::new(ComponentKind::Network(NetworkComponent::default()))
    }

    pub fn with_variables(mut self, names: &[&str]) -> Self {
        self.variables.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_labels(mut self, names: &[&str]) -> Self {
        self.labels.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_constant(mut self, name: &str, value: Option<Interval>) -> Self {
        self.constants.insert(name.to_string(), value);
        self
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, ComponentKind::Base(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, ComponentKind::Network(_))
    }

    pub fn as_base(&self) -> Option<&BaseComponent> {
        match &self.kind {
            ComponentKind::Base(base) => Some(base),
            ComponentKind::Network(_) => None,
        }
    }

    pub fn as_base_mut(&mut self) -> Option<&mut BaseComponent> {
        match &mut self.kind {
            ComponentKind::Base(base) => Some(base),
            ComponentKind::Network(_) => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkComponent> {
        match &self.kind {
            ComponentKind::Network(network) => Some(network),
            ComponentKind::Base(_) => None,
        }
    }

    pub fn as_network_mut(&mut self) -> Option<&mut NetworkComponent> {
        match &mut self.kind {
            ComponentKind::Network(network) => Some(network),
            ComponentKind::Base(_) => None,
        }
    }

    /// Instance name, or `<root>` for the root component.
    pub fn printable_instance_name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or("<root>")
    }

    pub fn has_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    /// Variables, constants and labels declared at this level.
    pub fn all_names(&self) -> impl Iterator<Item = &String> {
        self.variables
            .iter()
            .chain(self.constants.keys())
            .chain(self.labels.iter())
    }

    /// Copies the component without any tree linkage. Parent and instance name are cleared and
    /// have to be reassigned by the caller, the template is shared.
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            parent: None,
            instance_name: None,
            variables: self.variables.clone(),
            constants: self.constants.clone(),
            labels: self.labels.clone(),
            template: self.template.clone(),
            kind: match &self.kind {
                ComponentKind::Base(base) => ComponentKind::Base(base.clone()),
                // instances are re-created when the children are copied
                ComponentKind::Network(_) => ComponentKind::Network(NetworkComponent::default()),
            },
        }
    }
}
