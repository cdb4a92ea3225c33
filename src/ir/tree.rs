// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::validate::check_name_conflicts;
use crate::ir::{
    validate_name, Component, ComponentInstance, ComponentKind, ComponentRef, ExportError,
    ExportResult, Interval, MappingKind, ValidationError, ValidationOptions, ValidationResult,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::ops::{Index, IndexMut};

/// Owns every component of one automaton. Components refer to each other through
/// [`ComponentRef`] handles, parents are non-owning back-references.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    components: Vec<Component>,
    root: ComponentRef,
}

impl ComponentTree {
    /// Creates a tree with `root` as its only component. Linkage of the root is cleared.
    pub fn new(mut root: Component) -> Self {
        root.parent = None;
        root.instance_name = None;
        Self {
            components: vec![root],
            root: ComponentRef::from_index(0),
        }
    }

    pub fn root(&self) -> ComponentRef {
        self.root
    }

    pub fn root_component(&self) -> &Component {
        self.get(self.root)
    }

    pub fn root_component_mut(&mut self) -> &mut Component {
        let root = self.root;
        self.get_mut(root)
    }

    pub fn get(&self, reference: ComponentRef) -> &Component {
        &self.components[reference.index()]
    }

    pub fn get_mut(&mut self, reference: ComponentRef) -> &mut Component {
        &mut self.components[reference.index()]
    }

    /// Number of components in the arena, including detached copies.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Installs `child` under the network `parent` as `instance_name` and returns its handle.
    pub fn add_instance(
        &mut self,
        parent: ComponentRef,
        instance_name: &str,
        mut child: Component,
    ) -> ExportResult<ComponentRef> {
        let reference = ComponentRef::from_index(self.components.len());
        let network = self.get(parent);
        let Some(children) = network.as_network().map(|n| &n.children) else {
            return Err(ExportError::NotANetwork {
                component: network.printable_instance_name().to_string(),
            });
        };
        if children.contains_key(instance_name) {
            return Err(ExportError::DuplicateInstance {
                name: instance_name.to_string(),
                component: network.printable_instance_name().to_string(),
            });
        }
        child.parent = Some(parent);
        child.instance_name = Some(instance_name.to_string());
        self.components.push(child);
        self.attach(parent, instance_name, ComponentInstance::new(parent, reference));
        Ok(reference)
    }

    /// Installs an already allocated, detached component as a child of `parent`.
    pub fn attach_copy(
        &mut self,
        parent: ComponentRef,
        instance_name: &str,
        copy: ComponentRef,
    ) -> ExportResult<&mut ComponentInstance> {
        let network = self.get(parent);
        let Some(children) = network.as_network().map(|n| &n.children) else {
            return Err(ExportError::NotANetwork {
                component: network.printable_instance_name().to_string(),
            });
        };
        if children.contains_key(instance_name) {
            return Err(ExportError::DuplicateInstance {
                name: instance_name.to_string(),
                component: network.printable_instance_name().to_string(),
            });
        }
        let child = self.get_mut(copy);
        child.parent = Some(parent);
        child.instance_name = Some(instance_name.to_string());
        Ok(self.attach(parent, instance_name, ComponentInstance::new(parent, copy)))
    }

    fn attach(
        &mut self,
        parent: ComponentRef,
        instance_name: &str,
        instance: ComponentInstance,
    ) -> &mut ComponentInstance {
        let children = match &mut self.get_mut(parent).kind {
            ComponentKind::Network(network) => &mut network.children,
            ComponentKind::Base(_) => unreachable!("parent was checked to be a network"),
        };
        children.entry(instance_name.to_string()).or_insert(instance)
    }

    /// The instance through which `c` is installed in its parent.
    pub fn instance(&self, c: ComponentRef) -> Option<&ComponentInstance> {
        let component = self.get(c);
        let parent = self.get(component.parent?).as_network()?;
        parent.children.get(component.instance_name.as_deref()?)
    }

    pub fn instance_mut(&mut self, c: ComponentRef) -> Option<&mut ComponentInstance> {
        let component = self.get(c);
        let name = component.instance_name.clone()?;
        let parent = component.parent?;
        self.get_mut(parent).as_network_mut()?.children.get_mut(&name)
    }

    fn expect_instance(&self, c: ComponentRef) -> ExportResult<Option<&ComponentInstance>> {
        let component = self.get(c);
        match component.parent {
            None => Ok(None),
            Some(_) => match self.instance(c) {
                Some(instance) => Ok(Some(instance)),
                None => Err(ExportError::UnknownInstance {
                    name: component.printable_instance_name().to_string(),
                    component: component
                        .parent
                        .map(|p| self.get(p).printable_instance_name().to_string())
                        .unwrap_or_default(),
                }),
            },
        }
    }

    /// Handles of the direct children of `c`, in instance order.
    pub fn children(&self, c: ComponentRef) -> Vec<ComponentRef> {
        match &self.get(c).kind {
            ComponentKind::Network(network) => network.children.values().map(|i| i.child).collect(),
            ComponentKind::Base(_) => vec![],
        }
    }

    /// `c` and all of its descendants in preorder.
    pub fn descendants(&self, c: ComponentRef) -> Vec<ComponentRef> {
        let mut out = vec![];
        let mut todo = vec![c];
        while let Some(next) = todo.pop() {
            out.push(next);
            todo.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Base components reachable from the root, in preorder.
    pub fn base_components(&self) -> Vec<ComponentRef> {
        self.descendants(self.root)
            .into_iter()
            .filter(|c| self.get(*c).is_base())
            .collect()
    }

    /// Checks the invariants of the whole tree, starting at the root.
    pub fn validate(&self, options: &ValidationOptions) -> ValidationResult {
        self.validate_component(self.root, options)
    }

    pub fn validate_component(&self, c: ComponentRef, options: &ValidationOptions) -> ValidationResult {
        if !options.enabled {
            return Ok(());
        }
        let component = self.get(c);
        let name = component.printable_instance_name();
        if let Some(instance_name) = &component.instance_name {
            validate_name(instance_name, name)?;
        }
        if component.instance_name.is_some() != component.parent.is_some() {
            return Err(ValidationError::InstanceParentMismatch {
                component: name.to_string(),
                has_parent: component.parent.is_some(),
            });
        }

        let mut all_names = HashSet::new();
        check_name_conflicts(&mut all_names, &component.variables, name)?;
        check_name_conflicts(&mut all_names, &component.labels, name)?;
        if options.validate_constants {
            check_name_conflicts(&mut all_names, component.constants.keys(), name)?;
            for constant in component.constants.keys() {
                if let Err(e) = self.constant_value(c, constant) {
                    return Err(ValidationError::UnmappedConstant {
                        name: constant.clone(),
                        component: name.to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        match &component.kind {
            ComponentKind::Base(base) => base.validate(component),
            ComponentKind::Network(network) => {
                if network.children.is_empty() {
                    return Err(ValidationError::EmptyNetwork {
                        component: name.to_string(),
                    });
                }
                for (key, instance) in network.children.iter() {
                    self.validate_instance(c, instance, options)?;
                    let declared = self.get(instance.child).instance_name.as_deref();
                    if declared != Some(key.as_str()) {
                        return Err(ValidationError::InstanceKeyMismatch {
                            key: key.clone(),
                            declared: declared.unwrap_or("<root>").to_string(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    fn validate_instance(
        &self,
        owner: ComponentRef,
        instance: &ComponentInstance,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let parent = self.get(owner);
        let child = self.get(instance.child);
        let parent_name = parent.printable_instance_name();
        if instance.parent != owner || child.parent != Some(owner) {
            return Err(ValidationError::ChildParentMismatch {
                instance: child.printable_instance_name().to_string(),
                component: parent_name.to_string(),
            });
        }
        for m in instance.var_mapping.iter() {
            m.validate(
                |n| parent.variables.iter().any(|v| v == n),
                |n| child.variables.iter().any(|v| v == n),
                MappingKind::Variable,
                parent_name,
                options.validate_constants,
            )?;
        }
        for m in instance.const_mapping.iter() {
            m.validate(
                |n| parent.has_constant(n),
                |n| child.has_constant(n),
                MappingKind::Constant,
                parent_name,
                options.validate_constants,
            )?;
        }
        for m in instance.label_mapping.iter() {
            m.validate(
                |n| parent.labels.iter().any(|l| l == n),
                |n| child.labels.iter().any(|l| l == n),
                MappingKind::Label,
                parent_name,
                options.validate_constants,
            )?;
        }
        self.validate_component(instance.child, options)
    }

    /// Value of a constant declared in `c`. A constant that is mapped in the parent takes its
    /// value from there, it must not also carry a local value.
    pub fn constant_value(&self, c: ComponentRef, name: &str) -> ExportResult<Interval> {
        let component = self.get(c);
        let Some(local) = component.constants.get(name) else {
            return Err(ExportError::UnknownConstant {
                name: name.to_string(),
                component: component.printable_instance_name().to_string(),
            });
        };
        if let Some(instance) = self.expect_instance(c)? {
            if let Some(parent_param) = instance.parent_name(MappingKind::Constant, name) {
                if local.is_some() {
                    return Err(ExportError::ConflictingConstantBinding {
                        name: name.to_string(),
                        component: component.printable_instance_name().to_string(),
                    });
                }
                return self.constant_value(instance.parent, parent_param);
            }
        }
        local.ok_or_else(|| ExportError::UnassignedConstant {
            name: name.to_string(),
            component: component.printable_instance_name().to_string(),
        })
    }

    /// Assigns a constant declared in `c`. Inside a network, a dotted name is forwarded to the
    /// child instance named by its first segment.
    pub fn set_constant(&mut self, c: ComponentRef, name: &str, value: Interval) -> ExportResult<()> {
        let component = self.get(c);
        if let (Some(network), Some((instance, rest))) = (component.as_network(), name.split_once('.')) {
            return match network.child(instance) {
                Some(child) => self.set_constant(child, rest, value),
                None => Err(ExportError::UnknownInstance {
                    name: instance.to_string(),
                    component: component.printable_instance_name().to_string(),
                }),
            };
        }
        let component = self.get_mut(c);
        match component.constants.get_mut(name) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(ExportError::UnknownConstant {
                name: name.to_string(),
                component: component.printable_instance_name().to_string(),
            }),
        }
    }

    /// Dotted path from the root to `c`; empty for the root.
    pub fn fully_qualified_instance_name(&self, c: ComponentRef) -> String {
        let component = self.get(c);
        let name = component.instance_name.clone().unwrap_or_default();
        match component.parent {
            Some(parent) if self.get(parent).instance_name.is_some() => {
                format!("{}.{}", self.fully_qualified_instance_name(parent), name)
            }
            _ => name,
        }
    }

    /// Name under which `var` of `c` is known globally. Mapped variables resolve to the outermost
    /// parent name, local ones are prefixed with the instance path.
    pub fn fully_qualified_variable_name(&self, c: ComponentRef, var: &str) -> ExportResult<String> {
        match self.expect_instance(c)? {
            None => Ok(var.to_string()),
            Some(instance) => match instance.parent_name(MappingKind::Variable, var) {
                Some(parent_param) => self.fully_qualified_variable_name(instance.parent, parent_param),
                None => Ok(format!("{}.{}", self.fully_qualified_instance_name(c), var)),
            },
        }
    }

    /// Fully qualified names of all variables visible at `c`. A base component reports its own
    /// variables in declaration order, a network the sorted union of its children's.
    pub fn all_variables(&self, c: ComponentRef) -> ExportResult<IndexSet<String>> {
        match &self.get(c).kind {
            ComponentKind::Base(_) => self
                .get(c)
                .variables
                .iter()
                .map(|v| self.fully_qualified_variable_name(c, v))
                .collect(),
            ComponentKind::Network(network) => {
                let mut vars = Vec::new();
                for instance in network.children.values() {
                    vars.extend(self.all_variables(instance.child)?);
                }
                vars.sort();
                Ok(vars.into_iter().collect())
            }
        }
    }

    /// Constants of `c` and, for networks, of all descendants, keyed by qualified name.
    /// Constants that take their value from a parent mapping are left out.
    pub fn all_constants(&self, c: ComponentRef) -> IndexMap<String, Option<Interval>> {
        let component = self.get(c);
        let instance = self.instance(c);
        let prefix = match self.fully_qualified_instance_name(c) {
            path if path.is_empty() => path,
            path => format!("{path}."),
        };
        let mut out: IndexMap<String, Option<Interval>> = component
            .constants
            .iter()
            .filter(|(name, _)| {
                instance
                    .and_then(|i| i.parent_name(MappingKind::Constant, name))
                    .is_none()
            })
            .map(|(name, value)| (format!("{prefix}{name}"), *value))
            .collect();
        for child in self.children(c) {
            out.extend(self.all_constants(child));
        }
        out
    }

    /// Deep copy of `c` and its descendants into this arena. The copy is detached: it has no
    /// parent and no instance name until it is attached.
    pub fn copy_component(&mut self, c: ComponentRef) -> ExportResult<ComponentRef> {
        let offset = self.components.len();
        let mut copies = Vec::new();
        let index = self.copy_into(c, &mut copies, offset)?;
        self.components.extend(copies);
        Ok(ComponentRef::from_index(offset + index))
    }

    /// Deep copy of the tree reachable from the root. Detached components are not carried over.
    pub fn copy(&self) -> ExportResult<ComponentTree> {
        let mut components = Vec::new();
        let root = self.copy_into(self.root, &mut components, 0)?;
        Ok(ComponentTree {
            components,
            root: ComponentRef::from_index(root),
        })
    }

    /// Appends copies of `c` and its descendants to `out`, whose first entry will live at index
    /// `offset` of the target arena. Returns the position of the copy of `c` within `out`.
    fn copy_into(
        &self,
        c: ComponentRef,
        out: &mut Vec<Component>,
        offset: usize,
    ) -> ExportResult<usize> {
        let index = out.len();
        let reference = ComponentRef::from_index(offset + index);
        out.push(self.get(c).detached_copy());
        let Some(network) = self.get(c).as_network() else {
            return Ok(index);
        };
        for (name, instance) in network.children.iter() {
            let child_index = self.copy_into(instance.child, out, offset)?;
            let child_reference = ComponentRef::from_index(offset + child_index);
            let mut copy = ComponentInstance::new(reference, child_reference);
            copy.var_mapping = instance.var_mapping.clone();
            copy.label_mapping = instance.label_mapping.clone();
            let child = &mut out[child_index];
            child.parent = Some(reference);
            child.instance_name = Some(name.clone());
            for mapping in instance.const_mapping.iter() {
                match mapping.literal_value() {
                    Some(literal) => {
                        let value: f64 = literal.trim().parse().map_err(|_| {
                            ExportError::MalformedLiteral {
                                param: mapping.child_param.clone(),
                                literal: literal.to_string(),
                            }
                        })?;
                        child
                            .constants
                            .insert(mapping.child_param.clone(), Some(Interval::point(value)));
                    }
                    None => copy.const_mapping.push(mapping.clone()),
                }
            }
            if let ComponentKind::Network(n) = &mut out[index].kind {
                n.children.insert(name.clone(), copy);
            }
        }
        Ok(index)
    }
}

/// Structural equality of the trees reachable from both roots. Arena order and detached
/// components do not matter, instances are matched by name.
impl PartialEq for ComponentTree {
    fn eq(&self, other: &Self) -> bool {
        self.same_structure(self.root, other, other.root)
    }
}

impl ComponentTree {
    fn same_structure(&self, a: ComponentRef, other: &ComponentTree, b: ComponentRef) -> bool {
        let (left, right) = (self.get(a), other.get(b));
        let same_fields = left.instance_name == right.instance_name
            && left.variables == right.variables
            && left.constants == right.constants
            && left.labels == right.labels
            && left.template == right.template;
        if !same_fields {
            return false;
        }
        match (&left.kind, &right.kind) {
            (ComponentKind::Base(l), ComponentKind::Base(r)) => l == r,
            (ComponentKind::Network(l), ComponentKind::Network(r)) => {
                l.children.len() == r.children.len()
                    && l.children.iter().all(|(name, li)| {
                        r.children.get(name).is_some_and(|ri| {
                            li.var_mapping == ri.var_mapping
                                && li.const_mapping == ri.const_mapping
                                && li.label_mapping == ri.label_mapping
                                && self.same_structure(li.child, other, ri.child)
                        })
                    })
            }
            _ => false,
        }
    }
}

impl Index<ComponentRef> for ComponentTree {
    type Output = Component;

    fn index(&self, index: ComponentRef) -> &Self::Output {
        self.get(index)
    }
}

impl IndexMut<ComponentRef> for ComponentTree {
    fn index_mut(&mut self, index: ComponentRef) -> &mut Self::Output {
        self.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{flows, ComponentMapping, Expression};

    fn counter(variables: &[&str]) -> Component {
        let mut c = Component::new_base().with_variables(variables);
        let dynamics = flows(variables.iter().map(|v| (*v, Expression::constant(1.0))));
        c.as_base_mut()
            .unwrap()
            .create_mode("run", Expression::TRUE, dynamics, "counter")
            .unwrap();
        c
    }

    /// `Net { k = 5 } -> A { x, k mapped to k }`
    fn mapped_constant_network() -> (ComponentTree, ComponentRef) {
        let net = Component::new_network().with_constant("k", Some(Interval::point(5.0)));
        let mut tree = ComponentTree::new(net);
        let a = counter(&["x"]).with_constant("k", None);
        let root = tree.root();
        let a = tree.add_instance(root, "A", a).unwrap();
        tree.instance_mut(a)
            .unwrap()
            .map(MappingKind::Constant, "k", "k");
        (tree, a)
    }

    #[test]
    fn constant_resolves_through_parent_mapping() {
        let (tree, a) = mapped_constant_network();
        tree.validate(&ValidationOptions::default()).unwrap();
        assert_eq!(tree.constant_value(a, "k").unwrap(), Interval::point(5.0));
        // mapped constants are reported by the parent only
        let all = tree.all_constants(tree.root());
        assert_eq!(all.len(), 1);
        assert_eq!(all["k"], Some(Interval::point(5.0)));
    }

    #[test]
    fn constant_cannot_be_assigned_and_mapped() {
        let (mut tree, a) = mapped_constant_network();
        tree.get_mut(a).constants["k"] = Some(Interval::point(1.0));
        assert!(matches!(
            tree.constant_value(a, "k"),
            Err(ExportError::ConflictingConstantBinding { .. })
        ));
        let err = tree.validate(&ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::UnmappedConstant { .. }), "{err}");
    }

    #[test]
    fn unassigned_and_unknown_constants() {
        let mut tree = ComponentTree::new(counter(&["x"]).with_constant("c", None));
        let root = tree.root();
        assert!(matches!(
            tree.constant_value(root, "c"),
            Err(ExportError::UnassignedConstant { .. })
        ));
        assert!(matches!(
            tree.constant_value(root, "d"),
            Err(ExportError::UnknownConstant { .. })
        ));
        // skipped without constant validation
        tree.validate(&ValidationOptions::without_constants()).unwrap();
        tree.set_constant(root, "c", Interval::point(2.0)).unwrap();
        tree.validate(&ValidationOptions::default()).unwrap();
    }

    #[test]
    fn dotted_constant_assignment() {
        let (mut tree, a) = mapped_constant_network();
        tree.get_mut(a).constants.insert("local".to_string(), None);
        let root = tree.root();
        tree.set_constant(root, "A.local", Interval::new(1.0, 2.0)).unwrap();
        assert_eq!(tree.get(a).constants["local"], Some(Interval::new(1.0, 2.0)));
        assert!(matches!(
            tree.set_constant(root, "B.local", Interval::point(1.0)),
            Err(ExportError::UnknownInstance { .. })
        ));
        assert!(matches!(
            tree.set_constant(root, "nope", Interval::point(1.0)),
            Err(ExportError::UnknownConstant { .. })
        ));
    }

    #[test]
    fn qualified_names() {
        let mut tree = ComponentTree::new(Component::new_network().with_variables(&["shared"]));
        let root = tree.root();
        let p = tree
            .add_instance(root, "P", Component::new_network().with_variables(&["y"]))
            .unwrap();
        tree.instance_mut(p)
            .unwrap()
            .map(MappingKind::Variable, "y", "shared");
        let q = tree.add_instance(p, "Q", counter(&["x", "y"])).unwrap();
        tree.instance_mut(q).unwrap().map(MappingKind::Variable, "y", "y");

        assert_eq!(tree.fully_qualified_instance_name(root), "");
        assert_eq!(tree.fully_qualified_instance_name(p), "P");
        assert_eq!(tree.fully_qualified_instance_name(q), "P.Q");
        assert_eq!(tree.fully_qualified_variable_name(q, "x").unwrap(), "P.Q.x");
        assert_eq!(tree.fully_qualified_variable_name(q, "y").unwrap(), "shared");
        let vars: Vec<_> = tree.all_variables(root).unwrap().into_iter().collect();
        assert_eq!(vars, ["P.Q.x", "shared"]);
        tree.validate(&ValidationOptions::default()).unwrap();
    }

    #[test]
    fn copies_are_independent() {
        let (tree, _) = mapped_constant_network();
        let mut copy = tree.copy().unwrap();
        assert_eq!(copy, tree);
        let root = copy.root();
        copy.get_mut(root).variables.push("z".to_string());
        copy.set_constant(root, "k", Interval::point(7.0)).unwrap();
        assert_eq!(tree.root_component().variables.len(), 0);
        assert_eq!(
            tree.constant_value(tree.root(), "k").unwrap(),
            Interval::point(5.0)
        );
    }

    #[test]
    fn equality_ignores_arena_order() {
        let mut tree = ComponentTree::new(Component::new_network());
        let root = tree.root();
        let a = tree.add_instance(root, "A", Component::new_network()).unwrap();
        tree.add_instance(root, "B", counter(&["x"])).unwrap();
        tree.add_instance(a, "C", counter(&["y"])).unwrap();
        let copy = tree.copy().unwrap();
        assert_eq!(copy, tree);
        assert_eq!(tree, copy);

        // a detached copy is not part of the tree
        let mut with_detached = tree.clone();
        with_detached.copy_component(a).unwrap();
        assert_eq!(with_detached.len(), 6);
        assert_eq!(with_detached, tree);

        let mut changed = tree.copy().unwrap();
        let c = changed.get(changed.root()).as_network().unwrap().child("A").unwrap();
        let c = changed.get(c).as_network().unwrap().child("C").unwrap();
        changed.get_mut(c).variables.push("z".to_string());
        assert_ne!(changed, tree);
    }

    #[test]
    fn copy_resolves_value_maps() {
        let mut tree = ComponentTree::new(Component::new_network());
        let root = tree.root();
        let a = tree
            .add_instance(root, "A", counter(&["x"]).with_constant("k", None))
            .unwrap();
        tree.instance_mut(a)
            .unwrap()
            .const_mapping
            .push(ComponentMapping::new("k", "~2.5"));
        tree.validate(&ValidationOptions::without_constants()).unwrap();

        let copy = tree.copy().unwrap();
        let a2 = copy.children(copy.root())[0];
        assert!(copy.instance(a2).unwrap().const_mapping.is_empty());
        assert_eq!(copy.constant_value(a2, "k").unwrap(), Interval::point(2.5));
        copy.validate(&ValidationOptions::default()).unwrap();

        tree.instance_mut(a).unwrap().const_mapping[0].parent_param = "~two".to_string();
        assert!(matches!(
            tree.copy(),
            Err(ExportError::MalformedLiteral { .. })
        ));
    }

    #[test]
    fn copy_component_in_same_arena() {
        let (mut tree, a) = mapped_constant_network();
        let copy = tree.copy_component(a).unwrap();
        assert_ne!(copy, a);
        assert_eq!(tree.get(copy).parent, None);
        let root = tree.root();
        tree.attach_copy(root, "B", copy)
            .unwrap()
            .map(MappingKind::Constant, "k", "k");
        assert_eq!(tree.children(root), vec![a, copy]);
        assert_eq!(tree.fully_qualified_instance_name(copy), "B");
        tree.validate(&ValidationOptions::default()).unwrap();
    }

    #[test]
    fn structural_errors() {
        let mut tree = ComponentTree::new(Component::new_network());
        assert!(matches!(
            tree.validate(&ValidationOptions::default()),
            Err(ValidationError::EmptyNetwork { .. })
        ));
        assert!(tree.validate(&ValidationOptions::disabled()).is_ok());

        let root = tree.root();
        let a = tree.add_instance(root, "A", counter(&["x"])).unwrap();
        tree.get_mut(a).instance_name = Some("B".to_string());
        assert!(matches!(
            tree.validate(&ValidationOptions::default()),
            Err(ValidationError::InstanceKeyMismatch { .. })
        ));
        tree.get_mut(a).instance_name = None;
        assert!(matches!(
            tree.validate(&ValidationOptions::default()),
            Err(ValidationError::InstanceParentMismatch { .. })
        ));
        // the child points at itself instead of the network that owns it
        tree.get_mut(a).instance_name = Some("A".to_string());
        tree.get_mut(a).parent = Some(a);
        assert!(matches!(
            tree.validate(&ValidationOptions::default()),
            Err(ValidationError::ChildParentMismatch { .. })
        ));
        assert!(matches!(
            tree.add_instance(a, "C", counter(&["y"])),
            Err(ExportError::NotANetwork { .. })
        ));
    }
}
