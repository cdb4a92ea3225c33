// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::validate::validate_name;
use crate::ir::{
    Component, ExportError, ExportResult, Expression, Interval, ValidationError, ValidationResult,
};
use indexmap::{IndexMap, IndexSet};
use std::fmt::{Display, Formatter};

/// An expression plus an optional bounded nondeterministic term, e.g. `x + [0, 0.1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionInterval {
    pub expression: Expression,
    pub interval: Option<Interval>,
}

impl ExpressionInterval {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            interval: None,
        }
    }

    pub fn with_interval(expression: Expression, interval: Interval) -> Self {
        Self {
            expression,
            interval: Some(interval),
        }
    }

    /// True when the value is not uniquely determined by the expression.
    pub fn is_nondeterministic(&self) -> bool {
        self.interval.map(|i| !i.is_point()).unwrap_or(false)
    }
}

impl From<Expression> for ExpressionInterval {
    fn from(expression: Expression) -> Self {
        ExpressionInterval::new(expression)
    }
}

impl Display for ExpressionInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.interval {
            None => write!(f, "{}", self.expression),
            Some(i) => write!(f, "{} + {}", self.expression, i),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonMode {
    pub name: String,
    pub invariant: Expression,
    /// Urgent modes must be left immediately and carry no flows.
    pub urgent: bool,
    /// `None` iff the mode is urgent.
    pub flow_dynamics: Option<IndexMap<String, ExpressionInterval>>,
}

impl AutomatonMode {
    pub fn flows(&self) -> impl Iterator<Item = (&String, &ExpressionInterval)> {
        self.flow_dynamics.iter().flat_map(|flows| flows.iter())
    }

    pub fn flows_mut(&mut self) -> impl Iterator<Item = (&String, &mut ExpressionInterval)> {
        self.flow_dynamics.iter_mut().flat_map(|flows| flows.iter_mut())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonTransition {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub guard: Expression,
    /// Variables without an entry keep their value.
    pub reset: IndexMap<String, ExpressionInterval>,
}

/// Leaf automaton: modes with continuous dynamics and discrete transitions between them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseComponent {
    pub modes: IndexMap<String, AutomatonMode>,
    pub transitions: Vec<AutomatonTransition>,
}

impl BaseComponent {
    fn insert_mode(&mut self, mode: AutomatonMode, component: &str) -> ExportResult<&mut AutomatonMode> {
        if self.modes.contains_key(&mode.name) {
            return Err(ExportError::DuplicateMode {
                mode: mode.name,
                component: component.to_string(),
            });
        }
        let entry = self.modes.entry(mode.name.clone());
        Ok(entry.or_insert(mode))
    }

    /// Creates a mode with the given invariant and flows. `component` is only used in errors.
    pub fn create_mode(
        &mut self,
        name: &str,
        invariant: Expression,
        flows: IndexMap<String, ExpressionInterval>,
        component: &str,
    ) -> ExportResult<&mut AutomatonMode> {
        let mode = AutomatonMode {
            name: name.to_string(),
            invariant,
            urgent: false,
            flow_dynamics: Some(flows),
        };
        self.insert_mode(mode, component)
    }

    pub fn create_urgent_mode(
        &mut self,
        name: &str,
        invariant: Expression,
        component: &str,
    ) -> ExportResult<&mut AutomatonMode> {
        let mode = AutomatonMode {
            name: name.to_string(),
            invariant,
            urgent: true,
            flow_dynamics: None,
        };
        self.insert_mode(mode, component)
    }

    /// Creates a transition with a `true` guard and an empty reset.
    pub fn create_transition(
        &mut self,
        from: &str,
        to: &str,
        component: &str,
    ) -> ExportResult<&mut AutomatonTransition> {
        for mode in [from, to] {
            if !self.modes.contains_key(mode) {
                return Err(ExportError::UnknownMode {
                    mode: mode.to_string(),
                    component: component.to_string(),
                });
            }
        }
        self.transitions.push(AutomatonTransition {
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            guard: Expression::TRUE,
            reset: IndexMap::new(),
        });
        let index = self.transitions.len() - 1;
        Ok(&mut self.transitions[index])
    }

    /// First transition between the two modes.
    pub fn find_transition(&self, from: &str, to: &str) -> Option<&AutomatonTransition> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
    }

    /// Renames a mode and every transition endpoint that refers to it. The mode keeps its
    /// position in the mode map.
    pub fn rename_mode(&mut self, old: &str, new: &str, component: &str) -> ExportResult<()> {
        if old == new {
            return Ok(());
        }
        if self.modes.contains_key(new) {
            return Err(ExportError::DuplicateMode {
                mode: new.to_string(),
                component: component.to_string(),
            });
        }
        let Some(index) = self.modes.get_index_of(old) else {
            return Err(ExportError::UnknownMode {
                mode: old.to_string(),
                component: component.to_string(),
            });
        };
        let modes = std::mem::take(&mut self.modes);
        self.modes = modes
            .into_iter()
            .enumerate()
            .map(|(i, (key, mut mode))| {
                if i == index {
                    mode.name = new.to_string();
                    (new.to_string(), mode)
                } else {
                    (key, mode)
                }
            })
            .collect();
        for t in self.transitions.iter_mut() {
            if t.from == old {
                t.from = new.to_string();
            }
            if t.to == old {
                t.to = new.to_string();
            }
        }
        Ok(())
    }

    /// Visits every expression stored in modes and transitions.
    pub fn for_each_expression_mut(&mut self, mut f: impl FnMut(&mut Expression)) {
        for mode in self.modes.values_mut() {
            f(&mut mode.invariant);
            for (_, flow) in mode.flows_mut() {
                f(&mut flow.expression);
            }
        }
        for t in self.transitions.iter_mut() {
            f(&mut t.guard);
            for reset in t.reset.values_mut() {
                f(&mut reset.expression);
            }
        }
    }

    /// Checks the automaton structure. `component` is the enclosing component, whose shared
    /// checks have already passed.
    pub(crate) fn validate(&self, component: &Component) -> ValidationResult {
        let name = component.printable_instance_name();
        if self.modes.is_empty() {
            return Err(ValidationError::NoModes {
                component: name.to_string(),
            });
        }
        for (key, mode) in self.modes.iter() {
            if key != &mode.name {
                return Err(ValidationError::ModeKeyMismatch {
                    key: key.clone(),
                    name: mode.name.clone(),
                    component: name.to_string(),
                });
            }
        }
        for mode in self.modes.values() {
            validate_mode(mode, component)?;
        }
        for t in self.transitions.iter() {
            self.validate_transition(t, name)?;
        }
        for label in component.labels.iter() {
            let used = self
                .transitions
                .iter()
                .any(|t| t.label.as_deref() == Some(label.as_str()));
            if !used {
                return Err(ValidationError::UnusedLabel {
                    label: label.clone(),
                    component: name.to_string(),
                });
            }
        }
        self.validate_flow_variables(component)
    }

    fn validate_transition(&self, t: &AutomatonTransition, component: &str) -> ValidationResult {
        for mode in [&t.from, &t.to] {
            if !self.modes.contains_key(mode) {
                return Err(ValidationError::UnknownTransitionMode {
                    mode: mode.clone(),
                    from: t.from.clone(),
                    to: t.to.clone(),
                    component: component.to_string(),
                });
            }
        }
        if matches!(&t.label, Some(l) if l.is_empty()) {
            return Err(ValidationError::BlankLabel {
                from: t.from.clone(),
                to: t.to.clone(),
                component: component.to_string(),
            });
        }
        Ok(())
    }

    /// All non-urgent modes define flows for the same variables, and flows only mention
    /// variables and constants of the component.
    fn validate_flow_variables(&self, component: &Component) -> ValidationResult {
        let name = component.printable_instance_name();
        let mut first: Option<(&str, IndexSet<&String>)> = None;
        for mode in self.modes.values().filter(|m| !m.urgent) {
            let variables: IndexSet<&String> = mode.flows().map(|(v, _)| v).collect();
            if let Some((first_mode, first_variables)) = &first {
                if first_variables != &variables {
                    return Err(ValidationError::InconsistentFlowVariables {
                        first_mode: first_mode.to_string(),
                        first_variables: first_variables.iter().map(|v| v.to_string()).collect(),
                        mode: mode.name.clone(),
                        variables: variables.iter().map(|v| v.to_string()).collect(),
                        component: name.to_string(),
                    });
                }
            } else {
                first = Some((&mode.name, variables));
            }
            for (variable, flow) in mode.flows() {
                let unknown = flow.expression.variables().into_iter().find(|symbol| {
                    !component.variables.contains(symbol) && !component.has_constant(symbol)
                });
                if let Some(symbol) = unknown {
                    return Err(ValidationError::UnknownSymbolInFlow {
                        symbol,
                        variable: variable.clone(),
                        mode: mode.name.clone(),
                        component: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_mode(mode: &AutomatonMode, component: &Component) -> ValidationResult {
    let name = component.printable_instance_name();
    validate_name(&mode.name, name)?;
    if mode.invariant.is_false() {
        return Err(ValidationError::FalseInvariant {
            mode: mode.name.clone(),
            component: name.to_string(),
        });
    }
    match (&mode.flow_dynamics, mode.urgent) {
        (Some(_), true) => {
            return Err(ValidationError::UrgentModeWithFlows {
                mode: mode.name.clone(),
                component: name.to_string(),
            })
        }
        (None, false) => {
            return Err(ValidationError::MissingFlows {
                mode: mode.name.clone(),
                component: name.to_string(),
            })
        }
        _ => {}
    }
    for (variable, _) in mode.flows() {
        if !component.variables.contains(variable) {
            return Err(ValidationError::FlowForUnknownVariable {
                variable: variable.clone(),
                mode: mode.name.clone(),
                component: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Builds a flow map from `(variable, derivative)` pairs.
pub fn flows<'a>(
    derivatives: impl IntoIterator<Item = (&'a str, Expression)>,
) -> IndexMap<String, ExpressionInterval> {
    derivatives
        .into_iter()
        .map(|(v, e)| (v.to_string(), ExpressionInterval::new(e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Operator;

    fn thermostat() -> Component {
        let mut c = Component::new_base()
            .with_variables(&["x", "t"])
            .with_labels(&["switch"])
            .with_constant("rate", Some(Interval::point(2.0)));
        let base = c.as_base_mut().unwrap();
        let on_flow = flows([
            ("x", Expression::var("rate")),
            ("t", Expression::constant(1.0)),
        ]);
        let off_flow = flows([
            ("x", Expression::unary(Operator::Negative, Expression::var("x"))),
            ("t", Expression::constant(1.0)),
        ]);
        base.create_mode("on", Expression::TRUE, on_flow, "c").unwrap();
        base.create_mode("off", Expression::TRUE, off_flow, "c").unwrap();
        base.create_transition("on", "off", "c").unwrap().label = Some("switch".to_string());
        c
    }

    #[test]
    fn valid_base_component() {
        let c = thermostat();
        c.as_base().unwrap().validate(&c).unwrap();
    }

    #[test]
    fn duplicate_modes_and_unknown_transition_targets() {
        let mut c = thermostat();
        let base = c.as_base_mut().unwrap();
        assert!(matches!(
            base.create_urgent_mode("on", Expression::TRUE, "c"),
            Err(ExportError::DuplicateMode { .. })
        ));
        assert!(matches!(
            base.create_transition("on", "missing", "c"),
            Err(ExportError::UnknownMode { .. })
        ));
    }

    #[test]
    fn unused_label() {
        let mut c = thermostat();
        c.as_base_mut().unwrap().transitions[0].label = None;
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(matches!(err, ValidationError::UnusedLabel { label, .. } if label == "switch"));
    }

    #[test]
    fn flows_must_agree_between_modes() {
        let mut c = thermostat();
        let off = c.as_base_mut().unwrap().modes.get_mut("off").unwrap();
        off.flow_dynamics.as_mut().unwrap().shift_remove("t");
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(matches!(err, ValidationError::InconsistentFlowVariables { .. }));
    }

    #[test]
    fn flows_use_known_symbols() {
        let mut c = thermostat();
        let on = c.as_base_mut().unwrap().modes.get_mut("on").unwrap();
        on.flow_dynamics.as_mut().unwrap()["x"] = Expression::var("speed").into();
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(
            matches!(err, ValidationError::UnknownSymbolInFlow { ref symbol, .. } if symbol == "speed"),
            "{err}"
        );
    }

    #[test]
    fn urgent_modes_have_no_flows() {
        let mut c = thermostat();
        c.as_base_mut().unwrap().modes.get_mut("on").unwrap().urgent = true;
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(matches!(err, ValidationError::UrgentModeWithFlows { .. }));
    }

    #[test]
    fn modes_are_required() {
        let mut c = thermostat();
        let base = c.as_base_mut().unwrap();
        base.transitions.clear();
        base.modes.clear();
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(matches!(err, ValidationError::NoModes { .. }), "{err}");
    }

    #[test]
    fn invariant_must_be_satisfiable() {
        let mut c = thermostat();
        c.as_base_mut().unwrap().modes.get_mut("off").unwrap().invariant = Expression::FALSE;
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(
            matches!(err, ValidationError::FalseInvariant { ref mode, .. } if mode == "off"),
            "{err}"
        );
    }

    #[test]
    fn regular_modes_need_flows() {
        let mut c = thermostat();
        c.as_base_mut().unwrap().modes.get_mut("on").unwrap().flow_dynamics = None;
        let err = c.as_base().unwrap().validate(&c).unwrap_err();
        assert!(
            matches!(err, ValidationError::MissingFlows { ref mode, .. } if mode == "on"),
            "{err}"
        );
    }

    #[test]
    fn rename_mode_keeps_order_and_transitions() {
        let mut c = thermostat();
        let base = c.as_base_mut().unwrap();
        base.rename_mode("on", "heating", "c").unwrap();
        let names: Vec<_> = base.modes.keys().cloned().collect();
        assert_eq!(names, ["heating", "off"]);
        assert_eq!(base.transitions[0].from, "heating");
        assert!(base.find_transition("heating", "off").is_some());
        assert!(matches!(
            base.rename_mode("heating", "off", "c"),
            Err(ExportError::DuplicateMode { .. })
        ));
    }
}
