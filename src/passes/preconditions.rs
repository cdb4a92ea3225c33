// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::analysis::{has_nondeterministic_dynamics, has_urgent_mode, is_flat};
use crate::ir::{Configuration, Operator};

/// A property a configuration needs to have before a pass may run on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PreconditionsFlag {
    NeedsOneVariable = 0,
    NoNondeterministicDynamics = 1,
    NoUrgent = 2,
    AllConstantsDefined = 3,
    NoIntervalConstants = 4,
    NeedsFlat = 5,
    NoDisjunctiveInitForbidden = 6,
}

impl PreconditionsFlag {
    pub const ALL: [PreconditionsFlag; 7] = [
        PreconditionsFlag::NeedsOneVariable,
        PreconditionsFlag::NoNondeterministicDynamics,
        PreconditionsFlag::NoUrgent,
        PreconditionsFlag::AllConstantsDefined,
        PreconditionsFlag::NoIntervalConstants,
        PreconditionsFlag::NeedsFlat,
        PreconditionsFlag::NoDisjunctiveInitForbidden,
    ];

    #[inline]
    fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of [`PreconditionsFlag`]s to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preconditions(u8);

impl Default for Preconditions {
    fn default() -> Self {
        Self::all()
    }
}

impl Preconditions {
    pub fn all() -> Self {
        Self::none().with_all(PreconditionsFlag::ALL)
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn with(self, flag: PreconditionsFlag) -> Self {
        Self(self.0 | flag.mask())
    }

    pub fn with_all(self, flags: impl IntoIterator<Item = PreconditionsFlag>) -> Self {
        flags.into_iter().fold(self, |p, f| p.with(f))
    }

    pub fn without(self, flag: PreconditionsFlag) -> Self {
        Self(self.0 & !flag.mask())
    }

    pub fn contains(&self, flag: PreconditionsFlag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Returns a description of the first precondition that `config` violates.
    pub fn check(&self, config: &Configuration) -> Result<(), String> {
        let tree = &config.root;
        if self.contains(PreconditionsFlag::NeedsFlat) && !is_flat(tree) {
            return Err("Automaton must be a single base component; network components are not supported".to_string());
        }
        let constants = config.all_constants();
        if self.contains(PreconditionsFlag::NoIntervalConstants) {
            let interval = constants.iter().find_map(|(name, value)| match value {
                Some(v) if !v.is_point() => Some((name, v)),
                _ => None,
            });
            if let Some((name, value)) = interval {
                return Err(format!("Constant '{name}' has interval value {value}"));
            }
        }
        if self.contains(PreconditionsFlag::NoDisjunctiveInitForbidden) {
            for (states, map) in [("init", &config.init), ("forbidden", &config.forbidden)] {
                if let Some((mode, _)) = map.iter().find(|(_, e)| e.contains_operator(Operator::Or)) {
                    return Err(format!(
                        "Disjunctive {states} condition in mode '{mode}' is not supported"
                    ));
                }
            }
        }
        if self.contains(PreconditionsFlag::NeedsOneVariable) {
            let variables = config.all_variables().map_err(|e| e.to_string())?;
            if variables.is_empty() {
                return Err("Automaton must have at least one variable".to_string());
            }
        }
        if self.contains(PreconditionsFlag::NoNondeterministicDynamics)
            && has_nondeterministic_dynamics(tree)
        {
            return Err("Nondeterministic flows or resets are not supported".to_string());
        }
        if self.contains(PreconditionsFlag::NoUrgent) && has_urgent_mode(tree) {
            return Err("Urgent modes are not supported".to_string());
        }
        if self.contains(PreconditionsFlag::AllConstantsDefined) {
            if let Some((name, _)) = constants.iter().find(|(_, value)| value.is_none()) {
                return Err(format!("Constant '{name}' was not defined"));
            }
        }
        Ok(())
    }
}
