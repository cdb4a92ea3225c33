// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Structural queries over a component tree.

use crate::ir::{ComponentKind, ComponentRef, ComponentTree};
use fuzzy_matcher::FuzzyMatcher;

/// Checks whether `mode` names a mode of `c`.
///
/// Two spellings are accepted for networks:
/// - the leaf form, one mode per base component in preorder: `m1.m2.m3`
/// - the instance path form: `instance.sub_instance.mode`
pub fn mode_exists(tree: &ComponentTree, c: ComponentRef, mode: &str) -> bool {
    mode_exists_by_leaves(tree, c, mode) == Some("") || mode_exists_by_path(tree, c, mode)
}

/// Consumes one mode per leaf. Returns the unconsumed suffix, or `None` if a leaf did not
/// contain the next mode.
fn mode_exists_by_leaves<'a>(tree: &ComponentTree, c: ComponentRef, mode: &'a str) -> Option<&'a str> {
    match &tree.get(c).kind {
        ComponentKind::Base(base) => {
            let (head, tail) = mode.split_once('.').unwrap_or((mode, ""));
            base.modes.contains_key(head).then_some(tail)
        }
        ComponentKind::Network(network) => {
            let mut rest = mode;
            for instance in network.children.values() {
                rest = mode_exists_by_leaves(tree, instance.child, rest)?;
            }
            Some(rest)
        }
    }
}

fn mode_exists_by_path(tree: &ComponentTree, c: ComponentRef, mode: &str) -> bool {
    match &tree.get(c).kind {
        ComponentKind::Base(base) => base.modes.contains_key(mode),
        ComponentKind::Network(network) => match mode.split_once('.') {
            Some((instance, rest)) => network
                .child(instance)
                .map(|child| mode_exists_by_path(tree, child, rest))
                .unwrap_or(false),
            None => false,
        },
    }
}

/// `desired`, or `desired` followed by the smallest counter `>= 2` that is not taken.
pub fn fresh_name(desired: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut name = desired.to_string();
    let mut counter = 2;
    while taken(&name) {
        name = format!("{desired}{counter}");
        counter += 1;
    }
    name
}

/// Up to `n` candidates that fuzzy match `query`, best match first.
pub fn best_guesses<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    query: &str,
    n: usize,
) -> Vec<&'a str> {
    let matcher = fuzzy_matcher::skim::SkimMatcherV2::default();
    let mut matches: Vec<(&str, i64)> = candidates
        .into_iter()
        .flat_map(|other| matcher.fuzzy_match(other, query).map(|s| (other, s)))
        .collect();
    matches.sort_by_key(|(_, s)| -(*s));
    matches.into_iter().take(n).map(|(c, _)| c).collect()
}

/// True when the automaton consists of a single base component.
pub fn is_flat(tree: &ComponentTree) -> bool {
    tree.root_component().is_base()
}

pub fn has_urgent_mode(tree: &ComponentTree) -> bool {
    tree.base_components().into_iter().any(|c| {
        tree.get(c)
            .as_base()
            .map(|base| base.modes.values().any(|m| m.urgent))
            .unwrap_or(false)
    })
}

/// True if some flow or reset carries a non-point interval term.
pub fn has_nondeterministic_dynamics(tree: &ComponentTree) -> bool {
    tree.base_components().into_iter().any(|c| {
        let Some(base) = tree.get(c).as_base() else {
            return false;
        };
        let flows = base
            .modes
            .values()
            .flat_map(|m| m.flows().map(|(_, f)| f));
        let resets = base.transitions.iter().flat_map(|t| t.reset.values());
        flows.chain(resets).any(|e| e.is_nondeterministic())
    })
}
