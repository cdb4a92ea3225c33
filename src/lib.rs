// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Intermediate representation of networks of hybrid automata and the transformation passes
//! that rewrite them.

pub mod ir;
pub mod passes;
