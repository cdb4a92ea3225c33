// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::ir::analysis::best_guesses;
use crate::ir::Configuration;
use crate::passes::*;
use lazy_static::lazy_static;

lazy_static! {
    static ref PASSES: Vec<Box<dyn Pass + Send + Sync>> = vec![
        Box::new(AddIdentityResetPass),
        Box::new(CopyInstancePass),
        Box::new(RenameParamPass),
        Box::new(ShortenModeNamesPass),
        Box::new(SubstituteConstantsPass),
    ];
}

/// All passes that can be requested by their command line flag.
pub fn available_passes() -> impl Iterator<Item = &'static dyn Pass> {
    PASSES.iter().map(|p| p.as_ref() as &'static dyn Pass)
}

pub fn find_pass(flag: &str) -> PassResult<&'static dyn Pass> {
    if let Some(pass) = available_passes().find(|p| p.command_line_flag() == flag) {
        return Ok(pass);
    }
    let suggestions = best_guesses(available_passes().map(|p| p.command_line_flag()), flag, 5)
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    Err(PassError::UnknownPass {
        flag: flag.to_string(),
        suggestions,
    })
}

/// A pass together with the parameter string it was requested with.
#[derive(Clone)]
pub struct RequestedPass {
    pub pass: &'static dyn Pass,
    pub params: String,
}

impl std::fmt::Debug for RequestedPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.pass.command_line_flag(), self.params)
    }
}

/// Passes that run one after the other on the same configuration.
#[derive(Debug, Default, Clone)]
pub struct PassPipeline {
    passes: Vec<RequestedPass>,
}

impl PassPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flag: &str, params: &str) -> PassResult<&mut Self> {
        let pass = find_pass(flag)?;
        self.passes.push(RequestedPass {
            pass,
            params: params.to_string(),
        });
        Ok(self)
    }

    pub fn passes(&self) -> &[RequestedPass] {
        &self.passes
    }

    /// Runs all passes in order on `config` and stops at the first failure.
    pub fn run(&self, config: &mut Configuration) -> PassResult {
        for requested in self.passes.iter() {
            log::info!(
                "Running {} with params '{}'",
                requested.pass.name(),
                requested.params
            );
            requested
                .pass
                .run_transformation_pass(config, &requested.params)?;
        }
        Ok(())
    }
}
