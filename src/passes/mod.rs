// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Transformation passes modify a [`Configuration`] in place. Every pass run goes through the
//! same steps: the pass preconditions are checked, the parameters are parsed, the pass mutates
//! the configuration and finally the configuration is validated again. A validation failure at
//! the end always indicates a bug in the pass.

mod add_identity_reset;
mod args;
mod copy_instance;
mod pipeline;
mod preconditions;
mod rename_param;
mod shorten_mode_names;
mod substitute_constants;

pub use add_identity_reset::AddIdentityResetPass;
pub use args::{split_args, ArgTokens};
pub use copy_instance::{CopyInstanceOptions, CopyInstancePass};
pub use pipeline::{available_passes, find_pass, PassPipeline, RequestedPass};
pub use preconditions::{Preconditions, PreconditionsFlag};
pub use rename_param::{RenameParamOptions, RenameParamPass};
pub use shorten_mode_names::ShortenModeNamesPass;
pub use substitute_constants::SubstituteConstantsPass;

use crate::ir::{Configuration, ExportError};
use clap::{CommandFactory, Parser};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassError {
    #[error("the preconditions for pass {pass} were not met by the hybrid automaton model: {reason}")]
    PreconditionsNotMet { pass: String, reason: String },
    #[error("invalid parameters for pass {pass}: {message}")]
    CommandLineArgument { pass: String, message: String },
    #[error("unknown pass '{flag}'.{}", suggestion_list(.suggestions))]
    UnknownPass {
        flag: String,
        suggestions: Vec<String>,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
}

fn suggestion_list(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" Did you mean: {}?", suggestions.join(", "))
    }
}

pub type PassResult<T = ()> = Result<T, PassError>;

/// Options of passes that do not take any parameters.
#[derive(Parser, Debug, Default)]
pub struct NoParams {}

/// How a pass presents itself on the command line.
pub trait PassInfo {
    /// Unique flag used to request the pass.
    fn command_line_flag(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn long_help(&self) -> Option<&'static str> {
        None
    }
}

pub trait TransformationPass: PassInfo {
    type Options: Parser;

    /// Checks that need to hold before the pass may run.
    fn preconditions(&self) -> Preconditions {
        Preconditions::all()
    }

    /// Returns the reason if the configuration is not acceptable. Passes with requirements
    /// beyond [`PreconditionsFlag`] extend this.
    fn check_preconditions(&self, config: &Configuration) -> Result<(), String> {
        self.preconditions().check(config)
    }

    fn run_pass(&self, config: &mut Configuration, options: Self::Options) -> Result<(), ExportError>;
}

/// Object safe interface of a pass, implemented for every [`TransformationPass`].
pub trait Pass: PassInfo {
    fn param_help(&self) -> String;

    fn check(&self, config: &Configuration) -> Result<(), String>;

    /// Parses `args` and runs the pass without any checks.
    fn mutate(&self, config: &mut Configuration, args: &[String]) -> PassResult;

    /// Checks preconditions, then runs the pass and validates the result. A failed precondition
    /// leaves the configuration untouched.
    fn run_transformation_pass(&self, config: &mut Configuration, params: &str) -> PassResult {
        PassExecution::new(self.name()).run(self, config, params, true)
    }

    /// Runs the pass and validates the result, skipping the preconditions.
    fn run_vanilla_pass(&self, config: &mut Configuration, params: &str) -> PassResult {
        PassExecution::new(self.name()).run(self, config, params, false)
    }
}

impl<T: TransformationPass> Pass for T {
    fn param_help(&self) -> String {
        let mut cmd = T::Options::command().name(self.command_line_flag());
        cmd.render_help().to_string()
    }

    fn check(&self, config: &Configuration) -> Result<(), String> {
        self.check_preconditions(config)
    }

    fn mutate(&self, config: &mut Configuration, args: &[String]) -> PassResult {
        let argv = std::iter::once(self.command_line_flag().to_string()).chain(args.iter().cloned());
        let options = T::Options::try_parse_from(argv).map_err(|e| PassError::CommandLineArgument {
            pass: self.name().to_string(),
            message: e.to_string().trim_end().to_string(),
        })?;
        self.run_pass(config, options)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    PreconditionChecking,
    Mutating,
    PostValidating,
    Done,
    Failed,
}

/// Drives a single pass run through its states.
#[derive(Debug)]
pub struct PassExecution {
    pass: String,
    state: PassState,
}

impl PassExecution {
    pub fn new(pass: &str) -> Self {
        Self {
            pass: pass.to_string(),
            state: PassState::Idle,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    fn enter(&mut self, state: PassState) {
        log::debug!("{}: {:?} -> {:?}", self.pass, self.state, state);
        self.state = state;
    }

    pub fn run<P: Pass + ?Sized>(
        &mut self,
        pass: &P,
        config: &mut Configuration,
        params: &str,
        check_preconditions: bool,
    ) -> PassResult {
        debug_assert_eq!(self.state, PassState::Idle, "execution can only run once");
        let result = self.run_steps(pass, config, params, check_preconditions);
        match &result {
            Ok(()) => {
                self.enter(PassState::Done);
                log::info!("Finished pass {}", self.pass);
            }
            Err(e) => {
                self.enter(PassState::Failed);
                log::info!("Pass {} failed: {e}", self.pass);
            }
        }
        result
    }

    fn run_steps<P: Pass + ?Sized>(
        &mut self,
        pass: &P,
        config: &mut Configuration,
        params: &str,
        check_preconditions: bool,
    ) -> PassResult {
        if check_preconditions {
            self.enter(PassState::PreconditionChecking);
            log::debug!("Checking preconditions for {}", self.pass);
            pass.check(config)
                .map_err(|reason| PassError::PreconditionsNotMet {
                    pass: self.pass.clone(),
                    reason,
                })?;
        }

        self.enter(PassState::Mutating);
        let args: Vec<String> = split_args(params)
            .tokens
            .iter()
            .map(|t| t.to_string())
            .collect();
        log::info!("Running pass {} with parameters {:?}", self.pass, args);
        pass.mutate(config, &args)?;

        self.enter(PassState::PostValidating);
        config.validate().map_err(|e| ExportError::CorruptedByPass {
            pass: self.pass.clone(),
            source: Box::new(e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{flows, Component, Expression};

    struct AddVariablePass;

    #[derive(Parser, Debug)]
    struct AddVariableOptions {
        /// name of the new variable
        #[arg(long)]
        name: String,
    }

    impl PassInfo for AddVariablePass {
        fn command_line_flag(&self) -> &'static str {
            "add_var"
        }

        fn name(&self) -> &'static str {
            "Add Variable Pass"
        }
    }

    impl TransformationPass for AddVariablePass {
        type Options = AddVariableOptions;

        fn preconditions(&self) -> Preconditions {
            Preconditions::none().with(PreconditionsFlag::NeedsFlat)
        }

        fn run_pass(&self, config: &mut Configuration, options: Self::Options) -> Result<(), ExportError> {
            // flows are not added, which breaks the automaton for any name
            config.root.root_component_mut().variables.push(options.name);
            Ok(())
        }
    }

    fn config() -> Configuration {
        let mut c = Component::new_base().with_variables(&["x"]);
        c.as_base_mut()
            .unwrap()
            .create_mode("m", Expression::TRUE, flows([("x", Expression::constant(1.0))]), "c")
            .unwrap();
        let mut config = Configuration::new(c);
        config.settings.plot_variable_names = [Some("x".to_string()), Some("x".to_string())];
        config.init.insert("m".to_string(), Expression::TRUE);
        config
    }

    #[test]
    fn states_of_a_successful_run() {
        let mut config = config();
        let mut execution = PassExecution::new("noop");
        execution
            .run(&ShortenModeNamesPass, &mut config, "", true)
            .unwrap();
        assert_eq!(execution.state(), PassState::Done);
        assert!(config.init.contains_key("mode_0"));
    }

    #[test]
    fn corruption_is_reported_with_pass_name() {
        let mut config = config();
        let err = AddVariablePass
            .run_transformation_pass(&mut config, "--name 1x")
            .unwrap_err();
        match err {
            PassError::Export(ExportError::CorruptedByPass { pass, .. }) => {
                assert_eq!(pass, "Add Variable Pass")
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn bad_arguments_do_not_mutate() {
        let mut config = config();
        let before = config.clone();
        let mut execution = PassExecution::new("add");
        let err = execution
            .run(&AddVariablePass, &mut config, "--nme y", false)
            .unwrap_err();
        assert!(matches!(err, PassError::CommandLineArgument { .. }));
        assert_eq!(execution.state(), PassState::Failed);
        assert_eq!(config, before);
    }

    #[test]
    fn help_mentions_options() {
        let help = AddVariablePass.param_help();
        assert!(help.contains("--name"), "{help}");
        assert!(help.contains("name of the new variable"), "{help}");
    }
}
