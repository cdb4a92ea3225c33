// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use clap::Parser;
use hyst::ir::*;
use hyst::passes::{available_passes, PassInfo, PassPipeline};

#[derive(Parser, Debug)]
#[command(name = "pipeline")]
#[command(author = "Kevin Laeufer <laeufer@cornell.edu>")]
#[command(version)]
#[command(about = "Runs transformation passes on a bouncing ball model and prints the result.", long_about = None)]
struct Args {
    #[arg(short, long)]
    verbose: bool,
    #[arg(long, help = "list the available passes and exit")]
    list: bool,
    #[arg(
        value_name = "PASS",
        help = "passes to run, each as a flag optionally followed by parameters after '=', e.g. rename=x:height"
    )]
    passes: Vec<String>,
}

fn bouncing_ball() -> Result<Configuration, ExportError> {
    let mut c = Component::new_base()
        .with_variables(&["x", "v"])
        .with_labels(&["bounce"])
        .with_constant("g", Some(Interval::point(9.81)))
        .with_constant("c", Some(Interval::point(0.75)));
    let base = c.as_base_mut().ok_or_else(|| {
        ExportError::Unsupported("expected a base component".to_string())
    })?;
    let ground = Expression::binary(
        Operator::GreaterEqual,
        Expression::var("x"),
        Expression::constant(0.0),
    );
    let dynamics = flows([
        ("x", Expression::var("v")),
        ("v", Expression::unary(Operator::Negative, Expression::var("g"))),
    ]);
    base.create_mode("falling_or_rising", ground, dynamics, "ball")?;
    let t = base.create_transition("falling_or_rising", "falling_or_rising", "ball")?;
    t.label = Some("bounce".to_string());
    t.guard = Expression::and(
        Expression::binary(Operator::LessEqual, Expression::var("x"), Expression::constant(0.0)),
        Expression::binary(Operator::Less, Expression::var("v"), Expression::constant(0.0)),
    );
    t.reset.insert(
        "v".to_string(),
        Expression::binary(
            Operator::Multiply,
            Expression::unary(Operator::Negative, Expression::var("c")),
            Expression::var("v"),
        )
        .into(),
    );

    let mut config = Configuration::new(c);
    config.settings = AutomatonSettings::with_plot_variables("x", "v");
    config.init.insert(
        "falling_or_rising".to_string(),
        Expression::and(
            Expression::binary(Operator::Equal, Expression::var("x"), Expression::constant(10.0)),
            Expression::binary(Operator::Equal, Expression::var("v"), Expression::constant(0.0)),
        ),
    );
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if args.list {
        for pass in available_passes() {
            println!("{:<16} {}", pass.command_line_flag(), pass.name());
            if let Some(help) = pass.long_help() {
                println!("{:<16} {help}", "");
            }
        }
        return Ok(());
    }

    let mut pipeline = PassPipeline::new();
    for requested in args.passes.iter() {
        let (flag, params) = requested.split_once('=').unwrap_or((requested.as_str(), ""));
        pipeline.add(flag, params)?;
    }

    let mut config = bouncing_ball()?;
    config.validate()?;
    pipeline.run(&mut config)?;
    print!("{}", config.serialize_to_str());
    Ok(())
}
