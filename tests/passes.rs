// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use hyst::ir::*;
use hyst::passes::*;
use test_log::test;

/// Two water tanks that are filled alternately.
fn tank(name: &str) -> Component {
    let mut c = Component::new_base()
        .with_variables(&["level"])
        .with_labels(&["switch"])
        .with_constant("inflow", None);
    let base = c.as_base_mut().unwrap();
    let low = Expression::binary(Operator::GreaterEqual, Expression::var("level"), Expression::constant(0.0));
    base.create_mode(
        "fill",
        low.clone(),
        flows([(
            "level",
            Expression::binary(Operator::Subtract, Expression::var("inflow"), Expression::constant(1.0)),
        )]),
        name,
    )
    .unwrap();
    base.create_mode(
        "drain",
        low,
        flows([("level", Expression::constant(-1.0))]),
        name,
    )
    .unwrap();
    base.create_transition("fill", "drain", name).unwrap().label = Some("switch".to_string());
    base.create_transition("drain", "fill", name).unwrap().label = Some("switch".to_string());
    c
}

fn tanks() -> Configuration {
    let mut tree = ComponentTree::new(
        Component::new_network()
            .with_variables(&["level"])
            .with_labels(&["switch"])
            .with_constant("inflow", Some(Interval::point(2.0))),
    );
    let root = tree.root();
    let a = tree.add_instance(root, "Tank", tank("Tank")).unwrap();
    tree.instance_mut(a)
        .unwrap()
        .map(MappingKind::Variable, "level", "level")
        .map(MappingKind::Label, "switch", "switch")
        .map(MappingKind::Constant, "inflow", "inflow");
    let mut config = Configuration::from_tree(tree);
    config.settings = AutomatonSettings::with_plot_variables("level", "level");
    config.init.insert(
        "Tank.fill".to_string(),
        Expression::binary(Operator::Equal, Expression::var("level"), Expression::constant(1.0)),
    );
    config
}

fn flat_tank() -> Configuration {
    let mut config = Configuration::new(tank("tank").with_constant("inflow", Some(Interval::point(2.0))));
    config.settings = AutomatonSettings::with_plot_variables("level", "level");
    config.init.insert("fill".to_string(), Expression::TRUE);
    config
}

#[test]
fn failed_preconditions_leave_the_configuration_untouched() {
    let mut config = tanks();
    config.validate().unwrap();
    let snapshot = config.copy().unwrap();
    for flag in ["shorten", "pass_identity", "rename"] {
        let pass = find_pass(flag).unwrap();
        let err = pass
            .run_transformation_pass(&mut config, "level:height")
            .unwrap_err();
        assert!(
            matches!(err, PassError::PreconditionsNotMet { .. }),
            "{flag}: {err}"
        );
        assert_eq!(config, snapshot);
    }
}

#[test]
fn vanilla_runs_skip_preconditions() {
    let mut config = flat_tank();
    config.root.root_component_mut().constants["inflow"] = Some(Interval::new(1.0, 3.0));
    // the interval constant is only rejected by the preconditions
    let err = SubstituteConstantsPass
        .run_transformation_pass(&mut config, "")
        .unwrap_err();
    assert!(matches!(err, PassError::PreconditionsNotMet { .. }));
    let err = SubstituteConstantsPass
        .run_vanilla_pass(&mut config, "")
        .unwrap_err();
    assert!(matches!(
        err,
        PassError::Export(ExportError::NonConstantInterval { .. })
    ));
}

#[test]
fn copy_then_substitute() {
    let mut config = tanks();
    let mut pipeline = PassPipeline::new();
    pipeline
        .add("copy", "--name Tank --num 2 --prefix p")
        .unwrap()
        .add("sub_constants", "")
        .unwrap();
    pipeline.run(&mut config).unwrap();

    insta::assert_snapshot!(config.serialize_to_str(), @r###"
    init:
      fill.fill: level == 1 & p2_level == 1
    plot: level, level
    component <root> (network)
      variables: level, p2_level
      labels: switch, p2_switch
      instance Tank
        var level -> level
        label switch -> switch
        component Tank (base)
          variables: level
          labels: switch
          mode fill
            invariant: level >= 0
            level' = 2 - 1
          mode drain
            invariant: level >= 0
            level' = -1
          transition fill -> drain [switch]
          transition drain -> fill [switch]
      instance p2_Tank
        var level -> p2_level
        label switch -> p2_switch
        component p2_Tank (base)
          variables: level
          labels: switch
          mode fill
            invariant: level >= 0
            level' = 2 - 1
          mode drain
            invariant: level >= 0
            level' = -1
          transition fill -> drain [switch]
          transition drain -> fill [switch]
    "###);
}

#[test]
fn flat_pipeline() {
    let mut config = flat_tank();
    let mut pipeline = PassPipeline::new();
    pipeline
        .add("rename", "level:h:switch:toggle")
        .unwrap()
        .add("pass_identity", "")
        .unwrap()
        .add("shorten", "")
        .unwrap()
        .add("sub_constants", "")
        .unwrap();
    pipeline.run(&mut config).unwrap();

    insta::assert_snapshot!(config.serialize_to_str(), @r###"
    init:
      mode_0: true
    plot: h, h
    component <root> (base)
      variables: h
      labels: toggle
      mode mode_0
        invariant: h >= 0
        h' = 2 - 1
      mode mode_1
        invariant: h >= 0
        h' = -1
      transition mode_0 -> mode_1 [toggle]
        h := h
      transition mode_1 -> mode_0 [toggle]
        h := h
    "###);
}

#[test]
fn pipeline_stops_at_first_error() {
    let mut config = flat_tank();
    let mut pipeline = PassPipeline::new();
    pipeline
        .add("shorten", "")
        .unwrap()
        .add("rename", "a:b:c")
        .unwrap()
        .add("pass_identity", "")
        .unwrap();
    let err = pipeline.run(&mut config).unwrap_err();
    assert!(matches!(err, PassError::CommandLineArgument { .. }), "{err}");
    // the first pass did run, the last one did not
    assert!(config.init.contains_key("mode_0"));
    let base = config.root.root_component().as_base().unwrap();
    assert!(base.transitions.iter().all(|t| t.reset.is_empty()));
}

#[test]
fn every_pass_has_help() {
    for pass in available_passes() {
        let help = pass.param_help();
        assert!(help.contains(pass.command_line_flag()), "{help}");
    }
    assert!(find_pass("copy").unwrap().param_help().contains("--prefix"));
}
