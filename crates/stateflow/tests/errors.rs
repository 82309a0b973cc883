//! Error taxonomy: every failure aborts the whole directive block

use stateflow::core::StateFlowError;
use stateflow::directive::{parse_all, parse_config, parse_rule};
use stateflow::model::build_model;

fn build_err(text: &str) -> StateFlowError {
    let rule_set = parse_all(text).unwrap();
    build_model(&rule_set).unwrap_err()
}

#[test]
fn test_syntax_errors_embed_line() {
    let line = "@Flow: Ready(Enabled => [ Failed ]";
    match parse_rule(line).unwrap_err() {
        StateFlowError::UnmatchedParenthesis { line: reported } => assert_eq!(reported, line),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = parse_rule("@Flow: Ready => Failed").unwrap_err();
    assert!(err.to_string().contains("@Flow: Ready => Failed"));
}

#[test]
fn test_bracket_errors() {
    assert!(matches!(
        parse_rule("@Flow: A => B, C").unwrap_err(),
        StateFlowError::MissingTargetList { .. }
    ));
    assert!(matches!(
        parse_rule("@Flow: A => []").unwrap_err(),
        StateFlowError::EmptyTargetList { .. }
    ));
}

#[test]
fn test_semantic_errors() {
    assert_eq!(
        parse_rule("@Flow: A => [ B! ]").unwrap_err(),
        StateFlowError::ApprovalWithoutVia {
            mark: '!',
            line: "@Flow: A => [ B! ]".to_string()
        }
    );
    assert!(matches!(
        parse_all("@StateFlow(name=A)\n@StateFlow(name=B)").unwrap_err(),
        StateFlowError::DuplicateConfig { .. }
    ));
    assert!(matches!(
        parse_rule("@Flow: (Enabled) => [ B ]").unwrap_err(),
        StateFlowError::EmptyStateRef { .. }
    ));
    assert_eq!(parse_config("no header here"), Err(StateFlowError::MissingConfig));
}

#[test]
fn test_bad_rule_fails_whole_block() {
    let text = "@StateFlow\n@Flow: A => [ B ]\n@Flow: B => [ C? ]\n@Flow: C => [ A ]";
    assert!(matches!(
        parse_all(text).unwrap_err(),
        StateFlowError::ApprovalWithoutVia { mark: '?', .. }
    ));
}

#[test]
fn test_graph_errors() {
    assert_eq!(build_err("@StateFlow"), StateFlowError::NoPhases);

    let isolated = build_err("@StateFlow\n@Flow: A => [ B ]\n@Flow: C");
    assert_eq!(
        isolated,
        StateFlowError::IsolatedNode {
            stage: "C".to_string()
        }
    );

    let disconnected = build_err(
        "@StateFlow\n@Flow: A => [ B ]\n@Flow: B => [ A ]\n@Flow: C => [ D ]\n@Flow: D => [ C ]",
    );
    assert_eq!(
        disconnected,
        StateFlowError::DisconnectedSubgraph {
            stage: "C".to_string()
        }
    );
    assert!(disconnected.is_graph_error());
}

#[test]
fn test_disconnected_status_cluster() {
    let err = build_err(
        "@StateFlow\n\
         @Flow: Init => [ Ready(Enabled) ]\n\
         @Flow: Ready(Disabled) => [ Failed ]",
    );
    assert_eq!(
        err,
        StateFlowError::DisconnectedSubgraph {
            stage: "Ready(Disabled)".to_string()
        }
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        StateFlowError::NoTransitions { phases: 3 }.to_string(),
        "State flow declares 3 phases but no transitions"
    );
    assert!(StateFlowError::IsolatedNode {
        stage: "Ready(Enabled)".to_string()
    }
    .to_string()
    .contains("Ready(Enabled)"));
}
