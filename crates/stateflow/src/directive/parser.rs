//! Line parser for `@StateFlow` and `@Flow:` directives
//!
//! Structural splitting (parenthesis balance, top-level comma split and the
//! `via`/`else` clauses) is done here with small depth-tracking scans. The
//! fixed-shape pieces are handed to [`DirectiveGrammar`].

use tracing::{debug, trace};

use super::chumsky_parser::{DirectiveGrammar, Qualifier, RawRef, CONFIG_DIRECTIVE};
use super::rules::{Approval, Config, FlowRule, StageRef, StateRef, TargetRef};
use crate::core::{Result, StateFlowError};

/// Keyword that opens a flow directive
pub const FLOW_DIRECTIVE: &str = "@Flow";

/// Separator between a rule's source and its target list
const RULE_ARROW: &str = "=>";

/// Parse the `@StateFlow` configuration directive found in `text`
///
/// Only the first line carrying the directive is read. Unknown keys are
/// ignored and keys match case-insensitively.
pub fn parse_config(text: &str) -> Result<Config> {
    let start = text
        .find(CONFIG_DIRECTIVE)
        .ok_or(StateFlowError::MissingConfig)?;
    let line = text[start..].lines().next().unwrap_or_default().trim_end();

    let params = DirectiveGrammar::new().parse_header(line).map_err(|e| {
        trace!(error = %e, "Config header rejected by grammar");
        StateFlowError::malformed("expected `@StateFlow(key=value, ...)`", line)
    })?;

    let mut config = Config::default();
    for (key, value) in params {
        match key.to_lowercase().as_str() {
            "name" => config.name = value,
            "output" => config.output = Some(value),
            other => trace!(key = other, "Ignoring unknown @StateFlow parameter"),
        }
    }

    debug!(name = %config.name, output = ?config.output, "Parsed @StateFlow header");
    Ok(config)
}

/// Parse one `@Flow: <source> [=> [ <target>, ... ]]` line
pub fn parse_rule(line: &str) -> Result<FlowRule> {
    let line = line.trim();
    let body = line
        .strip_prefix(FLOW_DIRECTIVE)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| StateFlowError::malformed("expected `@Flow:`", line))?;

    check_parens(body).map_err(|_| StateFlowError::unmatched_parenthesis(line))?;

    let (source_text, targets_text) = match body.find(RULE_ARROW) {
        Some(pos) => (&body[..pos], Some(&body[pos + RULE_ARROW.len()..])),
        None => (body, None),
    };

    let source = parse_source(source_text, line)?;
    let targets = match targets_text {
        Some(text) => parse_target_list(text, line)?,
        None => Vec::new(),
    };

    trace!(source = %source, targets = targets.len(), "Parsed @Flow rule");
    Ok(FlowRule { source, targets })
}

/// Verify that every `)` closes an earlier `(` and nothing is left open
fn check_parens(text: &str) -> std::result::Result<(), usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or(idx)?,
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(text.len())
    }
}

/// Split on `sep` wherever it appears outside parentheses
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_raw(text: &str, line: &str) -> Result<RawRef> {
    DirectiveGrammar::new().parse_ref(text).map_err(|e| {
        trace!(error = %e, fragment = text, "Stage reference rejected by grammar");
        StateFlowError::malformed(format!("invalid state reference `{}`", text.trim()), line)
    })
}

fn parse_source(text: &str, line: &str) -> Result<StateRef> {
    let raw = parse_raw(text, line)?;
    let Some(phase) = raw.phase else {
        return Err(StateFlowError::empty_state_ref(line));
    };

    match raw.qualifier {
        None => Ok(StateRef::new(phase)),
        Some(Qualifier::Status(status)) => Ok(StateRef::with_status(phase, status)),
        Some(Qualifier::Wildcard) => Ok(StateRef::wildcard(phase)),
        Some(Qualifier::Same) => Err(StateFlowError::malformed(
            "`(=)` is only valid as a target",
            line,
        )),
    }
}

/// Parse a `via`/`else` clause reference: `Phase` or `Phase(Status)`
fn parse_stage_ref(text: &str, clause: &str, line: &str) -> Result<StageRef> {
    let raw = parse_raw(text, line)?;
    if raw.is_empty() {
        return Err(StateFlowError::empty_state_ref(line));
    }

    match (raw.phase, raw.qualifier) {
        (Some(phase), None) => Ok(StageRef::new(phase, None)),
        (Some(phase), Some(Qualifier::Status(status))) => Ok(StageRef::new(phase, Some(&status))),
        _ => Err(StateFlowError::malformed(
            format!("`{}` expects `Phase` or `Phase(Status)`", clause),
            line,
        )),
    }
}

fn parse_target_list(text: &str, line: &str) -> Result<Vec<TargetRef>> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| StateFlowError::MissingTargetList {
            line: line.to_string(),
        })?;

    if inner.trim().is_empty() {
        return Err(StateFlowError::EmptyTargetList {
            line: line.to_string(),
        });
    }

    split_top_level(inner, ',')
        .into_iter()
        .map(|token| parse_target(token.trim(), line))
        .collect()
}

fn strip_mark(text: &str) -> (&str, Approval) {
    let text = text.trim_end();
    if let Some(rest) = text.strip_suffix('!') {
        (rest.trim_end(), Approval::Required)
    } else if let Some(rest) = text.strip_suffix('?') {
        (rest.trim_end(), Approval::Optional)
    } else {
        (text, Approval::None)
    }
}

/// Split off the last top-level ` <keyword> <rest>` clause
fn split_clause<'a>(text: &'a str, keyword: &str) -> (&'a str, Option<&'a str>) {
    for (idx, _) in text.rmatch_indices(keyword) {
        let before = &text[..idx];
        let after = &text[idx + keyword.len()..];
        let bounded = before.ends_with(char::is_whitespace) && after.starts_with(char::is_whitespace);
        if bounded && check_parens(before).is_ok() {
            return (before.trim_end(), Some(after.trim()));
        }
    }
    (text, None)
}

fn parse_target(token: &str, line: &str) -> Result<TargetRef> {
    if token.is_empty() {
        return Err(StateFlowError::empty_state_ref(line));
    }

    // A mark may close the whole token: `Deleted via Archiving!`
    let (rest, trailing) = strip_mark(token);
    let (rest, else_text) = split_clause(rest, "else");
    let (rest, via_text) = split_clause(rest, "via");
    let (main, inline) = strip_mark(rest);

    let approval = match (inline, trailing) {
        (Approval::None, mark) | (mark, Approval::None) => mark,
        (a, b) if a == b => a,
        _ => {
            return Err(StateFlowError::malformed(
                "`!` and `?` are mutually exclusive",
                line,
            ))
        }
    };

    let via = via_text
        .map(|text| parse_stage_ref(text, "via", line))
        .transpose()?;
    let else_ = else_text
        .map(|text| parse_stage_ref(text, "else", line))
        .transpose()?;

    if let (Some(mark), None) = (approval.mark(), &via) {
        return Err(StateFlowError::ApprovalWithoutVia {
            mark,
            line: line.to_string(),
        });
    }

    let raw = parse_raw(main, line)?;
    let mut target = match (raw.phase, raw.qualifier) {
        (None, None) => return Err(StateFlowError::empty_state_ref(line)),
        (None, Some(Qualifier::Same)) => TargetRef::same(),
        (None, Some(Qualifier::Status(status))) => TargetRef::status_only(status),
        (Some(phase), None) => TargetRef::phase(phase),
        (Some(phase), Some(Qualifier::Status(status))) => TargetRef {
            phase: Some(phase),
            status: Some(status),
            ..Default::default()
        },
        (_, Some(Qualifier::Wildcard)) => {
            return Err(StateFlowError::malformed(
                "wildcard `(*)` is only valid on a source",
                line,
            ))
        }
        (Some(_), Some(Qualifier::Same)) => {
            return Err(StateFlowError::malformed("`(=)` takes no phase", line))
        }
    };

    target.approval = approval;
    target.via = via;
    target.else_ = else_;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_name() {
        let config = parse_config(r#"@StateFlow(name="Server")"#).unwrap();
        assert_eq!(config.name, "Server");
        assert_eq!(config.output, None);
    }

    #[test]
    fn test_parse_config_keys_case_insensitive() {
        let config =
            parse_config("@StateFlow(NAME=Server, Output=`gen/server.go`, flavor=x)").unwrap();
        assert_eq!(config.name, "Server");
        assert_eq!(config.output.as_deref(), Some("gen/server.go"));
    }

    #[test]
    fn test_parse_config_without_params() {
        assert_eq!(parse_config("@StateFlow").unwrap(), Config::default());
        assert_eq!(parse_config("@StateFlow()").unwrap().name, "");
    }

    #[test]
    fn test_parse_config_missing() {
        assert_eq!(
            parse_config("@Flow: Init").unwrap_err(),
            StateFlowError::MissingConfig
        );
    }

    #[test]
    fn test_parse_config_malformed() {
        let err = parse_config("@StateFlow(name=)").unwrap_err();
        assert!(matches!(err, StateFlowError::MalformedDirective { .. }));
    }

    #[test]
    fn test_parse_rule_full_target() {
        let rule =
            parse_rule("@Flow: Ready(Enabled) => [ Created! via Updating else Failed ]").unwrap();
        assert_eq!(rule.source, StateRef::with_status("Ready", "Enabled"));
        assert_eq!(rule.targets.len(), 1);

        let target = &rule.targets[0];
        assert_eq!(target.phase.as_deref(), Some("Created"));
        assert!(target.approval_required());
        assert!(!target.approval_optional());
        assert_eq!(target.via, Some(StageRef::new("Updating", None)));
        assert_eq!(target.else_, Some(StageRef::new("Failed", None)));
    }

    #[test]
    fn test_parse_rule_without_targets() {
        let rule = parse_rule("@Flow: Init").unwrap();
        assert_eq!(rule.source, StateRef::new("Init"));
        assert!(rule.targets.is_empty());
    }

    #[test]
    fn test_parse_rule_target_forms() {
        let rule =
            parse_rule("@Flow: Ready(*) => [ (=), (Disabled), Deleted, Ready(Enabled) ]").unwrap();
        assert!(rule.source.wildcard);
        assert_eq!(
            rule.targets,
            vec![
                TargetRef::same(),
                TargetRef::status_only("Disabled"),
                TargetRef::phase("Deleted"),
                TargetRef {
                    phase: Some("Ready".to_string()),
                    status: Some("Enabled".to_string()),
                    ..Default::default()
                },
            ]
        );
    }

    #[test]
    fn test_parse_rule_via_with_status() {
        let rule = parse_rule("@Flow: Draft => [ Published? via Review(Pending) ]").unwrap();
        let target = &rule.targets[0];
        assert!(target.approval_optional());
        assert_eq!(target.via, Some(StageRef::new("Review", Some("Pending"))));
        assert_eq!(target.else_, None);
    }

    #[test]
    fn test_parse_rule_mark_after_clause() {
        let rule = parse_rule("@Flow: Ready => [ Deleted via Archiving! ]").unwrap();
        assert!(rule.targets[0].approval_required());
        assert_eq!(rule.targets[0].via, Some(StageRef::new("Archiving", None)));
    }

    #[test]
    fn test_parse_rule_conflicting_marks() {
        let err = parse_rule("@Flow: Ready => [ Deleted! via Archiving? ]").unwrap_err();
        assert!(matches!(err, StateFlowError::MalformedDirective { .. }));
    }

    #[test]
    fn test_parse_rule_phase_names_containing_keywords() {
        let rule = parse_rule("@Flow: Deviation => [ Elsewhere ]").unwrap();
        assert_eq!(rule.source, StateRef::new("Deviation"));
        assert_eq!(rule.targets, vec![TargetRef::phase("Elsewhere")]);
    }

    #[test]
    fn test_parse_rule_errors() {
        assert!(matches!(
            parse_rule("@Flow: Ready(Enabled => [ A ]").unwrap_err(),
            StateFlowError::UnmatchedParenthesis { .. }
        ));
        assert!(matches!(
            parse_rule("@Flow: Ready => A").unwrap_err(),
            StateFlowError::MissingTargetList { .. }
        ));
        assert!(matches!(
            parse_rule("@Flow: Ready => [  ]").unwrap_err(),
            StateFlowError::EmptyTargetList { .. }
        ));
        assert!(matches!(
            parse_rule("@Flow:  => [ A ]").unwrap_err(),
            StateFlowError::EmptyStateRef { .. }
        ));
        assert!(matches!(
            parse_rule("@Flow: A => [ B, , C ]").unwrap_err(),
            StateFlowError::EmptyStateRef { .. }
        ));
        assert!(matches!(
            parse_rule("@Flow A => [ B ]").unwrap_err(),
            StateFlowError::MalformedDirective { .. }
        ));
        assert!(matches!(
            parse_rule("@Flow: A => [ B(*) ]").unwrap_err(),
            StateFlowError::MalformedDirective { .. }
        ));
    }

    #[test]
    fn test_approval_without_via_names_mark() {
        let err = parse_rule("@Flow: Draft => [ Published? ]").unwrap_err();
        assert_eq!(
            err,
            StateFlowError::ApprovalWithoutVia {
                mark: '?',
                line: "@Flow: Draft => [ Published? ]".to_string(),
            }
        );
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("A(x, y), B , C", ','),
            vec!["A(x, y)", " B ", " C"]
        );
        assert_eq!(split_top_level("", ','), vec![""]);
    }

    #[test]
    fn test_check_parens() {
        assert!(check_parens("A(B)").is_ok());
        assert!(check_parens("A(B").is_err());
        assert!(check_parens("A)B(").is_err());
    }
}
