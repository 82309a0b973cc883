//! Directive block scanner
//!
//! Walks a comment block line by line, strips comment leaders and hands
//! directive lines to the line parser.

use tracing::{debug, info_span, trace};

use super::chumsky_parser::CONFIG_DIRECTIVE;
use super::parser::{parse_config, parse_rule, FLOW_DIRECTIVE};
use super::rules::{Config, RuleSet};
use crate::core::{Result, StateFlowError};

/// Leaders stripped from lines outside a `/* ... */` block, longest first
const LINE_LEADERS: [&str; 5] = ["///", "//!", "//", "#", "*"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScanState {
    #[default]
    Outside,
    InBlock,
}

/// Comment-leader stripper that remembers whether it is inside `/* */`
#[derive(Debug, Default)]
struct CommentScanner {
    state: ScanState,
}

impl CommentScanner {
    fn strip<'a>(&mut self, raw: &'a str) -> &'a str {
        let mut line = raw.trim();

        if self.state == ScanState::Outside {
            if let Some(rest) = line.strip_prefix("/*") {
                self.state = ScanState::InBlock;
                line = rest
                    .strip_prefix('*')
                    .filter(|r| !r.starts_with('/'))
                    .unwrap_or(rest)
                    .trim_start();
            } else {
                return LINE_LEADERS
                    .iter()
                    .find_map(|leader| line.strip_prefix(leader))
                    .map(str::trim_start)
                    .unwrap_or(line);
            }
        } else if let Some(rest) = line.strip_prefix('*').filter(|r| !r.starts_with('/')) {
            line = rest.trim_start();
        }

        if let Some(pos) = line.find("*/") {
            self.state = ScanState::Outside;
            line = line[..pos].trim_end();
        }
        line
    }
}

/// `line` opens with `keyword` as a whole word, so `@Flowchart` prose is
/// not mistaken for `@Flow`
fn is_directive(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .and_then(|rest| rest.chars().next())
        .map_or(line == keyword, |next| !(next.is_alphanumeric() || next == '_'))
}

/// Parse a whole directive block: at most one `@StateFlow` header and any
/// number of `@Flow:` rules, in source order
///
/// A block without a header gets [`Config::default`]; the caller supplies
/// the name through [`Config::name_or`].
pub fn parse_all(text: &str) -> Result<RuleSet> {
    let span = info_span!("parse_all", input_len = text.len());
    let _enter = span.enter();

    let mut scanner = CommentScanner::default();
    let mut config: Option<Config> = None;
    let mut rules = Vec::new();

    for raw in text.lines() {
        let line = scanner.strip(raw);

        if is_directive(line, CONFIG_DIRECTIVE) {
            if config.is_some() {
                return Err(StateFlowError::DuplicateConfig {
                    line: line.to_string(),
                });
            }
            config = Some(parse_config(line)?);
        } else if is_directive(line, FLOW_DIRECTIVE) {
            rules.push(parse_rule(line)?);
        } else if !line.is_empty() {
            trace!(line, "Skipping non-directive line");
        }
    }

    if config.is_none() {
        debug!("No @StateFlow header in block, using defaults");
    }
    debug!(rules = rules.len(), "Parsed directive block");

    Ok(RuleSet {
        config: config.unwrap_or_default(),
        rules,
    })
}
