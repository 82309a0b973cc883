//! Directive grammar using chumsky
//!
//! Covers the fixed-shape pieces of the DSL: the `@StateFlow(...)` header
//! with its `key=value` list, and single stage references such as
//! `Ready`, `Ready(Enabled)`, `Ready(*)`, `(Disabled)` or `(=)`.
//! Splitting a directive into those pieces happens in the line parser.

use crate::core::chumsky_utils::{inline_whitespace, quoted, symbol_name};
use anyhow::Result;
use chumsky::prelude::*;

/// Keyword that opens a configuration directive
pub const CONFIG_DIRECTIVE: &str = "@StateFlow";

/// Parenthesised qualifier following an optional phase name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// `(*)`
    Wildcard,
    /// `(=)`
    Same,
    /// `(Status)`
    Status(String),
}

/// A stage reference before it is checked against its context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRef {
    pub phase: Option<String>,
    pub qualifier: Option<Qualifier>,
}

impl RawRef {
    pub fn is_empty(&self) -> bool {
        self.phase.is_none() && self.qualifier.is_none()
    }
}

/// Chumsky-based grammar for directive fragments
pub struct DirectiveGrammar;

impl DirectiveGrammar {
    pub fn new() -> Self {
        Self
    }

    /// Parse one stage reference, surrounding whitespace allowed
    pub fn parse_ref(&self, input: &str) -> Result<RawRef> {
        let parser = inline_whitespace()
            .ignore_then(Self::stage_ref_parser())
            .then_ignore(inline_whitespace())
            .then_ignore(end());

        parser
            .parse(input)
            .into_result()
            .map_err(|errors| anyhow::anyhow!("Parse errors: {:?}", errors))
    }

    /// Parse a `@StateFlow` header into its raw `(key, value)` pairs
    ///
    /// Keys are returned as written; callers match them case-insensitively.
    pub fn parse_header(&self, input: &str) -> Result<Vec<(String, String)>> {
        let parser = inline_whitespace()
            .ignore_then(just(CONFIG_DIRECTIVE))
            .ignore_then(inline_whitespace())
            .ignore_then(Self::param_list_parser().or_not())
            .then_ignore(inline_whitespace())
            .then_ignore(end())
            .map(|params| params.unwrap_or_default());

        parser
            .parse(input)
            .into_result()
            .map_err(|errors| anyhow::anyhow!("Parse errors: {:?}", errors))
    }

    fn qualifier_parser<'src>() -> impl Parser<'src, &'src str, Qualifier> + Clone {
        let inner = just('*')
            .to(Qualifier::Wildcard)
            .or(just('=').to(Qualifier::Same))
            .or(symbol_name().map(Qualifier::Status));

        just('(')
            .ignore_then(inner.padded_by(inline_whitespace()))
            .then_ignore(just(')'))
    }

    fn stage_ref_parser<'src>() -> impl Parser<'src, &'src str, RawRef> + Clone {
        symbol_name()
            .or_not()
            .then_ignore(inline_whitespace())
            .then(Self::qualifier_parser().or_not())
            .map(|(phase, qualifier)| RawRef { phase, qualifier })
    }

    /// Parse a parameter value: `"double"`, `` `back` `` or bare
    fn value_parser<'src>() -> impl Parser<'src, &'src str, String> + Clone {
        let bare = none_of(",) \t\"`")
            .repeated()
            .at_least(1)
            .collect::<String>();

        quoted('"').or(quoted('`')).or(bare)
    }

    /// Parse `(key=value, key=value)`; an empty list is allowed
    fn param_list_parser<'src>() -> impl Parser<'src, &'src str, Vec<(String, String)>> + Clone {
        let param = symbol_name()
            .then_ignore(just('=').padded_by(inline_whitespace()))
            .then(Self::value_parser())
            .padded_by(inline_whitespace());

        just('(')
            .ignore_then(inline_whitespace())
            .ignore_then(param.separated_by(just(',')).collect::<Vec<_>>())
            .then_ignore(inline_whitespace())
            .then_ignore(just(')'))
    }
}

impl Default for DirectiveGrammar {
    fn default() -> Self {
        Self::new()
    }
}
