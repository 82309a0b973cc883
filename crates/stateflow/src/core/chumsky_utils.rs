//! Shared chumsky parser utilities for directive parsing
//!
//! Common combinators used by the `@StateFlow` header grammar and the
//! stage-reference grammar.

use chumsky::prelude::*;

/// Parse inline whitespace only (spaces and tabs, no newlines).
///
/// Uses explicit character matching to avoid the "repeated combinator making
/// no progress" issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse a symbolic name: a phase, a status or a parameter key.
pub fn symbol_name<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .collect::<String>()
}

/// Parse a value wrapped in `quote` characters, returning the inner text.
pub fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, String> + Clone {
    just(quote)
        .ignore_then(none_of(quote).repeated().collect::<String>())
        .then_ignore(just(quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_whitespace() {
        let parser = inline_whitespace().then(just("test")).then_ignore(end());
        assert!(parser.parse("test").into_result().is_ok());
        assert!(parser.parse(" \ttest").into_result().is_ok());
        // Should NOT consume newlines
        assert!(parser.parse("\ntest").into_result().is_err());
    }

    #[test]
    fn test_symbol_name() {
        let parser = symbol_name().then_ignore(end());
        assert_eq!(
            parser.parse("Ready_2").into_result().ok(),
            Some("Ready_2".to_string())
        );
        assert!(parser.parse("").into_result().is_err());
        assert!(parser.parse("Ready(").into_result().is_err());
    }

    #[test]
    fn test_quoted() {
        let parser = quoted('`').then_ignore(end());
        assert_eq!(
            parser.parse("`gen/flow.go`").into_result().ok(),
            Some("gen/flow.go".to_string())
        );
        assert!(parser.parse("`open").into_result().is_err());
    }
}
