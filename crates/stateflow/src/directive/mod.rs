//! Directive parsing
//!
//! Turns `@StateFlow(...)` and `@Flow:` comment lines into a [`RuleSet`].
//!
//! ```text
//! @StateFlow(name="Server")
//! @Flow: Init           => [ Provisioning ]
//! @Flow: Provisioning   => [ Ready(Enabled), Failed ]
//! @Flow: Ready(Enabled) => [ (Disabled)! via Updating ]
//! @Flow: Ready(*)       => [ Deleted! via Archiving else Failed ]
//! ```

mod chumsky_parser;
mod parser;
mod rules;
mod scanner;

pub use chumsky_parser::{DirectiveGrammar, Qualifier, RawRef, CONFIG_DIRECTIVE};
pub use parser::{parse_config, parse_rule, split_top_level, FLOW_DIRECTIVE};
pub use rules::*;
pub use scanner::parse_all;
