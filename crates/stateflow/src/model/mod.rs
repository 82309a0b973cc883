//! State model construction and validation
//!
//! [`build_model`] turns a [`RuleSet`](crate::directive::RuleSet) into a
//! validated, immutable [`StateModel`].

mod builder;
mod stage;
mod state_model;
mod validate;

pub use builder::{build_model, build_model_from};
pub use stage::{Stage, Transition};
pub use state_model::StateModel;
pub use validate::validate_model;
