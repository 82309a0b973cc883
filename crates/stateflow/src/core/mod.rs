//! Core abstractions shared by the directive parser, model builder and
//! diagram renderer.

pub mod chumsky_utils;
mod database;
mod error;
pub mod logging;
mod renderer;
mod text;
mod types;

pub use database::*;
pub use error::*;
pub use logging::*;
pub use renderer::*;
pub use text::*;
pub use types::*;
