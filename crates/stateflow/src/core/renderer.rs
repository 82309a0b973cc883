//! Renderer trait

use super::{CharacterSet, Database, Result};

/// Turns the graph held by a [`Database`] into text
pub trait Renderer<D: Database>: Send + Sync {
    type Output;

    fn render(&self, database: &D) -> Result<Self::Output>;

    fn name(&self) -> &'static str;

    /// Glyph set used for connectors
    fn character_set(&self) -> CharacterSet;
}
