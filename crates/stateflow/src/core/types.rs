//! Core type definitions for diagram rendering
//!
//! Character sets and the glyph table the flow renderer draws with.

use std::fmt;

/// Character set for rendering output
///
/// Controls which glyphs are used for junctions, corners and connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CharacterSet {
    /// Pure ASCII: `+` junctions and corners, `|` connectors
    #[default]
    Ascii,
    /// Unicode box-drawing: `┤` junction, `┌ └ ├` corners, `│` connector
    Unicode,
}

impl CharacterSet {
    /// Returns true if this character set uses only ASCII
    pub fn is_ascii(&self) -> bool {
        matches!(self, CharacterSet::Ascii)
    }

    /// Get all valid character set names
    pub fn variants() -> &'static [&'static str] {
        &["ascii", "unicode"]
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterSet::Ascii => write!(f, "ascii"),
            CharacterSet::Unicode => write!(f, "unicode"),
        }
    }
}

impl std::str::FromStr for CharacterSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascii" => Ok(CharacterSet::Ascii),
            "unicode" => Ok(CharacterSet::Unicode),
            _ => Err(format!("Unknown character set: {}", s)),
        }
    }
}

/// Glyphs used by the flow renderer
///
/// Per-node overrides in [`NodeConfig`](crate::diagram::NodeConfig) take
/// precedence over this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    /// Default edge label and the arrow drawn after a parent label
    pub arrow: &'static str,
    /// Drawn on the centre row of an even branch fan-out
    pub junction: char,
    /// Corner in front of the first branch
    pub corner_top: char,
    /// Corner in front of the last branch
    pub corner_bottom: char,
    /// Marker in front of every inner branch
    pub intersection: char,
    /// Connector between branch anchors
    pub vertical: char,
    /// Suffix appended to a node that closes a cycle
    pub loop_marker: &'static str,
    /// Suffix appended to approval intermediate labels
    pub via_suffix: &'static str,
}

impl Symbols {
    pub fn new(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self::ascii(),
            CharacterSet::Unicode => Self::unicode(),
        }
    }

    pub fn ascii() -> Self {
        Self {
            arrow: "-->",
            junction: '+',
            corner_top: '+',
            corner_bottom: '+',
            intersection: '+',
            vertical: '|',
            loop_marker: "🔁",
            via_suffix: "(via)",
        }
    }

    pub fn unicode() -> Self {
        Self {
            arrow: "-->",
            junction: '┤',
            corner_top: '┌',
            corner_bottom: '└',
            intersection: '├',
            vertical: '│',
            loop_marker: "🔁",
            via_suffix: "(via)",
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::ascii()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_character_set_default() {
        assert_eq!(CharacterSet::default(), CharacterSet::Ascii);
        assert!(CharacterSet::Ascii.is_ascii());
        assert!(!CharacterSet::Unicode.is_ascii());
    }

    #[test]
    fn test_character_set_display_and_parse() {
        assert_eq!(CharacterSet::Unicode.to_string(), "unicode");
        assert_eq!(
            CharacterSet::from_str("ASCII").unwrap(),
            CharacterSet::Ascii
        );
        assert!(CharacterSet::from_str("math").is_err());
        assert!(CharacterSet::variants().contains(&"unicode"));
    }

    #[test]
    fn test_symbols_for_style() {
        let ascii = Symbols::new(CharacterSet::Ascii);
        assert_eq!(ascii.junction, '+');
        assert_eq!(ascii.vertical, '|');
        assert_eq!(ascii.arrow, "-->");

        let unicode = Symbols::new(CharacterSet::Unicode);
        assert_eq!(unicode.corner_top, '┌');
        assert_eq!(unicode.vertical, '│');
        assert_eq!(unicode.loop_marker, ascii.loop_marker);
    }
}
