//! Response depth tiers.
//!
//! A depth is a user-selected verbosity tier. Each tier maps to a fixed
//! instruction appended to the system prompt and a completion token ceiling.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Depth {
    Concise,
    Short,
    #[default]
    Medium,
    Large,
}

impl Depth {
    pub const ALL: [Depth; 4] = [Depth::Concise, Depth::Short, Depth::Medium, Depth::Large];

    /// Instruction appended to the system prompt for this tier.
    pub fn instruction(&self) -> &'static str {
        match self {
            Depth::Concise => {
                "Answer in one or two sentences. Give only the essential fact or result, with no preamble."
            }
            Depth::Short => {
                "Answer briefly in a short paragraph or a few bullet points. Skip background unless it is needed."
            }
            Depth::Medium => {
                "Give a complete but focused answer of a few paragraphs. Include a short example when it helps."
            }
            Depth::Large => {
                "Give a thorough, well-structured answer with headings where useful. Cover background, details, examples and caveats."
            }
        }
    }

    /// Maximum completion tokens requested for this tier.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Depth::Concise => 150,
            Depth::Short => 400,
            Depth::Medium => 1000,
            Depth::Large => 2500,
        }
    }

    /// Parse a label, falling back to the default tier for unknown input.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Concise => write!(f, "Concise"),
            Depth::Short => write!(f, "Short"),
            Depth::Medium => write!(f, "Medium"),
            Depth::Large => write!(f, "Large"),
        }
    }
}

impl FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concise" => Ok(Depth::Concise),
            "short" => Ok(Depth::Short),
            "medium" => Ok(Depth::Medium),
            "large" => Ok(Depth::Large),
            other => Err(format!("invalid depth: '{other}'")),
        }
    }
}

// Lenient on the wire: unknown labels select the default tier instead of
// rejecting the whole request.
impl<'de> Deserialize<'de> for Depth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Depth::from_label(&label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_roundtrip() {
        for depth in Depth::ALL {
            let parsed: Depth = depth.to_string().parse().unwrap();
            assert_eq!(depth, parsed);
        }
    }

    #[test]
    fn test_depth_parse_is_case_insensitive() {
        assert_eq!(Depth::from_label("LARGE"), Depth::Large);
        assert_eq!(Depth::from_label(" concise "), Depth::Concise);
    }

    #[test]
    fn test_unknown_depth_falls_back_to_medium() {
        assert_eq!(Depth::from_label("enormous"), Depth::Medium);
        let depth: Depth = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(depth, Depth::Medium);
    }

    #[test]
    fn test_token_ceilings_increase_with_depth() {
        let ceilings: Vec<u32> = Depth::ALL.iter().map(Depth::max_tokens).collect();
        assert!(ceilings.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_each_tier_has_distinct_instruction() {
        let mut seen = std::collections::HashSet::new();
        for depth in Depth::ALL {
            assert!(seen.insert(depth.instruction()));
        }
    }
}
