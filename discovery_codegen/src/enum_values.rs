//! Enum values mined from free-text descriptions.
//!
//! Discovery documents often describe string enums only in prose:
//! `Possible values are: "default" - A regular event. "focusTime" - A focus-time event.`
//! The miner scans such text left to right and yields `(token, sentence)` pairs
//! in the order they occur. Matches never overlap.

use crate::error::CodegenError;
use regress::Regex;

/// Marker a description must contain for its string schema to become an enum.
pub const POSSIBLE_VALUES_MARKER: &str = "Possible values are:";

/// `"TOKEN"`, a run of spaces/hyphens, then a sentence up to and including its period.
const ENUM_VALUE_PATTERN: &str = r#""(\w+)"[ -]+([^\.]+\.)"#;

/// One mined enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedValue {
    pub token: String,
    pub documentation: String,
}

/// Compiled enum value pattern.
#[derive(Debug)]
pub struct EnumMiner {
    pattern: Regex,
}

impl EnumMiner {
    /// Compiles the enum value pattern.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::Pattern` if the pattern fails to compile.
    pub fn new() -> Result<Self, CodegenError> {
        let pattern: Regex =
            Regex::new(ENUM_VALUE_PATTERN).map_err(|e| CodegenError::Pattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// True when `description` announces an enumerated value list.
    #[must_use]
    pub fn applies_to(description: &str) -> bool {
        description.contains(POSSIBLE_VALUES_MARKER)
    }

    /// All `(token, sentence)` pairs in `description`, leftmost first.
    #[must_use]
    pub fn mine(&self, description: &str) -> Vec<MinedValue> {
        self.pattern
            .find_iter(description)
            .filter_map(|m| {
                let token = m.group(1)?;
                let sentence = m.group(2)?;
                Some(MinedValue {
                    token: description[token].to_string(),
                    documentation: description[sentence].trim().to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mine(text: &str) -> Vec<(String, String)> {
        EnumMiner::new()
            .expect("pattern compiles")
            .mine(text)
            .into_iter()
            .map(|v| (v.token, v.documentation))
            .collect()
    }

    #[test]
    fn mines_values_in_text_order() {
        let actual: Vec<(String, String)> =
            mine(r#"Possible values are: "A" - Means A. "B" - Means B."#);
        let expected: Vec<(String, String)> = vec![
            ("A".to_string(), "Means A.".to_string()),
            ("B".to_string(), "Means B.".to_string()),
        ];
        assert_eq!(expected, actual);
    }

    #[test]
    fn mines_multiline_descriptions() {
        let text: &str = "Type of the event. Possible values are:  \n- \"default\" - A regular event or not further specified. \n- \"outOfOffice\" - An out-of-office event. \n- \"focusTime\" - A focus-time event.";
        let actual: Vec<String> = mine(text).into_iter().map(|(token, _)| token).collect();
        let expected: Vec<&str> = vec!["default", "outOfOffice", "focusTime"];
        assert_eq!(expected, actual);
    }

    #[test]
    fn quoted_word_without_sentence_is_skipped() {
        let actual: Vec<(String, String)> = mine(r#"Possible values are: "orphan""#);
        assert!(actual.is_empty(), "a token without a trailing sentence is not a value");
    }

    #[test]
    fn applies_only_with_marker() {
        assert!(EnumMiner::applies_to("Possible values are: \"x\" - X."));
        assert!(!EnumMiner::applies_to("The values are \"x\" - X."));
    }
}
