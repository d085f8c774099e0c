//! Safe identifiers for API field, parameter and component names.
//!
//! An [`Identifier`] pairs the name used in generated code with the original
//! wire name. The two only diverge when the wire name is a reserved word of the
//! output language, in which case the code name gets a `__` suffix and
//! renderers carry the wire name as serialization metadata.

use heck::ToUpperCamelCase;

/// Strict, reserved and edition-specific keywords of the Rust output language.
const RESERVED_WORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Suffix appended to names colliding with a reserved word.
pub const COLLISION_SUFFIX: &str = "__";

/// Returns true if `name` is a reserved word of the output language.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// A language-safe identifier plus the name it has on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    name: String,
    wire_name: String,
}

impl Identifier {
    /// Resolves a raw API name into an identifier, suffixing reserved words.
    #[must_use]
    pub fn resolve(raw_name: &str) -> Self {
        let name: String = if is_reserved(raw_name) {
            format!("{raw_name}{COLLISION_SUFFIX}")
        } else {
            raw_name.to_string()
        };
        Self {
            name,
            wire_name: raw_name.to_string(),
        }
    }

    /// The name to use in generated code.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original name used on the wire.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// True when the code name differs from the wire name.
    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.name != self.wire_name
    }

    /// Derives a type name from this (lower-camel) field name.
    ///
    /// `"attendees"` -> `"Attendees"`, `"timeZone"` -> `"TimeZone"`.
    #[must_use]
    pub fn to_type_name(&self) -> String {
        let type_name: String = self.wire_name.to_upper_camel_case();
        if is_reserved(&type_name) {
            format!("{type_name}{COLLISION_SUFFIX}")
        } else {
            type_name
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_word_gets_suffix_and_keeps_wire_name() {
        for keyword in ["type", "move", "self", "async", "match"] {
            let actual: Identifier = Identifier::resolve(keyword);
            assert_eq!(format!("{keyword}__"), actual.name());
            assert_eq!(keyword, actual.wire_name());
            assert!(actual.is_renamed(), "{keyword} must be marked as renamed");
        }
    }

    #[test]
    fn non_reserved_name_is_unchanged() {
        for name in ["calendarId", "maxResults", "kind", "Type", "timeZone"] {
            let actual: Identifier = Identifier::resolve(name);
            assert_eq!(name, actual.name());
            assert_eq!(name, actual.wire_name());
            assert!(!actual.is_renamed());
        }
    }

    #[test]
    fn to_type_name_converts_lower_camel_to_upper_camel() {
        let actual: String = Identifier::resolve("conferenceData").to_type_name();
        let expected: &str = "ConferenceData";
        assert_eq!(expected, actual);
    }

    #[test]
    fn to_type_name_of_keyword_uses_wire_name() {
        let actual: String = Identifier::resolve("move").to_type_name();
        let expected: &str = "Move";
        assert_eq!(expected, actual);
    }

    #[test]
    fn to_type_name_never_yields_a_keyword() {
        let actual: String = Identifier::resolve("self").to_type_name();
        let expected: &str = "Self__";
        assert_eq!(expected, actual);
    }
}
