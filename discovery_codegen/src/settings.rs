//! Settings for discovery code generation.

use crate::error::CodegenError;
use std::path::PathBuf;
use std::str::FromStr;

/// Settings that control code generation and output.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// Dotted package every API's package is nested in.
    ///
    /// **Default: `generated`.**
    pub base_package: String,

    /// Directory generated sources are written to.
    ///
    /// **Default: `generated`.**
    pub output_dir: PathBuf,

    /// Path of the client runtime crate referenced by rendered code.
    ///
    /// **Default: `discovery_runtime`.**
    pub runtime_crate: String,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            base_package: "generated".to_string(),
            output_dir: PathBuf::from("generated"),
            runtime_crate: "discovery_runtime".to_string(),
        }
    }
}

impl GenerateSettings {
    /// Segments of [`Self::base_package`], skipping empty ones.
    #[must_use]
    pub fn base_package_segments(&self) -> Vec<String> {
        self.base_package
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// One API to generate, as `name:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiSelector {
    pub name: String,
    pub version: String,
}

impl FromStr for ApiSelector {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, version)) = s.split_once(':') else {
            return Err(CodegenError::InvalidApiSelector(s.to_string()));
        };
        let (name, version): (&str, &str) = (name.trim(), version.trim());
        if name.is_empty() || version.is_empty() || version.contains(':') {
            return Err(CodegenError::InvalidApiSelector(s.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl std::fmt::Display for ApiSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_version() {
        let actual: ApiSelector = "calendar:v3".parse().expect("valid selector");
        let expected: ApiSelector = ApiSelector {
            name: "calendar".to_string(),
            version: "v3".to_string(),
        };
        assert_eq!(expected, actual);
        assert_eq!("calendar:v3", actual.to_string());
    }

    #[test]
    fn rejects_malformed_selectors() {
        for input in ["calendar", ":v3", "calendar:", "a:b:c", ""] {
            let result: Result<ApiSelector, CodegenError> = input.parse();
            assert!(
                matches!(result, Err(CodegenError::InvalidApiSelector(_))),
                "{input:?} must be rejected"
            );
        }
    }

    #[test]
    fn base_package_segments_skip_empty_parts() {
        let settings: GenerateSettings = GenerateSettings {
            base_package: "info..google.".to_string(),
            ..GenerateSettings::default()
        };
        let actual: Vec<String> = settings.base_package_segments();
        let expected: Vec<&str> = vec!["info", "google"];
        assert_eq!(expected, actual);
    }
}
