use serde::Deserialize;

use crate::dialect::{self, Dialect};
use crate::error::ScanlineError;
use crate::style::ColorScheme;

/// Settings holds all scanner and front-end configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_dialect")]
    pub dialect_name: String,

    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,

    /// Fail on incomplete statements and diagnostics.
    #[serde(default)]
    pub check: bool,

    /// Print files with syntax highlighting.
    #[serde(default)]
    pub highlight: bool,

    /// Glob patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub no_color: bool,

    #[serde(default)]
    pub force_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[serde(default)]
    pub threads: usize,

    #[serde(default)]
    pub single_process: bool,

    /// Overrides the dialect's shell command prefix.
    #[serde(default)]
    pub command_prefix: Option<char>,
}

fn default_dialect() -> String {
    "default".to_string()
}
fn default_color_scheme() -> String {
    "dark".to_string()
}

impl Settings {
    /// Create the dialect for the configured dialect_name.
    pub fn dialect(&self) -> Result<Dialect, ScanlineError> {
        let dialect = dialect::dialect_from_name(&self.dialect_name)?;
        match self.command_prefix {
            Some(prefix) => Ok(dialect.with_command_prefix(prefix)),
            None => Ok(dialect),
        }
    }

    pub fn color_scheme(&self) -> Result<ColorScheme, ScanlineError> {
        ColorScheme::from_name(&self.color_scheme)
    }

    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        if self.force_color {
            return true;
        }
        if self.no_color {
            return false;
        }
        std::env::var_os("NO_COLOR").is_none()
    }

    /// SQL script extensions to process.
    pub fn sql_extensions(&self) -> &[&str] {
        &["sql", "ddl", "dml"]
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dialect_name: default_dialect(),
            color_scheme: default_color_scheme(),
            check: false,
            highlight: false,
            exclude: Vec::new(),
            verbose: false,
            quiet: false,
            no_color: false,
            force_color: false,
            threads: 0,
            single_process: false,
            command_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.dialect_name, "default");
        assert_eq!(settings.color_scheme, "dark");
        assert!(!settings.check);
        assert!(!settings.highlight);
        assert_eq!(settings.command_prefix, None);
    }

    #[test]
    fn test_dialect_creation() {
        let settings = Settings::default();
        assert_eq!(settings.dialect().unwrap().name(), "default");

        let mut oracle = Settings::default();
        oracle.dialect_name = "oracle".to_string();
        assert!(oracle.dialect().unwrap().procedural_block().is_some());

        let mut bad = Settings::default();
        bad.dialect_name = "cobol".to_string();
        assert!(bad.dialect().is_err());
    }

    #[test]
    fn test_command_prefix_override() {
        let mut settings = Settings::default();
        settings.command_prefix = Some('\\');
        assert_eq!(settings.dialect().unwrap().command_prefix(), '\\');
    }

    #[test]
    fn test_color_logic() {
        let mut settings = Settings::default();
        settings.no_color = true;
        assert!(!settings.color());

        settings.force_color = true;
        assert!(settings.color()); // force_color overrides no_color
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: Settings = toml::from_str("dialect_name = \"mysql\"\ncheck = true\n").unwrap();
        assert_eq!(settings.dialect_name, "mysql");
        assert!(settings.check);
        assert_eq!(settings.color_scheme, "dark");
    }
}
