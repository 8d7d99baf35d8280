use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ScanlineError;
use crate::settings::Settings;

const CONFIG_FILE: &str = "sqlscan.toml";

/// Load sqlscan configuration.
/// Searches parent directories of the inputs for sqlscan.toml or
/// pyproject.toml, then the user config directory.
pub fn load_config(files: &[PathBuf], config_path: Option<&Path>) -> Result<Settings, ScanlineError> {
    let mut settings = Settings::default();

    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(ScanlineError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(files).or_else(user_config_file),
    };

    if let Some(path) = config_file {
        debug!("loading config from {}", path.display());
        let raw = load_config_from_path(&path)?;
        apply_config(&mut settings, &raw)?;
    }

    Ok(settings)
}

/// Search for a config file in the common parent directories of the given files.
fn find_config_file(files: &[PathBuf]) -> Option<PathBuf> {
    let parents = get_common_parents(files);
    for parent in parents {
        let config = parent.join(CONFIG_FILE);
        if config.exists() {
            return Some(config);
        }
        let config = parent.join("pyproject.toml");
        if config.exists() && has_tool_section(&config) {
            return Some(config);
        }
    }
    None
}

fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("sqlscan").join(CONFIG_FILE);
    path.exists().then_some(path)
}

/// A pyproject.toml without `[tool.sqlscan]` does not stop the search.
fn has_tool_section(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| toml::from_str::<toml::Table>(&content).ok())
        .is_some_and(|parsed| parsed.get("tool").and_then(|t| t.get("sqlscan")).is_some())
}

/// Get the common parent directories of the given file paths, ordered
/// from most specific to least specific.
fn get_common_parents(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for file in files {
        let parent = if file.is_dir() {
            file.clone()
        } else {
            file.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        // Walk up to root
        let mut current = Some(parent.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Load and parse a TOML config file.
fn load_config_from_path(path: &Path) -> Result<HashMap<String, toml::Value>, ScanlineError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: toml::Table = toml::from_str(&content)
        .map_err(|e| ScanlineError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    // [tool.sqlscan] in pyproject.toml, top-level keys in sqlscan.toml
    let section = match parsed.get("tool").and_then(|t| t.get("sqlscan")) {
        Some(toml::Value::Table(table)) => Some(table),
        Some(_) => None,
        None if path.file_name().is_some_and(|n| n == CONFIG_FILE) => Some(&parsed),
        None => None,
    };

    let mut map = HashMap::new();
    if let Some(table) = section {
        for (k, v) in table {
            map.insert(k.to_lowercase().replace('-', "_"), v.clone());
        }
    }
    Ok(map)
}

fn expect_str<'a>(key: &str, value: &'a toml::Value) -> Result<&'a str, ScanlineError> {
    value
        .as_str()
        .ok_or_else(|| ScanlineError::Config(format!("{} must be a string", key)))
}

fn expect_bool(key: &str, value: &toml::Value) -> Result<bool, ScanlineError> {
    value
        .as_bool()
        .ok_or_else(|| ScanlineError::Config(format!("{} must be a boolean", key)))
}

/// Apply configuration values to Settings.
fn apply_config(settings: &mut Settings, config: &HashMap<String, toml::Value>) -> Result<(), ScanlineError> {
    for (key, value) in config {
        match key.as_str() {
            "dialect" | "dialect_name" => settings.dialect_name = expect_str(key, value)?.to_string(),
            "color_scheme" => settings.color_scheme = expect_str(key, value)?.to_string(),
            "exclude" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| ScanlineError::Config("exclude must be an array".to_string()))?;
                settings.exclude = arr
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect();
            }
            "check" => settings.check = expect_bool(key, value)?,
            "highlight" => settings.highlight = expect_bool(key, value)?,
            "verbose" => settings.verbose = expect_bool(key, value)?,
            "quiet" => settings.quiet = expect_bool(key, value)?,
            "no_color" => settings.no_color = expect_bool(key, value)?,
            "force_color" => settings.force_color = expect_bool(key, value)?,
            "single_process" => settings.single_process = expect_bool(key, value)?,
            "threads" => {
                let n = value
                    .as_integer()
                    .filter(|n| *n >= 0)
                    .ok_or_else(|| ScanlineError::Config("threads must be a non-negative integer".to_string()))?;
                settings.threads = n as usize;
            }
            "command_prefix" => {
                let s = expect_str(key, value)?;
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => settings.command_prefix = Some(c),
                    _ => {
                        return Err(ScanlineError::Config(
                            "command_prefix must be a single character".to_string(),
                        ))
                    }
                }
            }
            _ => {
                return Err(ScanlineError::Config(format!(
                    "Unknown config option: {}",
                    key
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_config() {
        let mut settings = Settings::default();
        let mut config = HashMap::new();
        config.insert(
            "dialect".to_string(),
            toml::Value::String("postgresql".to_string()),
        );
        config.insert(
            "color_scheme".to_string(),
            toml::Value::String("solarized".to_string()),
        );
        config.insert("threads".to_string(), toml::Value::Integer(4));

        apply_config(&mut settings, &config).unwrap();
        assert_eq!(settings.dialect_name, "postgresql");
        assert_eq!(settings.color_scheme, "solarized");
        assert_eq!(settings.threads, 4);
    }

    #[test]
    fn test_unknown_config_key_error() {
        let mut settings = Settings::default();
        let mut config = HashMap::new();
        config.insert("line_length".to_string(), toml::Value::Integer(88));

        assert!(apply_config(&mut settings, &config).is_err());
    }

    #[test]
    fn test_wrong_type_is_error() {
        let mut settings = Settings::default();
        let mut config = HashMap::new();
        config.insert("check".to_string(), toml::Value::String("yes".to_string()));
        assert!(apply_config(&mut settings, &config).is_err());

        let mut config = HashMap::new();
        config.insert(
            "command_prefix".to_string(),
            toml::Value::String("!!".to_string()),
        );
        assert!(apply_config(&mut settings, &config).is_err());
    }

    #[test]
    fn test_load_sqlscan_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("sqlscan.toml"),
            "dialect = \"oracle\"\ncommand-prefix = \"\\\\\"\n",
        )
        .unwrap();
        let file = dir.path().join("a.sql");
        std::fs::write(&file, "select 1;").unwrap();

        let settings = load_config(&[file], None).unwrap();
        assert_eq!(settings.dialect_name, "oracle");
        assert_eq!(settings.command_prefix, Some('\\'));
    }

    #[test]
    fn test_load_pyproject_section() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"x\"\n\n[tool.sqlscan]\ndialect = \"mysql\"\nexclude = [\"gen_*\"]\n",
        )
        .unwrap();

        let settings = load_config(&[dir.path().to_path_buf()], None).unwrap();
        assert_eq!(settings.dialect_name, "mysql");
        assert_eq!(settings.exclude, vec!["gen_*".to_string()]);
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = load_config(&[], Some(Path::new("/nonexistent/sqlscan.toml")));
        assert!(result.is_err());
    }
}
