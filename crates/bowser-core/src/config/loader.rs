//! Configuration file discovery and merging
//!
//! Any `bowser.toml` files found in the check paths are merged together,
//! with files appearing later taking precedence over those appearing
//! earlier. Each check path may be the `bowser.toml` file itself or its
//! parent directory.

use std::path::PathBuf;

use toml::Value;

use crate::Result;

use super::BowserConfig;

const CONFIG_FILE_NAME: &str = "bowser.toml";

/// Default set of paths to check for configuration files.
///
/// System config first, then the user's XDG config directory, so user
/// settings override system-wide ones.
fn default_check_paths() -> Vec<PathBuf> {
    let xdg_config = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));

    let mut paths = vec![PathBuf::from("/etc/bowser.toml")];
    if let Some(config_home) = xdg_config {
        paths.push(config_home.join("bowser").join(CONFIG_FILE_NAME));
    }
    paths
}

/// Load configuration from all `bowser.toml` files in the default locations.
pub fn load_app_configuration() -> Result<BowserConfig> {
    load_from_paths(&default_check_paths())
}

/// Load and merge configuration from `check_paths`, in order of appearance.
pub fn load_from_paths(check_paths: &[PathBuf]) -> Result<BowserConfig> {
    tracing::info!(
        "Looking for configuration files: {}",
        check_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let candidates: Vec<PathBuf> = check_paths
        .iter()
        .map(|path| {
            if path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME) {
                path.clone()
            } else {
                path.join(CONFIG_FILE_NAME)
            }
        })
        .collect();

    let raw = load_raw_configuration(&candidates)?;
    let bowser_table = raw
        .get("bowser")
        .cloned()
        .unwrap_or_else(|| Value::Table(toml::map::Map::new()));
    Ok(bowser_table.try_into::<BowserConfig>()?)
}

fn load_raw_configuration(candidates: &[PathBuf]) -> Result<Value> {
    let mut merged = Value::Table(toml::map::Map::new());
    for path in candidates {
        if !path.exists() {
            continue;
        }
        let contents = std::fs::read_to_string(path)?;
        let parsed: Value = toml::from_str(&contents)?;
        merged = merge_configuration(merged, parsed);
    }
    Ok(merged)
}

/// Merge two configuration values recursively.
///
/// Keys present in only one side appear unchanged in the result. Keys in
/// both sides take the `right` value, unless both are tables, in which case
/// the tables are merged recursively. Scalars and arrays from `right`
/// override `left` wholesale.
fn merge_configuration(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Table(mut left_table), Value::Table(right_table)) => {
            for (key, right_value) in right_table {
                let merged_value = match left_table.remove(&key) {
                    Some(left_value) => merge_configuration(left_value, right_value),
                    None => right_value,
                };
                left_table.insert(key, merged_value);
            }
            Value::Table(left_table)
        }
        (_, right) => right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(s: &str) -> Value {
        toml::from_str(s).unwrap_or(Value::Table(toml::map::Map::new()))
    }

    #[test]
    fn test_merge_disjoint_keys() {
        let merged = merge_configuration(table("a = 1"), table("b = 2"));
        assert_eq!(merged.get("a").and_then(Value::as_integer), Some(1));
        assert_eq!(merged.get("b").and_then(Value::as_integer), Some(2));
    }

    #[test]
    fn test_merge_scalar_override() {
        let merged = merge_configuration(table("a = 1"), table("a = 2"));
        assert_eq!(merged.get("a").and_then(Value::as_integer), Some(2));
    }

    #[test]
    fn test_merge_array_overrides_wholesale() {
        let merged = merge_configuration(table("a = [1, 2, 3]"), table("a = [4]"));
        let array = merged.get("a").and_then(Value::as_array);
        assert_eq!(array.map(Vec::len), Some(1));
    }

    #[test]
    fn test_merge_tables_recursively() {
        let left = table("[bowser]\nverbose = true\n[bowser.nested]\nkeep = 1");
        let right = table("[bowser]\nverbose = false");
        let merged = merge_configuration(left, right);
        let bowser = merged.get("bowser");
        assert_eq!(
            bowser.and_then(|b| b.get("verbose")).and_then(Value::as_bool),
            Some(false)
        );
        assert_eq!(
            bowser
                .and_then(|b| b.get("nested"))
                .and_then(|n| n.get("keep"))
                .and_then(Value::as_integer),
            Some(1)
        );
    }

    #[test]
    fn test_load_from_paths_merges_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let lower = dir.path().join("lower");
        let higher = dir.path().join("higher");
        std::fs::create_dir_all(&lower)?;
        std::fs::create_dir_all(&higher)?;
        std::fs::write(lower.join("bowser.toml"), "[bowser]\nverbose = true\n")?;
        std::fs::write(higher.join("bowser.toml"), "[bowser]\nverbose = false\n")?;

        let config = load_from_paths(&[lower, higher])?;
        assert!(!config.verbose);
        Ok(())
    }

    #[test]
    fn test_load_from_paths_accepts_file_or_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("bowser.toml");
        std::fs::write(&file, "[bowser]\nverbose = true\n")?;

        let from_file = load_from_paths(&[file])?;
        let from_dir = load_from_paths(&[dir.path().to_path_buf()])?;
        assert!(from_file.verbose);
        assert!(from_dir.verbose);
        Ok(())
    }

    #[test]
    fn test_missing_files_yield_defaults() -> Result<()> {
        let config = load_from_paths(&[PathBuf::from("/nonexistent/bowser.toml")])?;
        assert!(config.backends.is_empty());
        Ok(())
    }
}
