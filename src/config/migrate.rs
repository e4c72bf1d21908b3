use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Keys present in the on-disk YAML mapping.
fn present_keys(map: &Mapping) -> Vec<String> {
    map.keys()
        .filter_map(|k| k.as_str().map(|s| s.to_string()))
        .collect()
}

/// Keys a complete configuration file is expected to carry.
fn expected_keys() -> AppResult<Mapping> {
    let defaults = serde_yaml::to_value(Config::default())?;
    Ok(defaults.as_mapping().cloned().unwrap_or_default())
}

/// Return the configuration keys missing from the file at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&content)?;
    let present = yaml.as_mapping().map(present_keys).unwrap_or_default();

    let missing = present_keys(&expected_keys()?)
        .into_iter()
        .filter(|k| !present.contains(k))
        .collect();

    Ok(missing)
}

/// Add every missing key (with its default value) to the configuration file,
/// preserving the values already set.
/// Returns:
///   Ok(true)  → config updated
///   Ok(false) → no change needed
pub fn migrate_config_file(path: &Path) -> AppResult<bool> {
    let content = fs::read_to_string(path)?;
    let mut yaml: Value = serde_yaml::from_str(&content)?;

    let Some(map) = yaml.as_mapping_mut() else {
        return Ok(false);
    };

    let mut changed = false;
    for (key, value) in expected_keys()? {
        if !map.contains_key(&key) {
            if let Some(k) = key.as_str() {
                info(format!("Adding missing config key '{k}'"));
            }
            map.insert(key, value);
            changed = true;
        }
    }

    if changed {
        fs::write(path, serde_yaml::to_string(&yaml)?)?;
        success(format!("Configuration migrated: {}", path.display()));
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_conf(name: &str, body: &str) -> std::path::PathBuf {
        let mut p = env::temp_dir();
        p.push(format!("{name}_fastpos.conf"));
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn detects_and_fills_missing_keys() {
        let path = temp_conf("cfg_migrate", "database: /tmp/x.sqlite\nreceipt_width: 32\n");

        let missing = missing_keys(&path).unwrap();
        assert!(missing.contains(&"printer_timeout_ms".to_string()));
        assert!(!missing.contains(&"receipt_width".to_string()));

        assert!(migrate_config_file(&path).unwrap());
        assert!(missing_keys(&path).unwrap().is_empty());

        // existing values survive
        let cfg: Config = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cfg.receipt_width, 32);

        assert!(!migrate_config_file(&path).unwrap());
        fs::remove_file(&path).ok();
    }
}
