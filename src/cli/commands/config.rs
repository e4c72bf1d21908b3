use crate::cli::parser::Commands;
use crate::config::Config;
use crate::config::migrate::{migrate_config_file, missing_keys};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration ({}):\n", path.display());
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            if !path.exists() {
                warning(format!("No configuration file at {}", path.display()));
            } else {
                let missing = missing_keys(&path)?;
                if missing.is_empty() {
                    success("Configuration file is complete.");
                } else {
                    warning(format!("Missing keys: {}", missing.join(", ")));
                    info("Run `fastpos config --migrate` to add them with default values.");
                }
            }
        }

        if *migrate {
            if !path.exists() {
                warning(format!("No configuration file at {}", path.display()));
            } else if !migrate_config_file(&path)? {
                info("Configuration file already up to date.");
            }
        }

        if *edit_config {
            edit(&path, editor.as_deref());
        }
    }

    Ok(())
}

fn default_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

/// Open `path` in the requested editor, falling back to the default one.
fn edit(path: &std::path::Path, requested: Option<&str>) {
    let fallback = default_editor();
    let first = requested.map(str::to_string).unwrap_or_else(|| fallback.clone());

    match Command::new(&first).arg(path).status() {
        Ok(s) if s.success() => {
            success(format!("Configuration file edited using '{first}'"));
            return;
        }
        _ => warning(format!(
            "Editor '{first}' not available, falling back to '{fallback}'"
        )),
    }

    match Command::new(&fallback).arg(path).status() {
        Ok(s) if s.success() => success(format!(
            "Configuration file edited using fallback '{fallback}'"
        )),
        _ => error(format!(
            "Failed to edit configuration file using fallback '{fallback}'"
        )),
    }
}
