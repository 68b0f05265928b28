//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use watchlist_core::{Category, Config};

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const KEYS: &str = "data_dir, log_file, search_debounce_ms, search_limit, default_category";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                    "search_debounce_ms": config.search_debounce_ms,
                    "search_limit": config.search_limit,
                    "default_category": config.default_category,
                    "snapshot_path": config.snapshot_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(stderr)".to_string())
            );
            println!("  search_debounce_ms: {}", config.search_debounce_ms);
            println!("  search_limit:       {}", config.search_limit);
            println!("  default_category:   {}", config.default_category);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "search_debounce_ms" => {
            config.search_debounce_ms = value
                .parse()
                .context("Invalid value for search_debounce_ms. Use a number of milliseconds.")?;
        }
        "search_limit" => {
            config.search_limit = value
                .parse()
                .context("Invalid value for search_limit. Use a positive number.")?;
        }
        "default_category" => {
            config.default_category = value.parse::<Category>().with_context(|| {
                format!(
                    "Invalid category. Use one of: {}",
                    Category::ALL.map(|c| c.key()).join(", ")
                )
            })?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: {}",
                key,
                KEYS
            );
        }
    }
    Ok(())
}
