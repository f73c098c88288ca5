
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;

use super::{Config, ConfigError, EndpointConfig, RetrievalConfig};
use crate::retrieval::CategoryMatchMode;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🌿 Vatika Support Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("Completion Endpoint").bold().yellow());
    eprintln!("Configure the OpenAI-compatible endpoint used to answer questions.");
    eprintln!();

    configure_endpoint(&mut config.endpoint)?;

    eprintln!();
    eprintln!("{}", style("Retrieval").bold().yellow());
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    let api_key = std::env::var(&config.endpoint.api_key_env).ok();
    if api_key.is_none() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ Warning: {} is not set, chat will only answer FAQ questions",
                config.endpoint.api_key_env
            ))
            .yellow()
        );
    } else if test_endpoint_connection(&config.endpoint, api_key.as_deref()) {
        eprintln!("{}", style("✓ Endpoint reachable!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not reach the completion endpoint").yellow()
        );
        eprintln!("You can continue, but chat replies will fall back to the support contact message.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Endpoint Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.endpoint.base_url).cyan());
    eprintln!("  Model: {}", style(&config.endpoint.model).cyan());
    eprintln!("  Max Tokens: {}", style(config.endpoint.max_tokens).cyan());
    eprintln!("  Temperature: {}", style(config.endpoint.temperature).cyan());
    eprintln!(
        "  Timeout: {}s",
        style(config.endpoint.timeout_seconds).cyan()
    );
    let key_state = if std::env::var_os(&config.endpoint.api_key_env).is_some() {
        style("set").green()
    } else {
        style("not set").red()
    };
    eprintln!(
        "  API Key: ${} ({})",
        style(&config.endpoint.api_key_env).cyan(),
        key_state
    );

    eprintln!();
    match config.endpoint.completions_url() {
        Ok(url) => eprintln!("  Completions URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Completions URL: {} ({})", style("Invalid").red(), e),
    }

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Category Matching: {}",
        style(category_mode_label(config.retrieval.category_match)).cyan()
    );
    eprintln!(
        "  History Window: {} turns",
        style(config.retrieval.history_window).cyan()
    );
    eprintln!(
        "  Product Limit: {}",
        style(config.retrieval.product_limit).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Config {
    if !config_dir.join("config.toml").exists() {
        eprintln!(
            "{}",
            style("No existing configuration found. Using defaults.").yellow()
        );
        return Config {
            base_dir: config_dir.to_path_buf(),
            ..Config::default()
        };
    }

    Config::load(config_dir).map_or_else(
        |e| {
            eprintln!(
                "{}",
                style(format!("Existing configuration is invalid ({e:#}). Using defaults.")).yellow()
            );
            Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            }
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_endpoint(endpoint: &mut EndpointConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Endpoint base URL")
        .default(endpoint.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = EndpointConfig {
                base_url: input.clone(),
                ..EndpointConfig::default()
            };
            temp_config.completions_url()?;
            Ok(())
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Model")
        .default(endpoint.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let max_tokens: u32 = Input::new()
        .with_prompt("Maximum tokens per reply")
        .default(endpoint.max_tokens)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (1..=8192).contains(input) {
                Ok(())
            } else {
                Err("Max tokens must be between 1 and 8192")
            }
        })
        .interact_text()?;

    let temperature: f32 = Input::new()
        .with_prompt("Sampling temperature")
        .default(endpoint.temperature)
        .validate_with(|input: &f32| -> Result<(), &str> {
            if (0.0..=2.0).contains(input) {
                Ok(())
            } else {
                Err("Temperature must be between 0.0 and 2.0")
            }
        })
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("Request timeout (seconds)")
        .default(endpoint.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if (1..=300).contains(input) {
                Ok(())
            } else {
                Err("Timeout must be between 1 and 300 seconds")
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(endpoint.api_key_env.clone())
        .interact_text()?;

    endpoint.set_base_url(base_url)?;
    endpoint.set_model(model)?;
    endpoint.set_max_tokens(max_tokens)?;
    endpoint.set_temperature(temperature)?;
    endpoint.set_timeout_seconds(timeout_seconds)?;
    endpoint.set_api_key_env(api_key_env)?;

    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let modes = [CategoryMatchMode::Accumulate, CategoryMatchMode::LastWins];
    let labels: Vec<&str> = modes.iter().copied().map(category_mode_label).collect();
    let default_index = modes
        .iter()
        .position(|&mode| mode == retrieval.category_match)
        .unwrap_or(0);

    let mode_index = Select::new()
        .with_prompt("Category matching")
        .default(default_index)
        .items(&labels)
        .interact()?;

    let history_window: usize = Input::new()
        .with_prompt("History turns sent with each question")
        .default(retrieval.history_window)
        .interact_text()?;

    let product_limit: usize = Input::new()
        .with_prompt("Featured products included in context")
        .default(retrieval.product_limit)
        .interact_text()?;

    retrieval.category_match = modes.get(mode_index).copied().unwrap_or_default();
    retrieval.set_history_window(history_window)?;
    retrieval.set_product_limit(product_limit)?;

    Ok(())
}

fn category_mode_label(mode: CategoryMatchMode) -> &'static str {
    match mode {
        CategoryMatchMode::Accumulate => "accumulate (every matching category)",
        CategoryMatchMode::LastWins => "last wins (only the last matching category)",
    }
}

fn test_endpoint_connection(endpoint: &EndpointConfig, api_key: Option<&str>) -> bool {
    let url = format!("{}/models", endpoint.base_url.trim_end_matches('/'));

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    let mut request = agent.get(&url);
    if let Some(key) = api_key {
        request = request.header("Authorization", format!("Bearer {key}"));
    }

    match request.call() {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
