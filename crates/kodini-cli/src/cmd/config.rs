use crate::output::{print_json, print_table};
use clap::Subcommand;
use kodini_core::config::{default_params, Config, WarnLevel};
use kodini_core::Intent;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration and per-intent generation parameters
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

/// Config file with environment overrides applied.
fn effective(root: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load(root)?;
    config.apply_env_overrides();
    Ok(config)
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = effective(root)?;
    let key_present = std::env::var(&config.llm.api_key_env)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);

    if json {
        let intents: serde_json::Map<String, serde_json::Value> = Intent::all()
            .iter()
            .map(|intent| {
                let p = config.generation.params_for(*intent);
                (
                    intent.as_str().to_string(),
                    serde_json::json!({
                        "model": p.model,
                        "temperature": p.temperature,
                        "max_output_tokens": p.max_output_tokens,
                    }),
                )
            })
            .collect();
        return print_json(&serde_json::json!({
            "llm": config.llm,
            "api_key_present": key_present,
            "intents": intents,
        }));
    }

    println!(
        "endpoint:     {}",
        config.llm.endpoint.as_deref().unwrap_or("(not set)")
    );
    println!("api_version:  {}", config.llm.api_version);
    println!(
        "api_key_env:  {} ({})",
        config.llm.api_key_env,
        if key_present { "set" } else { "not set" }
    );
    println!("timeout_secs: {}", config.llm.timeout_secs);
    println!();

    let rows = Intent::all()
        .iter()
        .map(|intent| {
            let p = config.generation.params_for(*intent);
            let marker = if p == default_params(*intent) { "" } else { "*" };
            vec![
                format!("{}{marker}", intent.as_str()),
                p.model,
                p.temperature.to_string(),
                p.max_output_tokens.to_string(),
            ]
        })
        .collect();
    print_table(&["INTENT", "MODEL", "TEMPERATURE", "MAX TOKENS"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = effective(root)?;
    let warnings = config.validate();

    if json {
        print_json(&warnings)?;
    } else if warnings.is_empty() {
        println!("Config OK");
    } else {
        for w in &warnings {
            let label = match w.level {
                WarnLevel::Error => "error",
                WarnLevel::Warning => "warning",
            };
            println!("{label}: {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config has errors");
    }
    Ok(())
}
