/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When AppConfig schema changes
*/

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::Path;

use taskboard_core::config::{AppConfig, AuthConfig, BackendConfig, LoggingConfig, is_hex_color};

const LOG_LEVELS: [&str; 4] = ["info", "debug", "warn", "error"];

pub fn run_init(output: &Path) -> Result<()> {
    println!("{}", style("Taskboard configuration").bold().cyan());
    println!(
        "{}",
        style("Answers are written as YAML; the password is best kept in TASKBOARD__AUTH__PASSWORD.")
            .dim()
    );

    if output.exists()
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?
    {
        bail!("left {} untouched", output.display());
    }

    let theme = ColorfulTheme::default();

    println!("\n{}", style("--- Backend ---").bold());
    let url: String = Input::with_theme(&theme)
        .with_prompt("Project URL")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(())
            } else {
                Err("URL must start with http:// or https://")
            }
        })
        .interact_text()?;
    let anon_key: String = Input::with_theme(&theme)
        .with_prompt("Anon key")
        .interact_text()?;

    println!("\n{}", style("--- Sign-in ---").bold());
    let email: String = Input::with_theme(&theme)
        .with_prompt("Email (leave empty to skip)")
        .allow_empty(true)
        .interact_text()?;

    println!("\n{}", style("--- Board defaults ---").bold());
    let mut config = AppConfig::default();
    let copy_suffix: String = Input::with_theme(&theme)
        .with_prompt("Suffix for duplicated items")
        .default(config.board.copy_suffix.clone())
        .interact_text()?;
    for column in &mut config.board.default_columns {
        column.color = Input::with_theme(&theme)
            .with_prompt(format!("Color for \"{}\"", column.name))
            .default(column.color.clone())
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                if is_hex_color(input) {
                    Ok(())
                } else {
                    Err("expected #rrggbb")
                }
            })
            .interact_text()?;
    }

    let level_selection = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(&LOG_LEVELS)
        .default(0)
        .interact()?;

    config.backend = BackendConfig {
        url: url.trim().to_string(),
        anon_key: anon_key.trim().to_string(),
        ..BackendConfig::default()
    };
    config.auth = AuthConfig {
        email: Some(email.trim().to_string()).filter(|email| !email.is_empty()),
        password: None,
    };
    config.board.copy_suffix = copy_suffix;
    config.logging = LoggingConfig {
        level: LOG_LEVELS[level_selection].to_string(),
        ..LoggingConfig::default()
    };
    config.validate().context("generated configuration is invalid")?;

    let yaml = config.to_yaml().context("failed to serialize config to YAML")?;
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!("Configuration written to: {}", style(output.display()).cyan());

    Ok(())
}
