//! `insights` - CLI for insights-survey
//!
//! This binary runs the survey in the terminal and gives operators access to
//! the stored responses.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::Write;

use anyhow::Context;
use clap::Parser;
use dialoguer::Password;

use insights_survey::cli::{Cli, Command, ConfigCommand, ExportCommand, ExportFormat};
use insights_survey::survey::catalog;
use insights_survey::terminal::TerminalSurvey;
use insights_survey::{
    export, init_logging, AdminGate, Config, CsvMirror, MirroredStore, Session, Storage,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Take => handle_take(&config),
        Command::Export(export_cmd) => handle_export(&config, export_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Questions => {
            handle_questions();
            Ok(())
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the configured response store; failure here is fatal.
fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    Storage::open_with_timeout(config.database_path(), config.busy_timeout())
        .context("cannot serve the survey without response storage")
}

fn handle_take(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let mirror = config
        .mirror
        .enabled
        .then(|| CsvMirror::new(config.mirror_directory()));
    let store = MirroredStore::new(storage, mirror);
    let gate = AdminGate::from_config(&config.admin);

    let mut session = Session::new();
    TerminalSurvey::new(&store, &gate).run(&mut session)?;
    Ok(())
}

fn handle_export(config: &Config, cmd: ExportCommand) -> anyhow::Result<()> {
    let gate = AdminGate::from_config(&config.admin);
    if !gate.is_configured() {
        anyhow::bail!(
            "admin export is disabled; set [admin] password in {} or INSIGHTS_ADMIN__PASSWORD",
            Config::default_config_path().display()
        );
    }

    let storage = open_storage(config)?;
    let password = match cmd.password {
        Some(password) => password,
        None => Password::new().with_prompt("Admin Password").interact()?,
    };
    let records = export::fetch_all(&storage, &gate, &password)?;

    let writer: Box<dyn Write> = match &cmd.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    let count = match cmd.format {
        ExportFormat::Csv => export::write_csv(&records, writer)?,
        ExportFormat::Json => export::write_json(&records, writer)?,
    };

    if let Some(path) = &cmd.output {
        eprintln!("Exported {count} responses to {}", path.display());
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "stats": stats,
            "mirror_enabled": config.mirror.enabled,
            "admin_export_enabled": config.admin.password.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let format_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
        };
        println!("insights status");
        println!("---------------");
        println!("Database:         {}", storage.path().display());
        println!("Responses:        {}", stats.total_responses);
        println!("First submission: {}", format_time(stats.first_submission));
        println!("Last submission:  {}", format_time(stats.last_submission));
        println!("Database size:    {} bytes", stats.db_size_bytes);
        println!(
            "CSV mirror:       {}",
            if config.mirror.enabled {
                config.mirror_directory().display().to_string()
            } else {
                "disabled".to_string()
            }
        );
    }
    Ok(())
}

fn handle_questions() {
    println!("{}", catalog::SURVEY_TITLE);
    for section in &catalog::SECTIONS {
        println!();
        println!("{}", section.title);
        for question in &section.questions {
            println!("  {:>2}. {}", question.number, question.prompt);
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
                println!();
                println!("[Mirror]");
                println!("  Enabled:            {}", config.mirror.enabled);
                println!("  Directory:          {}", config.mirror_directory().display());
                println!();
                println!("[Admin]");
                println!(
                    "  Password:           {}",
                    config.admin.password.as_deref().unwrap_or("(not set, export disabled)")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
