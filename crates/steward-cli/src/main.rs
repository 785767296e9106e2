mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use steward_core::storage::models::{ActionLogEntry, ActionStatus, FileRecord};
use steward_core::storage::Database;
use steward_core::{AppConfig, Steward};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = match steward_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            let guard = logging::init_logger(&AppConfig::default());
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };

    let _guard = logging::init_logger(&config);

    let args = Cli::parse();
    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return Ok(());
    };

    if let Commands::PrintConfig = command {
        println!("Configuration: {:?}", config);
        return Ok(());
    }

    let steward = Steward::open(&config)
        .with_context(|| format!("opening database {}", config.db_path))?;

    if let Err(err) = run(&steward, &config, command) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
    Ok(())
}

fn run(steward: &Steward<Database>, config: &AppConfig, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Scan { root } => {
            let reporter = CliReporter::new();
            let summary = steward.scan(&root, &reporter)?;
            info!(
                "Generation {}: {} files, {} in {}",
                summary.generation_id,
                format!("{}", summary.files_indexed).green(),
                format!("{} bytes", summary.total_bytes).green(),
                format!("{:.2}s", summary.duration.as_secs_f64()).green(),
            );
        }
        Commands::Files { json } => {
            let files = steward.list_files()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                files.iter().for_each(print_record);
            }
        }
        Commands::Duplicates { json } => {
            let groups = steward.list_duplicates()?;
            print_groups("Duplicate", &groups, json)?;
        }
        Commands::Versions { threshold, json } => {
            let threshold = threshold.unwrap_or(config.version_threshold);
            let groups = steward.list_versions(threshold)?;
            print_groups("Version", &groups, json)?;
        }
        Commands::Largest { limit } => {
            let limit = limit.unwrap_or(config.largest_limit);
            steward.largest(limit)?.iter().for_each(print_record);
        }
        Commands::Move { ids, target } => {
            let entries = steward.move_files(&ids, &target)?;
            report_entries("Moved", entries.len(), &target);
        }
        Commands::GroupDuplicates { target } => {
            let entries = steward.move_duplicate_groups(&target)?;
            report_entries("Moved", entries.len(), &target);
        }
        Commands::GroupVersions { target, threshold } => {
            let threshold = threshold.unwrap_or(config.version_threshold);
            let entries = steward.move_version_groups(threshold, &target)?;
            report_entries("Moved", entries.len(), &target);
        }
        Commands::Archive { dir, archive } => {
            let entry_id = steward.archive(&dir, archive.as_deref())?;
            println!("Archived {} (journal #{})", dir.display(), entry_id);
        }
        Commands::Delete { id } => {
            let entry_id = steward.delete_file(id)?;
            println!("Deleted file {} (journal #{})", id, entry_id);
        }
        Commands::Open { path } => {
            let entry_id = steward.open_file(&path)?;
            println!("Opened {} (journal #{})", path.display(), entry_id);
        }
        Commands::Journal { json } => {
            let entries = steward.list_journal()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                entries.iter().for_each(print_entry);
            }
        }
        Commands::Revert { id } => {
            steward.revert(id)?;
            println!("{} journal #{}", "Reverted".green(), id);
        }
        Commands::ClearCatalog => {
            if prompt_confirm("Remove every record from the catalog?", Some(false))? {
                steward.clear_catalog()?;
                println!("Catalog cleared");
            }
        }
        Commands::ClearJournal => {
            if prompt_confirm(
                "Are you SURE you want to DELETE the journal? Nothing can be reverted afterwards.",
                Some(false),
            )? {
                steward.clear_journal()?;
                println!("Journal cleared");
            }
        }
        Commands::PrintConfig => println!("Configuration: {:?}", config),
    }
    Ok(())
}

fn print_record(record: &FileRecord) {
    println!(
        "{:>6}  {:>12}  {}  {}",
        record.id.to_string().cyan(),
        record.file_size,
        record.content_hash.dimmed(),
        record.path
    );
}

fn print_groups(label: &str, groups: &[Vec<FileRecord>], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(groups)?);
        return Ok(());
    }
    for (i, group) in groups.iter().enumerate() {
        println!(
            "{} {}",
            format!("{} group {}", label, i + 1).yellow(),
            format!("({} files)", group.len()).dimmed()
        );
        group.iter().for_each(print_record);
    }
    info!("{} {} groups", format!("{}", groups.len()).red(), label.to_lowercase());
    Ok(())
}

fn print_entry(entry: &ActionLogEntry) {
    let status = match entry.status {
        ActionStatus::Success => entry.status.as_str().green(),
        ActionStatus::Failure => entry.status.as_str().red(),
        ActionStatus::Reverted => entry.status.as_str().cyan(),
        ActionStatus::Pending => entry.status.as_str().yellow(),
    };
    let target = entry
        .target_path
        .as_deref()
        .map(|t| format!(" -> {}", t))
        .unwrap_or_default();
    println!(
        "{:>6}  {}  {:<13} {:<8} {}{}",
        entry.id.to_string().cyan(),
        entry.timestamp.dimmed(),
        entry.kind.as_str(),
        status,
        entry.source_path,
        target
    );
}

fn report_entries(verb: &str, count: usize, target: &Path) {
    println!(
        "{} {} files into {}",
        verb,
        format!("{}", count).green(),
        target.display()
    );
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
