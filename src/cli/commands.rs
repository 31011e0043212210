//! Command dispatch: resolve the parsed (category, command) pair to a
//! handler, invoke it with the process-wide settings, and render the result.

use clap::CommandFactory;
use tracing::instrument;

use crate::cli::args::{
    Cli, Commands, ConfigCommands, FilelabCommands, NetworkCommands, SystemCommands,
    UtilsCommands,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::report::Report;
use crate::commands::{filelab, network, system, utils, HandlerError, HandlerResult};
use crate::config::{self, Settings};

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let Some(command) = &cli.command else {
        // no subcommand given: top-level help, success
        let _ = Cli::command().print_help();
        return Ok(());
    };

    let report = match command {
        Commands::System { command } => dispatch_system(command)?,
        Commands::Network { command } => dispatch_network(command, settings)?,
        Commands::Filelab { command } => dispatch_filelab(command)?,
        Commands::Utils { command } => dispatch_utils(command, settings)?,
        Commands::Config { command } => dispatch_config(command, cli, settings)?,
        Commands::Info => info(),
        Commands::ListCommands => list_commands(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut std::io::stdout());
            return Ok(());
        }
    };

    report.render();
    Ok(())
}

#[instrument(skip_all)]
fn dispatch_system(command: &SystemCommands) -> HandlerResult {
    match command {
        SystemCommands::Cpu { interval, count } => system::cpu(*interval, *count),
        SystemCommands::Memory => system::memory(),
        SystemCommands::Processes { limit, sort_by } => system::processes(*limit, *sort_by),
        SystemCommands::Disk { path } => system::disk(path),
    }
}

#[instrument(skip_all)]
fn dispatch_network(command: &NetworkCommands, settings: &Settings) -> HandlerResult {
    match command {
        NetworkCommands::Ip => network::ip(settings),
        NetworkCommands::HttpCheck { url, method } => network::http_check(url, *method, settings),
        NetworkCommands::PortScan {
            host,
            start_port,
            end_port,
            timeout_ms,
        } => network::port_scan(host, *start_port, *end_port, *timeout_ms),
        NetworkCommands::Ping { host, count } => network::ping(host, *count, settings),
    }
}

#[instrument(skip_all)]
fn dispatch_filelab(command: &FilelabCommands) -> HandlerResult {
    match command {
        FilelabCommands::Rename {
            directory,
            pattern,
            prefix,
            suffix,
            replace_from,
            replace_to,
            apply,
        } => {
            let options = filelab::RenameOptions {
                pattern: pattern.clone(),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
                replace_from: replace_from.clone(),
                replace_to: replace_to.clone(),
            };
            filelab::rename(directory, &options, *apply)
        }
        FilelabCommands::Metadata { path } => filelab::metadata(path),
        FilelabCommands::Tree {
            directory,
            max_depth,
            show_hidden,
        } => filelab::tree(directory, *max_depth, *show_hidden),
        FilelabCommands::Search {
            directory,
            name,
            extension,
            min_size,
            max_size,
        } => {
            let filters = filelab::SearchFilters {
                name: name.clone(),
                extension: extension.clone(),
                min_size: *min_size,
                max_size: *max_size,
            };
            filelab::search(directory, &filters)
        }
    }
}

#[instrument(skip_all)]
fn dispatch_utils(command: &UtilsCommands, settings: &Settings) -> CliResult<Report> {
    let report = match command {
        UtilsCommands::Currency { amount, from, to } => {
            utils::currency(*amount, from, to, settings)?
        }
        UtilsCommands::Password {
            length,
            count,
            no_special,
            no_numbers,
            no_uppercase,
        } => utils::password(
            *length,
            *count,
            *no_special,
            *no_numbers,
            *no_uppercase,
            settings,
        )?,
        UtilsCommands::Markdown { file, text } => {
            // required-one-of constraint clap cannot express across a
            // positional and a flag
            if file.is_none() && text.is_none() {
                return Err(CliError::Usage(
                    "provide a markdown file or --text".into(),
                ));
            }
            utils::markdown(file.as_deref(), text.as_deref())?
        }
        UtilsCommands::Base64 { text, decode } => utils::base64(text, *decode)?,
        UtilsCommands::Hash { text, algorithm } => utils::hash(text, *algorithm)?,
        UtilsCommands::Uuid { count } => utils::uuid(*count)?,
    };
    Ok(report)
}

#[instrument(skip_all)]
fn dispatch_config(command: &ConfigCommands, cli: &Cli, settings: &Settings) -> HandlerResult {
    match command {
        ConfigCommands::Show => Ok(Report::text(settings.to_toml())),
        ConfigCommands::Path => {
            let mut pairs = Vec::new();
            if let Some(explicit) = &cli.config {
                let path = config::expand_path(explicit);
                pairs.push(("--config".to_string(), annotate_path(&path)));
            }
            match config::global_config_path() {
                Some(path) => pairs.push(("Global".to_string(), annotate_path(&path))),
                None => pairs.push(("Global".to_string(), "unavailable".to_string())),
            }
            Ok(Report::KeyValue {
                title: "Config locations".into(),
                pairs,
            })
        }
        ConfigCommands::Init { force } => {
            let target = cli
                .config
                .as_ref()
                .map(|p| config::expand_path(p))
                .or_else(config::global_config_path)
                .ok_or_else(|| {
                    HandlerError::InvalidInput("could not determine config directory".into())
                })?;

            if target.exists() && !force {
                return Err(HandlerError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    target.display()
                )));
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| HandlerError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&target, Settings::template())
                .map_err(|e| HandlerError::io(format!("write {}", target.display()), e))?;

            Ok(Report::text(format!("Wrote {}", target.display())))
        }
    }
}

fn annotate_path(path: &std::path::Path) -> String {
    if path.exists() {
        format!("{} (exists)", path.display())
    } else {
        format!("{} (not present)", path.display())
    }
}

fn info() -> Report {
    let cmd = Cli::command();
    let mut pairs = vec![
        ("Name".to_string(), cmd.get_name().to_string()),
        (
            "Version".to_string(),
            cmd.get_version().unwrap_or("unknown").to_string(),
        ),
    ];
    if let Some(author) = cmd.get_author() {
        pairs.push(("Author".to_string(), author.to_string()));
    }
    pairs.extend(crate::commands::system::host_summary());
    Report::KeyValue {
        title: "termkit".into(),
        pairs,
    }
}

/// Walk the clap command tree and list every (category, command) pair.
/// This is the registry made inspectable without invoking any handler.
fn list_commands() -> Report {
    let root = Cli::command();
    let mut rows = Vec::new();

    for category in root.get_subcommands() {
        if category.get_name() == "help" {
            continue;
        }
        let children: Vec<_> = category
            .get_subcommands()
            .filter(|sub| sub.get_name() != "help")
            .collect();

        if children.is_empty() {
            rows.push(vec![category.get_name().to_string(), about(category)]);
        } else {
            for sub in children {
                rows.push(vec![
                    format!("{} {}", category.get_name(), sub.get_name()),
                    about(sub),
                ]);
            }
        }
    }

    Report::table("Registered commands", vec!["Command", "Description"], rows)
}

fn about(cmd: &clap::Command) -> String {
    cmd.get_about().map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_command_tree_when_listed_then_all_categories_present() {
        let report = list_commands();
        let Report::Table { rows, .. } = report else {
            panic!("expected table");
        };
        let commands: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();

        assert!(commands.contains(&"system cpu"));
        assert!(commands.contains(&"network http-check"));
        assert!(commands.contains(&"filelab tree"));
        assert!(commands.contains(&"utils hash"));
        assert!(commands.contains(&"config show"));
        assert!(commands.contains(&"info"));
    }

    #[test]
    fn given_category_command_pairs_when_listed_then_unique() {
        let Report::Table { rows, .. } = list_commands() else {
            panic!("expected table");
        };
        let mut names: Vec<&String> = rows.iter().map(|r| &r[0]).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
