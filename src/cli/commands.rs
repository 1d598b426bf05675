//! Command dispatch: one handler per subcommand

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{CheckReport, KindReport};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `flowtree --help`".to_string(),
        ));
    };

    // Commands that need no services
    match command {
        Commands::Completion { shell } => return cmd_completion(*shell),
        Commands::Config {
            command: ConfigCommands::Template,
        } => {
            output::info(&Settings::template());
            return Ok(());
        }
        _ => {}
    }

    let settings = load_settings(cli)?;
    if let Commands::Config { command } = command {
        return cmd_config(command, &settings);
    }

    let container = ServiceContainer::new(settings)?;
    match command {
        Commands::Build {
            file,
            parent_kind,
            format,
        } => cmd_build(&container, file, parent_kind.as_deref(), *format),
        Commands::Check { files } => cmd_check(&container, files),
        Commands::Kinds { kind } => cmd_kinds(&container, kind.as_deref()),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Settings from files and environment, then CLI flags on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.catalogs.extend(cli.catalogs.iter().cloned());
    if cli.lenient {
        settings.lenient_values = true;
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

#[instrument(skip(container))]
fn cmd_build(
    container: &ServiceContainer,
    file: &std::path::Path,
    parent_kind: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let view = container.view_service.build_file(file, parent_kind)?;
    match format {
        OutputFormat::Tree => output::info(&view.render()),
        OutputFormat::Json => output::info(&view.to_json()?),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_check(container: &ServiceContainer, files: &[std::path::PathBuf]) -> CliResult<()> {
    let reports = container.view_service.check_files(files);
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    for report in &reports {
        print_check(report);
    }
    if failed > 0 {
        return Err(CliError::CheckFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

fn print_check(report: &CheckReport) {
    match &report.outcome {
        Ok(summary) => output::success(&format!(
            "{} ({} components, {} leaves, depth {})",
            report.path.display(),
            summary.components,
            summary.leaves,
            summary.depth
        )),
        Err(e) => {
            output::failure(&report.path.display());
            output::detail(&format!("  {e}"));
        }
    }
}

fn cmd_kinds(container: &ServiceContainer, kind: Option<&str>) -> CliResult<()> {
    let service = &container.view_service;
    match kind {
        None => {
            for name in service.kinds() {
                output::info(&name);
            }
        }
        Some(kind) => print_kind(&service.describe_kind(kind)?),
    }
    Ok(())
}

fn print_kind(report: &KindReport) {
    output::header(&report.kind);
    output::action("capabilities", &report.capability_sets.join(", "));
    output::action("children", &report.children);
    for prop in &report.properties {
        let ty = prop.ty.to_string();
        output::detail(&format!("{:<20} {:<24} ({})", prop.name, ty, prop.origin));
    }
}

fn cmd_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not found)" };
                output::action("global", &format!("{}{}", path.display(), state));
            }
            None => output::warning("cannot determine config directory"),
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
