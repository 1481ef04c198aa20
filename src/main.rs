mod cli;
mod config;
mod convert;
mod docx;
mod error;
mod models;
mod pdf;
mod toolkit;

use anyhow::Context;
use clap::Parser;
use cli::{run_menu, App, Cli, Commands, LinePrompter, TerminalPrompter};
use colored::*;
use config::Config;
use std::io::IsTerminal;
use toolkit::Toolkit;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Stderr logging, plus daily JSON files when a log directory is configured.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "docshift.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    guard
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to read configuration")?;
    let _guard = init_logging(&config);

    info!("Starting docshift {}", env!("CARGO_PKG_VERSION"));

    let toolkit = Toolkit::new(config.show_progress && !cli.no_progress);
    let app = App::new(toolkit, config, cli.json);

    match cli.command {
        None | Some(Commands::Menu) => {
            let result = if std::io::stdin().is_terminal() {
                run_menu(&app, &mut TerminalPrompter::default())
            } else {
                run_menu(&app, &mut LinePrompter::new(std::io::stdin().lock()))
            };
            if let Err(e) = result {
                println!("{} {}", "Failed to get input:".red(), e);
                return Err(e).context("Interactive menu failed");
            }
        },
        Some(Commands::Run(action)) => {
            app.execute(action);
        },
    }

    Ok(())
}
