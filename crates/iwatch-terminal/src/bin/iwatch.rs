//! iwatch: run a command repeatedly and highlight what changed.
//!
//! Run: cargo run -p iwatch-terminal --bin iwatch -- -w date

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use iwatch_core::WatchContext;
use iwatch_terminal::{install_panic_hook, logging, signals, App, Cli, FileConfig, Settings};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if cli.dump_config {
        print!("{}", FileConfig::default_yaml());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init() {
        eprintln!("iwatch: cannot open log file: {e}");
        return ExitCode::from(1);
    }

    let file = match &cli.config {
        Some(path) => match FileConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("iwatch: {e}");
                return ExitCode::from(e.exit_code());
            }
        },
        None => FileConfig::load(),
    };

    let Some(command) = cli.command_spec() else {
        eprintln!("iwatch: no command given");
        return ExitCode::from(1);
    };

    let settings = Settings::resolve(&cli, &file);
    info!(command = command.display(), ?settings, "starting");

    let shutdown = match signals::shutdown_flag() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("iwatch: cannot install signal handlers: {e}");
            return ExitCode::from(1);
        }
    };
    install_panic_hook();

    let ctx = WatchContext::new(command, settings.display_state());
    let mut app = App::new(ctx, shutdown).with_config(settings.tui_config());

    match app.run() {
        Ok(()) => {
            info!(stats = ?app.stats(), "exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "fatal");
            eprintln!("iwatch: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
