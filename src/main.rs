use crate::app::{App, UnrecoverableError};
use crate::args::{Args, Command, Parser};
use crate::logging::LogTarget;
use crate::settings::{default_log_path, default_settings_path, Settings};
use std::process::ExitCode;

mod app;
mod args;
mod clock;
mod dispatch;
mod event;
mod idle;
mod logging;
mod notification;
mod schedule;
mod settings;
mod timespan;
mod tui;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("respite: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), UnrecoverableError> {
    let command = args.command();

    // The terminal ui owns the screen, so its logs go to a file.
    let log_target = match (args.log_file, &command) {
        (Some(path), _) => LogTarget::File(path),
        (None, Command::Run { headless: false }) => LogTarget::File(default_log_path()),
        (None, _) => LogTarget::Stderr,
    };
    logging::init(log_target)?;

    let settings_path = match args.config {
        Some(path) => path,
        None => default_settings_path()?,
    };

    match command {
        Command::Run { headless } => {
            let settings = Settings::load(&settings_path)?;
            let mut app = App::new(settings, settings_path, headless)?;
            app.run().await
        }
        Command::Init { force } => {
            Settings::write_defaults(&settings_path, force)?;
            println!("wrote default settings to {}", settings_path.display());
            Ok(())
        }
        Command::Check => {
            let settings = Settings::load(&settings_path)?;
            println!("{} is valid\n\n{}", settings_path.display(), settings.summary());
            Ok(())
        }
        Command::Path => {
            println!("{}", settings_path.display());
            Ok(())
        }
    }
}
