use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rand::Rng;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod auth;
mod controller;
mod domain;
mod inputter;
mod mock;
mod model;
mod records;
mod table;
mod ui;

use controller::Controller;
use domain::{AppConfig, AppError, PAGE_SIZES};
use model::{Model, Status};

#[derive(Parser, Debug)]
#[command(version, about = "Terminal back-office dashboard over mock client data")]
struct Args {
    /// Seed for the generated client list, random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Rows per page at startup
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Where the login session is kept between runs
    #[arg(long, default_value = "~/.backoffice-session.json")]
    session_file: String,

    /// Append logs to this file, filtered through RUST_LOG
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        init_tracing(log_file)?;
    }
    if !PAGE_SIZES.contains(&args.page_size) {
        return Err(AppError::InvalidPageSize(args.page_size));
    }

    let config = AppConfig {
        event_poll_time: 100,
        page_size: args.page_size,
        session_file: expand(&args.session_file)?,
        seed: args.seed.unwrap_or_else(|| rand::thread_rng().r#gen()),
    };
    info!("Starting backoffice with {config:?}");

    let controller = Controller::new(&config);
    let mut model = Model::init(config);
    let mut terminal = ratatui::init();

    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui::draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        }
    }

    ratatui::restore();
    Ok(())
}

/// Expand `~` and environment variables in user-supplied paths.
fn expand(path: &str) -> Result<PathBuf, AppError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| AppError::PathExpansion(path.to_string(), e.to_string()))
}

/// The terminal owns stdout, so logs go to a file instead.
fn init_tracing(log_file: &str) -> Result<(), AppError> {
    let path = expand(log_file)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
