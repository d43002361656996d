use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    cancel_pair, dispatch, ClientSettings, Column, ErrorKind, TrainList, TransportSession,
    ViewObserver,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use shared::domain::TerritoryId;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod keys;
mod render;

use render::{Screen, TerminalGuard};

#[derive(Parser, Debug)]
#[command(about = "Live list of trains on a Run 8 dispatcher session")]
struct Args {
    /// Simulator host name or address.
    host: Option<String>,
    /// Connect to a simulator on this machine.
    #[arg(long, conflicts_with = "host")]
    localhost: bool,
    #[arg(long)]
    port: Option<u16>,
    /// Settings file. Defaults to ./trainlist.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Initial sort column, e.g. `speed` or `territory`.
    #[arg(long)]
    sort: Option<Column>,
    #[arg(long)]
    descending: bool,
    /// Hide a territory by id. May be repeated.
    #[arg(long = "hide", value_name = "TERRITORY")]
    hidden: Vec<u32>,
    /// Hide trains in unknown territories or on unsignalled track.
    #[arg(long)]
    hide_unknown: bool,
    /// Where log output goes while the table owns the terminal.
    #[arg(long, default_value = "trainlist.log")]
    log_file: PathBuf,
}

impl Args {
    fn apply(&self, settings: &mut ClientSettings) {
        if self.localhost {
            settings.host = "localhost".to_string();
        } else if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(column) = self.sort {
            settings.sort_column = column;
        }
        if self.descending {
            settings.sort_descending = true;
        }
        settings
            .disabled_territories
            .extend(self.hidden.iter().copied().map(TerritoryId));
        if self.hide_unknown {
            settings.show_unknown_territories = false;
        }
    }
}

fn init_tracing(default_filter: &str, log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings =
        ClientSettings::load(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings);
    init_tracing(&settings.log_filter, &args.log_file)?;

    let gazetteer = settings.gazetteer()?;
    let filter = settings.territory_filter(gazetteer.territories());
    let territories = gazetteer.territories().known_territories();
    let endpoint = settings.endpoint();
    let (cancel, signal) = cancel_pair();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, disconnecting");
            interrupt.cancel();
        }
    });

    let mut session = TransportSession::new(signal);
    let mut list = TrainList::new(gazetteer, filter, settings.sort_key());

    let err = {
        let _guard = TerminalGuard::enter()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .context("failed to set up the terminal")?;
        let mut screen = Screen::new(terminal);
        screen.refresh(&list);

        let (commands_tx, mut commands) = mpsc::channel(16);
        keys::spawn_input_thread(territories, commands_tx, cancel);
        match session.connect(&endpoint).await {
            Ok(()) => {
                dispatch::run_with_commands(&mut session, &mut list, &mut screen, &mut commands)
                    .await
            }
            Err(err) => err,
        }
    };
    drop(list);

    match err.kind() {
        ErrorKind::Cancelled => Ok(()),
        ErrorKind::PermissionDenied => bail!(
            "the simulator at {} rescinded this client's dispatcher permission",
            endpoint.host
        ),
        ErrorKind::Transport => Err(err).with_context(|| {
            format!(
                "lost the dispatcher session with {}:{}",
                endpoint.host, endpoint.port
            )
        }),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
