//! `bagctl`: apply replacements, undo changes and inspect the ledger of a
//! JSON-backed bag store.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fitting_backend::config::BagSettings;
use fitting_backend::domain::ports::{BagGrader, BagGraderError, FixtureBagGrader};
use fitting_backend::domain::{
    BagMutationService, BagPorts, ChangeId, ClubId, Error, Grade, OwnerId, OwnerLocks,
    ReplacementAdvisorService, ReplacementMode, SessionId, SetSpec, UndoService,
};
use fitting_backend::inbound::{
    ApplyReplacementBody, BagOperations, CallerIdentity, SuggestReplacementBody, UndoChangeBody,
    exit,
};
use fitting_backend::outbound::grading::HttpBagGrader;
use fitting_backend::outbound::memory::{
    InMemoryBagStore, SnapshotLock, load_document, save_document,
};

#[derive(Debug, Parser)]
#[command(name = "bagctl", about = "Golf bag replacement and undo tool")]
struct Cli {
    /// Snapshot file; overrides `BAG_STORE_PATH`.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Owner acting on the bag.
    #[arg(long, global = true)]
    owner: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend a set or single replacement.
    Suggest {
        #[arg(long)]
        club_type: String,
        #[arg(long)]
        winning: String,
    },
    /// Replace a club (or a set) after a testing session.
    Apply {
        #[arg(long)]
        session: String,
        #[arg(long)]
        winning: String,
        #[arg(long)]
        losing: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Single)]
        mode: ModeArg,
        /// Set specification as JSON, required with `--mode set`.
        #[arg(long)]
        set_spec: Option<String>,
    },
    /// Undo a recorded change.
    Undo {
        #[arg(long)]
        change: String,
    },
    /// List recorded changes, newest first.
    History,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Single,
    Set,
}

impl From<ModeArg> for ReplacementMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Single => Self::Single,
            ModeArg::Set => Self::Set,
        }
    }
}

enum ConfiguredGrader {
    Http(HttpBagGrader),
    Fixture(FixtureBagGrader),
}

#[async_trait]
impl BagGrader for ConfiguredGrader {
    async fn grade(&self, owner_id: &OwnerId) -> Result<Grade, BagGraderError> {
        match self {
            Self::Http(grader) => grader.grade(owner_id).await,
            Self::Fixture(grader) => grader.grade(owner_id).await,
        }
    }
}

fn invalid_input<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidInput, error)
}

fn build_grader(settings: &BagSettings) -> io::Result<ConfiguredGrader> {
    match settings.grader_url().map_err(invalid_input)? {
        Some(endpoint) => {
            info!(%endpoint, "using HTTP grading service");
            HttpBagGrader::new(endpoint, settings.grader_timeout())
                .map(ConfiguredGrader::Http)
                .map_err(io::Error::other)
        }
        None => {
            warn!("BAG_GRADER_URL not set; using fixture grader");
            Ok(ConfiguredGrader::Fixture(FixtureBagGrader))
        }
    }
}

fn print_json(value: &impl Serialize) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{rendered}");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Rejected(#[from] Error),
}

/// Application bootstrap.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match execute(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Rejected(rejection)) => {
            let (rendered, status) = exit::report(&rejection);
            eprintln!("{rendered}");
            status
        }
        Err(CliError::Io(failure)) => {
            tracing::error!(error = %failure, "bagctl failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<(), CliError> {
    // Subcommands belong to clap; settings come from files and environment.
    let settings =
        BagSettings::load_from_iter([OsString::from("bagctl")]).map_err(io::Error::other)?;
    let undo_window = settings.undo_window().map_err(invalid_input)?;
    let store_path = cli.store.clone().unwrap_or_else(|| settings.store_path());

    // Held until the snapshot is saved so concurrent runs cannot both consume
    // the same change.
    let _snapshot_lock = SnapshotLock::acquire(&store_path).map_err(io::Error::other)?;
    let document = load_document(&store_path).map_err(io::Error::other)?;
    let store = Arc::new(InMemoryBagStore::from_document(document));
    let grader = Arc::new(build_grader(&settings)?);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let locks = Arc::new(OwnerLocks::new());
    let ports = BagPorts::new(Arc::clone(&store), Arc::clone(&store), grader);
    let undo = Arc::new(UndoService::new(
        ports.clone(),
        Arc::clone(&clock),
        Arc::clone(&locks),
    ));
    let operations = BagOperations {
        advisor: Arc::new(ReplacementAdvisorService::new(Arc::clone(&store))),
        mutations: Arc::new(
            BagMutationService::new(ports, clock, locks).with_undo_window(undo_window),
        ),
        undo: undo.clone(),
        history: undo,
    };

    let caller = CallerIdentity::from(
        cli.owner
            .map(OwnerId::new)
            .transpose()
            .map_err(invalid_input)?,
    );

    if run(&operations, &caller, cli.command).await? {
        save_document(&store_path, &store.snapshot().await).map_err(io::Error::other)?;
        info!(path = %store_path.display(), "snapshot saved");
    }
    Ok(())
}

/// Dispatch one subcommand. Returns whether the bag was mutated.
async fn run(
    operations: &BagOperations,
    caller: &CallerIdentity,
    command: Command,
) -> Result<bool, CliError> {
    match command {
        Command::Suggest { club_type, winning } => {
            let body = SuggestReplacementBody {
                club_type,
                winning_club_id: ClubId::new(winning).map_err(invalid_input)?,
            };
            print_json(&operations.suggest_replacement(caller, body).await?)?;
            Ok(false)
        }
        Command::Apply {
            session,
            winning,
            losing,
            mode,
            set_spec,
        } => {
            let set_spec = set_spec
                .as_deref()
                .map(serde_json::from_str::<SetSpec>)
                .transpose()
                .map_err(invalid_input)?;
            let body = ApplyReplacementBody {
                session_id: SessionId::new(session).map_err(invalid_input)?,
                winning_club_id: ClubId::new(winning).map_err(invalid_input)?,
                losing_club_id: ClubId::new(losing).map_err(invalid_input)?,
                mode: mode.into(),
                set_spec,
            };
            print_json(&operations.apply_replacement(caller, body).await?)?;
            Ok(true)
        }
        Command::Undo { change } => {
            let body = UndoChangeBody {
                change_id: ChangeId::new(change).map_err(invalid_input)?,
            };
            print_json(&operations.undo_change(caller, body).await?)?;
            Ok(true)
        }
        Command::History => {
            print_json(&operations.list_changes(caller).await?)?;
            Ok(false)
        }
    }
}
