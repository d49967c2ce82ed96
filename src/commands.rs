use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::core::auth::{AccountKind, AccountManager};
use crate::core::downloader::{ensure_file_hash, PauseGate, ProgressFn, TransferProgress};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::install::{DownloadOrchestrator, DownloadTask, TaskQueue};
use crate::core::instance::GameLayout;
use crate::core::launch::build_launch_command;
use crate::core::state::AppState;

#[derive(Parser)]
#[command(name = "pmcl")]
#[command(about = "Download, authenticate and prepare Minecraft versions")]
pub struct Cli {
    /// Launcher data directory (config, profiles, keys)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the download mirrors and print the fastest
    Mirror,
    /// List versions from the manifest
    Versions {
        /// Include snapshots and old versions
        #[arg(long)]
        all: bool,
    },
    /// Download a version (type `p` or `r` + Enter to pause/resume)
    Download {
        version: String,
        /// Only the client binary, asset index and libraries
        #[arg(long)]
        core: bool,
        /// Only the asset objects
        #[arg(long)]
        assets: bool,
    },
    /// Check a file against an expected SHA-1
    Verify { path: PathBuf, sha1: String },
    /// Log in and store the profile
    Login(LoginArgs),
    /// Manage stored accounts
    #[command(subcommand)]
    Accounts(AccountCommands),
    /// Print the command that would start an installed version
    Launch {
        version: String,
        /// Profile identity to launch with
        #[arg(long)]
        account: String,
        /// Max heap, e.g. 2G or 4096M
        #[arg(long)]
        memory: Option<String>,
    },
}

#[derive(Args)]
struct LoginArgs {
    kind: LoginKind,
    /// Email/username for online accounts, player name for offline ones
    identity: String,
    #[arg(long)]
    password: Option<String>,
    /// Keep the (encrypted) password for later logins
    #[arg(long)]
    remember: bool,
    /// Use this profile for auto-login
    #[arg(long)]
    auto: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoginKind {
    Official,
    Offline,
    ThirdParty,
}

impl From<LoginKind> for AccountKind {
    fn from(kind: LoginKind) -> Self {
        match kind {
            LoginKind::Official => AccountKind::Official,
            LoginKind::Offline => AccountKind::Offline,
            LoginKind::ThirdParty => AccountKind::ThirdParty,
        }
    }
}

#[derive(Subcommand)]
enum AccountCommands {
    /// List stored profiles
    List,
    /// Invalidate and delete a profile
    Remove { identity: String },
    /// Refresh a profile's session token
    Refresh { identity: String },
    /// Check a profile's session, refreshing it when expired
    Validate { identity: String },
}

pub async fn dispatch(cli: Cli) -> LauncherResult<()> {
    let state = AppState::new(cli.data_dir)?;

    match cli.command {
        Commands::Mirror => select_mirror(&state).await,
        Commands::Versions { all } => list_versions(&state, all).await,
        Commands::Download {
            version,
            core,
            assets,
        } => download(&state, version, core, assets).await,
        Commands::Verify { path, sha1 } => {
            ensure_file_hash(&path, &sha1).await?;
            println!("OK {}", path.display());
            Ok(())
        }
        Commands::Login(args) => login(&state, args).await,
        Commands::Accounts(cmd) => accounts(&state, cmd).await,
        Commands::Launch {
            version,
            account,
            memory,
        } => launch(&state, &version, &account, memory).await,
    }
}

async fn select_mirror(state: &AppState) -> LauncherResult<()> {
    let orchestrator = DownloadOrchestrator::from_state(state)?;
    let mirror = orchestrator.resolver().mirrors().select().await;
    println!("{}\t{}", mirror.label, mirror.manifest_url);
    Ok(())
}

async fn list_versions(state: &AppState, all: bool) -> LauncherResult<()> {
    let orchestrator = DownloadOrchestrator::from_state(state)?;
    let manifest = orchestrator.resolver().manifest().await?;

    let entries: Vec<_> = if all {
        manifest.versions.iter().collect()
    } else {
        manifest.releases()
    };
    for entry in entries {
        println!("{}\t{}\t{}", entry.id, entry.version_type, entry.release_time);
    }
    Ok(())
}

// ── Download ────────────────────────────────────────────

fn print_progress(progress: TransferProgress) {
    let percent = progress
        .percent
        .map(|p| format!("{:5.1}%", p))
        .unwrap_or_else(|| "  ?  ".into());
    eprint!(
        "\r{} {:>10} bytes {:>8.1} KiB/s",
        percent,
        progress.done,
        progress.bytes_per_sec / 1024.0
    );
    let _ = std::io::stderr().flush();
}

/// `p` pauses and `r` resumes. Returns whether the gate is now paused, or
/// `None` for any other line.
fn apply_control(gate: &PauseGate, line: &str) -> Option<bool> {
    match line.trim() {
        "p" => {
            gate.pause();
            Some(true)
        }
        "r" => {
            gate.resume();
            Some(false)
        }
        _ => None,
    }
}

/// Toggles the gate from lines of `input` until aborted or `input` ends.
fn spawn_pause_control<R>(gate: PauseGate, input: R) -> tokio::task::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    // Blocking reads live on their own thread; the runtime never waits for them.
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            match apply_control(&gate, &line) {
                Some(true) => eprintln!("\npaused (r + Enter to resume)"),
                Some(false) => eprintln!("resumed"),
                None => {}
            }
        }
    })
}

async fn download(state: &AppState, version: String, core: bool, assets: bool) -> LauncherResult<()> {
    let mut queue = TaskQueue::new();
    if core || !assets {
        queue.push(DownloadTask::FetchCoreBinary);
    }
    if assets || !core {
        queue.push(DownloadTask::FetchAssetBundle);
    }

    let orchestrator = Arc::new(DownloadOrchestrator::from_state(state)?);
    let control = spawn_pause_control(orchestrator.gate(), BufReader::new(std::io::stdin()));
    let progress: Arc<ProgressFn> = Arc::new(print_progress);

    let handle = orchestrator.spawn_queue(version.clone(), queue, Some(progress));
    let joined = handle.await;
    control.abort();
    eprintln!();

    let (remaining, result) =
        joined.map_err(|e| LauncherError::Other(format!("download task panicked: {}", e)))?;
    if let Err(e) = result {
        let left: Vec<String> = remaining.iter().map(|t| t.to_string()).collect();
        warn!("Unfinished tasks for {}: {}", version, left.join(", "));
        return Err(e);
    }
    info!("Version {} downloaded", version);
    Ok(())
}

// ── Accounts ────────────────────────────────────────────

async fn login(state: &AppState, args: LoginArgs) -> LauncherResult<()> {
    let manager = AccountManager::from_state(state)?;
    let profile = manager
        .login(
            args.kind.into(),
            &args.identity,
            args.password.as_deref(),
            args.remember,
        )
        .await?;

    if args.auto {
        manager.store().set_auto_login(Some(profile.identity())).await?;
    }
    println!(
        "{}\t{}\t{}",
        profile.identity(),
        profile.kind(),
        profile.unique_id()
    );
    Ok(())
}

async fn accounts(state: &AppState, cmd: AccountCommands) -> LauncherResult<()> {
    let manager = AccountManager::from_state(state)?;
    let store = manager.store();

    match cmd {
        AccountCommands::List => {
            let auto = store.auto_login().await?;
            for profile in store.list_profiles().await? {
                let marker = if auto.as_deref() == Some(profile.identity()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}\t{}\t{}",
                    marker,
                    profile.identity(),
                    profile.kind(),
                    profile.unique_id()
                );
            }
            let remembered = store.remembered_accounts().await?;
            if !remembered.is_empty() {
                println!("remembered logins:");
            }
            for entry in remembered {
                println!(
                    "  {}\t{}\t-> {}",
                    entry.identity,
                    entry.kind,
                    entry.profile.as_deref().unwrap_or(&entry.identity)
                );
            }
        }
        AccountCommands::Remove { identity } => {
            let state = manager.remove(&identity).await?;
            println!("{}: {:?}", identity, state);
        }
        AccountCommands::Refresh { identity } => {
            let mut profile = require_profile(&manager, &identity).await?;
            manager.refresh(&mut profile).await?;
            println!("{}: refreshed", identity);
        }
        AccountCommands::Validate { identity } => {
            let mut profile = require_profile(&manager, &identity).await?;
            let state = manager.ensure_valid(&mut profile).await;
            println!("{}: {:?}", identity, state);
        }
    }
    Ok(())
}

async fn require_profile(
    manager: &AccountManager,
    identity: &str,
) -> LauncherResult<crate::core::auth::Profile> {
    manager
        .store()
        .load_profile(identity)
        .await?
        .ok_or_else(|| LauncherError::NotFound(format!("profile '{}'", identity)))
}

async fn launch(
    state: &AppState,
    version: &str,
    account: &str,
    memory: Option<String>,
) -> LauncherResult<()> {
    let manager = AccountManager::from_state(state)?;
    let mut profile = require_profile(&manager, account).await?;

    let session = manager.ensure_valid(&mut profile).await;
    if !session.is_usable() {
        warn!("Session for '{}' is {:?}; the game may reject it", account, session);
    }

    let memory = memory.unwrap_or_else(|| state.config.max_memory.clone());
    let layout = GameLayout::new(state.game_dir());
    let command = build_launch_command(&profile, &layout, version, &memory)?;
    println!("{}", command);
    Ok(())
}
