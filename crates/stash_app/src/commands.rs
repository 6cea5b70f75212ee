use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use stash_core::{update, DecodeError, Msg, NormalizedCollection, SyncPhase, SyncState};
use stash_engine::{export_snapshot, import_snapshot, RedditClient, SyncSettings};
use stash_logging::{stash_info, stash_warn};

use crate::config::load_config;
use crate::runner::run_sync;

pub const TOKEN_ENV: &str = "STASH_TOKEN";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub out: Option<PathBuf>,
    pub merge: Option<PathBuf>,
    pub deadline_secs: Option<u64>,
    pub token: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn sync(options: SyncOptions) -> anyhow::Result<ExitCode> {
    let token = resolve_token(options.token, std::env::var(TOKEN_ENV).ok())?;
    let config = load_config(options.config.as_deref())?;
    let settings = config.apply(SyncSettings::default());
    let client = RedditClient::new(settings, token).context("invalid client settings")?;

    let mut state = SyncState::new();
    if let Some(path) = &options.merge {
        let restored = import_snapshot(path)?;
        stash_info!("merging {} restored records from {:?}", restored.len(), path);
        state = update(state, Msg::SnapshotImported(restored)).0;
    }

    let deadline = options.deadline_secs.map(Duration::from_secs);
    let finished = run_sync(Arc::new(client), state, deadline)?;
    let view = finished.view();

    let exit = match &view.phase {
        SyncPhase::Empty => {
            println!("No saved content found.");
            ExitCode::SUCCESS
        }
        SyncPhase::Error(failure) => {
            eprintln!("Sync failed: {failure}");
            ExitCode::FAILURE
        }
        SyncPhase::Cancelled => {
            eprintln!("Sync cancelled; keeping {} records fetched so far.", view.total);
            ExitCode::SUCCESS
        }
        _ => ExitCode::SUCCESS,
    };

    let collection = finished.into_collection();
    if collection.is_empty() {
        return Ok(exit);
    }
    let out = options.out.unwrap_or_else(default_output_path);
    let written = export_snapshot(&out, &collection)?;
    println!("{}", summarize(&collection));
    println!("Wrote {}", written.display());
    Ok(exit)
}

pub fn inspect(path: &Path) -> anyhow::Result<ExitCode> {
    match import_snapshot(path) {
        Ok(collection) => {
            println!("{}", summarize(&collection));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.decode_error() {
            Some(DecodeError::UnsupportedVersion { .. }) => {
                stash_warn!("rejected snapshot {:?}: {}", path, err);
                eprintln!("{} was written by an incompatible version: {err}", path.display());
                Ok(ExitCode::FAILURE)
            }
            Some(DecodeError::MalformedSnapshot(_)) => {
                stash_warn!("rejected snapshot {:?}: {}", path, err);
                eprintln!("{} is not a valid snapshot: {err}", path.display());
                Ok(ExitCode::FAILURE)
            }
            None => Err(err.into()),
        },
    }
}

/// The `--token` flag wins over the environment; blank values count as absent.
pub fn resolve_token(flag: Option<String>, env: Option<String>) -> anyhow::Result<String> {
    match flag.or(env).map(|t| t.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bail!("no access token: pass --token or set {TOKEN_ENV}"),
    }
}

pub fn summarize(collection: &NormalizedCollection) -> String {
    let (posts, comments) = collection.count_by_kind();
    let subreddits = collection.subreddits();
    let mut text = format!(
        "{} records ({} posts, {} comments, {} restored)",
        collection.len(),
        posts,
        comments,
        collection.restored_count()
    );
    if !subreddits.is_empty() {
        text.push_str(&format!("\nsubreddits: {}", subreddits.join(", ")));
    }
    text
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "stash-{}.json",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}
