use super::config::{default_config_path, CouncilConfig};
use council::governance::GovernanceState;
use council::observability::{init_logging, session_span, LogFormat};
use council::protocol::{handle_message, Message, Outbox, ProposalEvent};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{info, warn, Instrument};

/// Event line on stdout. `_e` distinguishes events from outbound messages.
#[derive(Serialize)]
struct EventLine<'a> {
    #[serde(rename = "_e")]
    marker: u8,
    #[serde(flatten)]
    event: &'a ProposalEvent,
}

/// Replay a JSON-lines message log through the engine
///
/// ## State
///
/// State is loaded from one of these sources (in order of precedence):
/// 1. `--snapshot` if the file exists
/// 2. `[state] snapshot_path` from the config if the file exists
/// 3. A fresh council seeded with `[governance] initial_controllers`
///
/// After the input is exhausted the state is written back to the snapshot
/// path, when there is one.
///
/// ## Output
///
/// Every outbound message and every event is printed to stdout as one JSON
/// line, in the order the engine produced them. Logs go to stderr.
pub async fn execute(
    config_path: Option<String>,
    input: String,
    snapshot: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    let (format, level) = config
        .as_ref()
        .map(|c| (c.logging.format, c.logging.level.clone()))
        .unwrap_or((LogFormat::Pretty, "info".to_string()));
    init_logging(format, &level);

    let snapshot_path = snapshot
        .map(PathBuf::from)
        .or_else(|| config.as_ref().and_then(|c| c.state.snapshot_path.clone()));

    let mut state = load_state(snapshot_path.as_deref(), config.as_ref()).await?;

    let span = session_span(
        snapshot_path.as_deref().and_then(Path::to_str),
        state.controllers.count(),
    );

    let stats = async {
        let reader: Box<dyn AsyncBufRead + Unpin> = if input == "-" {
            Box::new(BufReader::new(tokio::io::stdin()))
        } else {
            Box::new(BufReader::new(fs::File::open(&input).await.map_err(|e| {
                format!("Failed to open input '{}': {}", input, e)
            })?))
        };
        let mut writer = BufWriter::new(tokio::io::stdout());
        let stats = process_lines(&mut state, reader, &mut writer).await?;
        writer.flush().await?;
        Ok::<_, Box<dyn std::error::Error>>(stats)
    }
    .instrument(span)
    .await?;

    info!(
        handled = stats.handled,
        skipped = stats.skipped,
        controllers = state.controllers.count(),
        open_proposals = state.proposals.len(),
        "input exhausted"
    );

    if let Some(path) = &snapshot_path {
        save_snapshot(&state, path).await?;
        info!(path = %path.display(), digest = %state.digest()?, "snapshot written");
    }

    Ok(())
}

/// Counters for one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub handled: usize,
    pub skipped: usize,
}

/// Feed every line of `reader` through the engine, writing JSON lines to
/// `writer`. Blank lines are ignored; malformed lines are logged and skipped.
pub async fn process_lines<R, W>(
    state: &mut GovernanceState,
    reader: R,
    writer: &mut W,
) -> Result<ReplayStats, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message = match Message::from_json_line(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(line = line_number, error = %e, "skipping malformed message");
                stats.skipped += 1;
                continue;
            }
        };

        let outbox = handle_message(state, &message);
        write_outbox(&outbox, writer).await?;
        stats.handled += 1;
    }

    Ok(stats)
}

async fn write_outbox<W>(outbox: &Outbox, writer: &mut W) -> Result<(), Box<dyn std::error::Error>>
where
    W: AsyncWrite + Unpin,
{
    for message in &outbox.messages {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    for event in &outbox.events {
        let mut line = serde_json::to_vec(&EventLine { marker: 1, event })?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    Ok(())
}

/// Explicit `--config` must exist; the default path is optional.
fn load_config(
    config_path: Option<String>,
) -> Result<Option<CouncilConfig>, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => Ok(Some(CouncilConfig::load(Path::new(&path))?)),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(Some(CouncilConfig::load(&path)?))
            } else {
                Ok(None)
            }
        }
    }
}

pub async fn load_state(
    snapshot_path: Option<&Path>,
    config: Option<&CouncilConfig>,
) -> Result<GovernanceState, Box<dyn std::error::Error>> {
    if let Some(path) = snapshot_path {
        if fs::try_exists(path).await? {
            let bytes = fs::read(path).await?;
            let state = GovernanceState::from_bytes(&bytes)
                .map_err(|e| format!("Failed to load snapshot '{}': {}", path.display(), e))?;
            info!(
                path = %path.display(),
                controllers = state.controllers.count(),
                open_proposals = state.proposals.len(),
                "snapshot loaded"
            );
            return Ok(state);
        }
    }

    let config = config.ok_or(
        "No snapshot and no config file found. Run `council init --controller <address>` first.",
    )?;
    let state = GovernanceState::new(config.governance.initial_controllers.iter().map(String::as_str))?;
    info!(controllers = state.controllers.count(), "starting fresh council");
    Ok(state)
}

pub async fn save_snapshot(
    state: &GovernanceState,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, state.to_bytes()?).await?;
    Ok(())
}
