use super::config::{default_config_path, CouncilConfig};
use council::governance::{controllers_snapshot, proposals_snapshot, Address, GovernanceState};
use council::protocol::ProposalRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView {
    controllers: Vec<Address>,
    proposals: BTreeMap<String, ProposalRecord>,
    next_proposal_number: u64,
    schema_version: u64,
    digest: String,
}

/// Print the contents of a state snapshot
///
/// The snapshot comes from `--snapshot`, or from the config's
/// `[state] snapshot_path`.
pub async fn execute(
    snapshot: Option<String>,
    config_path: Option<String>,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot_path = match snapshot {
        Some(path) => PathBuf::from(path),
        None => {
            let config_path = config_path
                .map(PathBuf::from)
                .unwrap_or_else(default_config_path);
            CouncilConfig::load(&config_path)?
                .state
                .snapshot_path
                .ok_or("No --snapshot given and the config has no [state] snapshot_path")?
        }
    };

    let state = read_snapshot(&snapshot_path).await?;
    println!("{}", render(&state, as_json)?);
    Ok(())
}

async fn read_snapshot(path: &Path) -> Result<GovernanceState, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read snapshot '{}': {}", path.display(), e))?;
    Ok(GovernanceState::from_bytes(&bytes)?)
}

fn render(state: &GovernanceState, as_json: bool) -> Result<String, Box<dyn std::error::Error>> {
    let digest = state.digest()?;

    if as_json {
        let view = SnapshotView {
            controllers: controllers_snapshot(state),
            proposals: proposals_snapshot(state),
            next_proposal_number: state.sequencer.peek(),
            schema_version: state.schema_version,
            digest,
        };
        return Ok(serde_json::to_string_pretty(&view)?);
    }

    let thresholds = state.thresholds();
    let mut out = String::new();
    out.push_str(&format!(
        "Controllers ({}, pass {} / fail {}):\n",
        state.controllers.count(),
        thresholds.pass,
        thresholds.fail
    ));
    for controller in state.controllers.iter() {
        out.push_str(&format!("  {}\n", controller));
    }

    out.push_str(&format!("Open proposals ({}):\n", state.proposals.len()));
    for number in state.proposals.numbers() {
        if let Some(proposal) = state.proposals.get(number) {
            out.push_str(&format!(
                "  #{} {} by {} (yays {}, nays {})\n",
                proposal.number,
                proposal.name,
                proposal.proposer,
                proposal.yays_count(),
                proposal.nays_count()
            ));
        }
    }

    out.push_str(&format!("Next proposal number: {}\n", state.sequencer.peek()));
    out.push_str(&format!("Digest: {}", digest));
    Ok(out)
}
