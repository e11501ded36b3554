use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use emote_core::impls::InMemoryMediaService;
use emote_core::observability::ReactionCounts;
use emote_core::{
    ParticipantId, ReactOutcome, ReactionBridge, ReactionConfig, ReactionKind, ReactionStore,
};
use rand::seq::SliceRandom;
use serde::Serialize;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::EnvFilter;

const REMOTE_PEERS: [&str; 3] = ["alice", "bob", "carol"];

/// What a participant tile would render.
#[derive(Debug, Serialize)]
struct TileView {
    participant: String,
    kind: ReactionKind,
    label: &'static str,
    glyph: &'static str,
    age_ms: u128,
}

#[derive(Debug, Serialize)]
struct Report {
    visible: Vec<TileView>,
    counts: ReactionCounts,
}

async fn report(store: &ReactionStore) -> Report {
    let mut visible = Vec::new();
    for event in store.snapshot().await {
        // may have expired between the two reads
        if let Some((event, age)) = store.active_for(event.participant_id()).await {
            visible.push(TileView {
                participant: event.participant_id().to_string(),
                kind: event.kind(),
                label: event.kind().label(),
                glyph: event.kind().glyph(),
                age_ms: age.as_millis(),
            });
        }
    }
    Report {
        visible,
        counts: store.counts().await,
    }
}

fn print_report(title: &str, report: &Report) -> Result<(), serde_json::Error> {
    println!("== {title}");
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Demo: one local participant and a few simulated remote peers in a call.
///
/// Usage: `emote-cli [config.json]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // (A) config: path from argv, defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => ReactionConfig::from_path(path)?,
        None => ReactionConfig::default(),
    };
    info!(ttl_ms = config.ttl_ms, "starting reaction demo");

    // (B) store + media service + bridge
    let media = Arc::new(InMemoryMediaService::new());
    let store = ReactionStore::new(&config)?;
    let bridge = ReactionBridge::new(store.clone(), media.clone());
    let mut changes = store.subscribe();

    // reacting before joining is dropped
    let early = bridge.react("clap").await;
    info!(?early, "reaction before join");

    bridge.join(ParticipantId::parse("me")?).await;
    if let ReactOutcome::Applied(event) = bridge.react("clap").await {
        info!(kind = %event.kind(), "local reaction applied");
    }

    // (C) remote peers react with random kinds, plus one the client does not know
    let remote: Vec<(&str, ReactionKind)> = {
        let mut rng = rand::thread_rng();
        REMOTE_PEERS
            .iter()
            .filter_map(|peer| ReactionKind::ALL.choose(&mut rng).map(|kind| (*peer, *kind)))
            .collect()
    };
    for (peer, kind) in &remote {
        media.deliver(peer, kind.as_str());
    }
    media.deliver("mallory", "wink");

    // one Set for us, one per known remote reaction
    for _ in 0..=remote.len() {
        changes.recv().await?;
    }
    print_report("active reactions", &report(&store).await)?;
    info!(sent = ?media.sent(), "outbound reactions");

    // (D) someone leaves, the rest expire on their own
    bridge.participant_left(&ParticipantId::parse(REMOTE_PEERS[0])?).await;
    sleep(config.ttl() + Duration::from_millis(100)).await;
    print_report("after ttl", &report(&store).await)?;

    // (E) session teardown
    bridge.shutdown().await;
    Ok(())
}
