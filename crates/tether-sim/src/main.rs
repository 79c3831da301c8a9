//! Simulation driver: one compute node against an in-process memory fleet.
//!
//! Loads a JSON [`SimConfig`] (path as the first argument, defaults
//! otherwise), spawns one memory-server task per memory node, bootstraps
//! the tree, then drives a tick loop that launches due operations and
//! feeds completions back into the engine. Past the simulation horizon
//! no new operations launch; in-flight operations drain to completion.

use std::time::{Duration, Instant};
use tether_common::{Result, SimConfig, TetherError};
use tether_engine::{BTreeEngine, Outcome, WorkloadGenerator, WorkloadKind};
use tether_memory::{MemoryServer, MemoryStore, SharedStore};
use tether_net::open_channels;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text)
                .map_err(|e| TetherError::ConfigError(format!("{path}: {e}")))?
        }
        None => SimConfig::default(),
    };

    run(config).await
}

async fn run(config: SimConfig) -> Result<()> {
    let (gateway, mut completions, endpoints) =
        open_channels(config.engine.node_id, config.engine.num_memory_nodes)?;

    let mut stores: Vec<SharedStore> = Vec::new();
    for (memory_node, endpoint) in endpoints.into_iter().enumerate() {
        let store = MemoryStore::shared(memory_node as u32, config.memory.clone());
        stores.push(store.clone());
        MemoryServer::spawn(store, endpoint);
    }
    tracing::info!(
        memory_nodes = stores.len(),
        slab_size = config.memory.slab_size,
        "memory fleet online"
    );

    let mut engine = BTreeEngine::new(config.engine.clone(), &config.memory, gateway)?;
    engine.bootstrap(&mut completions).await?;
    tracing::info!(
        "tree bootstrapped: root {:#x}, fanout {}",
        engine.root_addr(),
        config.engine.btree_fanout
    );

    let mut schedule = WorkloadGenerator::new(
        config.engine.node_id,
        config.engine.key_range,
        config.workload.clone(),
    )
    .generate();
    tracing::info!(operations = schedule.len(), "workload generated");

    let horizon = Duration::from_micros(config.workload.simulation_duration_us);
    let tick_period =
        Duration::from_nanos(1_000_000_000 / u64::from(config.workload.ops_per_second.max(1)));
    let mut ticker = tokio::time::interval(tick_period);
    let max_per_tick = config.ops_per_tick();
    let started = Instant::now();

    let mut found = 0u64;
    let mut missed = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = started.elapsed();
                if now > horizon {
                    // Deadline passed: stop launching, drain in-flight work
                    if engine.outstanding() == 0 {
                        break;
                    }
                } else {
                    let mut launched = 0;
                    while launched < max_per_tick {
                        let due = matches!(schedule.front(), Some(op) if op.scheduled_at <= now);
                        if !due {
                            break;
                        }
                        if let Some(op) = schedule.pop_front() {
                            match op.kind {
                                WorkloadKind::Insert => engine.insert(op.key, op.value)?,
                                WorkloadKind::Search => engine.search(op.key)?,
                            }
                            launched += 1;
                        }
                    }
                    if schedule.is_empty() && engine.outstanding() == 0 {
                        break;
                    }
                }
            }
            Some(completion) = completions.recv() => {
                engine.handle_completion(completion)?;
            }
        }

        for result in engine.drain_results() {
            if let Outcome::Searched { value, .. } = result.outcome {
                if value.is_some() {
                    found += 1;
                } else {
                    missed += 1;
                }
            }
        }
    }

    println!("simulation finished in {:?}", started.elapsed());
    println!("tree height: {}", engine.tree_height());
    println!("{}", engine.stats());
    println!("searches found: {found}, missed: {missed}");
    for (memory_node, store) in stores.iter().enumerate() {
        let store = store.lock();
        println!(
            "memory node {memory_node}: {} reads, {} writes served",
            store.reads_served(),
            store.writes_served()
        );
    }

    Ok(())
}
