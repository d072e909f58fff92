//! Headless demo: run one all-AI race to its terminal state and print the
//! standings as JSON lines.
//!
//! Usage: `cutline [seed] [runner_count]`

use cutline::consts::DEFAULT_ROSTER;
use cutline::{NoHooks, RaceConfig, RaceSession};

/// Generous bound; a race normally ends well inside it
const TICK_LIMIT: u64 = 60 * 600;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(1);
    let runner_count = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_ROSTER);

    let mut session = RaceSession::new(RaceConfig {
        seed,
        runner_count,
        ..Default::default()
    });
    let mut hooks = NoHooks;

    let mut ticks: u64 = 0;
    while !session.is_over() && ticks < TICK_LIMIT {
        session.step(&mut hooks);
        ticks += 1;
    }

    let snapshot = session.level().snapshot();
    if session.is_over() {
        log::info!(
            "race ended after {} ticks: {:?}, {} finished, {} eliminated",
            ticks,
            snapshot.status,
            snapshot.finisher_count,
            snapshot.eliminated_count
        );
    } else {
        log::warn!("race did not terminate within the tick limit");
    }

    for result in session.results() {
        match serde_json::to_string(result) {
            Ok(line) => println!("{line}"),
            Err(err) => log::error!("failed to serialize a result: {err}"),
        }
    }
}
