//! Two trigger cycles linked by a deferred event.
//!
//! The first cycle defers `db_ready` because the database is not up yet; the
//! second cycle replays it before handling `update_status`.
//!
//! Run with `RUST_LOG=charmsim=debug cargo run --example deferred`.

use charmsim::capture::{CaptureConfig, capture};
use charmsim::{monitors::Tracer, *};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct DbReady;
impl Event for DbReady {}

struct Webapp {
    db_up: bool,
    configured: bool,
}

impl Webapp {
    fn on_start(fw: &mut Framework<Self>, _event: &Emission) -> Result {
        fw.emit("db_ready")
    }

    fn on_db_ready(fw: &mut Framework<Self>, event: &Emission) -> Result {
        if !fw.charm().db_up {
            println!("database not up, deferring {}", event.handle());
            event.defer();
            return Ok(());
        }
        fw.charm_mut().configured = true;
        Ok(())
    }
}

impl Charm for Webapp {
    fn new(meta: &CharmMeta) -> Self {
        // The second session finds the database running.
        Webapp {
            db_up: meta.summary() == Some("db up"),
            configured: false,
        }
    }

    fn declare(registry: &mut Registry<Self>) {
        registry
            .event::<DbReady>("db_ready")
            .observe("start", "on_start", Self::on_start)
            .observe("db_ready", "on_db_ready", Self::on_db_ready);
    }
}

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let _tracer = interception::install(Tracer);

    let config = CaptureConfig::default().with_include_framework(true);

    let meta = CharmMeta::new("webapp");
    let first = capture(config.clone(), || {
        trigger::<Webapp>(&State::new(), "start", &meta)
    });
    let (outcome, log) = first.into_parts();
    let outcome = outcome?;
    println!("first cycle: {log}");
    println!("deferred: {:?}", outcome.deferred());

    let state = outcome.output_state();
    println!(
        "carried state: {}",
        serde_json::to_string(&state).map_err(Error::from)?
    );

    let meta = meta.with_summary("db up");
    let second = capture(config, || trigger::<Webapp>(&state, "update_status", &meta));
    let (outcome, log) = second.into_parts();
    let outcome = outcome?;
    println!("second cycle: {log}");
    for event in &log {
        println!("  {event}");
    }
    println!("configured: {}", outcome.charm().configured);

    Ok(())
}
