use builderbus::app::App;
use builderbus::{init_logging, EventBusConfig, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!(version = VERSION, build_date = BUILD_DATE, "Starting builderbus demo");

    // Optional config path as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => EventBusConfig::load(&path)?,
        None => EventBusConfig::with_history(32),
    };

    let mut app = App::new(config);
    app.add_task("t1", "Sketch landing page");
    app.add_task("t2", "Pick brand colors");
    app.hover("hero-button");
    app.complete_task("t1");

    app.store().with_state(|state| -> anyhow::Result<()> {
        tracing::info!(state = %serde_json::to_string(state)?, "Final store state");
        Ok(())
    })?;
    for envelope in app.bus().history() {
        tracing::info!(event_type = %envelope.event_type, id = %envelope.id, "History");
    }

    app.shutdown();
    Ok(())
}
