use focusflow_core::{Config, SessionController};

use super::{notifier, open_store, CmdResult};

/// Clear any interrupted session, then keep the daily analytics reset
/// scheduled until Ctrl-C.
pub async fn run(config: &Config) -> CmdResult {
    let store = open_store(config)?;
    let notifier = notifier(config, &store);
    let controller = SessionController::new(store, notifier);

    if controller.recover_interrupted_session() {
        tracing::info!("cleared interrupted session from previous run");
    }
    let mut daily_reset = controller.schedule_daily_reset();

    tracing::info!("daily reset scheduled");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    daily_reset.cancel();
    Ok(())
}
