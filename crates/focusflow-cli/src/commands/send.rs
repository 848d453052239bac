use focusflow_core::{Config, SessionController};

use super::{notifier, open_store, CmdResult};

pub async fn run(config: &Config, message: &str) -> CmdResult {
    let store = open_store(config)?;
    let notifier = notifier(config, &store);
    let (client, session_task) = SessionController::new(store, notifier).spawn();

    let response = client.send_json(message).await?;
    println!("{}", serde_json::to_string(&response)?);

    drop(client);
    session_task.await?;
    if !response.is_success() {
        return Err("message was rejected".into());
    }
    Ok(())
}
