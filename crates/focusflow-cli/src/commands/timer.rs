use std::sync::Arc;

use clap::Subcommand;
use focusflow_core::{
    AttachOptions, Config, LogSoundPlayer, SessionController, TimerController, TimerServices,
};
use tokio::task::JoinHandle;

use super::{notifier, open_store, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the timer
    Start,
    /// Pause at the current remaining time
    Pause,
    /// Stop and restore the full interval
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Keep the timer attached and ticking until Ctrl-C
    Watch,
    /// Set the focus interval length in minutes (1-60)
    SetFocus { minutes: u32 },
    /// Set the break interval length in minutes (1-30)
    SetBreak { minutes: u32 },
    /// Automatically start breaks after a focus interval
    AutoBreaks {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Notification sound: bell, chime, digital, gentle or none
    Sound { id: String },
}

/// A timer attached for the duration of one command, with an in-process
/// session controller to receive its messages.
struct Attached {
    timer: TimerController,
    session_task: JoinHandle<()>,
}

impl Attached {
    async fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let store = open_store(config)?;
        let notifier = notifier(config, &store);
        let (client, session_task) = SessionController::new(store.clone(), notifier.clone()).spawn();
        let services = TimerServices {
            notifier,
            sound: Arc::new(LogSoundPlayer),
            session: Some(client),
        };
        let timer = TimerController::attach(store, services, AttachOptions::from(&config.timer)).await;
        Ok(Self {
            timer,
            session_task,
        })
    }

    /// Detach the timer and let the session controller drain its queue.
    async fn close(self) -> CmdResult {
        self.timer.detach().await;
        self.session_task.await?;
        Ok(())
    }
}

pub async fn run(config: &Config, action: TimerAction) -> CmdResult {
    let attached = Attached::open(config).await?;
    let timer = &attached.timer;

    match action {
        TimerAction::Start => match timer.start().await {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{}", serde_json::to_string_pretty(&timer.snapshot().await)?),
        },
        TimerAction::Pause => match timer.pause().await {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{}", serde_json::to_string_pretty(&timer.snapshot().await)?),
        },
        TimerAction::Reset => {
            let event = timer.reset().await;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&timer.snapshot().await)?);
        }
        TimerAction::Watch => watch(timer).await?,
        TimerAction::SetFocus { minutes } => {
            let record = timer.update_settings(|r| r.set_focus_minutes(minutes)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        TimerAction::SetBreak { minutes } => {
            let record = timer.update_settings(|r| r.set_break_minutes(minutes)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        TimerAction::AutoBreaks { enabled } => {
            let record = timer
                .update_settings(|r| {
                    r.auto_start_breaks = enabled;
                    Ok(())
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        TimerAction::Sound { id } => {
            let record = timer.update_settings(|r| r.set_notification_sound(&id)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    attached.close().await
}

async fn watch(timer: &TimerController) -> CmdResult {
    let mut rx = timer.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let record = rx.borrow_and_update().clone();
    println!("{} {}", record.mode, record.display_remaining());
    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let record = rx.borrow_and_update().clone();
                let state = if record.is_running { "" } else { " (paused)" };
                println!("{} {}{state}", record.mode, record.display_remaining());
            }
        }
    }
    Ok(())
}
