use clap::Subcommand;
use focusflow_core::{AppSettings, Config, StoreExt, StoreKey, Theme};

use super::{open_store, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the stored app settings
    Show,
    /// Turn completion banners on or off
    Notifications {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Set the theme: light or dark
    Theme { theme: Theme },
}

pub fn run(config: &Config, action: SettingsAction) -> CmdResult {
    let store = open_store(config)?;
    let mut settings: AppSettings = store.load_or_default(StoreKey::AppSettings)?;

    match action {
        SettingsAction::Show => {}
        SettingsAction::Notifications { enabled } => {
            settings.notifications_enabled = enabled;
            store.save(StoreKey::AppSettings, &settings)?;
        }
        SettingsAction::Theme { theme } => {
            settings.theme = theme;
            store.save(StoreKey::AppSettings, &settings)?;
        }
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
