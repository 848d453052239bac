use clap::Subcommand;
use focusflow_core::{Account, Config, Integrations, Plan, StoreExt, StoreKey};

use super::{open_store, CmdResult};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Show the signed-in user and connected integrations
    Status,
    /// Sign in (simulated)
    SignIn { email: String },
    /// Upgrade to premium (simulated): monthly or yearly
    Upgrade { plan: Plan },
    /// Connect an integration such as trello, asana or google-calendar
    Connect { service: String },
}

pub fn run(config: &Config, action: AccountAction) -> CmdResult {
    let store = open_store(config)?;
    let account = Account::new(&*store);

    match action {
        AccountAction::Status => {
            let user = account.user()?;
            let integrations: Integrations = store.load_or_default(StoreKey::Integrations)?;
            let status = serde_json::json!({
                "user": user,
                "integrations": integrations,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        AccountAction::SignIn { email } => {
            let user = account.sign_in(&email)?;
            println!("Welcome, {}!", user.name);
        }
        AccountAction::Upgrade { plan } => {
            account.upgrade(plan)?;
            println!("Upgrade successful! You now have premium access.");
        }
        AccountAction::Connect { service } => {
            let integrations = account.connect_integration(&service)?;
            println!("Successfully connected to {service}!");
            println!("Connected: {}", integrations.connected.join(", "));
        }
    }
    Ok(())
}
