//! Simulated account, premium upgrade, integrations and coworking rooms.
//!
//! None of these talk to a server. Sign-in and payment only flip the
//! persisted `userData` flags; integrations and rooms are local bookkeeping.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::records::{Integrations, UserData};
use crate::storage::{KeyValueStore, StoreExt, StoreKey};

/// Integrations available on the free tier.
pub const FREE_INTEGRATIONS: [&str; 3] = ["trello", "asana", "google-calendar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Yearly,
}

impl std::str::FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Plan::Monthly),
            "yearly" => Ok(Plan::Yearly),
            other => Err(ValidationError::Unknown {
                kind: "plan".into(),
                value: other.into(),
            }),
        }
    }
}

pub struct Account<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> Account<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn user(&self) -> Result<UserData, CoreError> {
        Ok(self.store.load_or_default(StoreKey::UserData)?)
    }

    /// Simulated sign-in. The display name is the part of the email before `@`.
    pub fn sign_in(&self, email: &str) -> Result<UserData, CoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::Empty("email".into()).into());
        }
        let mut user = self.user()?;
        user.is_logged_in = true;
        user.email = email.to_string();
        user.name = email.split('@').next().unwrap_or(email).to_string();
        self.store.save(StoreKey::UserData, &user)?;
        tracing::info!(name = %user.name, "signed in");
        Ok(user)
    }

    /// Simulated payment. Always succeeds.
    pub fn upgrade(&self, plan: Plan) -> Result<UserData, CoreError> {
        let mut user = self.user()?;
        user.is_premium = true;
        self.store.save(StoreKey::UserData, &user)?;
        tracing::info!(?plan, "upgraded to premium");
        Ok(user)
    }

    /// Connect an integration. Services outside the free list need premium.
    pub fn connect_integration(&self, service: &str) -> Result<Integrations, CoreError> {
        let service = service.trim();
        if service.is_empty() {
            return Err(ValidationError::Empty("service".into()).into());
        }
        if !FREE_INTEGRATIONS.contains(&service) && !self.user()?.is_premium {
            return Err(ValidationError::UpgradeRequired(service.to_string()).into());
        }
        let mut integrations: Integrations = self.store.load_or_default(StoreKey::Integrations)?;
        if !integrations.connected.iter().any(|s| s == service) {
            integrations.connected.push(service.to_string());
            self.store.save(StoreKey::Integrations, &integrations)?;
        }
        Ok(integrations)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
}

/// Local stand-in for a virtual coworking room.
#[derive(Debug, Default)]
pub struct CoworkingRoom {
    current: Option<String>,
    messages: Vec<ChatMessage>,
}

impl CoworkingRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn join(&mut self, room_id: &str, is_premium: bool) -> Result<(), ValidationError> {
        if room_id.contains("premium") && !is_premium {
            return Err(ValidationError::UpgradeRequired(format!("room '{room_id}'")));
        }
        self.current = Some(room_id.to_string());
        self.messages.push(ChatMessage {
            sender: "FocusAI".into(),
            content: format!("You've joined {room_id}. Focus time begins now!"),
        });
        Ok(())
    }

    pub fn send(&mut self, text: &str) -> Result<&ChatMessage, ValidationError> {
        if self.current.is_none() {
            return Err(ValidationError::Precondition("Please join a room first".into()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Empty("message".into()));
        }
        self.messages.push(ChatMessage {
            sender: "You".into(),
            content: text.to_string(),
        });
        Ok(&self.messages[self.messages.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn sign_in_derives_name_from_email() {
        let store = MemoryStore::new();
        let user = Account::new(&store).sign_in("ada@example.com").unwrap();
        assert!(user.is_logged_in);
        assert_eq!(user.name, "ada");
        assert!(Account::new(&store).sign_in("  ").is_err());
    }

    #[test]
    fn premium_integration_needs_upgrade() {
        let store = MemoryStore::new();
        let account = Account::new(&store);
        assert!(account.connect_integration("trello").is_ok());
        let err = account.connect_integration("notion").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UpgradeRequired(_))
        ));

        account.upgrade(Plan::Monthly).unwrap();
        let connected = account.connect_integration("notion").unwrap();
        assert_eq!(connected.connected, ["trello", "notion"]);
    }

    #[test]
    fn connecting_twice_is_idempotent() {
        let store = MemoryStore::new();
        let account = Account::new(&store);
        account.connect_integration("asana").unwrap();
        let connected = account.connect_integration("asana").unwrap();
        assert_eq!(connected.connected.len(), 1);
    }

    #[test]
    fn plan_parses_known_names() {
        assert_eq!("yearly".parse::<Plan>().unwrap(), Plan::Yearly);
        assert!("weekly".parse::<Plan>().is_err());
    }

    #[test]
    fn coworking_requires_room_and_premium_for_premium_rooms() {
        let mut room = CoworkingRoom::new();
        assert!(room.send("hi").is_err());
        assert!(room.join("premium-deep-work", false).is_err());
        room.join("general", false).unwrap();
        assert_eq!(room.current(), Some("general"));
        assert_eq!(room.send(" hello ").unwrap().content, "hello");
        assert!(room.send("   ").is_err());
        assert_eq!(room.messages().len(), 2);
    }
}
