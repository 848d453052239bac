//! Small persisted records with no behavior of their own.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    pub is_logged_in: bool,
    pub name: String,
    pub email: String,
    pub is_premium: bool,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            is_logged_in: false,
            name: "Guest".to_string(),
            email: String::new(),
            is_premium: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Integrations {
    pub connected: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::str::FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::Unknown {
                kind: "theme".into(),
                value: other.into(),
            }),
        }
    }
}

/// User preferences shared with every context that opens the store.
/// `notificationsEnabled` mutes banners through `SettingsGate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub notifications_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            notifications_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_defaults_to_guest() {
        let user: UserData = serde_json::from_str("{}").unwrap();
        assert_eq!(user.name, "Guest");
        assert!(!user.is_premium);
    }

    #[test]
    fn user_data_reads_camel_case() {
        let user: UserData =
            serde_json::from_str(r#"{"isPremium":true,"isLoggedIn":true,"name":"ada"}"#).unwrap();
        assert!(user.is_premium);
        assert!(user.is_logged_in);
        assert_eq!(user.email, "");
    }

    #[test]
    fn app_settings_theme_is_lowercase() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["notificationsEnabled"], true);
    }

    #[test]
    fn theme_parses_lowercase_names() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("solarized".parse::<Theme>().is_err());
    }
}
