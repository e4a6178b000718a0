//! Backend API configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storefront locale. The backend prefixes every route with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English storefront
    #[default]
    En,
    /// Arabic storefront
    Ar,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ar" => Ok(Locale::Ar),
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the storefront backend lives and which locale to address it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for API requests
    pub base_url: String,
    /// Locale path segment
    pub locale: Locale,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            locale: Locale::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!(Locale::from_str("en").unwrap(), Locale::En);
        assert_eq!(Locale::from_str("AR").unwrap(), Locale::Ar);
        assert!(Locale::from_str("fr").is_err());
    }

    #[test]
    fn test_locale_serde() {
        let json = serde_json::to_string(&Locale::Ar).unwrap();
        assert_eq!(json, "\"ar\"");
    }

    #[test]
    fn test_api_config_toml() {
        let toml = r#"
            base_url = "https://store.example.com/api"
            locale = "ar"
        "#;
        let config: ApiConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://store.example.com/api");
        assert_eq!(config.locale, Locale::Ar);
    }
}
