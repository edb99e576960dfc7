//! In-memory token registry - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use defender_core::domain::ApiApplication;
use defender_core::ports::{ApiTokenResolver, AuthError};

/// Token → application table held in process memory.
pub struct InMemoryTokenResolver {
    applications: RwLock<HashMap<String, ApiApplication>>,
}

impl InMemoryTokenResolver {
    pub fn new() -> Self {
        Self {
            applications: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_applications(applications: impl IntoIterator<Item = ApiApplication>) -> Self {
        let applications = applications
            .into_iter()
            .map(|app| (app.api_token.clone(), app))
            .collect();
        Self {
            applications: RwLock::new(applications),
        }
    }

    /// Parse `API_TOKENS`.
    /// Format: `<token>=<application name>,<token>=<application name>`
    /// Example: `API_TOKENS=3f9a...=Mobile App,77c1...=Partner Portal`
    pub fn from_env() -> Self {
        let raw = std::env::var("API_TOKENS").unwrap_or_default();
        Self::with_applications(parse_token_list(&raw))
    }

    pub async fn register(&self, application: ApiApplication) {
        let mut applications = self.applications.write().await;
        applications.insert(application.api_token.clone(), application);
    }

    pub async fn len(&self) -> usize {
        self.applications.read().await.len()
    }
}

impl Default for InMemoryTokenResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_token_list(raw: &str) -> Vec<ApiApplication> {
    raw.split(',')
        .filter_map(|entry| {
            let (token, name) = entry.split_once('=').unwrap_or((entry, ""));
            let token = token.trim();
            if token.is_empty() {
                return None;
            }
            let name = match name.trim() {
                "" => "unnamed application",
                name => name,
            };
            Some(ApiApplication::new(name, token))
        })
        .collect()
}

#[async_trait]
impl ApiTokenResolver for InMemoryTokenResolver {
    async fn resolve_token(&self, token: &str) -> Result<Option<ApiApplication>, AuthError> {
        let applications = self.applications.read().await;
        Ok(applications.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_token_resolves() {
        let resolver = InMemoryTokenResolver::new();
        resolver
            .register(ApiApplication::new("test app", "abc"))
            .await;

        let app = resolver.resolve_token("abc").await.unwrap().unwrap();
        assert_eq!(app.name, "test app");
        assert!(resolver.resolve_token("xyz").await.unwrap().is_none());
    }

    #[test]
    fn test_parse_token_list() {
        let apps = parse_token_list(" abc=Mobile App, def ,,ghi=");
        let pairs: Vec<_> = apps
            .iter()
            .map(|a| (a.api_token.as_str(), a.name.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("abc", "Mobile App"),
                ("def", "unnamed application"),
                ("ghi", "unnamed application"),
            ]
        );
    }
}
