use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use grimoire_domain::{AuthSession, AuthUser, UserId};

use crate::repositories::rest_store::{checked, RestStore};

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for AuthUser {
    fn from(payload: UserPayload) -> Self {
        AuthUser {
            id: UserId(payload.id),
            email: payload.email,
        }
    }
}

/// Resolves the signed-in user from the store's auth endpoint.
#[async_trait]
impl AuthSession for RestStore {
    async fn current_user(&self) -> anyhow::Result<Option<AuthUser>> {
        if !self.has_access_token() {
            debug!("no access token configured, no auth session");
            return Ok(None);
        }
        let response = self.auth_request().send().await?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        let payload: UserPayload = checked(response).await?.json().await?;
        Ok(Some(payload.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_payload_maps_to_auth_user() {
        let payload: UserPayload =
            serde_json::from_value(json!({"id": "u-1", "email": "dm@example.com", "role": "authenticated"}))
                .expect("decodes");
        let user = AuthUser::from(payload);
        assert_eq!(user.id, UserId("u-1".to_string()));
        assert_eq!(user.email.as_deref(), Some("dm@example.com"));
    }

    #[tokio::test]
    async fn no_token_means_no_session() {
        let store = RestStore::new(
            reqwest::Client::new(),
            &grimoire_domain::StoreConfig {
                url: Some("https://db.example.com".to_string()),
                api_key: None,
                access_token: None,
            },
        )
        .expect("configured");
        assert_eq!(store.current_user().await.expect("no request made"), None);
    }
}
