use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::profile::{AccountKind, OnlineSession, Profile};
use super::provider::AuthProvider;
use crate::core::error::{LauncherError, LauncherResult};

// ── Wire types ──────────────────────────────────────────

#[derive(Serialize)]
struct Agent {
    name: &'static str,
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    agent: Agent,
    username: &'a str,
    password: &'a str,
    request_user: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair<'a> {
    access_token: &'a str,
    client_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    access_token: &'a str,
    client_token: &'a str,
    request_user: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    access_token: String,
    client_token: String,
    selected_profile: Option<GameProfile>,
}

#[derive(Deserialize)]
struct GameProfile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error_message: Option<String>,
}

// ── Provider ────────────────────────────────────────────

/// Token-based authentication against a Yggdrasil-style server.
///
/// The official backend exposes `/authenticate` at its root; third-party
/// servers expose the same endpoints under `<api root>/authserver`.
#[derive(Debug, Clone)]
pub struct YggdrasilProvider {
    client: Client,
    base_url: String,
    kind: AccountKind,
}

impl YggdrasilProvider {
    pub fn official(client: Client, auth_server: &str) -> Self {
        Self {
            client,
            base_url: auth_server.trim_end_matches('/').to_string(),
            kind: AccountKind::Official,
        }
    }

    pub fn third_party(client: Client, api_root: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/authserver", api_root.trim_end_matches('/')),
            kind: AccountKind::ThirdParty,
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn rejection(&self, action: &str, response: reqwest::Response) -> LauncherError {
        let status = response.status();
        let detail = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|e| e.error_message);
        let message = match detail {
            Some(detail) => format!("{} {} rejected (HTTP {}): {}", self.kind, action, status.as_u16(), detail),
            None => format!("{} {} rejected (HTTP {})", self.kind, action, status.as_u16()),
        };
        LauncherError::InvalidCredentials(message)
    }

    async fn read_session(response: reqwest::Response) -> LauncherResult<SessionResponse> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| LauncherError::Format(format!("malformed auth response: {}", e)))
    }
}

fn parse_profile_id(id: &str) -> LauncherResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| LauncherError::Format(format!("invalid profile id '{}': {}", id, e)))
}

#[async_trait]
impl AuthProvider for YggdrasilProvider {
    fn kind(&self) -> AccountKind {
        self.kind
    }

    async fn authenticate(&self, identity: &str, secret: Option<&str>) -> LauncherResult<Profile> {
        let password = secret.filter(|s| !s.is_empty()).ok_or_else(|| {
            LauncherError::InvalidCredentials(format!("{} login requires a password", self.kind))
        })?;

        info!("Authenticating '{}' against {}", identity, self.base_url);
        let response = self
            .client
            .post(self.endpoint("authenticate"))
            .json(&AuthenticateRequest {
                agent: Agent { name: "Minecraft", version: 1 },
                username: identity,
                password,
                request_user: true,
            })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(self.rejection("login", response).await);
        }

        let session = Self::read_session(response).await?;
        let selected = session.selected_profile.ok_or_else(|| {
            LauncherError::InvalidCredentials(format!("'{}' owns no game profile", identity))
        })?;

        let online = OnlineSession {
            identity: selected.name,
            unique_id: parse_profile_id(&selected.id)?,
            session_token: session.access_token,
            session_secret: session.client_token,
            refreshed_at: Utc::now(),
        };
        Profile::online(self.kind, online)
            .ok_or_else(|| LauncherError::Other("offline kind on a token provider".into()))
    }

    async fn validate(&self, profile: &Profile) -> bool {
        let Some(session) = profile.session() else {
            return true;
        };
        let result = self
            .client
            .post(self.endpoint("validate"))
            .json(&TokenPair {
                access_token: &session.session_token,
                client_token: &session.session_secret,
            })
            .send()
            .await;

        match result {
            Ok(resp) => resp.status() == StatusCode::NO_CONTENT,
            Err(e) => {
                debug!("Validation of '{}' failed: {}", session.identity, e);
                false
            }
        }
    }

    async fn refresh(&self, profile: &mut Profile) -> LauncherResult<()> {
        let Some(current) = profile.session() else {
            return Ok(());
        };

        let response = self
            .client
            .post(self.endpoint("refresh"))
            .json(&RefreshRequest {
                access_token: &current.session_token,
                client_token: &current.session_secret,
                request_user: true,
            })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(self.rejection("refresh", response).await);
        }
        let refreshed = Self::read_session(response).await?;

        // Identity and unique id are the profile's storage key; only the tokens move.
        if let Some(session) = profile.session_mut() {
            session.session_token = refreshed.access_token;
            session.session_secret = refreshed.client_token;
            session.refreshed_at = Utc::now();
            info!("Refreshed session for '{}'", session.identity);
        }
        Ok(())
    }

    async fn invalidate(&self, profile: &Profile) -> LauncherResult<()> {
        let Some(session) = profile.session() else {
            return Ok(());
        };
        let response = self
            .client
            .post(self.endpoint("invalidate"))
            .json(&TokenPair {
                access_token: &session.session_token,
                client_token: &session.session_secret,
            })
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.rejection("invalidate", response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use mockito::Matcher;
    use serde_json::json;

    const PROFILE_ID: &str = "c3b6f12055d337359190555ca0867b44";

    fn session_body(access: &str) -> String {
        json!({
            "accessToken": access,
            "clientToken": "client-1",
            "selectedProfile": { "id": PROFILE_ID, "name": "Alex" }
        })
        .to_string()
    }

    fn online_profile() -> Profile {
        Profile::ThirdParty(OnlineSession {
            identity: "Alex".into(),
            unique_id: Uuid::parse_str(PROFILE_ID).unwrap(),
            session_token: "old-token".into(),
            session_secret: "client-1".into(),
            refreshed_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn third_party_login_builds_online_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/yggdrasil/authserver/authenticate")
            .match_body(Matcher::PartialJson(json!({
                "agent": { "name": "Minecraft", "version": 1 },
                "username": "alex@example.com",
                "password": "hunter2",
                "requestUser": true
            })))
            .with_status(200)
            .with_body(session_body("token-1"))
            .create_async()
            .await;

        let provider = YggdrasilProvider::third_party(
            Client::new(),
            &format!("{}/api/yggdrasil/", server.url()),
        );
        let profile = provider
            .authenticate("alex@example.com", Some("hunter2"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.kind(), AccountKind::ThirdParty);
        assert_eq!(profile.identity(), "Alex");
        assert_eq!(profile.unique_id().to_string(), "c3b6f120-55d3-3735-9190-555ca0867b44");
        assert_eq!(profile.session_token(), Some("token-1"));
        assert_eq!(profile.session_secret(), Some("client-1"));
    }

    #[tokio::test]
    async fn official_login_uses_server_root() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/authenticate")
            .with_status(200)
            .with_body(session_body("token-1"))
            .create_async()
            .await;

        let provider = YggdrasilProvider::official(Client::new(), &server.url());
        let profile = provider.authenticate("a@b.c", Some("pw")).await.unwrap();
        assert_eq!(profile.kind(), AccountKind::Official);
    }

    #[tokio::test]
    async fn rejected_login_is_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/authserver/authenticate")
            .with_status(403)
            .with_body(r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid credentials."}"#)
            .create_async()
            .await;

        let provider = YggdrasilProvider::third_party(Client::new(), &server.url());
        let err = provider.authenticate("a@b.c", Some("wrong")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
        assert!(err.to_string().contains("Invalid credentials."));
    }

    #[tokio::test]
    async fn missing_password_never_hits_the_network() {
        let provider = YggdrasilProvider::official(Client::new(), "http://127.0.0.1:1");
        let err = provider.authenticate("a@b.c", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn garbage_body_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/authenticate")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let provider = YggdrasilProvider::official(Client::new(), &server.url());
        let err = provider.authenticate("a@b.c", Some("pw")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[tokio::test]
    async fn validate_is_true_only_on_no_content() {
        let mut server = mockito::Server::new_async().await;
        let provider = YggdrasilProvider::official(Client::new(), &server.url());
        let profile = online_profile();

        let ok = server
            .mock("POST", "/validate")
            .match_body(Matcher::Json(json!({
                "accessToken": "old-token",
                "clientToken": "client-1"
            })))
            .with_status(204)
            .create_async()
            .await;
        assert!(provider.validate(&profile).await);
        ok.remove_async().await;

        let _rejected = server
            .mock("POST", "/validate")
            .with_status(403)
            .create_async()
            .await;
        assert!(!provider.validate(&profile).await);
    }

    #[tokio::test]
    async fn validate_unreachable_server_is_false() {
        let provider = YggdrasilProvider::official(Client::new(), "http://127.0.0.1:1");
        assert!(!provider.validate(&online_profile()).await);
    }

    #[tokio::test]
    async fn refresh_replaces_token_but_keeps_identity() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/refresh")
            .match_body(Matcher::PartialJson(json!({
                "accessToken": "old-token",
                "clientToken": "client-1",
                "requestUser": true
            })))
            .with_status(200)
            .with_body(
                json!({
                    "accessToken": "new-token",
                    "clientToken": "client-2",
                    "selectedProfile": {
                        "id": "0123456789abcdef0123456789abcdef",
                        "name": "Alexander"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = YggdrasilProvider::official(Client::new(), &server.url());
        let mut profile = online_profile();
        provider.refresh(&mut profile).await.unwrap();
        assert_eq!(profile.session_token(), Some("new-token"));
        assert_eq!(profile.session_secret(), Some("client-2"));
        assert_eq!(profile.identity(), "Alex");
        assert_eq!(profile.unique_id(), Uuid::parse_str(PROFILE_ID).unwrap());
    }

    #[tokio::test]
    async fn failed_refresh_leaves_profile_untouched() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/refresh")
            .with_status(403)
            .create_async()
            .await;

        let provider = YggdrasilProvider::official(Client::new(), &server.url());
        let mut profile = online_profile();
        let before = profile.clone();
        let err = provider.refresh(&mut profile).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(profile, before);
    }

    #[tokio::test]
    async fn invalidate_accepts_no_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/invalidate")
            .with_status(204)
            .create_async()
            .await;

        let provider = YggdrasilProvider::official(Client::new(), &server.url());
        provider.invalidate(&online_profile()).await.unwrap();
        mock.assert_async().await;
    }
}
