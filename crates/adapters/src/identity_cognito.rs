//! Cognito identity adapter
//!
//! Speaks the Cognito IdP JSON protocol directly: every operation is a POST
//! to the regional endpoint with an `X-Amz-Target` header naming the action.
//! Public-client flow only (no client secret). The session is held in memory
//! and ends with the process.

use async_trait::async_trait;
use newsdesk_domain::{IdentityError, IdentityProvider, Session, UserHandle, UserInfo};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

const TARGET_SIGN_UP: &str = "AWSCognitoIdentityProviderService.SignUp";
const TARGET_INITIATE_AUTH: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const TARGET_GET_USER: &str = "AWSCognitoIdentityProviderService.GetUser";
const TARGET_GLOBAL_SIGN_OUT: &str = "AWSCognitoIdentityProviderService.GlobalSignOut";

const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Cognito user-pool identity provider
pub struct CognitoIdentityProvider {
    client: Client,
    endpoint: String,
    client_id: String,
    access_token: RwLock<Option<SecretString>>,
}

impl CognitoIdentityProvider {
    pub fn new(region: &str, client_id: String) -> Self {
        Self::with_endpoint(
            format!("https://cognito-idp.{}.amazonaws.com", region),
            client_id,
        )
    }

    pub fn with_endpoint(endpoint: String, client_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint,
            client_id,
            access_token: RwLock::new(None),
        }
    }

    async fn call(&self, target: &str, body: serde_json::Value) -> Result<String, IdentityError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", target)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if status.is_success() {
            return Ok(text);
        }

        let envelope: ErrorEnvelope = serde_json::from_str(&text).unwrap_or_default();
        let kind = envelope.kind();
        let message = envelope
            .message
            .unwrap_or_else(|| format!("status {}", status.as_u16()));

        if is_auth_failure(&kind) {
            Err(IdentityError::Auth(format!("{}: {}", kind, message)))
        } else {
            Err(IdentityError::Transport(format!("{}: {}", kind, message)))
        }
    }

    fn stored_token(&self) -> Option<SecretString> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_token(&self, token: Option<SecretString>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "__type")]
    type_name: Option<String>,
    message: Option<String>,
}

impl ErrorEnvelope {
    /// Error types may arrive namespaced (`service#NotAuthorizedException`)
    fn kind(&self) -> String {
        self.type_name
            .as_deref()
            .and_then(|name| name.rsplit('#').next())
            .unwrap_or("UnknownError")
            .to_string()
    }
}

fn is_auth_failure(kind: &str) -> bool {
    matches!(
        kind,
        "NotAuthorizedException"
            | "UserNotFoundException"
            | "UserNotConfirmedException"
            | "UsernameExistsException"
            | "InvalidPasswordException"
            | "InvalidParameterException"
            | "PasswordResetRequiredException"
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    user_confirmed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    username: String,
    #[serde(default)]
    user_attributes: Vec<UserAttribute>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserAttribute {
    name: String,
    value: String,
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        nickname: Option<&str>,
    ) -> Result<UserHandle, IdentityError> {
        let mut attributes = Vec::new();
        if let Some(nickname) = nickname {
            attributes.push(json!({"Name": "nickname", "Value": nickname}));
        }

        let body = json!({
            "ClientId": self.client_id,
            "Username": username,
            "Password": password.expose_secret(),
            "UserAttributes": attributes,
        });

        let text = self.call(TARGET_SIGN_UP, body).await?;
        let response: SignUpResponse =
            serde_json::from_str(&text).map_err(|e| IdentityError::Contract(e.to_string()))?;

        tracing::info!(username, confirmed = response.user_confirmed, "signed up");
        Ok(UserHandle {
            username: username.to_string(),
            confirmed: response.user_confirmed,
        })
    }

    async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, IdentityError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": {
                "USERNAME": username,
                "PASSWORD": password.expose_secret(),
            },
        });

        let text = self.call(TARGET_INITIATE_AUTH, body).await?;
        let response: InitiateAuthResponse =
            serde_json::from_str(&text).map_err(|e| IdentityError::Contract(e.to_string()))?;

        if let Some(challenge) = response.challenge_name {
            return Err(IdentityError::Auth(format!(
                "unsupported auth challenge: {}",
                challenge
            )));
        }

        let result = response.authentication_result.ok_or_else(|| {
            IdentityError::Contract("auth response missing AuthenticationResult".to_string())
        })?;

        let access_token = SecretString::new(result.access_token.into());
        self.store_token(Some(access_token.clone()));

        Ok(Session {
            access_token,
            id_token: result.id_token.map(|t| SecretString::new(t.into())),
            refresh_token: result.refresh_token.map(|t| SecretString::new(t.into())),
            expires_in_secs: result.expires_in,
        })
    }

    async fn sign_out(&self) -> Result<bool, IdentityError> {
        let Some(token) = self.stored_token() else {
            return Ok(false);
        };
        self.store_token(None);

        // Best-effort revocation; the local session is gone either way.
        let body = json!({"AccessToken": token.expose_secret()});
        if let Err(error) = self.call(TARGET_GLOBAL_SIGN_OUT, body).await {
            tracing::warn!(error = %error, "global sign-out failed; local session cleared");
        }

        Ok(true)
    }

    async fn current_user(&self) -> Result<Option<UserInfo>, IdentityError> {
        let Some(token) = self.stored_token() else {
            return Ok(None);
        };

        let body = json!({"AccessToken": token.expose_secret()});
        let text = match self.call(TARGET_GET_USER, body).await {
            Ok(text) => text,
            Err(IdentityError::Auth(reason)) => {
                // Expired or revoked token: treat as signed out.
                tracing::debug!(reason, "stored session no longer valid");
                self.store_token(None);
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        let response: GetUserResponse =
            serde_json::from_str(&text).map_err(|e| IdentityError::Contract(e.to_string()))?;

        let mut email = None;
        let mut nickname = None;
        let mut attributes = HashMap::new();
        for attribute in response.user_attributes {
            match attribute.name.as_str() {
                "email" => email = Some(attribute.value),
                "nickname" => nickname = Some(attribute.value),
                _ => {
                    attributes.insert(attribute.name, attribute.value);
                }
            }
        }

        Ok(Some(UserInfo {
            username: response.username,
            email,
            nickname,
            attributes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> CognitoIdentityProvider {
        CognitoIdentityProvider::with_endpoint(server.uri(), "client-123".to_string())
    }

    #[tokio::test]
    async fn test_sign_in_success_stores_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("X-Amz-Target", TARGET_INITIATE_AUTH))
            .and(body_partial_json(serde_json::json!({
                "AuthFlow": "USER_PASSWORD_AUTH",
                "ClientId": "client-123",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AuthenticationResult": {
                    "AccessToken": "access-abc",
                    "IdToken": "id-abc",
                    "RefreshToken": "refresh-abc",
                    "ExpiresIn": 3600
                }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_GET_USER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Username": "alice",
                "UserAttributes": [
                    {"Name": "email", "Value": "alice@example.com"},
                    {"Name": "nickname", "Value": "Al"},
                    {"Name": "sub", "Value": "uuid-1"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let identity = provider(&mock_server);
        let session = identity
            .sign_in("alice", &SecretString::new("secret".into()))
            .await
            .unwrap();
        assert_eq!(session.expires_in_secs, 3600);

        let user = identity.current_user().await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.nickname.as_deref(), Some("Al"));
        assert_eq!(user.attributes.get("sub").map(String::as_str), Some("uuid-1"));
    }

    #[tokio::test]
    async fn test_sign_in_rejected_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_INITIATE_AUTH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "__type": "NotAuthorizedException",
                "message": "Incorrect username or password."
            })))
            .mount(&mock_server)
            .await;

        let identity = provider(&mock_server);
        let result = identity
            .sign_in("alice", &SecretString::new("wrong".into()))
            .await;

        assert!(matches!(result, Err(IdentityError::Auth(_))));
        assert!(identity.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_reports_confirmation_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_SIGN_UP))
            .and(body_partial_json(serde_json::json!({
                "Username": "bob",
                "UserAttributes": [{"Name": "nickname", "Value": "Bobby"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "UserConfirmed": false,
                "UserSub": "uuid-2"
            })))
            .mount(&mock_server)
            .await;

        let identity = provider(&mock_server);
        let handle = identity
            .sign_up("bob", &SecretString::new("pw".into()), Some("Bobby"))
            .await
            .unwrap();

        assert_eq!(handle.username, "bob");
        assert!(!handle.confirmed);
    }

    #[tokio::test]
    async fn test_current_user_without_session_makes_no_request() {
        let mock_server = MockServer::start().await;
        // No mocks mounted: any request would 404 and fail the call.
        let identity = provider(&mock_server);

        assert!(identity.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_degrades_to_signed_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_INITIATE_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AuthenticationResult": {"AccessToken": "stale", "ExpiresIn": 1}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_GET_USER))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "__type": "NotAuthorizedException",
                "message": "Access Token has expired"
            })))
            .mount(&mock_server)
            .await;

        let identity = provider(&mock_server);
        identity
            .sign_in("carol", &SecretString::new("pw".into()))
            .await
            .unwrap();

        assert!(identity.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_reports_whether_session_existed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_INITIATE_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AuthenticationResult": {"AccessToken": "tok", "ExpiresIn": 3600}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_GLOBAL_SIGN_OUT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let identity = provider(&mock_server);
        assert!(!identity.sign_out().await.unwrap());

        identity
            .sign_in("dave", &SecretString::new("pw".into()))
            .await
            .unwrap();
        assert!(identity.sign_out().await.unwrap());
        assert!(identity.current_user().await.unwrap().is_none());
    }
}
