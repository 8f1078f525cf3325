/*
[INPUT]:  Email/password credentials and HTTP client
[OUTPUT]: Authenticated session and approved profile
[POS]:    Auth layer - orchestrates complete authentication flow
[UPDATE]: When auth endpoints or flow steps change
*/

use reqwest::Method;
use serde_json::json;

use crate::http::client::{eq, NO_QUERY};
use crate::http::{Result, TaskboardClient, TaskboardError};
use crate::types::{
    AuthSession, PasswordCredentials, Profile, ProfileRole, RefreshTokenRequest, SignUpMetadata,
    SignUpRequest, SignUpResponse, UserId,
};

use super::SessionManager;

/// Full name stored on a profile recreated for a user who has none.
const RECOVERED_PROFILE_NAME: &str = "Recovered user";

/// Manages the complete authentication flow
#[derive(Debug, Clone)]
pub struct AuthManager {
    client: TaskboardClient,
}

impl AuthManager {
    /// Wrap a client; the session lands in the client's own holder so
    /// every later table request carries the user's token.
    pub fn new(client: TaskboardClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &TaskboardClient {
        &self.client
    }

    /// Get the session holder
    pub fn session(&self) -> &SessionManager {
        self.client.session()
    }

    /// Sign in with email and password
    ///
    /// POST /auth/v1/token?grant_type=password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = PasswordCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let builder = self
            .client
            .auth_request(Method::POST, "token")?
            .query(&[("grant_type", "password")])
            .json(&body);
        let session: AuthSession = self.client.send_auth_json(builder).await?;

        self.session().set_session(&session);
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    /// Exchange the stored refresh token for a new session
    ///
    /// POST /auth/v1/token?grant_type=refresh_token
    pub async fn refresh(&self) -> Result<AuthSession> {
        let refresh_token = self
            .session()
            .refresh_token()
            .ok_or(TaskboardError::SessionExpired)?;
        let builder = self
            .client
            .auth_request(Method::POST, "token")?
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshTokenRequest { refresh_token });
        let session: AuthSession = self.client.send_auth_json(builder).await?;

        self.session().set_session(&session);
        tracing::debug!(user_id = %session.user.id, "session refreshed");
        Ok(session)
    }

    /// Register a new account. New profiles start unapproved.
    ///
    /// POST /auth/v1/signup
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpResponse> {
        let body = SignUpRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            data: SignUpMetadata {
                full_name: full_name.trim().to_string(),
            },
        };
        let builder = self.client.auth_request(Method::POST, "signup")?.json(&body);
        let response: SignUpResponse = self.client.send_auth_json(builder).await?;

        if let SignUpResponse::Session(session) = &response {
            self.session().set_session(session);
        }
        Ok(response)
    }

    /// Revoke the session server-side and forget it locally
    ///
    /// POST /auth/v1/logout
    pub async fn sign_out(&self) -> Result<()> {
        if !self.session().is_signed_in() {
            return Ok(());
        }
        let builder = self.client.auth_request(Method::POST, "logout")?;
        let outcome = self.client.send_auth_empty(builder).await;
        self.session().clear();
        outcome
    }

    /// Read a user's profile row
    ///
    /// GET /rest/v1/profiles?user_id=eq.{user_id}
    pub async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .client
            .select_rows(
                "profiles",
                &[("select", "*".to_string()), ("user_id", eq(user_id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Recreate a missing profile for the signed-in user.
    ///
    /// POST /rest/v1/rpc/ensure_own_profile, falling back to a direct
    /// insert; a duplicate key (`23505`) means the row already exists.
    pub async fn ensure_profile(&self, user_id: UserId) -> Result<()> {
        let builder = self
            .client
            .rest_request(Method::POST, "rpc/ensure_own_profile", NO_QUERY)?
            .json(&json!({}));
        match self.client.send_empty(builder).await {
            Ok(()) => return Ok(()),
            Err(err) => tracing::warn!(error = %err, "profile repair rpc failed, inserting directly"),
        }

        let row = json!({
            "user_id": user_id,
            "full_name": RECOVERED_PROFILE_NAME,
            "role": "client",
            "approved": false,
        });
        match self
            .client
            .insert_rows::<Profile, _>("profiles", std::slice::from_ref(&row))
            .await
        {
            Ok(_) => Ok(()),
            Err(TaskboardError::Api { code, .. }) if code.as_deref() == Some("23505") => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Fail unless the signed-in user's account was approved.
    ///
    /// Admins pass regardless of the flag.
    pub async fn ensure_approved(&self) -> Result<Profile> {
        let user_id = self
            .session()
            .user_id()
            .ok_or_else(|| TaskboardError::Authentication {
                message: "not signed in".to_string(),
            })?;

        let profile = match self.fetch_profile(user_id).await? {
            Some(profile) => profile,
            None => {
                self.ensure_profile(user_id).await?;
                self.fetch_profile(user_id)
                    .await?
                    .ok_or_else(|| TaskboardError::Authentication {
                        message: "profile could not be created".to_string(),
                    })?
            }
        };

        if profile.approved || profile.role == ProfileRole::Admin {
            Ok(profile)
        } else {
            Err(TaskboardError::Authentication {
                message: "account is pending approval".to_string(),
            })
        }
    }
}
