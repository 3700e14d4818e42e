//! Session policy for the calling surface.
//!
//! Login, logout, the "am I signed in" check and the reaction to a failed
//! call. A 401 that survives the client's refresh-and-retry means the
//! session is gone, so the caller is told to log out.

use serde::Serialize;

use crate::api::models::Identity;
use crate::http::{ApiClient, ApiError, ApiResult};

/// Path the UI sends an unauthenticated user to.
pub const LOGIN_ROUTE: &str = "/login";

const ADMIN_AVATAR: &str =
    "https://i.pinimg.com/200x/ba/45/a7/ba45a7114bdc22df8f756868b69789fb.jpg";

/// Result of [`Session::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthCheck {
    Authenticated,
    Unauthenticated {
        redirect_to: &'static str,
        message: &'static str,
    },
}

/// What the caller should do with an error from the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// The session cannot be recovered; drop the token and go to login.
    ForceLogout,
    /// Show the error, keep the session.
    Propagate,
}

#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, password: &str) -> ApiResult<()> {
        self.client.login(password).await
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.client.logout()
    }

    pub fn check(&self) -> AuthCheck {
        if self.client.token_store().load().is_some() {
            AuthCheck::Authenticated
        } else {
            AuthCheck::Unauthenticated {
                redirect_to: LOGIN_ROUTE,
                message: "Token not found",
            }
        }
    }

    pub fn on_error(&self, error: &ApiError) -> ErrorAction {
        classify_error(error)
    }

    /// Apply [`on_error`](Self::on_error): logs out when the session is gone.
    pub fn handle_error(&self, error: &ApiError) -> ApiResult<ErrorAction> {
        let action = self.on_error(error);
        if action == ErrorAction::ForceLogout {
            tracing::warn!("Session expired, logging out");
            self.logout()?;
        }
        Ok(action)
    }

    /// The single back-office operator.
    pub fn identity(&self) -> Identity {
        Identity {
            name: "Admin".to_string(),
            avatar: ADMIN_AVATAR.to_string(),
        }
    }
}

fn classify_error(error: &ApiError) -> ErrorAction {
    if error.status() == Some(401) {
        ErrorAction::ForceLogout
    } else {
        ErrorAction::Propagate
    }
}
