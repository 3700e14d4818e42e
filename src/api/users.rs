//! User mutations outside plain CRUD.

use serde_json::json;

use crate::api::models::{User, UserPatch};
use crate::http::{ApiClient, ApiRequest, ApiResult};

#[derive(Debug, Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `PATCH /users/{id}` with only the fields that are set.
    pub async fn update_user(&self, user_id: &str, patch: &UserPatch) -> ApiResult<User> {
        let request = ApiRequest::patch("/users")
            .segment(user_id)
            .json(serde_json::to_value(patch)?);
        self.client.send(&request).await
    }

    /// `POST /users/{id}/give-xp`.
    pub async fn increment_user_xp(&self, user_id: &str, xp: i64) -> ApiResult<User> {
        let request = ApiRequest::post("/users")
            .segment(user_id)
            .segment("give-xp")
            .json(json!({ "xp": xp }));
        self.client.send(&request).await
    }
}
