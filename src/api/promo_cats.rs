//! Promo-cat campaign settings and uploaded images.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::models::{PromoCatImage, PromoCatSettings};
use crate::http::{ApiClient, ApiRequest, ApiResult};

#[derive(Debug, Deserialize)]
struct RawImage {
    name: String,
    #[serde(default)]
    preview: Value,
}

#[derive(Debug, Clone)]
pub struct PromoCatsApi {
    client: ApiClient,
}

impl PromoCatsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_settings(&self) -> ApiResult<PromoCatSettings> {
        self.client.send(&ApiRequest::get("promo-cats/settings")).await
    }

    pub async fn set_settings(&self, channel_id: &str, post_time: &str) -> ApiResult<Value> {
        let request = ApiRequest::post("promo-cats/settings").json(json!({
            "channel_id": channel_id,
            "post_time": post_time,
        }));
        self.client.execute(&request).await
    }

    /// Uploaded images with previews re-encoded as base64.
    pub async fn get_images(&self) -> ApiResult<Vec<PromoCatImage>> {
        let raw: Option<Vec<RawImage>> = self
            .client
            .send(&ApiRequest::get("promo-cats/upload/images"))
            .await?;

        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(|image| PromoCatImage {
                preview: preview_to_base64(&image.preview),
                name: image.name,
            })
            .collect())
    }
}

/// Encode a serialized byte buffer as base64.
///
/// The backend sends buffers as objects keyed `"0"`, `"1"`, ...; reading
/// stops at the first missing index. Plain arrays are accepted too, and a
/// string is assumed to be base64 already.
pub fn preview_to_base64(preview: &Value) -> String {
    let bytes: Vec<u8> = match preview {
        Value::String(s) => return s.clone(),
        Value::Object(map) => (0usize..)
            .map_while(|i| map.get(&i.to_string()).and_then(as_byte))
            .collect(),
        Value::Array(items) => items.iter().map_while(as_byte).collect(),
        _ => Vec::new(),
    };
    STANDARD.encode(bytes)
}

fn as_byte(value: &Value) -> Option<u8> {
    value.as_u64().and_then(|n| u8::try_from(n).ok())
}
