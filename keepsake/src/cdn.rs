use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha1::Sha1;

use crate::config::CdnConfig;
use crate::error::{KeepsakeError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Thumbnail dimensions used for list-view covers.
pub const LIST_THUMB_WIDTH: u32 = 600;
pub const LIST_THUMB_HEIGHT: u32 = 400;

/// Client for the external image CDN. The CDN owns the assets; this system
/// only stores `public_id` references. Delivery URLs are computed locally;
/// the destroy endpoint requires a signed request.
#[derive(Clone, Debug)]
pub struct CdnClient {
    client: Client,
    delivery_base_url: String,
    api_base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl CdnClient {
    pub fn new(config: &CdnConfig) -> Result<Self> {
        url::Url::parse(&config.delivery_base_url)?;
        url::Url::parse(&config.api_base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KeepsakeError::Cdn(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            delivery_base_url: config.delivery_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Destroys require credentials; delivery URLs never do.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }

    /// On-the-fly transformation URL for an uploaded asset.
    pub fn delivery_url(&self, public_id: &str, width: u32, height: u32) -> String {
        format!(
            "{}/f_auto,q_auto,w_{},h_{},c_fill,g_auto/{}",
            self.delivery_base_url, width, height, public_id
        )
    }

    fn signature(secret: &str, public_id: &str, timestamp: i64) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
            .map_err(|_| KeepsakeError::Cdn("Invalid signing secret".to_string()))?;
        mac.update(format!("public_id={public_id}&timestamp={timestamp}").as_bytes());
        let digest = mac.finalize().into_bytes();
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Signed destroy of an uploaded asset. Callers deleting several photos
    /// treat individual failures as best-effort.
    pub async fn destroy(&self, public_id: &str) -> Result<()> {
        let (api_key, api_secret) = match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) => (key, secret),
            _ => {
                return Err(KeepsakeError::Cdn(
                    "Image CDN credentials not configured".to_string(),
                ))
            }
        };

        let timestamp = Utc::now().timestamp();
        let signature = Self::signature(api_secret, public_id, timestamp)?;

        let response = self
            .client
            .post(format!("{}/destroy", self.api_base_url))
            .form(&[
                ("public_id", public_id),
                ("timestamp", &timestamp.to_string()),
                ("api_key", api_key),
                ("signature", &signature),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KeepsakeError::Cdn(format!(
                "Destroy of '{public_id}' failed: {status} - {body}"
            )));
        }

        Ok(())
    }
}
