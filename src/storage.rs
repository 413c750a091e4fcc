use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Reference to an externally hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedImage {
    pub public_id: String,
    pub url: String,
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn upload(
        &self,
        folder: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<HostedImage>;
    async fn destroy(&self, public_id: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct S3ImageStorage {
    client: Client,
    bucket: String,
    public_url: String,
}

impl S3ImageStorage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_url: cfg.public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageStorage for S3ImageStorage {
    async fn upload(
        &self,
        folder: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<HostedImage> {
        let ext = ext_from_mime(content_type).unwrap_or("bin");
        let key = format!("{}/{}.{}", folder, Uuid::new_v4(), ext);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {}", key))?;
        debug!(key = %key, "image uploaded");
        Ok(HostedImage {
            url: format!("{}/{}", self.public_url, key),
            public_id: key,
        })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(public_id)
            .send()
            .await
            .with_context(|| format!("s3 delete_object {}", public_id))?;
        debug!(key = %public_id, "image destroyed");
        Ok(())
    }
}

/// Image payload decoded from a JSON request body.
#[derive(Debug)]
pub struct DecodedImage {
    pub body: Bytes,
    pub content_type: String,
}

/// Accepts `data:<mime>;base64,<payload>` or bare base64.
pub fn decode_image(input: &str) -> anyhow::Result<DecodedImage> {
    let input = input.trim();
    let (content_type, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest
                .split_once(',')
                .context("data uri without payload")?;
            let mime = meta
                .strip_suffix(";base64")
                .context("only base64 data uris are supported")?;
            (mime.to_string(), payload)
        }
        None => ("application/octet-stream".to_string(), input),
    };
    anyhow::ensure!(!payload.is_empty(), "empty image payload");
    let bytes = STANDARD.decode(payload).context("invalid base64 image")?;
    Ok(DecodedImage {
        body: Bytes::from(bytes),
        content_type,
    })
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}
