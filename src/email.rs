use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::EmailConfig;

#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail through a JSON HTTP API (`POST {api_url}/emails`).
pub struct HttpEmailClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    sender: String,
}

impl HttpEmailClient {
    pub fn new(cfg: &EmailConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("build email http client")?;
        Ok(Self {
            http_client,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            sender: cfg.sender.clone(),
        })
    }
}

#[async_trait]
impl EmailClient for HttpEmailClient {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let url = format!("{}/emails", self.base_url);
        let request = SendEmailRequest {
            from: &self.sender,
            to,
            subject,
            text: body,
        };

        self.http_client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("send email request")?
            .error_for_status()
            .context("email api rejected request")?;

        debug!(to = %to, "email sent");
        Ok(())
    }
}

pub const RESET_SUBJECT: &str = "Reset Password Token for Ghareebstar.com";

pub fn reset_password_message(reset_url: &str) -> String {
    format!(
        "You Requested For Password Reset on Ghareebstar, \n\n \
         Here is Your Reset Password URL, \n\n {}. \n\n \
         If you have not requested for reset password , Please Ignore this Email",
        reset_url
    )
}
