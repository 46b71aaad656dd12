use std::fmt::{Debug, Formatter};

use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

use crate::domain::ContactEmail;
use crate::error_handling::error_chain_fmt;

#[derive(Debug)]
pub struct EmailClient {
    sender: ContactEmail,
    http_client: Client,
    endpoint: Url,
    authorization_token: Option<Secret<String>>,
}

#[derive(thiserror::Error)]
pub enum EmailClientError {
    #[error("No authorization token is configured for the email provider.")]
    MissingAuthorizationToken,
    #[error("The email provider request failed.")]
    Request(#[from] reqwest::Error),
}

impl Debug for EmailClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl EmailClient {
    pub fn new(
        base_url: &str,
        sender: ContactEmail,
        authorization_token: Option<Secret<String>>,
        timeout: std::time::Duration,
    ) -> Result<Self, anyhow::Error> {
        let endpoint = Url::parse(base_url)
            .and_then(|base_url| base_url.join("/emails"))
            .with_context(|| format!("Invalid email provider base url: {}", base_url))?;
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the email provider http client")?;

        Ok(Self {
            sender,
            http_client,
            endpoint,
            authorization_token,
        })
    }

    /// Sends one email and returns the identifier the provider assigned to it, if any.
    ///
    /// A missing authorization token is only detected here, before any request goes out.
    #[tracing::instrument(
        name = "Sending an email through the provider",
        skip_all,
        fields(recipient = %recipient, reply_to = %reply_to)
    )]
    pub async fn send_email(
        &self,
        recipient: &ContactEmail,
        reply_to: &ContactEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<Option<String>, EmailClientError> {
        let authorization_token = self
            .authorization_token
            .as_ref()
            .ok_or(EmailClientError::MissingAuthorizationToken)?;

        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject,
            html: html_content,
            text: text_content,
            reply_to: reply_to.as_ref(),
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        // a 2xx without a parseable id still counts as delivered
        let body = response.bytes().await?;
        let email_id = serde_json::from_slice::<SendEmailResponse>(&body)
            .ok()
            .and_then(|response| response.id);
        Ok(email_id)
    }
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    reply_to: &'a str,
}

#[derive(serde::Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}
