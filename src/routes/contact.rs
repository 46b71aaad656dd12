use std::fmt::{Debug, Formatter};

use actix_web::http::header::ContentType;
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;
use futures::StreamExt;
use serde_json::Value;

use crate::domain::{ContactEmail, ContactSubmission, SubmissionError};
use crate::email_client::EmailClient;
use crate::error_handling::error_chain_fmt;
use crate::startup::{ContactRecipient, MaxBodySize};

/// The four contact form fields as found in the request body.
///
/// A field is `None` when it is absent or holds `null`, `false`, `0` or `""`.
/// Other non-string values are kept in their JSON text form.
#[derive(Debug, Default)]
pub struct ContactFormData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactFormData {
    /// Anything that is not a JSON object carries none of the fields.
    pub fn from_json(body: &Value) -> Self {
        Self {
            name: form_field(body, "name"),
            email: form_field(body, "email"),
            subject: form_field(body, "subject"),
            message: form_field(body, "message"),
        }
    }
}

fn form_field(body: &Value, key: &str) -> Option<String> {
    match body.as_object()?.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl TryFrom<ContactFormData> for ContactSubmission {
    type Error = SubmissionError;

    /// Every field is checked for presence before the email format is looked at.
    fn try_from(form: ContactFormData) -> Result<Self, Self::Error> {
        let (Some(name), Some(email), Some(subject), Some(message)) =
            (form.name, form.email, form.subject, form.message)
        else {
            return Err(SubmissionError::MissingFields);
        };
        let email = ContactEmail::parse(email).map_err(|_| SubmissionError::InvalidEmail)?;
        Ok(Self {
            name,
            email,
            subject,
            message,
        })
    }
}

#[derive(serde::Serialize)]
struct SuccessBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    ValidationError(#[from] SubmissionError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for ContactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ContactError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // the cause chain only goes to the logs, never into the body
        let error = match self {
            ContactError::ValidationError(e) => e.to_string(),
            ContactError::UnexpectedError(_) => {
                "Failed to send email. Please try again later.".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error })
    }
}

/// Entry point for every path: answers preflights, rejects anything but `POST`,
/// and relays valid submissions.
///
/// The body stays unread until the method has been checked.
pub async fn contact_form(
    request: HttpRequest,
    payload: web::Payload,
    email_client: web::Data<EmailClient>,
    recipient: web::Data<ContactRecipient>,
    max_body_size: web::Data<MaxBodySize>,
) -> Result<HttpResponse, ContactError> {
    if request.method() == Method::OPTIONS {
        return Ok(HttpResponse::Ok().finish());
    }
    if request.method() != Method::POST {
        return Ok(HttpResponse::MethodNotAllowed()
            .content_type(ContentType::plaintext())
            .body("Method not allowed"));
    }
    let body = read_body(payload, max_body_size.0).await?;
    relay_submission(&body, &email_client, &recipient.0).await
}

#[tracing::instrument(name = "Reading the request body", skip(payload))]
async fn read_body(
    mut payload: web::Payload,
    limit: usize,
) -> Result<web::BytesMut, anyhow::Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| anyhow::anyhow!("Failed to read the request body: {}", e))?;
        if body.len() + chunk.len() > limit {
            anyhow::bail!("The request body is larger than {} bytes", limit);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[tracing::instrument(
    name = "Relaying a contact form submission",
    skip(body, email_client, recipient),
    fields(submitter_email = tracing::field::Empty)
)]
async fn relay_submission(
    body: &[u8],
    email_client: &EmailClient,
    recipient: &ContactEmail,
) -> Result<HttpResponse, ContactError> {
    let body: Value =
        serde_json::from_slice(body).context("Failed to parse the request body as JSON")?;
    if body.is_null() {
        return Err(anyhow::anyhow!("The request body is JSON null").into());
    }
    let form = ContactFormData::from_json(&body);
    let submission = ContactSubmission::try_from(form).map_err(|e| {
        tracing::warn!(error.message = %e, "Rejected contact form submission");
        e
    })?;
    tracing::Span::current().record(
        "submitter_email",
        tracing::field::display(&submission.email),
    );

    let email_id = email_client
        .send_email(
            recipient,
            &submission.email,
            &submission.subject,
            &submission.html_body(),
            &submission.text_body(),
        )
        .await
        .context("Failed to relay the contact form submission")?;
    tracing::info!(email_id = ?email_id, "Contact form submission relayed");

    Ok(HttpResponse::Ok().json(SuccessBody {
        success: true,
        message: "Email sent successfully",
        id: email_id,
    }))
}
