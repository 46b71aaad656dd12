use crate::domain::ContactEmail;

/// A validated contact form submission, consumed by a single delivery.
#[derive(Debug)]
pub struct ContactSubmission {
    pub name: String,
    pub email: ContactEmail,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Missing required fields: name, email, subject, and message")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
}

impl ContactSubmission {
    /// Renders the notification body as HTML.
    ///
    /// User content is interpolated verbatim; the markup is not escaped.
    pub fn html_body(&self) -> String {
        format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Subject:</strong> {}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{}</p>\n",
            self.name,
            self.email,
            self.subject,
            self.message.replace('\n', "<br>"),
        )
    }

    pub fn text_body(&self) -> String {
        format!(
            "New Contact Form Submission\n\n\
             Name: {}\n\
             Email: {}\n\
             Subject: {}\n\
             Message: {}\n",
            self.name, self.email, self.subject, self.message,
        )
    }
}
