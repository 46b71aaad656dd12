use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::domain::ContactEmail;
use crate::email_client::EmailClient;
use crate::routes::contact_form;

/// The fixed inbox every contact form submission is delivered to.
pub struct ContactRecipient(pub ContactEmail);

/// Upper bound, in bytes, on a contact form body. Larger bodies fail the request.
pub struct MaxBodySize(pub usize);

/// The CORS headers attached to every response, errors included.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    recipient: ContactEmail,
    max_body_size: usize,
) -> Result<Server, std::io::Error> {
    // wrapping in web::Data (an Arc) so every worker shares one client and its connection pool
    let email_client = web::Data::new(email_client);
    let recipient = web::Data::new(ContactRecipient(recipient));
    let max_body_size = web::Data::new(MaxBodySize(max_body_size));
    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_headers())
            .wrap(TracingLogger::default())
            // every path and method lands on the contact handler
            .default_service(web::to(contact_form))
            .app_data(email_client.clone())
            .app_data(recipient.clone())
            .app_data(max_body_size.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
