use std::net::TcpListener;

use anyhow::Context;

use contact_relay::configuration::get_configuration;
use contact_relay::startup::run;
use contact_relay::telemetry::{get_tracing_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_tracing_subscriber("contact-relay", "info", std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let recipient = configuration
        .email_client
        .recipient()
        .map_err(anyhow::Error::msg)
        .context("Invalid recipient email address.")?;
    let email_client = configuration
        .email_client
        .client()
        .context("Failed to build the email client.")?;

    let max_body_size = configuration.application.max_body_bytes;
    let address = configuration.application.address();
    tracing::info!(%address, "Starting contact relay");
    let listener = TcpListener::bind(&address)?;
    run(listener, email_client, recipient, max_body_size)?.await?;
    Ok(())
}
