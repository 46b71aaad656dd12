use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::ContactEmail;
use crate::email_client::EmailClient;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    // env vars are always strings, so the port is parsed leniently
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_body_bytes: usize,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub recipient_email: String,
    /// The provider API key. Left unset, every delivery fails with a logged configuration error.
    #[serde(default)]
    pub authorization_token: Option<Secret<String>>,
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<ContactEmail, String> {
        ContactEmail::parse(self.sender_email.clone())
    }

    pub fn recipient(&self) -> Result<ContactEmail, String> {
        ContactEmail::parse(self.recipient_email.clone())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client(self) -> Result<EmailClient, anyhow::Error> {
        let sender_email = self.sender().map_err(anyhow::Error::msg)?;
        let timeout = self.timeout();
        EmailClient::new(
            &self.base_url,
            sender_email,
            self.authorization_token,
            timeout,
        )
    }
}

/// The runtime environment of the service. Selects which configuration file is layered over
/// `base.yaml`.
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

/// Loads settings from `configuration/base.yaml`, then `configuration/{APP_ENVIRONMENT}.yaml`,
/// then `APP_`-prefixed environment variables, e.g. `APP_EMAIL_CLIENT__AUTHORIZATION_TOKEN`.
///
/// `APP_ENVIRONMENT` defaults to `local`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to read current dir: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
