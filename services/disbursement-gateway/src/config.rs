use config::{ConfigError, Environment, File};
use disbursement_adapters::{PartnerConfig, RemittanceDefaults, SenderProfile};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub partner: PartnerConfig,
    pub sender: SenderProfile,
    #[serde(default)]
    pub remittance: RemittanceDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "disbursement_gateway=info,disbursement_adapters=info,tower_http=info"
                .to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("partner.timeout_secs", 30)?
            .set_default("partner.connect_timeout_secs", 10)?
            .set_default("partner.cache_tokens", false)?;

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder.add_source(
                File::with_name(&format!("config/{}", environment)).required(false),
            );
        }

        // DISBURSEMENT__PARTNER__CREDENTIALS__CLIENT_SECRET=... etc.
        builder = builder.add_source(
            Environment::with_prefix("DISBURSEMENT")
                .prefix_separator("__")
                .separator("__"),
        );

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        if let Ok(format) = env::var("LOG_FORMAT") {
            builder = builder.set_override("logging.format", format.to_lowercase())?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }

        if self.sender.name.trim().is_empty() {
            return Err("Sender name is required".to_string());
        }

        self.partner.validate().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disbursement_adapters::PartnerCredentials;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8080,
            },
            logging: LoggingConfig::default(),
            partner: PartnerConfig::new(
                "https://partner.example",
                PartnerCredentials {
                    client_id: "id".into(),
                    client_secret: "secret".into(),
                    partner_id: "partner".into(),
                    username: "user".into(),
                    password: "pass".into(),
                    scope: "instapay".into(),
                },
            ),
            sender: SenderProfile {
                name: "Palngipang Corp.".into(),
                ..Default::default()
            },
            remittance: RemittanceDefaults::default(),
        }
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());
        assert_eq!(config().server.bind_addr(), "127.0.0.1:8080");

        let mut no_sender = config();
        no_sender.sender.name.clear();
        assert!(no_sender.validate().is_err());

        let mut no_port = config();
        no_port.server.port = 0;
        assert!(no_port.validate().is_err());

        let mut no_creds = config();
        no_creds.partner.credentials.username.clear();
        assert!(no_creds.validate().unwrap_err().contains("username"));
    }

    #[test]
    fn test_deserialize_from_sources() {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")
            .unwrap()
            .set_default("server.port", 9090)
            .unwrap()
            .add_source(File::from_str(
                r#"
                [partner]
                base_url = "https://partner.example"

                [partner.credentials]
                client_id = "id"
                client_secret = "secret"
                partner_id = "partner"
                username = "user"
                password = "pass"
                scope = "instapay"

                [sender]
                name = "Palngipang Corp."

                [sender.address]
                line1 = "Some Tower"
                line2 = "Some Barangay"
                city = "Some City"
                province = "Metro Manila"
                zip_code = "4024"
                country = "Philippines"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let loaded: Config = settings.try_deserialize().unwrap();
        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.partner.timeout_secs, 30);
        assert!(!loaded.partner.cache_tokens);
        assert_eq!(loaded.partner.paths.auth, "/partners/v1/oauth2/token");
        assert_eq!(loaded.sender.address.zip_code, "4024");
        assert_eq!(loaded.remittance.purpose, "1001");
        assert_eq!(loaded.logging.format, LogFormat::Text);
        assert!(loaded.validate().is_ok());
    }
}
