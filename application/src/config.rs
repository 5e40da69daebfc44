//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::{
    command,
    domain::{admin, contact},
    infra,
};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Object storage configuration.
    pub storage: Storage,

    /// Stripe configuration.
    pub stripe: Stripe,

    /// SMTP relay configuration.
    pub smtp: Smtp,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(5000)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,

    /// Maximum size of a request body in bytes.
    ///
    /// Must fit all the images of a single form.
    #[default(110 * 1024 * 1024)]
    pub max_body_size: usize,

    /// Indicator whether internal error details are exposed in responses.
    pub expose_backtraces: bool,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default(SecretString::from("secret"))]
    pub jwt_secret: SecretString,

    /// Administrator credentials.
    pub admin: Admin,

    /// Uploaded media configuration.
    pub media: Media,

    /// Contact form configuration.
    pub contact: Contact,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl Service {
    /// Converts this [`Service`] configuration into a [`service::Config`]
    /// using the provided [`Stripe`] redirect URLs.
    ///
    /// # Errors
    ///
    /// If the administrator username or the contact recipient is invalid, or
    /// the password cannot be hashed.
    pub fn into_service_config(
        self,
        stripe: &Stripe,
    ) -> Result<service::Config, ConfigError> {
        let Self {
            jwt_secret,
            admin: Admin { username, password },
            media: _,
            contact: Contact { company, recipient },
            tasks: Tasks {
                clean_orphaned_media,
            },
        } = self;

        let username = admin::Username::new(username.clone()).ok_or_else(|| {
            ConfigError::Message(format!(
                "`service.admin.username = {username:?}` is invalid",
            ))
        })?;
        let admin = admin::Identity::new(
            username,
            &admin::Password::from(password.expose_secret()),
        )
        .map_err(|e| {
            ConfigError::Message(format!(
                "failed to hash `service.admin.password`: {e}",
            ))
        })?;

        let recipient = contact::Email::new(&recipient).ok_or_else(|| {
            ConfigError::Message(format!(
                "`service.contact.recipient = {recipient:?}` is invalid",
            ))
        })?;

        Ok(service::Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.expose_secret().as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.expose_secret().as_bytes(),
            ),
            admin,
            checkout: command::create_checkout_session::Config {
                success_url: stripe.success_url.clone(),
                cancel_url: stripe.cancel_url.clone(),
            },
            contact: command::send_contact_message::Config {
                company,
                recipient,
            },
            clean_orphaned_media: service::task::clean_orphaned_media::Config {
                interval: clean_orphaned_media.interval,
                grace: clean_orphaned_media.grace,
            },
        })
    }
}

/// Administrator credentials.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Admin {
    /// Username of the administrator.
    #[default("Apex".to_owned())]
    pub username: String,

    /// Password of the administrator.
    #[default(SecretString::from("apex12345"))]
    pub password: SecretString,
}

/// Uploaded media configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Media {
    /// Maximum size of a single uploaded image in bytes.
    #[default(10 * 1024 * 1024)]
    pub max_file_size: usize,
}

/// Contact form configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Contact {
    /// Name of the company signing the confirmation e-mails.
    #[default("Apex Gerüstbau".to_owned())]
    pub company: String,

    /// E-mail address receiving the contact requests.
    #[default("info@apex-gerüste.ch".to_owned())]
    pub recipient: String,
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `CleanOrphanedMedia` task configuration.
    pub clean_orphaned_media: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Age after which unreferenced files are considered orphaned.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub grace: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Connection URL, taking precedence over the discrete fields below.
    pub url: Option<String>,

    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Timeout of a single database operation.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Postgres> for infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            url,
            host,
            port,
            user,
            password,
            dbname,
            timeout: _,
        } = value;

        if url.is_some() {
            return Self {
                url,
                ..Self::default()
            };
        }
        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// [Supabase Storage] configuration.
///
/// [Supabase Storage]: https://supabase.com/docs/guides/storage
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Base URL of the Supabase project.
    #[default("http://127.0.0.1:54321".to_owned())]
    pub url: String,

    /// Service key authorizing the storage operations.
    #[default(SecretString::from(""))]
    pub key: SecretString,

    /// Names of the buckets.
    pub buckets: Buckets,

    /// Timeout of a single storage request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Storage> for infra::supabase::Config {
    fn from(value: Storage) -> Self {
        let Storage {
            url,
            key,
            buckets: Buckets { products, projects },
            timeout,
        } = value;

        Self {
            url,
            key,
            buckets: infra::supabase::Buckets { products, projects },
            timeout,
        }
    }
}

/// Names of the storage buckets.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Buckets {
    /// Bucket of the product images.
    #[default("products".to_owned())]
    pub products: String,

    /// Bucket of the project images.
    #[default("projects".to_owned())]
    pub projects: String,
}

/// [Stripe] configuration.
///
/// [Stripe]: https://docs.stripe.com/api
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Stripe {
    /// Base URL of the Stripe API.
    #[default("https://api.stripe.com".to_owned())]
    pub url: String,

    /// Secret API key.
    #[default(SecretString::from(""))]
    pub secret_key: SecretString,

    /// Publishable API key handed out to browsers.
    pub publishable_key: String,

    /// Default URL to redirect to after a successful checkout.
    #[default("http://localhost:5173/payment-success".to_owned())]
    pub success_url: String,

    /// Default URL to redirect to after a cancelled checkout.
    #[default("http://localhost:5173/products".to_owned())]
    pub cancel_url: String,

    /// Timeout of a single Stripe request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<&Stripe> for infra::stripe::Config {
    fn from(value: &Stripe) -> Self {
        Self {
            url: value.url.clone(),
            secret_key: value.secret_key.clone(),
            timeout: value.timeout,
        }
    }
}

/// [SMTP] relay configuration.
///
/// [SMTP]: https://datatracker.ietf.org/doc/html/rfc5321
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Smtp {
    /// Host of the relay.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the relay.
    #[default(587)]
    pub port: u16,

    /// Security of the connection to the relay.
    pub security: SmtpSecurity,

    /// User to authenticate as, if the relay requires authentication.
    pub username: Option<String>,

    /// Password to authenticate with.
    #[default(SecretString::from(""))]
    pub password: SecretString,

    /// Sender of all the e-mails.
    #[default("Apex Gerüstbau <info@apex-gerüste.ch>".to_owned())]
    pub from: String,

    /// Timeout of a single SMTP session.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Smtp> for infra::smtp::Config {
    fn from(value: Smtp) -> Self {
        let Smtp {
            host,
            port,
            security,
            username,
            password,
            from,
            timeout,
        } = value;

        Self {
            host,
            port,
            security: security.into(),
            username: username.filter(|u| !u.is_empty()),
            password,
            from,
            timeout,
        }
    }
}

/// Security of a connection to an SMTP relay.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with `STARTTLS`.
    #[default]
    StartTls,

    /// Connection wrapped into TLS from the start.
    Tls,

    /// Unencrypted connection.
    Plain,
}

impl From<SmtpSecurity> for infra::smtp::Security {
    fn from(value: SmtpSecurity) -> Self {
        match value {
            SmtpSecurity::StartTls => Self::StartTls,
            SmtpSecurity::Tls => Self::Tls,
            SmtpSecurity::Plain => Self::Plain,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::ExposeSecret as _;

    use super::{Config, Stripe};

    #[test]
    fn defaults_to_local_development() {
        let conf = Config::default();

        assert_eq!(conf.server.port, 5000);
        assert_eq!(conf.service.admin.username, "Apex");
        assert_eq!(conf.service.admin.password.expose_secret(), "apex12345");
        assert_eq!(conf.service.media.max_file_size, 10 * 1024 * 1024);
        assert_eq!(conf.stripe.url, "https://api.stripe.com");
    }

    #[test]
    fn builds_service_config() {
        let conf = Config::default();

        let service = conf.service.into_service_config(&conf.stripe).unwrap();

        assert_eq!(AsRef::<str>::as_ref(&service.admin.username), "Apex");
        assert_eq!(
            service.checkout.success_url,
            "http://localhost:5173/payment-success",
        );
        assert_eq!(service.contact.company, "Apex Gerüstbau");
        assert_eq!(service.contact.recipient.as_ref(), "info@apex-gerüste.ch");
    }

    #[test]
    fn rejects_invalid_contact_recipient() {
        let mut conf = Config::default();
        conf.service.contact.recipient = "info@apex".to_owned();

        assert!(conf
            .service
            .into_service_config(&Stripe::default())
            .is_err());
    }

    #[test]
    fn converts_smtp_config() {
        let mut conf = Config::default();
        conf.smtp.username = Some(String::new());
        conf.smtp.security = super::SmtpSecurity::Plain;

        let smtp = service::infra::smtp::Config::from(conf.smtp);

        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.username, None);
        assert_eq!(smtp.security, service::infra::smtp::Security::Plain);
    }

    #[test]
    fn rejects_invalid_admin_username() {
        let mut conf = Config::default();
        conf.service.admin.username = String::new();

        assert!(conf
            .service
            .into_service_config(&Stripe::default())
            .is_err());
    }

    #[test]
    fn prefers_postgres_url() {
        let mut conf = Config::default();
        conf.postgres.url = Some("postgres://u:p@db:5432/apex".to_owned());

        let pg = service::infra::postgres::Config::from(conf.postgres);

        assert_eq!(pg.url.as_deref(), Some("postgres://u:p@db:5432/apex"));
        assert_eq!(pg.host, None);
    }
}
