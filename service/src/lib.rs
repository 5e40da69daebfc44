//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::error::Error;

use common::operations::{By, Start};
use derive_more::Debug;

#[cfg(doc)]
use infra::{Database, Mailer, Payments, Storage};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`domain::admin::Identity`] of the storefront administrator.
    pub admin: domain::admin::Identity,

    /// [`command::create_checkout_session::Config`] of the hosted checkout.
    pub checkout: command::create_checkout_session::Config,

    /// [`command::send_contact_message::Config`] of the contact form relay.
    pub contact: command::send_contact_message::Config,

    /// [`task::CleanOrphanedMedia`] configuration.
    pub clean_orphaned_media: task::clean_orphaned_media::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, St, Pay, Ml> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Storage`] of this [`Service`].
    storage: St,

    /// [`Payments`] of this [`Service`].
    payments: Pay,

    /// [`Mailer`] of this [`Service`].
    mailer: Ml,
}

impl<Db, St, Pay, Ml> Service<Db, St, Pay, Ml> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        storage: St,
        payments: Pay,
        mailer: Ml,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::CleanOrphanedMedia<Self>,
                        task::clean_orphaned_media::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            storage,
            payments,
            mailer,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(task::CleanOrphanedMedia::<Self>::NAME, async move {
            svc.execute(Start(By::new(svc.config().clean_orphaned_media)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// Returns [`Payments`] of this [`Service`].
    #[must_use]
    pub fn payments(&self) -> &Pay {
        &self.payments
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub fn mailer(&self) -> &Ml {
        &self.mailer
    }
}

#[cfg(test)]
mod spec {
    //! Shared test fixtures.

    use std::str::FromStr as _;

    use common::Percent;

    use crate::{
        command,
        domain::{admin, payment, product, Product},
        infra::Memory,
        task, Config, Service,
    };

    /// Secret the [`service()`] signs its tokens with.
    pub(crate) const JWT_SECRET: &str = "test-secret";

    /// Creates a new [`Service`] backed by a single [`Memory`] and
    /// administered by `Apex` with `apex12345` password.
    pub(crate) fn service(
    ) -> (Service<Memory, Memory, Memory, Memory>, Memory) {
        let memory = Memory::new();
        let config = Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                JWT_SECRET.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                JWT_SECRET.as_bytes(),
            ),
            admin: admin::Identity::new(
                admin::Username::new("Apex").unwrap(),
                &admin::Password::from("apex12345"),
            )
            .unwrap(),
            checkout: command::create_checkout_session::Config {
                success_url: "https://shop.test/payment-success".to_owned(),
                cancel_url: "https://shop.test/products".to_owned(),
            },
            contact: command::send_contact_message::Config {
                company: "Apex Gerüstbau".to_owned(),
                recipient: payment::Email::new("info@apex.test").unwrap(),
            },
            clean_orphaned_media: task::clean_orphaned_media::Config::default(),
        };
        let svc = Service {
            config,
            database: memory.clone(),
            storage: memory.clone(),
            payments: memory.clone(),
            mailer: memory.clone(),
        };
        (svc, memory)
    }

    /// Creates a new [`Product`] without an image.
    pub(crate) fn new_product(title: &str) -> Product {
        Product {
            id: product::Id::new(),
            title: product::Title::new(title).unwrap(),
            description: product::Description::new("Test").unwrap(),
            price: product::Price::from_str("10").unwrap(),
            discount: Percent::ZERO,
            image: None,
            created_at: product::CreationDateTime::now(),
            updated_at: None,
        }
    }
}
