//! HTTP API definitions.

pub mod auth;
pub mod contact;
pub mod form;
pub mod payment;
pub mod product;
pub mod project;

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler as _,
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use common::DateTime;
use serde::Serialize;
use service::command;

use crate::{context, Context};

/// Creates a new [`Router`] serving the whole HTTP API.
///
/// Mutating routes (and `GET /verify`) are guarded by [`context::authorize`]
/// middleware, everything else is public.
pub fn router(ctx: Context) -> Router {
    let guard = || middleware::from_fn(context::authorize);
    let max_body_size = ctx.settings().max_body_size;

    Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/verify", get(auth::verify.layer(guard())))
        .route(
            "/products",
            get(product::list).post(product::create.layer(guard())),
        )
        .route(
            "/products/:id",
            put(product::update.layer(guard()))
                .delete(product::delete.layer(guard())),
        )
        .route(
            "/projects",
            get(project::list).post(project::create.layer(guard())),
        )
        .route("/projects/:id", delete(project::delete.layer(guard())))
        .route("/contact", post(contact::send))
        .route("/stripe/create-payment-intent", post(payment::create_intent))
        .route("/stripe/confirm-payment", post(payment::confirm))
        .route(
            "/stripe/create-checkout-session",
            post(payment::create_checkout_session),
        )
        .route("/stripe/config", get(payment::config))
        .route("/stripe/payment-methods", get(payment::methods))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(Extension(ctx))
}

/// Response of [`health()`].
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `OK`.
    pub status: &'static str,

    /// [RFC 3339] date and time of the check.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub timestamp: String,
}

/// Reports the application is up.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: DateTime::now().to_rfc3339(),
    })
}

/// Response to a deletion.
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Always `true`.
    pub success: bool,

    /// Non-fatal problems occurred while deleting.
    pub warnings: Vec<String>,
}

impl Deleted {
    /// Creates a new [`Deleted`] response with the provided
    /// [`command::Warning`]s.
    #[must_use]
    pub fn with(warnings: Vec<command::Warning>) -> Self {
        Self {
            success: true,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }
}
