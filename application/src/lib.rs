//! Application provides HTTP API for interacting with the [`Service`].

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

pub mod api;
pub mod args;
pub mod config;
pub mod context;
pub mod error;

// Used in binary.
use axum_client_ip as _;
use futures as _;
use refinery as _;
use tokio as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
#[cfg(not(test))]
pub type Service = service::Service<
    service::infra::Postgres,
    service::infra::Supabase,
    service::infra::Stripe,
    service::infra::Smtp,
>;

/// [`Service`] backed by the in-memory infrastructure.
///
/// [`Service`]: service::Service
#[cfg(test)]
pub type Service = service::Service<
    service::infra::Memory,
    service::infra::Memory,
    service::infra::Memory,
    service::infra::Memory,
>;

#[cfg(test)]
mod spec {
    //! Router-level tests of the whole HTTP API.

    use axum::{body::Body, Router};
    use http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt as _;
    use serde_json::{json, Value};
    use service::{
        command,
        domain::{admin, contact},
        infra::{memory::Faults, Memory},
        task,
    };
    use tower::ServiceExt as _;

    use crate::{api, context::Settings, Context};

    /// Secret the test tokens are signed with.
    const JWT_SECRET: &str = "test-secret";

    /// Boundary of the multipart bodies built by [`multipart()`].
    const BOUNDARY: &str = "spec-boundary";

    /// Creates a new [`Router`] backed by a single [`Memory`].
    fn app() -> (Router, Memory) {
        let memory = Memory::new();
        let config = service::Config {
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
                recipient: contact::Email::new("info@apex.test").unwrap(),
            },
            clean_orphaned_media: task::clean_orphaned_media::Config::default(),
        };
        let (svc, _) = service::Service::new(
            config,
            memory.clone(),
            memory.clone(),
            memory.clone(),
            memory.clone(),
        );
        let ctx = Context::new(
            svc,
            Settings {
                max_file_size: 1024,
                max_body_size: 64 * 1024,
                publishable_key: "pk_test".to_owned(),
            },
        );
        (api::router(ctx), memory)
    }

    /// Part of a [`multipart()`] body.
    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a str, &'a [u8]),
    }

    /// Builds a `multipart/form-data` body out of the provided [`Part`]s.
    fn multipart(parts: &[Part<'_>]) -> Body {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; \
                             name=\"{name}\"\r\n\r\n{value}\r\n",
                        )
                        .as_bytes(),
                    );
                }
                Part::File(name, file_name, content_type, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; \
                             name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n",
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    /// Sends the provided request to the [`Router`] and returns the response
    /// status along with its JSON body.
    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<String>,
        body: Body,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            req = req.header(header::CONTENT_TYPE, content_type);
        }

        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn send_json(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        send(
            app,
            method,
            uri,
            token,
            Some("application/json".to_owned()),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn send_form(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        parts: &[Part<'_>],
    ) -> (StatusCode, Value) {
        send(
            app,
            method,
            uri,
            token,
            Some(format!("multipart/form-data; boundary={BOUNDARY}")),
            multipart(parts),
        )
        .await
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send_json(
            app,
            Method::POST,
            "/login",
            None,
            &json!({"username": "Apex", "password": "apex12345"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_owned()
    }

    async fn products(app: &Router) -> Vec<Value> {
        let (status, body) =
            send(app, Method::GET, "/products", None, None, Body::empty())
                .await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn logs_in_and_verifies() {
        let (app, _) = app();

        let token = login(&app).await;
        let (status, body) =
            send(&app, Method::GET, "/verify", Some(&token), None, Body::empty())
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["admin"]["username"], "Apex");
        let (iat, exp) = (
            body["admin"]["iat"].as_i64().unwrap(),
            body["admin"]["exp"].as_i64().unwrap(),
        );
        assert_eq!(exp - iat, 24 * 60 * 60);
    }

    #[tokio::test]
    async fn rejects_wrong_credentials_uniformly() {
        let (app, _) = app();

        for (username, password) in
            [("Apex", "wrong"), ("Nobody", "apex12345"), ("", "")]
        {
            let (status, body) = send_json(
                &app,
                Method::POST,
                "/login",
                None,
                &json!({"username": username, "password": password}),
            )
            .await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
        }
    }

    #[tokio::test]
    async fn guards_mutations() {
        let (app, memory) = app();
        let parts = [
            Part::Text("title", "Gerüst A"),
            Part::Text("description", "Facade scaffold"),
            Part::Text("price", "10"),
            Part::File("image", "a.png", "image/png", b"png"),
        ];

        let (status, body) =
            send_form(&app, Method::POST, "/products", None, &parts).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTHORIZATION_REQUIRED");

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/products",
            Some("not-a-token"),
            &parts,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");

        let forged = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &admin::Session::issue(admin::Username::new("Apex").unwrap()),
            &jsonwebtoken::EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();
        let (status, body) =
            send_form(&app, Method::POST, "/products", Some(&forged), &parts)
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");

        let foreign = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &admin::Session::issue(admin::Username::new("Mallory").unwrap()),
            &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .unwrap();
        let (status, body) =
            send_form(&app, Method::POST, "/products", Some(&foreign), &parts)
                .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "WRONG_PRINCIPAL");

        assert!(products(&app).await.is_empty());
        assert!(memory
            .object_paths(service::domain::media::Bucket::Products)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn serves_storefront_end_to_end() {
        let (app, _) = app();
        let token = login(&app).await;

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/products",
            Some(&token),
            &[
                Part::Text("title", "Gerüst A"),
                Part::Text("description", "Facade scaffold"),
                Part::Text("price", "100.00"),
                Part::Text("discount", "10"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["product"]["image"], Value::Null);
        assert_eq!(body["product"]["price"], json!(100.0));
        assert_eq!(body["product"]["discount"], json!(10.0));
        let id = body["product"]["id"].as_str().unwrap().to_owned();

        assert!(products(&app).await.iter().any(|p| p["id"] == id.as_str()));

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/products/{id}"),
            Some(&token),
            None,
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!products(&app).await.iter().any(|p| p["id"] == id.as_str()));
    }

    #[tokio::test]
    async fn manages_product_lifecycle() {
        let (app, memory) = app();
        let token = login(&app).await;

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/products",
            Some(&token),
            &[
                Part::Text("title", "Gerüst A"),
                Part::Text("description", "Facade scaffold"),
                Part::Text("price", "10"),
                Part::Text("discount", "20"),
                Part::File("image", "a.png", "image/png", b"png"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let product = &body["product"];
        assert_eq!(product["effectivePrice"], json!(8.0));
        assert!(product["image"].is_string());
        let id = product["id"].as_str().unwrap().to_owned();

        let listed = products(&app).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["title"], "Gerüst A");

        let (status, body) = send_form(
            &app,
            Method::PUT,
            &format!("/products/{id}"),
            Some(&token),
            &[
                Part::Text("title", "Gerüst B"),
                Part::Text("description", "Facade scaffold"),
                Part::Text("price", "12.50"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["product"]["title"], "Gerüst B");
        assert_eq!(body["product"]["discount"], json!(0.0));
        assert!(body["product"]["updatedAt"].is_string());
        assert_eq!(body["product"]["image"], product["image"]);

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/products/{id}"),
            Some(&token),
            None,
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(products(&app).await.is_empty());
        assert!(memory
            .object_paths(service::domain::media::Bucket::Products)
            .await
            .is_empty());

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/products/{id}"),
            Some(&token),
            None,
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "PRODUCT_NOT_FOUND");
    }

    #[tokio::test]
    async fn validates_product_forms() {
        let (app, memory) = app();
        let token = login(&app).await;

        let cases: [(&[Part<'_>], StatusCode, &str); 10] = [
            (
                &[
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                ],
                StatusCode::BAD_REQUEST,
                "MISSING_FIELD",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "-1"),
                ],
                StatusCode::BAD_REQUEST,
                "INVALID_PRICE",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                    Part::Text("discount", "150"),
                ],
                StatusCode::BAD_REQUEST,
                "INVALID_DISCOUNT",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10.005"),
                ],
                StatusCode::BAD_REQUEST,
                "INVALID_PRICE",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10000000000"),
                ],
                StatusCode::BAD_REQUEST,
                "INVALID_PRICE",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                    Part::Text("discount", "12.345"),
                ],
                StatusCode::BAD_REQUEST,
                "INVALID_DISCOUNT",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                    Part::File("image", "a.png", "image/png", b"png"),
                    Part::File("image", "b.png", "image/png", b"png"),
                ],
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                    Part::File("photo", "a.png", "image/png", b"png"),
                ],
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                    Part::File("image", "a.txt", "text/plain", b"text"),
                ],
                StatusCode::BAD_REQUEST,
                "INVALID_IMAGE",
            ),
            (
                &[
                    Part::Text("title", "Gerüst A"),
                    Part::Text("description", "Facade scaffold"),
                    Part::Text("price", "10"),
                    Part::File("image", "a.png", "image/png", &[0; 2048]),
                ],
                StatusCode::PAYLOAD_TOO_LARGE,
                "IMAGE_TOO_LARGE",
            ),
        ];
        for (parts, expected_status, expected_code) in cases {
            let (status, body) =
                send_form(&app, Method::POST, "/products", Some(&token), parts)
                    .await;

            assert_eq!(status, expected_status, "{body}");
            assert_eq!(body["error"]["code"], expected_code);
        }
        assert!(products(&app).await.is_empty());
        assert!(memory
            .object_paths(service::domain::media::Bucket::Products)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn manages_projects() {
        let (app, memory) = app();
        let token = login(&app).await;

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/projects",
            Some(&token),
            &[
                Part::Text("title", "Fassade Zürich"),
                Part::Text("description", "Facade scaffold"),
                Part::Text("location", "Zürich"),
                Part::Text("completedDate", "2024-05-07"),
                Part::File("images", "1.jpg", "image/jpeg", b"1"),
                Part::File("images", "2.jpg", "image/jpeg", b"2"),
                Part::File("images", "3.jpg", "image/jpeg", b"3"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let id = body["project"]["id"].as_str().unwrap().to_owned();

        let (_, listed) =
            send(&app, Method::GET, "/projects", None, None, Body::empty())
                .await;
        let images = listed[0]["images"].as_array().unwrap();
        assert_eq!(images.len(), 3);
        assert_eq!(listed[0]["completedDate"], "2024-05-07");

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/projects/{id}"),
            Some(&token),
            None,
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(memory
            .object_paths(service::domain::media::Bucket::Projects)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn rejects_too_many_project_images() {
        let (app, memory) = app();
        let token = login(&app).await;
        let mut parts = vec![
            Part::Text("title", "Fassade Zürich"),
            Part::Text("description", "Facade scaffold"),
            Part::Text("location", "Zürich"),
            Part::Text("completedDate", "2024-05-07"),
        ];
        parts.extend((0..11).map(|_| {
            Part::File("images", "n.jpg", "image/jpeg", b"jpg".as_slice())
        }));

        let (status, body) =
            send_form(&app, Method::POST, "/projects", Some(&token), &parts)
                .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "TOO_MANY_IMAGES");
        assert!(memory
            .object_paths(service::domain::media::Bucket::Projects)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn rejects_unexpected_project_files() {
        let (app, memory) = app();
        let token = login(&app).await;

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/projects",
            Some(&token),
            &[
                Part::Text("title", "Fassade Zürich"),
                Part::Text("description", "Facade scaffold"),
                Part::Text("location", "Zürich"),
                Part::Text("completedDate", "2024-05-07"),
                Part::File("images", "1.jpg", "image/jpeg", b"1"),
                Part::File("image", "2.jpg", "image/jpeg", b"2"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(memory
            .object_paths(service::domain::media::Bucket::Projects)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn processes_payments() {
        let (app, _) = app();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/stripe/create-payment-intent",
            None,
            &json!({
                "amount": 12.5,
                "currency": "chf",
                "description": "Gerüst A",
                "customerEmail": "kunde@example.ch",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["clientSecret"].is_string());
        let id = body["paymentIntentId"].as_str().unwrap().to_owned();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/stripe/confirm-payment",
            None,
            &json!({"paymentIntentId": id}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "PAYMENT_NOT_COMPLETED");

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/stripe/create-payment-intent",
            None,
            &json!({
                "amount": 12.5,
                "description": "Gerüst A",
                "customerEmail": "kunde@example",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_EMAIL");

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/stripe/create-checkout-session",
            None,
            &json!({"items": [{"name": "Gerüst A", "price": 10.0}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["url"].is_string());

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/stripe/create-checkout-session",
            None,
            &json!({"items": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ITEMS");

        let (_, body) = send(
            &app,
            Method::GET,
            "/stripe/config",
            None,
            None,
            Body::empty(),
        )
        .await;
        assert_eq!(body["publishableKey"], "pk_test");
        assert_eq!(body["currency"], "chf");
    }

    #[tokio::test]
    async fn rejects_amounts_overflowing_minor_units() {
        let (app, _) = app();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/stripe/create-payment-intent",
            None,
            &json!({
                "amount": 7e28,
                "description": "Gerüst A",
                "customerEmail": "kunde@example.ch",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY, "{body}");
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn relays_contact_messages() {
        let (app, memory) = app();

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/contact",
            None,
            &json!({
                "name": "Hans Muster",
                "email": "kunde@example.ch",
                "phone": "+41 76 123 45 67",
                "message": "Bitte um eine Offerte für ein Fassadengerüst.",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["warnings"], json!([]));
        let mails = memory.mails().await;
        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].to.as_ref(), "info@apex.test");
        assert_eq!(mails[1].to.as_ref(), "kunde@example.ch");
    }

    #[tokio::test]
    async fn validates_contact_messages() {
        let (app, memory) = app();

        let cases = [
            (
                json!({
                    "email": "kunde@example.ch",
                    "message": "Guten Tag!!",
                }),
                "MISSING_FIELD",
            ),
            (
                json!({
                    "name": " ",
                    "email": "kunde@example.ch",
                    "message": "Guten Tag!!",
                }),
                "MISSING_FIELD",
            ),
            (
                json!({
                    "name": "Hans",
                    "email": "kunde@example",
                    "message": "Guten Tag!!",
                }),
                "INVALID_EMAIL",
            ),
            (
                json!({
                    "name": "Hans",
                    "email": "kunde@example.ch",
                    "message": "Hallo",
                }),
                "VALIDATION_ERROR",
            ),
            (
                json!({
                    "name": "Hans",
                    "email": "kunde@example.ch",
                    "subject": "Offerte\r\nBcc: x@example.ch",
                    "message": "Guten Tag!!",
                }),
                "VALIDATION_ERROR",
            ),
        ];
        for (req, expected_code) in cases {
            let (status, body) =
                send_json(&app, Method::POST, "/contact", None, &req).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body["error"]["code"], expected_code);
        }
        assert!(memory.mails().await.is_empty());
    }

    #[tokio::test]
    async fn reports_undeliverable_contact_messages() {
        let (app, memory) = app();
        memory
            .inject(Faults {
                mails_left: Some(0),
                ..Faults::default()
            })
            .await;

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/contact",
            None,
            &json!({
                "name": "Hans Muster",
                "email": "kunde@example.ch",
                "message": "Bitte um eine Offerte.",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY, "{body}");
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }
}
