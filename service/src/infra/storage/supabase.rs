//! [Supabase Storage] implementation of [`Storage`].
//!
//! [Supabase Storage]: https://supabase.com/docs/reference/api/storage

use std::time;

use common::{
    operations::{By, Delete, Insert, Select},
    DateTime,
};
use derive_more::{Debug, Display, Error as StdError, From};
use reqwest::header;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use tracerr::Traced;

use crate::{
    domain::media,
    infra::{storage, Storage},
};

/// Maximum number of entries requested per listing page.
const PAGE_SIZE: usize = 1000;

/// [`Supabase`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the Supabase project (`https://<ref>.supabase.co`).
    pub url: String,

    /// Service key authorizing the storage operations.
    pub key: SecretString,

    /// Names of the [`media::Bucket`]s.
    pub buckets: Buckets,

    /// Timeout of a single request.
    pub timeout: time::Duration,
}

/// Names of the [`media::Bucket`]s in a Supabase project.
#[derive(Clone, Debug)]
pub struct Buckets {
    /// Name of the [`media::Bucket::Products`] bucket.
    pub products: String,

    /// Name of the [`media::Bucket::Projects`] bucket.
    pub projects: String,
}

/// [Supabase Storage] client.
///
/// [Supabase Storage]: https://supabase.com/docs/guides/storage
#[derive(Clone, Debug)]
pub struct Supabase {
    /// HTTP client performing the requests.
    client: reqwest::Client,

    /// Base URL of the Supabase project without a trailing slash.
    url: String,

    /// Service key authorizing the requests.
    #[debug(skip)]
    key: SecretString,

    /// Names of the [`media::Bucket`]s.
    buckets: Buckets,
}

impl Supabase {
    /// Creates a new [`Supabase`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to build the underlying HTTP client.
    pub fn new(conf: Config) -> Result<Self, Traced<storage::Error>> {
        let Config {
            url,
            key,
            buckets,
            timeout,
        } = conf;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_owned(),
            key,
            buckets,
        })
    }

    /// Returns the name of the provided [`media::Bucket`].
    fn bucket(&self, bucket: media::Bucket) -> &str {
        match bucket {
            media::Bucket::Products => &self.buckets.products,
            media::Bucket::Projects => &self.buckets.projects,
        }
    }

    /// Returns the public [`media::Url`] of the file stored at the provided
    /// [`media::Path`].
    fn public_url(&self, bucket: &str, path: &media::Path) -> media::Url {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.url).into()
    }

    /// Starts an authorized request to the provided storage `endpoint`.
    fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
    ) -> reqwest::RequestBuilder {
        let key = self.key.expose_secret();
        self.client
            .request(method, format!("{}/storage/v1/{endpoint}", self.url))
            .bearer_auth(key)
            .header("apikey", key)
    }

    /// Sends the provided request and ensures it succeeded.
    async fn send(
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Traced<storage::Error>> {
        let response = request
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_owned());
            return Err(tracerr::map_from(tracerr::new!(Error::Api {
                status: status.as_u16(),
                body,
            })));
        }
        Ok(response)
    }
}

impl Storage<Insert<media::Upload>> for Supabase {
    type Ok = media::Image;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(upload): Insert<media::Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        let media::Upload { bucket, path, file } = upload;
        let bucket = self.bucket(bucket);

        drop(
            Self::send(
                self.request(
                    reqwest::Method::POST,
                    &format!("object/{bucket}/{path}"),
                )
                .header(header::CONTENT_TYPE, file.content_type.to_string())
                .header(header::CACHE_CONTROL, "max-age=3600")
                .header("x-upsert", "false")
                .body(file.bytes),
            )
            .await
            .map_err(tracerr::wrap!())?,
        );

        Ok(media::Image {
            url: self.public_url(bucket, &path),
            path,
        })
    }
}

impl Storage<Delete<media::Removal>> for Supabase {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(removal): Delete<media::Removal>,
    ) -> Result<Self::Ok, Self::Err> {
        let media::Removal { bucket, paths } = removal;
        if paths.is_empty() {
            return Ok(());
        }

        let prefixes = paths.iter().map(AsRef::as_ref).collect::<Vec<&str>>();
        Self::send(
            self.request(
                reqwest::Method::DELETE,
                &format!("object/{}", self.bucket(bucket)),
            )
            .json(&serde_json::json!({ "prefixes": prefixes })),
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Entry of a Supabase Storage listing.
#[derive(Debug, Deserialize)]
struct Entry {
    /// Name of the entry inside the listed folder.
    name: String,

    /// ID of the stored object, absent for folders.
    id: Option<String>,

    /// [RFC 3339] date and time when the object was stored.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    created_at: Option<String>,
}

impl Storage<Select<By<Vec<media::Object>, media::Bucket>>> for Supabase {
    type Ok = Vec<media::Object>;
    type Err = Traced<storage::Error>;

    /// Lists all the objects of the [`media::Bucket`], descending into
    /// folders.
    async fn execute(
        &self,
        Select(by): Select<By<Vec<media::Object>, media::Bucket>>,
    ) -> Result<Self::Ok, Self::Err> {
        let bucket = self.bucket(by.into_inner());

        let mut objects = vec![];
        let mut folders = vec![String::new()];
        while let Some(folder) = folders.pop() {
            let mut offset = 0;
            loop {
                let entries = Self::send(
                    self.request(
                        reqwest::Method::POST,
                        &format!("object/list/{bucket}"),
                    )
                    .json(&serde_json::json!({
                        "prefix": folder,
                        "limit": PAGE_SIZE,
                        "offset": offset,
                        "sortBy": { "column": "name", "order": "asc" },
                    })),
                )
                .await
                .map_err(tracerr::wrap!())?
                .json::<Vec<Entry>>()
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?;
                let count = entries.len();

                for Entry {
                    name,
                    id,
                    created_at,
                } in entries
                {
                    let path = if folder.is_empty() {
                        name
                    } else {
                        format!("{folder}/{name}")
                    };
                    if id.is_none() {
                        folders.push(path);
                        continue;
                    }
                    objects.push(media::Object {
                        path: path.into(),
                        created_at: created_at
                            .as_deref()
                            .and_then(|dt| DateTime::from_rfc3339(dt).ok())
                            .map(DateTime::coerce),
                    });
                }

                if count < PAGE_SIZE {
                    break;
                }
                offset += count;
            }
        }
        Ok(objects)
    }
}

/// [`Supabase`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Supabase Storage API responded with a non-success status.
    #[display("Supabase Storage API error ({status}): {body}")]
    #[from(ignore)]
    Api {
        /// HTTP status code of the response.
        status: u16,

        /// Raw body of the response.
        body: String,
    },
}
