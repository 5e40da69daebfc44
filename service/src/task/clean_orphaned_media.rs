//! [`CleanOrphanedMedia`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Select, Start};
use derive_more::{Display, Error as StdError, From};
use smart_default::SmartDefault;
use strum::IntoEnumIterator as _;
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::media,
    infra::{database, storage, Database, Storage},
    read, Service,
};

use super::Task;

/// Configuration for [`CleanOrphanedMedia`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Interval between orphaned files cleanings.
    #[default(time::Duration::from_secs(60 * 60))]
    pub interval: time::Duration,

    /// Age a stored file must reach before being considered orphaned.
    ///
    /// Files are uploaded before the records referencing them are written,
    /// so younger files may still be adopted.
    #[default(time::Duration::from_secs(60 * 60))]
    pub grace: time::Duration,
}

/// [`Task`] removing stored files not referenced by any catalog record.
#[derive(Clone, Copy, Debug)]
pub struct CleanOrphanedMedia<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<S> CleanOrphanedMedia<S> {
    /// Name of this [`Task`] used in logs.
    pub const NAME: &'static str = "task::CleanOrphanedMedia";

    /// Creates a new [`CleanOrphanedMedia`] [`Task`] of the provided
    /// `service`.
    #[must_use]
    pub fn new(config: Config, service: S) -> Self {
        Self { config, service }
    }
}

impl<Db, St, Pay, Ml> Task<Start<By<CleanOrphanedMedia<Self>, Config>>>
    for Service<Db, St, Pay, Ml>
where
    CleanOrphanedMedia<Self>:
        Task<Perform<()>, Ok = usize, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanOrphanedMedia<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        const NAME: &str = CleanOrphanedMedia::<()>::NAME;

        let task = CleanOrphanedMedia::new(by.into_inner(), self.clone());

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => log::debug!("`{NAME}`: nothing to remove"),
                Ok(n) => log::info!("`{NAME}`: removed {n} files"),
                Err(e) => log::error!("`{NAME}` failed: {e}"),
            }
        }
    }
}

impl<Db, St, Pay, Ml> Task<Perform<()>>
    for CleanOrphanedMedia<Service<Db, St, Pay, Ml>>
where
    Db: Database<
        Select<By<read::media::ReferencedPaths, media::Bucket>>,
        Ok = read::media::ReferencedPaths,
        Err = Traced<database::Error>,
    >,
    St: Storage<
            Select<By<Vec<media::Object>, media::Bucket>>,
            Ok = Vec<media::Object>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<media::Removal>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    /// Number of removed files.
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let deadline = media::CreationDateTime::now() - self.config.grace;

        let mut removed = 0;
        for bucket in media::Bucket::iter() {
            // Listing goes first, so files uploaded afterwards are never seen.
            let objects = self
                .service
                .storage()
                .execute(Select(By::new(bucket)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            let referenced = self
                .service
                .database()
                .execute(Select(By::new(bucket)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let orphans = objects
                .into_iter()
                .filter(|o| o.created_at.is_some_and(|at| at <= deadline))
                .filter(|o| !referenced.contains(&o.path))
                .map(|o| o.path)
                .collect::<Vec<_>>();
            if orphans.is_empty() {
                continue;
            }

            log::warn!(
                "removing {} orphaned files from `{bucket}` bucket",
                orphans.len(),
            );
            let count = orphans.len();
            self.service
                .storage()
                .execute(Delete(media::Removal {
                    bucket,
                    paths: orphans,
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            removed += count;
        }
        Ok(removed)
    }
}

/// Error of [`CleanOrphanedMedia`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{Insert, Perform};

    use crate::{
        domain::media::{self, Bucket},
        infra::Database as _,
        spec::{new_product, service},
        Task as _,
    };

    use super::{CleanOrphanedMedia, Config};

    #[tokio::test]
    async fn removes_only_old_unreferenced_files() {
        let (svc, memory) = service();
        let task = CleanOrphanedMedia::new(
            Config {
                interval: Duration::from_secs(60),
                grace: Duration::from_secs(60 * 60),
            },
            svc.clone(),
        );

        let old = media::CreationDateTime::now() - Duration::from_secs(7200);
        let orphan = media::Path::from("products/orphan.png".to_owned());
        let fresh = media::Path::from("products/fresh.png".to_owned());
        let used = media::Path::from("products/used.png".to_owned());
        let unknown = media::Path::from("products/unknown.png".to_owned());
        memory.put_object(Bucket::Products, orphan.clone(), old).await;
        memory
            .put_object(
                Bucket::Products,
                fresh.clone(),
                media::CreationDateTime::now(),
            )
            .await;
        memory.put_object(Bucket::Products, used.clone(), old).await;
        memory.put_object(Bucket::Projects, unknown.clone(), old).await;

        let mut referencing = new_product("Used");
        referencing.image = Some(media::Image {
            url: "memory://products/used.png".to_owned().into(),
            path: used.clone(),
        });
        svc.database().execute(Insert(referencing)).await.unwrap();

        assert_eq!(task.execute(Perform(())).await.unwrap(), 2);

        let mut left = memory.object_paths(Bucket::Products).await;
        left.sort();
        assert_eq!(left, [fresh, used]);
        assert!(memory.object_paths(Bucket::Projects).await.is_empty());

        assert_eq!(task.execute(Perform(())).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_storage_is_noop() {
        let (svc, _) = service();
        let task = CleanOrphanedMedia::new(Config::default(), svc);

        assert_eq!(task.execute(Perform(())).await.unwrap(), 0);
    }
}
