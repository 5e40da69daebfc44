//! [`Command`] for creating a new [`Project`].

use common::{
    operations::{Delete, Insert},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{media, project, Project},
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Project`] with its images.
#[derive(Clone, Debug)]
pub struct CreateProject {
    /// [`project::Title`] of a new [`Project`].
    pub title: project::Title,

    /// [`project::Description`] of a new [`Project`].
    pub description: project::Description,

    /// [`project::Location`] of a new [`Project`].
    pub location: project::Location,

    /// [`Date`] when a new [`Project`] was completed.
    pub completed_date: Date,

    /// [`project::Client`] of a new [`Project`].
    pub client: Option<project::Client>,

    /// [`project::Category`] of a new [`Project`].
    pub category: Option<project::Category>,

    /// [`project::Duration`] of a new [`Project`].
    pub duration: Option<project::Duration>,

    /// [`media::File`]s to be stored as images of a new [`Project`], in the
    /// order they should be shown.
    pub images: Vec<media::File>,
}

impl<Db, St, Pay, Ml> Command<CreateProject> for Service<Db, St, Pay, Ml>
where
    Db: Database<Insert<Project>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<project::Image>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    St: Storage<
            Insert<media::Upload>,
            Ok = media::Image,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<media::Removal>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Project;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateProject) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProject {
            title,
            description,
            location,
            completed_date,
            client,
            category,
            duration,
            images,
        } = cmd;

        if images.len() > Project::MAX_IMAGES {
            return Err(tracerr::new!(E::TooManyImages(images.len())));
        }

        let mut project = Project {
            id: project::Id::new(),
            title,
            description,
            location,
            completed_date,
            client,
            category,
            duration,
            images: Vec::with_capacity(images.len()),
            created_at: project::CreationDateTime::now(),
        };
        self.database()
            .execute(Insert(project.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let folder = project.id.to_string();
        let total = images.len();
        for (n, file) in images.into_iter().enumerate() {
            let media = self
                .storage()
                .execute(Insert(media::Upload {
                    bucket: media::Bucket::Projects,
                    path: media::Path::generate(Some(&folder), &file.name),
                    file,
                }))
                .await
                .map_err(|e| {
                    log::error!(
                        "failed to store image {}/{total} of `Project(id: {})`, \
                         {n} image(s) kept: {e}",
                        n + 1,
                        project.id,
                    );
                    e
                })
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let image = project::Image {
                id: project::ImageId::new(),
                project_id: project.id,
                media,
                created_at: project::ImageCreationDateTime::now(),
            };
            if let Err(e) =
                self.database().execute(Insert(image.clone())).await
            {
                log::error!(
                    "failed to insert image {}/{total} of `Project(id: {})`, \
                     {n} image(s) kept: {e}",
                    n + 1,
                    project.id,
                );
                drop(
                    self.remove_media(media::Removal {
                        bucket: media::Bucket::Projects,
                        paths: vec![image.media.path],
                    })
                    .await,
                );
                return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
            }
            project.images.push(image);
        }

        Ok(project)
    }
}

/// Error of [`CreateProject`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// More than [`Project::MAX_IMAGES`] images provided.
    #[display(
        "`Project` may have at most {} images, {_0} provided",
        Project::MAX_IMAGES
    )]
    #[from(ignore)]
    TooManyImages(#[error(not(source))] usize),
}

#[cfg(test)]
mod spec {
    use std::{collections::HashSet, str::FromStr as _};

    use bytes::Bytes;
    use common::{
        operations::{By, Select},
        Date,
    };

    use crate::{
        command::Command as _,
        domain::{media, project, Project},
        infra::{memory::Faults, Database as _},
        spec::service,
    };

    use super::{CreateProject, ExecutionError};

    fn command(images: usize) -> CreateProject {
        CreateProject {
            title: project::Title::new("Fassade Zürich").unwrap(),
            description: project::Description::new("Facade scaffold").unwrap(),
            location: project::Location::new("Zürich").unwrap(),
            completed_date: Date::from_str("2024-05-07").unwrap(),
            client: None,
            category: project::Category::new("Fassade"),
            duration: None,
            images: (0..images)
                .map(|n| media::File {
                    name: media::FileName::sanitize(&format!("{n}.jpg")),
                    content_type: media::ContentType::image("image/jpeg")
                        .unwrap(),
                    bytes: Bytes::from(format!("jpg {n}")),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn stores_images_under_distinct_paths() {
        let (svc, memory) = service();

        let project = svc.execute(command(3)).await.unwrap();

        assert_eq!(project.images.len(), 3);
        let paths = project
            .images
            .iter()
            .map(|i| i.media.path.clone())
            .collect::<HashSet<_>>();
        assert_eq!(paths.len(), 3);
        let folder = project.id.to_string();
        assert!(paths.iter().all(|p| p.folder() == Some(folder.as_str())));
        assert_eq!(memory.object_paths(media::Bucket::Projects).await.len(), 3);

        let stored: Option<Project> = svc
            .database()
            .execute(Select(By::new(project.id)))
            .await
            .unwrap();
        let stored = stored.unwrap();
        assert_eq!(
            stored.images.iter().map(|i| &i.media).collect::<Vec<_>>(),
            project.images.iter().map(|i| &i.media).collect::<Vec<_>>(),
        );
    }

    #[tokio::test]
    async fn rejects_too_many_images_before_upload() {
        let (svc, memory) = service();

        let err = svc.execute(command(11)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::TooManyImages(11)));
        assert!(memory.object_paths(media::Bucket::Projects).await.is_empty());
        let projects: Vec<Project> =
            svc.database().execute(Select(By::<Vec<Project>, _>::new(()))).await.unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn keeps_earlier_images_on_mid_sequence_failure() {
        let (svc, memory) = service();
        memory
            .inject(Faults {
                uploads_left: Some(1),
                ..Faults::default()
            })
            .await;

        let err = svc.execute(command(3)).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Storage(_)));
        let projects: Vec<Project> =
            svc.database().execute(Select(By::<Vec<Project>, _>::new(()))).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].images.len(), 1);
    }
}
