//! [`Command`] for deleting a [`Project`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{media, project, Project},
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{Command, Warning};

/// [`Command`] for deleting a [`Project`] along with all its images.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProject {
    /// ID of the [`Project`] to delete.
    pub id: project::Id,
}

impl<Db, St, Pay, Ml> Command<DeleteProject> for Service<Db, St, Pay, Ml>
where
    Db: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Project, project::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    St: Storage<Delete<media::Removal>, Ok = (), Err = Traced<storage::Error>>,
{
    /// [`Warning`]s about the stored images left behind, if any.
    type Ok = Vec<Warning>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteProject) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProject { id } = cmd;

        let project = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotFound(id))
            .map_err(tracerr::wrap!())?;

        let warnings = self
            .remove_media(media::Removal {
                bucket: media::Bucket::Projects,
                paths: project.images.into_iter().map(|i| i.media.path).collect(),
            })
            .await
            .into_iter()
            .collect();

        self.database()
            .execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(warnings)
    }
}

/// Error of [`DeleteProject`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Project`] with the provided ID doesn't exist.
    #[display("`Project(id: {_0})` doesn't exist")]
    #[from(ignore)]
    NotFound(#[error(not(source))] project::Id),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use bytes::Bytes;
    use common::{
        operations::{By, Select},
        Date,
    };

    use crate::{
        command::{Command as _, CreateProject},
        domain::{media, project, Project},
        infra::{memory::Faults, Database as _},
        spec::service,
    };

    use super::{DeleteProject, ExecutionError};

    fn create(images: usize) -> CreateProject {
        CreateProject {
            title: project::Title::new("Fassade Bern").unwrap(),
            description: project::Description::new("Facade scaffold").unwrap(),
            location: project::Location::new("Bern").unwrap(),
            completed_date: Date::from_str("2023-09-14").unwrap(),
            client: None,
            category: None,
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
    async fn removes_record_and_all_images() {
        let (svc, memory) = service();
        let project = svc.execute(create(2)).await.unwrap();

        let warnings = svc.execute(DeleteProject { id: project.id }).await;

        assert!(warnings.unwrap().is_empty());
        assert!(memory.object_paths(media::Bucket::Projects).await.is_empty());
        let stored: Option<Project> = svc
            .database()
            .execute(Select(By::new(project.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn deletes_record_even_if_file_removal_fails() {
        let (svc, memory) = service();
        let project = svc.execute(create(2)).await.unwrap();
        memory
            .inject(Faults {
                removals: true,
                ..Faults::default()
            })
            .await;

        let warnings =
            svc.execute(DeleteProject { id: project.id }).await.unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(memory.object_paths(media::Bucket::Projects).await.len(), 2);
        let stored: Option<Project> = svc
            .database()
            .execute(Select(By::new(project.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn fails_on_unknown_project() {
        let (svc, _) = service();

        let err = svc
            .execute(DeleteProject {
                id: project::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotFound(_)));
    }
}
