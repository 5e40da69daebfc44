//! [`Command`] for deleting a [`Product`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{media, product, Product},
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{Command, Warning};

/// [`Command`] for deleting a [`Product`] along with its stored image.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteProduct {
    /// ID of the [`Product`] to delete.
    pub id: product::Id,
}

impl<Db, St, Pay, Ml> Command<DeleteProduct> for Service<Db, St, Pay, Ml>
where
    Db: Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Product, product::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    St: Storage<Delete<media::Removal>, Ok = (), Err = Traced<storage::Error>>,
{
    /// [`Warning`]s about the stored image left behind, if any.
    type Ok = Vec<Warning>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteProduct) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProduct { id } = cmd;

        let product = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotFound(id))
            .map_err(tracerr::wrap!())?;

        let warnings = match product.image {
            Some(image) => self
                .remove_media(media::Removal {
                    bucket: media::Bucket::Products,
                    paths: vec![image.path],
                })
                .await
                .into_iter()
                .collect(),
            None => vec![],
        };

        self.database()
            .execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(warnings)
    }
}

/// Error of [`DeleteProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Product`] with the provided ID doesn't exist.
    #[display("`Product(id: {_0})` doesn't exist")]
    #[from(ignore)]
    NotFound(#[error(not(source))] product::Id),
}

#[cfg(test)]
mod spec {
    use bytes::Bytes;
    use common::operations::{By, Insert, Select};

    use crate::{
        command::Command as _,
        domain::{media, product, Product},
        infra::{memory::Faults, Database as _, Storage as _},
        spec::{new_product, service},
    };

    use super::{DeleteProduct, ExecutionError};

    async fn listed(
        svc: &crate::Service<
            crate::infra::Memory,
            crate::infra::Memory,
            crate::infra::Memory,
            crate::infra::Memory,
        >,
    ) -> Vec<product::Id> {
        let products: Vec<Product> =
            svc.database().execute(Select(By::<Vec<Product>, _>::new(()))).await.unwrap();
        products.into_iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn removes_record_and_stored_image() {
        let (svc, memory) = service();
        let image = svc
            .storage()
            .execute(Insert(media::Upload {
                bucket: media::Bucket::Products,
                path: "products/a.png".to_owned().into(),
                file: media::File {
                    name: media::FileName::sanitize("a.png"),
                    content_type: media::ContentType::image("image/png")
                        .unwrap(),
                    bytes: Bytes::from_static(b"png"),
                },
            }))
            .await
            .unwrap();
        let mut product = new_product("Gerüst A");
        product.image = Some(image.clone());
        svc.database().execute(Insert(product.clone())).await.unwrap();

        let warnings = svc.execute(DeleteProduct { id: product.id }).await;

        assert!(warnings.unwrap().is_empty());
        assert_eq!(memory.object(media::Bucket::Products, &image.path).await, None);
        assert!(!listed(&svc).await.contains(&product.id));
    }

    #[tokio::test]
    async fn deletes_record_even_if_file_removal_fails() {
        let (svc, memory) = service();
        let mut product = new_product("Gerüst A");
        product.image = Some(media::Image {
            url: "memory://products/a.png".to_owned().into(),
            path: "products/a.png".to_owned().into(),
        });
        svc.database().execute(Insert(product.clone())).await.unwrap();
        memory
            .inject(Faults {
                removals: true,
                ..Faults::default()
            })
            .await;

        let warnings =
            svc.execute(DeleteProduct { id: product.id }).await.unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(listed(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn fails_on_unknown_product() {
        let (svc, _) = service();

        let err = svc
            .execute(DeleteProduct {
                id: product::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotFound(_)));
    }
}
