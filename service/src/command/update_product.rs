//! [`Command`] for updating an existing [`Product`].

use common::{
    operations::{By, Delete, Insert, Select, Update},
    Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{media, product, Product},
    infra::{database, storage, Database, Storage},
    Service,
};

use super::{create_product::IMAGES_FOLDER, Command};

/// [`Command`] for updating an existing [`Product`].
///
/// All the fields are replaced. The image is replaced only if a new one is
/// provided: the new file is stored first, then the [`Product`] is updated,
/// and only then the previous file is removed.
#[derive(Clone, Debug)]
pub struct UpdateProduct {
    /// ID of the [`Product`] to update.
    pub id: product::Id,

    /// New [`product::Title`] of the [`Product`].
    pub title: product::Title,

    /// New [`product::Description`] of the [`Product`].
    pub description: product::Description,

    /// New [`product::Price`] of the [`Product`].
    pub price: product::Price,

    /// New discount of the [`Product`].
    pub discount: Percent,

    /// New [`media::File`] to replace the image of the [`Product`] with.
    pub image: Option<media::File>,
}

/// Output of [`UpdateProduct`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Updated [`Product`].
    pub product: Product,

    /// [`super::Warning`]s occurred during the update.
    pub warnings: Vec<super::Warning>,
}

impl<Db, St, Pay, Ml> Command<UpdateProduct> for Service<Db, St, Pay, Ml>
where
    Db: Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        > + Database<Update<Product>, Ok = (), Err = Traced<database::Error>>,
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
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateProduct) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProduct {
            id,
            title,
            description,
            price,
            discount,
            image,
        } = cmd;

        let mut product = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotFound(id))
            .map_err(tracerr::wrap!())?;

        let new_image = match image {
            Some(file) => Some(
                self.storage()
                    .execute(Insert(media::Upload {
                        bucket: media::Bucket::Products,
                        path: media::Path::generate(
                            Some(IMAGES_FOLDER),
                            &file.name,
                        ),
                        file,
                    }))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?,
            ),
            None => None,
        };

        let replaced = match new_image.clone() {
            Some(new) => product.image.replace(new),
            None => None,
        };
        product.title = title;
        product.description = description;
        product.price = price;
        product.discount = discount;
        product.updated_at = Some(product::ModificationDateTime::now());

        if let Err(e) = self.database().execute(Update(product.clone())).await
        {
            if let Some(new) = new_image {
                log::error!(
                    "failed to update `Product(id: {id})` after storing its \
                     new image: {e}",
                );
                drop(
                    self.remove_media(media::Removal {
                        bucket: media::Bucket::Products,
                        paths: vec![new.path],
                    })
                    .await,
                );
            }
            return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
        }

        let warnings = match replaced {
            Some(old) => self
                .remove_media(media::Removal {
                    bucket: media::Bucket::Products,
                    paths: vec![old.path],
                })
                .await
                .into_iter()
                .collect(),
            None => vec![],
        };

        Ok(Output { product, warnings })
    }
}

/// Error of [`UpdateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// [`Product`] with the provided ID doesn't exist.
    #[display("`Product(id: {_0})` doesn't exist")]
    #[from(ignore)]
    NotFound(#[error(not(source))] product::Id),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use bytes::Bytes;
    use common::{operations::Insert, Percent};

    use crate::{
        command::Command as _,
        domain::{media, product},
        infra::{memory::Faults, Database as _, Storage as _},
        spec::{new_product, service},
    };

    use super::{ExecutionError, UpdateProduct};

    fn command(id: product::Id, image: Option<media::File>) -> UpdateProduct {
        UpdateProduct {
            id,
            title: product::Title::new("Gerüst B").unwrap(),
            description: product::Description::new("Updated").unwrap(),
            price: product::Price::from_str("100.00").unwrap(),
            discount: Percent::from_str("10").unwrap(),
            image,
        }
    }

    fn file(name: &str) -> media::File {
        media::File {
            name: media::FileName::sanitize(name),
            content_type: media::ContentType::image("image/jpeg").unwrap(),
            bytes: Bytes::from_static(b"jpeg"),
        }
    }

    #[tokio::test]
    async fn replaces_image_and_removes_previous_file() {
        let (svc, memory) = service();
        let old = svc
            .storage()
            .execute(Insert(media::Upload {
                bucket: media::Bucket::Products,
                path: media::Path::generate(Some("products"), &file("a").name),
                file: file("a.jpg"),
            }))
            .await
            .unwrap();
        let mut existing = new_product("Gerüst A");
        existing.image = Some(old.clone());
        svc.database().execute(Insert(existing.clone())).await.unwrap();

        let output = svc
            .execute(command(existing.id, Some(file("b.jpg"))))
            .await
            .unwrap();

        let new = output.product.image.clone().unwrap();
        assert_ne!(new.path, old.path);
        assert!(output.warnings.is_empty());
        assert!(output.product.updated_at.is_some());
        assert_eq!(output.product.effective_price().to_string(), "90.00");
        assert_eq!(
            memory.object_paths(media::Bucket::Products).await,
            [new.path],
        );
    }

    #[tokio::test]
    async fn keeps_image_when_none_provided() {
        let (svc, _) = service();
        let mut existing = new_product("Gerüst A");
        existing.image = Some(media::Image {
            url: "memory://products/a.jpg".to_owned().into(),
            path: "products/a.jpg".to_owned().into(),
        });
        svc.database().execute(Insert(existing.clone())).await.unwrap();

        let output = svc.execute(command(existing.id, None)).await.unwrap();

        assert_eq!(output.product.image, existing.image);
        assert_eq!(output.product.title.to_string(), "Gerüst B");
    }

    #[tokio::test]
    async fn failed_removal_of_previous_file_is_a_warning() {
        let (svc, memory) = service();
        let mut existing = new_product("Gerüst A");
        existing.image = Some(media::Image {
            url: "memory://products/a.jpg".to_owned().into(),
            path: "products/a.jpg".to_owned().into(),
        });
        svc.database().execute(Insert(existing.clone())).await.unwrap();
        memory
            .inject(Faults {
                removals: true,
                ..Faults::default()
            })
            .await;

        let output = svc
            .execute(command(existing.id, Some(file("b.jpg"))))
            .await
            .unwrap();

        assert_eq!(output.warnings.len(), 1);
    }

    #[tokio::test]
    async fn fails_on_unknown_product() {
        let (svc, _) = service();

        let err = svc
            .execute(command(product::Id::new(), None))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotFound(_)));
    }
}
