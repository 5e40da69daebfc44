//! [`Command`] for creating a new [`Product`].

use common::{
    operations::{Delete, Insert},
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

use super::Command;

/// Folder [`Product`] images are stored in.
pub(crate) const IMAGES_FOLDER: &str = "products";

/// [`Command`] for creating a new [`Product`].
#[derive(Clone, Debug)]
pub struct CreateProduct {
    /// [`product::Title`] of a new [`Product`].
    pub title: product::Title,

    /// [`product::Description`] of a new [`Product`].
    pub description: product::Description,

    /// [`product::Price`] of a new [`Product`].
    pub price: product::Price,

    /// Discount of a new [`Product`].
    pub discount: Percent,

    /// [`media::File`] to be stored as the image of a new [`Product`].
    pub image: Option<media::File>,
}

impl<Db, St, Pay, Ml> Command<CreateProduct> for Service<Db, St, Pay, Ml>
where
    Db: Database<Insert<Product>, Ok = (), Err = Traced<database::Error>>,
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
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateProduct) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProduct {
            title,
            description,
            price,
            discount,
            image,
        } = cmd;

        let image = match image {
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

        let product = Product {
            id: product::Id::new(),
            title,
            description,
            price,
            discount,
            image,
            created_at: product::CreationDateTime::now(),
            updated_at: None,
        };

        if let Err(e) = self.database().execute(Insert(product.clone())).await
        {
            log::error!(
                "failed to insert `Product(id: {})` after storing its image: \
                 {e}",
                product.id,
            );
            if let Some(image) = product.image {
                drop(
                    self.remove_media(media::Removal {
                        bucket: media::Bucket::Products,
                        paths: vec![image.path],
                    })
                    .await,
                );
            }
            return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
        }

        Ok(product)
    }
}

/// Error of [`CreateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}
