//! [`Product`]-related HTTP API.

use axum::{
    extract::{rejection::PathRejection, Multipart, Path},
    Extension, Json,
};
use common::Percent;
use rust_decimal::Decimal;
use serde::Serialize;
use service::{
    command::{self, Command as _},
    domain::{self, product},
    query::{self, Query as _},
};

use crate::{
    api::{
        form::{Form, ValidationError},
        Deleted,
    },
    define_error, AsError, Context, Error,
};

/// Name of the multipart field carrying a [`Product`] image.
const IMAGE_FIELD: &str = "image";

/// [`domain::Product`] as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// ID of this [`Product`].
    pub id: product::Id,

    /// Title of this [`Product`].
    pub title: String,

    /// Description of this [`Product`].
    pub description: String,

    /// Price of this [`Product`] before the discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Discount of this [`Product`] in percents.
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,

    /// Price of this [`Product`] after the discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_price: Decimal,

    /// Public URL of this [`Product`] image.
    pub image: Option<String>,

    /// Storage path of this [`Product`] image.
    pub image_path: Option<String>,

    /// [RFC 3339] date and time when this [`Product`] was created.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] date and time when this [`Product`] was updated.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub updated_at: Option<String>,
}

impl From<domain::Product> for Product {
    fn from(product: domain::Product) -> Self {
        let effective_price = product.effective_price().amount();
        let domain::Product {
            id,
            title,
            description,
            price,
            discount,
            image,
            created_at,
            updated_at,
        } = product;
        let (image, image_path) = image
            .map(|i| (i.url.into(), i.path.into()))
            .unzip();

        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            price: price.amount(),
            discount: discount.value(),
            effective_price,
            image,
            image_path,
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Response to a [`Product`] creation or update.
#[derive(Debug, Serialize)]
pub struct Saved {
    /// Always `true`.
    pub success: bool,

    /// Saved [`Product`].
    pub product: Product,

    /// Non-fatal problems occurred while saving.
    pub warnings: Vec<String>,
}

/// Fields of a [`Product`] submitted in a multipart form.
struct Fields {
    title: product::Title,
    description: product::Description,
    price: product::Price,
    discount: Percent,
    image: Option<domain::media::File>,
}

impl Fields {
    /// Parses [`Fields`] out of the provided multipart [`Form`].
    fn parse(mut form: Form) -> Result<Self, Error> {
        let image = form.take_file(IMAGE_FIELD)?;
        form.ensure_files_taken()?;

        Ok(Self {
            title: form.required("title", ValidationError::InvalidField)?,
            description: form
                .required("description", ValidationError::InvalidField)?,
            price: form.required("price", ValidationError::InvalidPrice)?,
            discount: form
                .optional("discount", ValidationError::InvalidDiscount)?
                .unwrap_or_default(),
            image,
        })
    }
}

/// Lists all [`Product`]s, newest first.
///
/// # Errors
///
/// If the catalog cannot be read.
#[tracing::instrument(skip_all, fields(http.handler = "listProducts"))]
pub async fn list(
    Extension(ctx): Extension<Context>,
) -> Result<Json<Vec<Product>>, Error> {
    let products = ctx
        .service()
        .execute(query::products::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Creates a new [`Product`] out of the submitted multipart form.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELD` - `title`, `description` or `price` is absent;
/// - `INVALID_PRICE`, `INVALID_DISCOUNT`, `VALIDATION_ERROR` - field value is
///   invalid;
/// - `INVALID_IMAGE`, `IMAGE_TOO_LARGE` - image is not acceptable;
/// - `VALIDATION_ERROR` - more than one image, or a file in another field;
/// - `UPSTREAM_ERROR` - image cannot be stored.
#[tracing::instrument(skip_all, fields(http.handler = "createProduct"))]
pub async fn create(
    Extension(ctx): Extension<Context>,
    multipart: Multipart,
) -> Result<Json<Saved>, Error> {
    let form = Form::read(multipart, ctx.settings().max_file_size).await?;
    let Fields {
        title,
        description,
        price,
        discount,
        image,
    } = Fields::parse(form)?;

    let product = ctx
        .service()
        .execute(command::CreateProduct {
            title,
            description,
            price,
            discount,
            image,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Saved {
        success: true,
        product: product.into(),
        warnings: vec![],
    }))
}

/// Updates the [`Product`] with the provided ID out of the submitted
/// multipart form.
///
/// # Errors
///
/// Same as [`create()`], plus:
/// - `PRODUCT_NOT_FOUND` - [`Product`] doesn't exist.
#[tracing::instrument(skip_all, fields(http.handler = "updateProduct", id))]
pub async fn update(
    Extension(ctx): Extension<Context>,
    id: Result<Path<product::Id>, PathRejection>,
    multipart: Multipart,
) -> Result<Json<Saved>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("id", tracing::field::display(id));

    let form = Form::read(multipart, ctx.settings().max_file_size).await?;
    let Fields {
        title,
        description,
        price,
        discount,
        image,
    } = Fields::parse(form)?;

    let command::update_product::Output { product, warnings } = ctx
        .service()
        .execute(command::UpdateProduct {
            id,
            title,
            description,
            price,
            discount,
            image,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Saved {
        success: true,
        product: product.into(),
        warnings: warnings.into_iter().map(|w| w.to_string()).collect(),
    }))
}

/// Deletes the [`Product`] with the provided ID along with its image.
///
/// # Errors
///
/// Possible error codes:
/// - `PRODUCT_NOT_FOUND` - [`Product`] doesn't exist.
#[tracing::instrument(skip_all, fields(http.handler = "deleteProduct", id))]
pub async fn delete(
    Extension(ctx): Extension<Context>,
    id: Result<Path<product::Id>, PathRejection>,
) -> Result<Json<Deleted>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("id", tracing::field::display(id));

    let warnings = ctx
        .service()
        .execute(command::DeleteProduct { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Deleted::with(warnings)))
}

impl AsError for command::create_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
            Self::NotFound(_) => Some(ProductError::NotFound.into()),
        }
    }
}

impl AsError for command::delete_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotFound(_) => Some(ProductError::NotFound.into()),
        }
    }
}

define_error! {
    enum ProductError {
        #[code = "PRODUCT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Product` doesn't exist"]
        NotFound,
    }
}
