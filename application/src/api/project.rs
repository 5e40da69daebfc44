//! [`Project`]-related HTTP API.

use axum::{
    extract::{rejection::PathRejection, Multipart, Path},
    Extension, Json,
};
use serde::Serialize;
use service::{
    command::{self, Command as _},
    domain::{self, project},
    query::{self, Query as _},
};

use crate::{
    api::{
        form::{Form, ValidationError},
        Deleted,
    },
    define_error, AsError, Context, Error,
};

/// Name of the multipart field carrying [`Project`] images.
const IMAGES_FIELD: &str = "images";

/// [`domain::Project`] as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// ID of this [`Project`].
    pub id: project::Id,

    /// Title of this [`Project`].
    pub title: String,

    /// Description of this [`Project`].
    pub description: String,

    /// Location of this [`Project`].
    pub location: String,

    /// Completion date of this [`Project`] in `YYYY-MM-DD` format.
    pub completed_date: String,

    /// Client of this [`Project`].
    pub client: Option<String>,

    /// Category of this [`Project`].
    pub category: Option<String>,

    /// Duration of this [`Project`].
    pub duration: Option<String>,

    /// [`Image`]s of this [`Project`] in upload order.
    pub images: Vec<Image>,

    /// [RFC 3339] date and time when this [`Project`] was created.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

/// Image of a [`Project`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// ID of this [`Image`].
    pub id: String,

    /// Public URL of this [`Image`].
    pub image_url: String,

    /// Storage path of this [`Image`].
    pub image_path: String,

    /// [RFC 3339] date and time when this [`Image`] was uploaded.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<domain::Project> for Project {
    fn from(project: domain::Project) -> Self {
        let domain::Project {
            id,
            title,
            description,
            location,
            completed_date,
            client,
            category,
            duration,
            images,
            created_at,
        } = project;

        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            completed_date: completed_date.to_string(),
            client: client.map(|c| c.to_string()),
            category: category.map(|c| c.to_string()),
            duration: duration.map(|d| d.to_string()),
            images: images
                .into_iter()
                .map(|i| Image {
                    id: i.id.to_string(),
                    image_url: i.media.url.into(),
                    image_path: i.media.path.into(),
                    created_at: i.created_at.to_rfc3339(),
                })
                .collect(),
            created_at: created_at.to_rfc3339(),
        }
    }
}

/// Response to a [`Project`] creation.
#[derive(Debug, Serialize)]
pub struct Created {
    /// Always `true`.
    pub success: bool,

    /// Created [`Project`].
    pub project: Project,
}

/// Lists all [`Project`]s with their images, most recently completed first.
///
/// # Errors
///
/// If the portfolio cannot be read.
#[tracing::instrument(skip_all, fields(http.handler = "listProjects"))]
pub async fn list(
    Extension(ctx): Extension<Context>,
) -> Result<Json<Vec<Project>>, Error> {
    let projects = ctx
        .service()
        .execute(query::projects::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// Creates a new [`Project`] out of the submitted multipart form.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELD` - `title`, `description`, `location` or
///   `completedDate` is absent;
/// - `INVALID_DATE`, `VALIDATION_ERROR` - field value is invalid;
/// - `TOO_MANY_IMAGES` - more than 10 images submitted;
/// - `INVALID_IMAGE`, `IMAGE_TOO_LARGE` - image is not acceptable;
/// - `VALIDATION_ERROR` - file sent in a field other than `images`;
/// - `UPSTREAM_ERROR` - image cannot be stored.
#[tracing::instrument(skip_all, fields(http.handler = "createProject"))]
pub async fn create(
    Extension(ctx): Extension<Context>,
    multipart: Multipart,
) -> Result<Json<Created>, Error> {
    use ValidationError as V;

    let mut form = Form::read(multipart, ctx.settings().max_file_size).await?;
    let images = form.take_files(IMAGES_FIELD);
    form.ensure_files_taken()?;

    let project = ctx
        .service()
        .execute(command::CreateProject {
            title: form.required("title", V::InvalidField)?,
            description: form.required("description", V::InvalidField)?,
            location: form.required("location", V::InvalidField)?,
            completed_date: form.required("completedDate", V::InvalidDate)?,
            client: form.optional("client", V::InvalidField)?,
            category: form.optional("category", V::InvalidField)?,
            duration: form.optional("duration", V::InvalidField)?,
            images,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Created {
        success: true,
        project: project.into(),
    }))
}

/// Deletes the [`Project`] with the provided ID along with all its images.
///
/// # Errors
///
/// Possible error codes:
/// - `PROJECT_NOT_FOUND` - [`Project`] doesn't exist.
#[tracing::instrument(skip_all, fields(http.handler = "deleteProject", id))]
pub async fn delete(
    Extension(ctx): Extension<Context>,
    id: Result<Path<project::Id>, PathRejection>,
) -> Result<Json<Deleted>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;
    _ = tracing::Span::current().record("id", tracing::field::display(id));

    let warnings = ctx
        .service()
        .execute(command::DeleteProject { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Deleted::with(warnings)))
}

impl AsError for command::create_project::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Storage(e) => e.try_as_error(),
            Self::TooManyImages(_) => Some(
                Error::from(ProjectError::TooManyImages)
                    .with_message(self.to_string()),
            ),
        }
    }
}

impl AsError for command::delete_project::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotFound(_) => Some(ProjectError::NotFound.into()),
        }
    }
}

define_error! {
    enum ProjectError {
        #[code = "PROJECT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Project` doesn't exist"]
        NotFound,

        #[code = "TOO_MANY_IMAGES"]
        #[status = BAD_REQUEST]
        #[message = "Too many images"]
        TooManyImages,
    }
}
