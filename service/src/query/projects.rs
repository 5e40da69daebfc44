//! [`Query`] collection related to [`Project`]s.

use common::operations::By;

use crate::domain::Project;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all [`Project`]s with their images, most recently completed
/// first.
pub type List = DatabaseQuery<By<Vec<Project>, ()>>;
