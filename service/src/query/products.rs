//! [`Query`] collection related to [`Product`]s.

use common::operations::By;

use crate::domain::{product, Product};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all [`Product`]s, newest first.
pub type List = DatabaseQuery<By<Vec<Product>, ()>>;

/// Queries a [`Product`] by its [`product::Id`].
pub type ById = DatabaseQuery<By<Option<Product>, product::Id>>;
