//! [`media`]-related read definitions.

use std::collections::HashSet;

use derive_more::{Deref, Into};

use crate::domain::media;

/// Set of [`media::Path`]s referenced by catalog records in some
/// [`media::Bucket`].
#[derive(Clone, Debug, Default, Deref, Eq, Into, PartialEq)]
pub struct ReferencedPaths(pub HashSet<media::Path>);
