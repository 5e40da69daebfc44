//! Background [`Task`]s definitions.

mod background;
pub mod clean_orphaned_media;

pub use common::Handler as Task;

pub use self::{
    background::{Background, Failure},
    clean_orphaned_media::CleanOrphanedMedia,
};
