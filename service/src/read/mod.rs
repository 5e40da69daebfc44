//! Read entities definitions.

pub mod media;
