//! Domain definitions.

pub mod admin;
pub mod contact;
pub mod media;
pub mod payment;
pub mod product;
pub mod project;

pub use self::{
    payment::{CheckoutSession, PaymentIntent},
    product::Product,
    project::Project,
};
