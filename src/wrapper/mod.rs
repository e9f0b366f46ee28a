//! Document lifecycle and property handling.

mod document;
mod properties;

pub use document::{Attributes, DocumentWrapper};
