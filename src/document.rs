//! Document model.
//!
//! Documents are ordered collections of field values. The same type is
//! returned by select-like queries and sent by update queries, where it may
//! additionally carry atomic-update modifiers, a `_version_` for optimistic
//! concurrency and anonymous child documents.
//!
//! # Examples
//!
//! ```
//! use solrium::document::{Document, Modifier};
//!
//! let doc = Document::builder()
//!     .field("id", "book-1")
//!     .add("cat", "fiction")
//!     .add("cat", "classics")
//!     .update("popularity", Modifier::Inc, 10)
//!     .build();
//!
//! assert_eq!(doc.len(), 3);
//! assert_eq!(doc.field_modifier("popularity"), Some(Modifier::Inc));
//! ```
//!
//! The [`converter`] module reads documents from JSON and JSON Lines files.

pub mod converter;
#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

pub use document::{
    Document, DocumentBuilder, Modifier, VERSION_DONT_CARE, VERSION_MUST_EXIST,
    VERSION_MUST_NOT_EXIST,
};
pub use field_value::FieldValue;
