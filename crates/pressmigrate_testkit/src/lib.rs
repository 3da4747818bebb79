//! # pressmigrate Testkit
//!
//! Test utilities for pressmigrate.
//!
//! This crate provides:
//! - A builder for exported content records
//! - Canned authors, terms, fields and record sets
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use pressmigrate_testkit::prelude::*;
//!
//! let record = RecordBuilder::new(7)
//!     .title("Hello")
//!     .author(author_jane())
//!     .term("category", term("News"))
//!     .build();
//! assert_eq!(record.slug, "post-7");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use builder::*;
pub use fixtures::*;
pub use generators::*;
