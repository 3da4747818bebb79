//! # pressmigrate Server
//!
//! Content export endpoint for pressmigrate.
//!
//! This crate provides:
//! - `GET /posts`: one cursor page of records, ascending by id
//! - `GET /post-types`: the importable content types
//! - Bearer token authentication with constant-time comparison
//! - `no-store` caching headers on every response
//! - An axum router and an async `serve` entry point
//!
//! # Pagination
//!
//! `GET /posts?count&startID&post_type&status` returns records with an id
//! strictly greater than `startID`, ascending, at most `count`. The server
//! keeps no cursor state; a page is a pure function of its query.
//!
//! # Authentication
//!
//! Every request must carry `Authorization: Bearer <token>`. A missing or
//! mismatched token is rejected with 403 before any record is read.
//!
//! ```rust,ignore
//! use pressmigrate_server::{serve, ExportServer, MemorySource, ServerConfig};
//! use std::sync::Arc;
//!
//! let source = MemorySource::load("records.json".as_ref())?;
//! let server = Arc::new(ExportServer::new(ServerConfig::default(), source)?);
//! println!("token: {}", server.token());
//! serve(server, "127.0.0.1:8080".parse()?).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod http;
mod server;
mod source;

pub use auth::{generate_token, TokenAuth, TOKEN_LEN};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use http::{into_response, router, serve};
pub use server::{ExportReply, ExportServer, NO_STORE_HEADERS};
pub use source::{MemorySource, SourceStore};
