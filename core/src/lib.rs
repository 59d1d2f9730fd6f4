//! Client core for the moj.io vehicle-telematics REST API.
//!
//! # Overview
//! `EndpointBuilder` assembles a request against one of the platform's
//! resources; `ResponseHandler` classifies what comes back and maps it to
//! typed models. Both are plain data in and out (host-does-IO), so a mobile
//! host can run the network itself through the FFI crate. `Dispatcher` is
//! the batteries-included path: it executes requests through a `Transport`
//! on a tokio runtime and follows `Links.Next` for paginated calls.
//!
//! # Design
//! - Builders are owned values; nothing is shared between calls.
//! - Every failure surfaces as one `ApiError`, never a panic.
//! - The decoder is chosen by an exhaustive `match` on `Resource`.
//! - Pagination is a stream, bounded by a cursor that stops when the server
//!   repeats its last next-page URL.

pub mod auth;
pub mod builder;
pub mod client;
pub mod dispatch;
pub mod entity;
pub mod environment;
pub mod error;
pub mod http;
pub mod models;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod response;
pub mod transport;

pub use auth::{KeychainTokenStore, NoToken, StaticToken, TokenStore};
pub use builder::EndpointBuilder;
pub use client::{ClientConfig, MojioClient};
pub use dispatch::Dispatcher;
pub use entity::{map_entity, Entity};
pub use environment::{preferred_languages_from_env, ClientEnvironment};
pub use error::ApiError;
pub use http::{BodyEncoding, HeaderContext, HttpMethod, HttpRequest, HttpResponse};
pub use pagination::{Cursor, PageStep};
pub use query::QueryOptions;
pub use resource::Resource;
pub use response::{CountedList, Handled, Payload, ResponseHandler};
pub use transport::{ReqwestTransport, Transport};
