//! # agenda
//!
//! A small contacts service: people identified by a CPF, each owning any
//! number of e-mail or phone contacts, served over HTTP as a JSON API and a
//! handful of server-rendered pages.
//!
//! ## Layers
//!
//! ```text
//! hyper connection ─► server::handle ─► Router ─► RouteTable (api | web)
//!                                                    │ first match wins
//!                                                    ▼
//!                                 controller ─► service ─► Repository
//! ```
//!
//! - [`cpf`] validates and formats CPF numbers. Nothing else in the crate
//!   knows the checksum.
//! - [`Router`] holds two ordered tables split on the API prefix. Within a
//!   table the first route that accepts the method and matches the path
//!   wins; trailing slashes are ignored.
//! - [`service`] owns the business rules: a person is never written with
//!   an invalid CPF, and a contact always points at an existing person.
//! - [`store`] is the persistence seam. The bundled implementation keeps
//!   everything in memory.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use agenda::{Server, routes::{self, Services}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), agenda::Error> {
//!     let router = routes::router(&Services::in_memory(), "/api/");
//!     Server::new("0.0.0.0:8080".parse().unwrap()).serve(router).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod route;
mod router;
mod server;
mod status;

pub mod config;
pub mod controller;
pub mod cpf;
pub mod health;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;

pub use error::Error;
pub use handler::{Handler, action};
pub use method::{Method, UnknownMethod};
pub use request::{Form, Request};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use route::{Params, RouteError, RouteTemplate};
pub use router::{DEFAULT_API_PREFIX, Match, Route, RouteTable, Router};
pub use server::Server;
pub use status::Status;
