//! # rollcall
//!
//! A small server-rendered user directory. Users have a first and last
//! name, an email, an age and an optional bio; they can be listed, created,
//! edited, deleted and searched by full name or email, all through plain
//! HTML forms.
//!
//! The pieces, leaf first:
//!
//! - [`UserStore`] — the in-memory, insertion-ordered list of users
//! - [`validation`] — accumulating per-field rule sets for the forms
//! - [`views`] — view models rendered as HTML, or JSON on request
//! - [`users`] — the route handlers tying the three together
//! - [`Router`] / [`Server`] — radix routing over hyper, graceful shutdown
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rollcall::{Server, UserStore, users};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rollcall::Error> {
//!     Server::bind("0.0.0.0:3000")?
//!         .serve(users::routes(UserStore::new()))
//!         .await
//! }
//! ```
//!
//! Handlers can be driven without a socket through [`Router::dispatch`]:
//!
//! ```rust
//! use rollcall::{Request, Status, UserStore, users};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = users::routes(UserStore::new());
//! let res = app.dispatch(Request::get("/search")).await;
//! assert_eq!(res.status_code(), Status::Ok);
//! # }
//! ```

mod config;
mod error;
mod form;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;
mod store;

pub mod health;
pub mod logging;
pub mod middleware;
pub mod users;
pub mod validation;
pub mod views;

pub use config::Config;
pub use error::Error;
pub use form::{FormData, MalformedForm};
pub use handler::Handler;
pub use method::{Method, UnsupportedMethod};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{SearchQuery, StoreError, UserFields, UserId, UserRecord, UserStore};
