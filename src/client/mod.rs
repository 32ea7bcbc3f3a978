//! HTTP access to the back-office REST service
//!
//! [`RestClient`] owns the connection pool, the bearer-token session and the
//! read retry policy. [`RestEntityApi`] layers the generic CRUD paths for one
//! entity type on top of it.

pub mod api;
pub mod auth;
pub mod endpoints;
pub mod rest;
pub mod retry;

pub use api::RestEntityApi;
pub use auth::{AuthSession, Credentials, TokenPair};
pub use rest::RestClient;
pub use retry::RetryPolicy;
