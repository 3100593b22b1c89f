//! Meroxa platform API client.
//!
//! The CLI talks to the platform through the [`PlatformClient`] trait object
//! so commands can be exercised against [`FakeClient`] (feature `fake`)
//! without a network.

#![forbid(unsafe_code)]

mod error;
#[cfg(feature = "fake")]
mod fake;
mod http;
mod models;

pub use error::{ApiError, ErrorResponse};
#[cfg(feature = "fake")]
pub use fake::FakeClient;
pub use http::{ClientOptions, HttpClient, DEFAULT_API_URL};
pub use models::{Account, Environment, EntityIdentifier, Resource, Status, User};

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`PlatformClient`] calls.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The slice of the Meroxa API the CLI uses.
pub trait PlatformClient: Send + Sync {
    /// The logged-in user.
    fn get_user(&self) -> ClientFuture<'_, User>;

    /// Accounts the user belongs to.
    fn list_accounts(&self) -> ClientFuture<'_, Vec<Account>>;

    /// Resources in the current account.
    fn list_resources(&self) -> ClientFuture<'_, Vec<Resource>>;

    /// Resource types the platform supports.
    fn list_resource_types(&self) -> ClientFuture<'_, Vec<String>>;

    /// A single resource by name.
    fn get_resource_by_name<'a>(&'a self, name: &'a str) -> ClientFuture<'a, Resource>;

    /// Delete a resource by name or id.
    fn delete_resource<'a>(&'a self, name_or_id: &'a str) -> ClientFuture<'a, ()>;

    /// Environments in the current account.
    fn list_environments(&self) -> ClientFuture<'_, Vec<Environment>>;

    /// A single environment by name or UUID.
    fn get_environment<'a>(&'a self, name_or_uuid: &'a str) -> ClientFuture<'a, Environment>;

    /// Start removing an environment; returns its state after the request.
    fn delete_environment<'a>(&'a self, name_or_uuid: &'a str) -> ClientFuture<'a, Environment>;
}
