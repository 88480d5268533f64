//! Client for the link-local instance metadata service.
//!
//! Implements [`decorator_core::MetadataSource`] on top of `reqwest`, with a
//! managed token: the client obtains a token on first use and renews it before
//! it expires or when the service rejects it.
mod config;
pub use config::{DEFAULT_METADATA_URL, DEFAULT_TOKEN_EXPIRY, MetadataClientConfig};

mod token;

mod client;
pub use client::MetadataClient;
