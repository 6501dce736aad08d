//! # sitegen
//!
//! A multi-tenant micro-site backend. Each business gets a subdomain of the
//! root domain, a stored profile, and generated legal pages.
//!
//! ## The contract
//!
//! The datastore is the only hard dependency. Creating a tenant is one
//! insert; the DNS record and the hosting-platform domain mapping that make
//! `{slug}.{root}` reachable are attempted afterwards and never fail the
//! request. Their outcome is reported alongside the stored row.
//!
//! What a reverse proxy or ingress already owns is left to it: TLS, body-size
//! limits, rate limiting, authentication.
//!
//! What's left here:
//!
//! - Radix-tree routing over hyper via [`matchit`]
//! - Tenant provisioning with retried, best-effort DNS and domain mapping
//! - Host-header tenant resolution and subdomain classification
//! - Graceful shutdown: SIGTERM / Ctrl-C drains in-flight requests
//!
//! ## Slugs
//!
//! ```rust
//! use sitegen::slug::slugify;
//!
//! assert_eq!(slugify("Acme Plumbing & Electric!!"), "acme-plumbing-electric");
//! ```

pub mod api;
pub mod config;
pub mod dns;
pub mod domains;
mod error;
mod handler;
pub mod health;
pub mod legal;
mod method;
pub mod provision;
mod request;
pub mod resolve;
mod response;
pub mod retry;
mod router;
mod server;
pub mod slug;
mod status;
pub mod store;
pub mod subdomain;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::{Server, shutdown_signal};
pub use status::Status;
