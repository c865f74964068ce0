#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Skiff Ports
//!
//! The interface (port) to the remote admin service that Skiff tracks
//! executions against.
//!
//! - [`AdminService`] -- definitions, executions, launches and cancellation
//! - [`Page`] and [`collect_pages`] -- token pagination
//! - [`Filter`] -- opaque `(field, comparator, value)` listing filters
//!
//! [`AdminService`] is `async_trait` and object-safe, suitable for use as
//! `Arc<dyn AdminService>` behind dependency injection.

pub mod admin;
pub mod error;
pub mod filter;
pub mod page;

pub use admin::AdminService;
pub use error::PortsError;
pub use filter::{Comparator, Filter};
pub use page::{Page, collect_pages};
