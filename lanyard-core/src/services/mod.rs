//! Plugin services
//!
//! - [`manifest`]: per-service JSON manifest
//! - [`service`]: lifecycle trait and fault boundary
//! - [`registry`]: discovery and dispatch

pub mod manifest;
pub mod registry;
pub mod service;

pub use manifest::{ManifestError, ServiceDescriptor, ServiceName, API_VERSION};
pub use registry::{LoadError, Registry, ServiceHandle, ServiceSource, SkipReason};
pub use service::{contain, EntryPoints, Fault, Phase, Service};
