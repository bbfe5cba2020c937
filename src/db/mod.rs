//! Entity registry: the in-memory source of truth shared by every service.

pub mod registry;

pub use registry::{Registry, Shared};
