//! Shared runtime plumbing for dalink services.

pub mod logging;
