//! Hosting provider implementations.
//!
//! Contains the Vercel implementation of the [`HostingProvider`] trait
//! defined in `launchpad-core`.
//!
//! [`HostingProvider`]: launchpad_core::deploy::HostingProvider

pub mod vercel;

pub use vercel::VercelClient;
