//! Ripple Platform
//!
//! Core of the social-feed backend:
//! - Account registration and login (local + federated)
//! - Stateless access/refresh token lifecycle
//! - Post / comment / like feed store over MongoDB
//! - Collaborator seams for blob storage and identity verification

pub mod api;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

pub use domain::*;
pub use error::PlatformError;
