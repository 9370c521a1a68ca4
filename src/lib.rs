//! attack-trends crate
//!
//! This crate is an implementation detail of the `attack-trends` tool. This crate's API is fluid and may change without warning
//! and in a semver-incompatible way.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod attacks;

#[doc(hidden)]
pub mod calendar;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod misc;

#[doc(hidden)]
pub mod notify;

#[doc(hidden)]
pub mod paths;

#[doc(hidden)]
pub mod pipeline;

#[doc(hidden)]
pub mod reports;

#[doc(hidden)]
pub mod store;
