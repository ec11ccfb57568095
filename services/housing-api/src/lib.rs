//! Housing management service library crate.
//!
//! # Purpose
//! Exposes the REST API surface, authentication, configuration, the record
//! service, and storage backends for use by the binary and tests.
//!
//! # Notes
//! Requests flow `api` -> `service` -> `store`. Access decisions come from the
//! `housing-authz` crate and are applied in `service` before any store call.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod service;
pub mod store;
