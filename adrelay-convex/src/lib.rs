//! Adrelay backend client
//!
//! This crate talks to the mutation backend:
//! - The [`MutationClient`] seam the HTTP handlers depend on
//! - [`ConvexHttpClient`], the Convex HTTP API implementation
//! - Wire types for the `/api/mutation` endpoint

pub mod client;
pub mod protocol;

pub use client::{ConvexHttpClient, MutationClient};
pub use protocol::{FunctionArgs, MutationRequest, MutationResponse, decode_value};
