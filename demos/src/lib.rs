//! # Demos
//!
//! A small HTTP server exposing the issuer's discovery document and
//! credential endpoint.

pub mod http;
pub mod issuer;
