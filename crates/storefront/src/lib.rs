//! Cinnamon Storefront library.
//!
//! This crate provides the storefront HTTP API as a library, allowing it to
//! be tested in-process and reused by the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
