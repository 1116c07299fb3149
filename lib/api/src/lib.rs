//! REST surface of finterm
//!
//! Routes are registered by [`rest::configure`] so tests can mount them on
//! an in-process `App`; [`RestApi::start`] binds the real server.

pub mod rest;

pub use rest::{configure, status_for, RestApi};
