//! Shared helpers for unit tests.
//!
//! Factories build small in-memory images with well-known module version ids, so tests can
//! arrange source and destination modules without repeating the boilerplate.

pub mod factories;
