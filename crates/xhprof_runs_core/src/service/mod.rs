//! Service layer for core use-cases.
//!
//! # Responsibility
//! - Provide use-case oriented APIs above repository primitives.
//! - Keep storage details out of hosting applications.

pub mod run_service;
