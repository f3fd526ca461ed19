//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the storage backends uploaded files are written to.

pub mod storage;
