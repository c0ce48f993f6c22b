//! Driven adapters implementing the domain ports.
//!
//! - **memory**: a mutex-guarded store used when no database is configured
//! - **persistence**: PostgreSQL repositories using Diesel

pub mod memory;
pub mod persistence;
