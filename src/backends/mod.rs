//! Backends module - Integrations beyond the local knowledge directory
//!
//! Provides:
//! - external: pluggable external documentation search capability

pub mod external;
