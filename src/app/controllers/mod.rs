//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the UI:
//! - Editor configuration assembly
//! - Editor lifecycle binding
//! - Application shell (document state + preview)

pub mod binding;
pub mod config;
pub mod shell;

#[cfg(test)]
pub(crate) mod test_support;
