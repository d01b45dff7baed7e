//! Core types
pub mod individual;
pub mod state;
