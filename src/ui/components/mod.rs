//! Shared UI building blocks.

pub mod theme;
