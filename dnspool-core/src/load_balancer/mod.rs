//! Endpoint selection and usage tracking.

pub mod guard;
pub mod selector;
