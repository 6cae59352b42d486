//! The core module holds the error type and the settings used to configure a render pipeline.

pub mod error;
pub mod settings;
