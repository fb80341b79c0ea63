//! Shared types for the heic2jpg client.
//!
//! - [`options`]: the user-editable [`ConversionOptions`] record and the raw
//!   form-field filtering applied before a request is sent.
//! - [`wire`]: JSON payloads exchanged with the remote conversion service.

pub mod error;
pub mod options;
pub mod wire;

pub use error::OptionsError;
pub use options::{
    filter_options, ConversionOptions, OptionField, QualityPreset, Rotation, DEFAULT_QUALITY,
};
pub use wire::{ConversionResult, ErrorResponse, HealthResponse};
