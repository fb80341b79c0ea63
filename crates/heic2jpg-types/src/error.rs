use thiserror::Error;

use crate::options::OptionField;

/// Errors raised while editing or validating [`crate::ConversionOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// The value could not be parsed or is outside the accepted range.
    #[error("invalid value {value:?} for {field}: {reason}")]
    InvalidValue {
        field: OptionField,
        value: String,
        reason: &'static str,
    },

    /// The option name does not match any known field.
    #[error("unknown option: {0}")]
    UnknownField(String),
}

impl OptionsError {
    pub(crate) fn invalid(field: OptionField, value: impl Into<String>, reason: &'static str) -> Self {
        OptionsError::InvalidValue {
            field,
            value: value.into(),
            reason,
        }
    }
}
