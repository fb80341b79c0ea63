use heic2jpg_types::OptionsError;
use thiserror::Error;

/// Fallback message when the service rejects a conversion without a `detail`.
pub const GENERIC_CONVERSION_ERROR: &str = "Error converting image";

/// Errors that can be returned by heic2jpg-client operations.
///
/// `Display` renders the message shown to the user.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Wrong file type, missing file or bad option value. Raised before any
    /// network call.
    #[error("{0}")]
    Validation(String),

    /// The service answered with a non-success status or an unusable body.
    #[error("{message}")]
    Conversion { status: u16, message: String },

    /// No response was received (connect failure, timeout, broken body).
    #[error("No response from server. Please check your connection.")]
    Network(#[source] reqwest::Error),

    /// The request could not be constructed.
    #[error("Error setting up request: {0}")]
    Request(String),

    /// A conversion is already in flight for this session.
    #[error("A conversion is already in progress")]
    Busy,

    /// A local filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Classify a transport error from `reqwest`.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ClientError::Request(e.to_string())
        } else {
            ClientError::Network(e)
        }
    }

    /// HTTP status of a server-side rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Conversion { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the user: the service's `detail` for rejections, a
    /// fixed sentence for transport failures.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<OptionsError> for ClientError {
    fn from(e: OptionsError) -> Self {
        ClientError::Validation(e.to_string())
    }
}
