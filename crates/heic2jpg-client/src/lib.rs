//! Client for a remote HEIC/HEIF to JPG conversion service.
//!
//! The service does all image work. This crate:
//! - validates the selected file and options ([`input`], [`session`])
//! - sends one multipart request per conversion ([`client`])
//! - formats results for display ([`format`])

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod session;


pub use client::{ClientBuilder, ConversionClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use format::{compression_ratio, format_file_size, format_time, ResultSummary};
pub use input::{is_heic_filename, SelectedFile};
pub use session::{Session, SessionState};

pub use heic2jpg_types as types;
