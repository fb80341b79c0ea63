//! Per-session conversion state.
//!
//! ```text
//! Idle --select--> Ready --begin--> Converting --finish--> Succeeded | Failed
//!   ^                                                          |
//!   +---------------------------reset--------------------------+
//! ```
//!
//! A second `begin` while `Converting` is refused with [`ClientError::Busy`].
//! Failures keep the selected file so the user can retry without selecting
//! it again. Dropping a [`Session::convert`] future before it completes puts
//! the session back in `Ready`.

use heic2jpg_types::{ConversionOptions, ConversionResult, OptionField, QualityPreset};
use tracing::{debug, warn};

use crate::client::ConversionClient;
use crate::config::DEFAULT_MAX_UPLOAD_MB;
use crate::error::ClientError;
use crate::input::{validate_selection, SelectedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Ready,
    Converting,
    Succeeded,
    Failed,
}

/// Transient state for one user: selected file, options, last outcome.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    file: Option<SelectedFile>,
    options: ConversionOptions,
    result: Option<ConversionResult>,
    last_error: Option<String>,
    max_upload_bytes: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_max_upload_bytes(DEFAULT_MAX_UPLOAD_MB * 1024 * 1024)
    }

    pub fn with_max_upload_bytes(max_upload_bytes: u64) -> Self {
        Self {
            state: SessionState::Idle,
            file: None,
            options: ConversionOptions::default(),
            result: None,
            last_error: None,
            max_upload_bytes,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Converting
    }

    /// Record `file` as the upload candidate.
    ///
    /// A rejected file leaves the session exactly as it was. An accepted one
    /// replaces any previous file and clears the previous result.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }
        validate_selection(&file, self.max_upload_bytes)?;

        debug!(file = %file.name(), size = file.size(), "file selected");
        self.file = Some(file);
        self.result = None;
        self.last_error = None;
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Replace one option and return the new snapshot.
    pub fn set_option(
        &mut self,
        field: OptionField,
        value: &str,
    ) -> Result<&ConversionOptions, ClientError> {
        self.options.set_field(field, value)?;
        Ok(&self.options)
    }

    pub fn apply_preset(&mut self, preset: QualityPreset) -> &ConversionOptions {
        self.options.apply_preset(preset);
        &self.options
    }

    pub fn set_options(&mut self, options: ConversionOptions) -> Result<(), ClientError> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Enter `Converting` and hand out what the request needs.
    pub fn begin(&mut self) -> Result<(SelectedFile, ConversionOptions), ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| ClientError::Validation("Please select a file first".to_owned()))?;

        self.state = SessionState::Converting;
        self.last_error = None;
        Ok((file, self.options.clone()))
    }

    /// Leave `Converting` with the request's outcome.
    ///
    /// Outside `Converting` the outcome is refused and the session is left
    /// untouched.
    pub fn finish(
        &mut self,
        outcome: Result<ConversionResult, ClientError>,
    ) -> Result<&ConversionResult, ClientError> {
        if !self.is_busy() {
            return Err(ClientError::Validation(
                "No conversion in progress".to_owned(),
            ));
        }
        match outcome {
            Ok(result) => {
                self.state = SessionState::Succeeded;
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                warn!(error = %e, "conversion failed");
                self.state = SessionState::Failed;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run one conversion of the selected file with the current options.
    pub async fn convert(
        &mut self,
        client: &ConversionClient,
    ) -> Result<&ConversionResult, ClientError> {
        let (file, options) = self.begin()?;
        let guard = InFlight {
            state: &mut self.state,
            armed: true,
        };
        let outcome = client.convert(&file, &options).await;
        guard.disarm();
        self.finish(outcome)
    }

    /// Drop the file and result. Options are kept.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.file = None;
        self.result = None;
        self.last_error = None;
    }
}

/// Returns a cancelled conversion to `Ready`.
struct InFlight<'a> {
    state: &'a mut SessionState,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && *self.state == SessionState::Converting {
            debug!("conversion cancelled");
            *self.state = SessionState::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heic(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, vec![0u8; 16])
    }

    fn sample_result() -> ConversionResult {
        ConversionResult {
            download_url: "/api/v1/download/out.jpg".into(),
            filename: "a.jpg".into(),
            original_size: 16,
            converted_size: 8,
            conversion_time: 0.1,
        }
    }

    #[test]
    fn starts_idle_with_default_options() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.file().is_none());
        assert_eq!(session.options(), &ConversionOptions::default());
    }

    #[test]
    fn rejected_selection_records_nothing() {
        let mut session = Session::new();
        let err = session.select(heic("photo.png")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please select a HEIC or HEIF file");
        assert!(session.file().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn rejected_selection_keeps_previous_file() {
        let mut session = Session::new();
        session.select(heic("first.heic")).unwrap();
        assert!(session.select(heic("second.jpeg")).is_err());
        assert_eq!(session.file().unwrap().name(), "first.heic");
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn accepted_selection_clears_previous_result() {
        let mut session = Session::new();
        session.select(heic("a.heic")).unwrap();
        session.begin().unwrap();
        session.finish(Ok(sample_result())).unwrap();
        assert!(session.result().is_some());

        session.select(heic("b.HEIF")).unwrap();
        assert!(session.result().is_none());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.file().unwrap().name(), "b.HEIF");
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut session = Session::with_max_upload_bytes(8);
        assert!(session.select(heic("big.heic")).is_err());
        assert!(session.file().is_none());
    }

    #[test]
    fn begin_without_file_is_validation_error() {
        let mut session = Session::new();
        let err = session.begin().unwrap_err();
        assert_eq!(err.to_string(), "Please select a file first");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn second_begin_while_converting_is_busy() {
        let mut session = Session::new();
        session.select(heic("a.heic")).unwrap();
        session.begin().unwrap();
        assert!(session.is_busy());
        assert!(matches!(session.begin(), Err(ClientError::Busy)));
        assert!(matches!(session.select(heic("b.heic")), Err(ClientError::Busy)));
    }

    #[test]
    fn failure_keeps_file_for_retry() {
        let mut session = Session::new();
        session.select(heic("a.heic")).unwrap();
        session.begin().unwrap();
        let err = session
            .finish(Err(ClientError::Conversion {
                status: 500,
                message: "bad file".into(),
            }))
            .unwrap_err();
        assert_eq!(err.to_string(), "bad file");
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.last_error(), Some("bad file"));
        assert_eq!(session.file().unwrap().name(), "a.heic");

        let (file, _) = session.begin().unwrap();
        assert_eq!(file.name(), "a.heic");
    }

    #[test]
    fn finish_outside_converting_is_refused() {
        let mut session = Session::new();
        let err = session.finish(Ok(sample_result())).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.result().is_none());

        session.select(heic("a.heic")).unwrap();
        assert!(session.finish(Ok(sample_result())).is_err());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn empty_heic_selection_is_accepted() {
        let mut session = Session::new();
        session
            .select(SelectedFile::from_bytes("photo.heic", Vec::new()))
            .unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.file().unwrap().size(), 0);
    }

    #[test]
    fn option_edits_return_snapshot() {
        let mut session = Session::new();
        let snapshot = session.set_option(OptionField::Height, "480").unwrap().clone();
        assert_eq!(snapshot.height, Some(480));
        assert!(session.set_option(OptionField::Height, "abc").is_err());
        assert_eq!(session.options().height, Some(480));
        assert_eq!(session.apply_preset(QualityPreset::Medium).quality, 75);
    }

    #[test]
    fn reset_returns_to_idle_and_keeps_options() {
        let mut session = Session::new();
        session.set_option(OptionField::Quality, "60").unwrap();
        session.select(heic("a.heic")).unwrap();
        session.begin().unwrap();
        session.finish(Ok(sample_result())).unwrap();

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.file().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.options().quality, 60);
    }
}
