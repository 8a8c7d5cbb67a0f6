use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::models::{Receipt, UploadFile, UploadResult};
use crate::render::Surface;
use crate::services::api::ReceiptApi;
use crate::services::export::ExportedResult;
use crate::services::state::{FlowGate, FlowPermit, ReceiptsView, RequestSequence, RequestToken, Tab, UiState};
use crate::services::summary::compute_summary;
use crate::utils::sha256_hex;

pub const UPLOAD_IN_PROGRESS: &str = "Uploading and extracting...";
pub const UPLOAD_DONE: &str = "Extraction complete";
pub const RECEIPT_DELETED: &str = "Receipt deleted";

/// Asks the user before a destructive action. `Ok(false)` is a decline;
/// `Err` means no answer could be obtained.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool, ClientError>;
}

/// Confirms everything, for `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool, ClientError> {
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// An upload that passed validation and holds the upload gate.
pub struct PendingUpload {
    permit: FlowPermit,
    file: UploadFile,
}

/// Drives the upload, receipts and tab flows against a [`ReceiptApi`],
/// pushing each resulting [`UiState`] to a [`Surface`].
pub struct Controller<A, S> {
    api: A,
    surface: S,
    config: ClientConfig,
    state: UiState,
    upload_gate: FlowGate,
    receipts_sequence: RequestSequence,
}

impl<A: ReceiptApi, S: Surface> Controller<A, S> {
    pub fn new(api: A, surface: S, config: ClientConfig) -> Self {
        let state = UiState::new(config.default_tab);
        Controller {
            api,
            surface,
            config,
            state,
            upload_gate: FlowGate::new("upload"),
            receipts_sequence: RequestSequence::default(),
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Draws the initial view, fetching receipts right away when that tab
    /// is the default.
    pub async fn start(&mut self) -> Result<(), ClientError> {
        self.apply();
        if self.state.is_active(Tab::Receipts) {
            self.load_receipts().await?;
        }
        Ok(())
    }

    /// Activates `tab`. Entering the receipts tab always re-fetches.
    pub async fn show_tab(&mut self, tab: Tab) -> Result<(), ClientError> {
        debug!(%tab, "switching tab");
        self.state.active_tab = tab;
        self.apply();
        if tab == Tab::Receipts {
            self.load_receipts().await?;
        }
        Ok(())
    }

    pub async fn submit_upload(&mut self, path: Option<&Path>) -> Result<UploadResult, ClientError> {
        let pending = self.begin_upload(path).await?;
        let outcome = self.api.extract(pending.file.clone()).await;
        self.finish_upload(pending, outcome)
    }

    pub async fn begin_upload(&mut self, path: Option<&Path>) -> Result<PendingUpload, ClientError> {
        let path = match path {
            Some(path) => path,
            None => {
                let err = ClientError::NoFileSelected;
                self.state.upload_status.show(err.upload_message(), true);
                self.apply();
                return Err(err);
            }
        };

        let permit = self.upload_gate.try_acquire()?;
        self.state.upload_disabled = true;
        self.state.upload_status.show(UPLOAD_IN_PROGRESS, false);
        self.apply();

        match read_upload(path).await {
            Ok(file) => Ok(PendingUpload { permit, file }),
            Err(err) => {
                drop(permit);
                self.state.upload_disabled = self.upload_gate.is_pending();
                self.state.upload_status.show(err.upload_message(), true);
                self.apply();
                Err(err)
            }
        }
    }

    pub fn finish_upload(
        &mut self,
        pending: PendingUpload,
        outcome: Result<serde_json::Value, ApiError>,
    ) -> Result<UploadResult, ClientError> {
        let PendingUpload { permit, file } = pending;
        debug!(token = ?permit.token(), "upload finished");
        drop(permit);
        self.state.upload_disabled = self.upload_gate.is_pending();

        match outcome {
            Ok(invoice) => {
                info!(file = %file.file_name, "extraction succeeded");
                let result = UploadResult { invoice };
                self.state.upload_result = Some(result.clone());
                self.state.download_link = None;
                self.state
                    .upload_status
                    .show_transient(UPLOAD_DONE, self.config.status_hide_after);
                self.apply();
                Ok(result)
            }
            Err(err) => {
                let err = ClientError::from(err);
                warn!(file = %file.file_name, error = %err, "extraction failed");
                self.state.upload_status.show(err.upload_message(), true);
                self.apply();
                Err(err)
            }
        }
    }

    /// The most recent extraction as a downloadable blob.
    pub fn export_result(&self) -> anyhow::Result<Option<ExportedResult>> {
        self.state
            .upload_result
            .as_ref()
            .map(|result| ExportedResult::from_invoice(&result.invoice))
            .transpose()
    }

    /// Writes the current result to `target` (a file, or a directory that
    /// receives `invoice.json`; default is the working directory). The
    /// outcome is reported in the upload status banner.
    pub fn save_result(&mut self, target: Option<PathBuf>) -> Result<Option<PathBuf>, ClientError> {
        let outcome = self.write_export(target);
        match &outcome {
            Ok(Some(path)) => {
                info!(path = %path.display(), "invoice JSON saved");
                self.state
                    .upload_status
                    .show_transient(format!("Saved {}", path.display()), self.config.status_hide_after);
            }
            Ok(None) => {
                self.state.upload_status.show("Nothing to save yet", true);
            }
            Err(err) => {
                warn!(error = %err, "saving invoice JSON failed");
                self.state.upload_status.show(err.upload_message(), true);
            }
        }
        self.apply();
        outcome
    }

    fn write_export(&self, target: Option<PathBuf>) -> Result<Option<PathBuf>, ClientError> {
        let export = match self.export_result().map_err(|e| ClientError::Save(e.to_string()))? {
            Some(export) => export,
            None => return Ok(None),
        };
        let path = match target {
            Some(path) if path.is_dir() => default_save_path(Some(path), &export),
            Some(path) => path,
            None => default_save_path(None, &export),
        };
        export
            .save_to(&path)
            .map_err(|e| ClientError::Save(e.to_string()))?;
        Ok(Some(path))
    }

    /// Shows the current result as an embeddable `data:` link in the
    /// upload panel.
    pub fn reveal_download_link(&mut self) -> Result<(), ClientError> {
        let export = self
            .export_result()
            .map_err(|e| ClientError::Save(e.to_string()))?;
        if let Some(export) = export {
            self.state.download_link = Some(export.to_data_uri());
            self.apply();
        }
        Ok(())
    }

    pub async fn load_receipts(&mut self) -> Result<(), ClientError> {
        let token = self.begin_load();
        let outcome = self.api.list_receipts().await;
        self.finish_load(token, outcome)
    }

    pub fn begin_load(&mut self) -> RequestToken {
        self.state.receipts_status.hide();
        self.state.receipts = ReceiptsView::Loading;
        self.apply();
        self.receipts_sequence.issue()
    }

    pub fn finish_load(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<Receipt>, ApiError>,
    ) -> Result<(), ClientError> {
        if !self.receipts_sequence.is_current(token) {
            debug!(?token, "discarding superseded receipts response");
            return Err(ClientError::Superseded);
        }

        match outcome {
            Ok(receipts) => {
                let summary = compute_summary(&receipts);
                debug!(count = summary.count, total = summary.total_sum, "receipts rendered");
                self.state.receipts = ReceiptsView::Loaded { receipts, summary };
                self.apply();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "loading receipts failed");
                self.state
                    .receipts_status
                    .show(format!("Failed to load receipts: {}", err), true);
                self.state.receipts = ReceiptsView::Cleared;
                self.apply();
                Err(err.into())
            }
        }
    }

    /// Deletes a receipt after confirmation, then reloads the list from the
    /// service.
    pub async fn delete_receipt(&mut self, id: i64, confirm: &impl Confirm) -> Result<DeleteOutcome, ClientError> {
        if !confirm.confirm(&format!("Delete receipt #{}? This cannot be undone.", id))? {
            debug!(receipt_id = id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(err) = self.api.delete_receipt(id).await {
            warn!(receipt_id = id, error = %err, "delete failed");
            self.state
                .receipts_status
                .show(format!("Failed to delete receipt: {}", err), true);
            self.apply();
            return Err(err.into());
        }

        info!(receipt_id = id, "receipt deleted");
        self.load_receipts().await?;
        self.state
            .receipts_status
            .show_transient(RECEIPT_DELETED, self.config.status_hide_after);
        self.apply();
        Ok(DeleteOutcome::Deleted)
    }

    fn apply(&mut self) {
        self.surface.apply(&self.state);
    }
}

async fn read_upload(path: &Path) -> Result<UploadFile, ClientError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = upload_file_name(path);
    info!(file = %file_name, bytes = bytes.len(), digest = %sha256_hex(&bytes), "file selected");
    Ok(UploadFile { file_name, bytes })
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload.pdf".to_string())
}

pub fn default_save_path(dir: Option<PathBuf>, export: &ExportedResult) -> PathBuf {
    dir.unwrap_or_default().join(&export.file_name)
}
