use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::render::Surface;
use crate::services::api::ReceiptApi;
use crate::services::controller::Controller;

pub async fn upload_invoice<A: ReceiptApi, S: Surface>(
    controller: &mut Controller<A, S>,
    file: Option<&Path>,
    save: Option<PathBuf>,
    open_after: bool,
    data_uri: bool,
) -> Result<()> {
    controller.submit_upload(file).await?;

    if data_uri {
        controller.reveal_download_link()?;
    }
    if save.is_none() && !open_after {
        return Ok(());
    }
    if let Some(path) = controller.save_result(save)? {
        if open_after {
            open::that(&path)?;
        }
    }
    Ok(())
}

pub fn pick_pdf() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("PDF", &["pdf"])
        .pick_file()
}

pub fn pick_save_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("JSON", &["json"])
        .set_file_name(crate::services::export::EXPORT_FILE_NAME)
        .save_file()
}
