use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use inquire::error::InquireError;
use inquire::{Select, Text};
use tracing::debug;

use crate::commands::receipts::PromptConfirm;
use crate::commands::upload::{pick_pdf, pick_save_path};
use crate::render::Surface;
use crate::services::api::ReceiptApi;
use crate::services::controller::Controller;
use crate::services::state::{ReceiptsView, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SwitchTab(Tab),
    Upload,
    SaveJson,
    Refresh,
    Delete,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SwitchTab(tab) => write!(f, "Go to {} tab", tab),
            Action::Upload => f.write_str("Upload a PDF"),
            Action::SaveJson => f.write_str("Download JSON"),
            Action::Refresh => f.write_str("Refresh receipts"),
            Action::Delete => f.write_str("Delete a receipt"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions_for(tab: Tab, has_result: bool, has_receipts: bool) -> Vec<Action> {
    let mut actions = Vec::new();
    match tab {
        Tab::Upload => {
            actions.push(Action::Upload);
            if has_result {
                actions.push(Action::SaveJson);
            }
            actions.push(Action::SwitchTab(Tab::Receipts));
        }
        Tab::Receipts => {
            actions.push(Action::Refresh);
            if has_receipts {
                actions.push(Action::Delete);
            }
            actions.push(Action::SwitchTab(Tab::Upload));
        }
    }
    actions.push(Action::Quit);
    actions
}

/// Interactive tabbed session. Flow failures are shown in the status
/// banners and do not end the session.
pub async fn run_session<A: ReceiptApi, S: Surface>(controller: &mut Controller<A, S>) -> Result<()> {
    if let Err(err) = controller.start().await {
        debug!(error = %err, "initial load failed");
    }

    loop {
        let state = controller.state();
        let receipt_ids: Vec<i64> = match &state.receipts {
            ReceiptsView::Loaded { receipts, .. } => receipts.iter().map(|r| r.id).collect(),
            _ => Vec::new(),
        };
        let actions = actions_for(state.active_tab, state.upload_result.is_some(), !receipt_ids.is_empty());

        let action = match Select::new("Action:", actions).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        let outcome = match action {
            Action::SwitchTab(tab) => controller.show_tab(tab).await.map(|_| ()),
            Action::Refresh => controller.load_receipts().await,
            Action::Upload => {
                let file = prompt_pdf_path()?;
                controller.submit_upload(file.as_deref()).await.map(|_| ())
            }
            Action::SaveJson => match pick_save_path() {
                Some(path) => controller.save_result(Some(path)).map(|_| ()),
                None => Ok(()),
            },
            Action::Delete => match Select::new("Receipt:", receipt_ids).prompt() {
                Ok(id) => controller.delete_receipt(id, &PromptConfirm).await.map(|_| ()),
                Err(err) => {
                    prompt_cancelled(err)?;
                    Ok(())
                }
            },
            Action::Quit => break,
        };

        if let Err(err) = outcome {
            debug!(%action, error = %err, "action failed");
        }
    }

    Ok(())
}

/// Empty input opens the native file picker; closing it selects nothing.
fn prompt_pdf_path() -> Result<Option<PathBuf>> {
    let raw = match Text::new("PDF path (empty to browse):").prompt() {
        Ok(raw) => raw,
        Err(err) => return prompt_cancelled(err).map(|_| None),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(pick_pdf());
    }
    Ok(Some(PathBuf::from(trimmed)))
}

/// Escape or Ctrl-C at a sub-prompt abandons only that action; anything
/// else (no terminal, I/O) ends the session.
fn prompt_cancelled(err: InquireError) -> Result<()> {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => Ok(()),
        other => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_tab_offers_download_only_with_result() {
        assert!(!actions_for(Tab::Upload, false, false).contains(&Action::SaveJson));
        assert!(actions_for(Tab::Upload, true, false).contains(&Action::SaveJson));
    }

    #[test]
    fn receipts_tab_offers_delete_only_with_receipts() {
        let actions = actions_for(Tab::Receipts, false, false);
        assert!(!actions.contains(&Action::Delete));
        assert_eq!(actions.last(), Some(&Action::Quit));
        assert!(actions_for(Tab::Receipts, false, true).contains(&Action::Delete));
    }

    #[test]
    fn cancelled_sub_prompts_keep_the_session() {
        assert!(prompt_cancelled(InquireError::OperationCanceled).is_ok());
        assert!(prompt_cancelled(InquireError::OperationInterrupted).is_ok());
        assert!(prompt_cancelled(InquireError::NotTTY).is_err());
    }

    #[test]
    fn each_tab_links_to_the_other() {
        assert!(actions_for(Tab::Upload, false, false).contains(&Action::SwitchTab(Tab::Receipts)));
        assert!(actions_for(Tab::Receipts, false, false).contains(&Action::SwitchTab(Tab::Upload)));
    }
}
