use anyhow::Result;
use inquire::error::InquireError;
use inquire::Confirm as ConfirmPrompt;

use crate::error::ClientError;
use crate::render::Surface;
use crate::services::api::ReceiptApi;
use crate::services::controller::{AssumeYes, Confirm, Controller, DeleteOutcome};
use crate::services::state::Tab;

/// Asks on the terminal. Escape declines; a missing terminal or any
/// other prompt failure is reported instead of being read as "no".
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool, ClientError> {
        confirmation_answer(ConfirmPrompt::new(prompt).with_default(false).prompt())
    }
}

fn confirmation_answer(answer: Result<bool, InquireError>) -> Result<bool, ClientError> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled) => Ok(false),
        Err(err) => Err(ClientError::Prompt(err.to_string())),
    }
}

pub async fn list_receipts<A: ReceiptApi, S: Surface>(controller: &mut Controller<A, S>) -> Result<()> {
    controller.show_tab(Tab::Receipts).await?;
    Ok(())
}

pub async fn delete_receipt<A: ReceiptApi, S: Surface>(
    controller: &mut Controller<A, S>,
    id: i64,
    assume_yes: bool,
) -> Result<DeleteOutcome> {
    controller.show_tab(Tab::Receipts).await?;
    let outcome = if assume_yes {
        controller.delete_receipt(id, &AssumeYes).await?
    } else {
        controller.delete_receipt(id, &PromptConfirm).await?
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_declines() {
        assert!(!confirmation_answer(Err(InquireError::OperationCanceled)).unwrap());
        assert!(confirmation_answer(Ok(true)).unwrap());
        assert!(!confirmation_answer(Ok(false)).unwrap());
    }

    #[test]
    fn missing_terminal_is_reported() {
        let err = confirmation_answer(Err(InquireError::NotTTY)).unwrap_err();
        assert!(matches!(err, ClientError::Prompt(_)));
        let err = confirmation_answer(Err(InquireError::OperationInterrupted)).unwrap_err();
        assert!(matches!(err, ClientError::Prompt(_)));
    }
}
