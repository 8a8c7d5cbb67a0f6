//! Pure text renderers for the client views plus the terminal surface
//! that applies them.

use std::time::Instant;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use crate::models::{RawAmount, Receipt, ReceiptsSummary, UploadResult};
use crate::services::export::pretty_json;
use crate::services::state::{ReceiptsView, StatusBanner, Tab, UiState};
use crate::utils::{format_decimal, format_timestamp, or_placeholder, PLACEHOLDER};

pub const UNKNOWN_SUPPLIER: &str = "Unknown Supplier";
pub const EMPTY_RECEIPTS: &str = "No receipts yet. Upload an invoice to get started.";
pub const LOADING_RECEIPTS: &str = "Loading receipts...";

/// Where a rendered view ends up. The controller calls `apply` once per
/// flow step.
pub trait Surface {
    fn apply(&mut self, state: &UiState);
}

/// Prints each applied view to stdout.
#[derive(Default)]
pub struct TerminalSurface {
    last: Option<String>,
}

impl Surface for TerminalSurface {
    fn apply(&mut self, state: &UiState) {
        let view = render_view(state, Instant::now());
        if self.last.as_deref() == Some(view.as_str()) {
            return;
        }
        println!("{}", view);
        self.last = Some(view);
    }
}

pub fn render_view(state: &UiState, now: Instant) -> String {
    let mut out = vec![render_tabs(state.active_tab)];

    match state.active_tab {
        Tab::Upload => {
            if let Some(banner) = state.upload_status.visible_at(now) {
                out.push(render_status(banner));
            }
            if let Some(result) = &state.upload_result {
                match render_invoice_preview(result) {
                    Ok(preview) => out.push(preview),
                    Err(e) => out.push(format!("[error] {}", e)),
                }
            }
            if let Some(link) = &state.download_link {
                out.push(format!("Download: {}", link));
            }
        }
        Tab::Receipts => {
            if let Some(banner) = state.receipts_status.visible_at(now) {
                out.push(render_status(banner));
            }
            let receipts = render_receipts(&state.receipts);
            if !receipts.is_empty() {
                out.push(receipts);
            }
        }
    }

    out.join("\n\n")
}

pub fn render_tabs(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.name())
            } else {
                format!(" {} ", tab.name())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_status(banner: &StatusBanner) -> String {
    if banner.is_error {
        format!("[error] {}", banner.message)
    } else {
        banner.message.clone()
    }
}

pub fn render_invoice_preview(result: &UploadResult) -> Result<String> {
    pretty_json(&result.invoice)
}

pub fn render_receipts(view: &ReceiptsView) -> String {
    match view {
        ReceiptsView::Hidden | ReceiptsView::Cleared => String::new(),
        ReceiptsView::Loading => LOADING_RECEIPTS.to_string(),
        ReceiptsView::Loaded { receipts, summary } => {
            let mut out = vec![render_summary(summary)];
            if receipts.is_empty() {
                out.push(EMPTY_RECEIPTS.to_string());
            } else {
                out.extend(receipts.iter().map(render_receipt_card));
            }
            out.join("\n\n")
        }
    }
}

pub fn render_summary(summary: &ReceiptsSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Receipts", "Total", "Tax", "Subtotal", "Average"]);
    table.add_row(vec![
        Cell::new(summary.count),
        Cell::new(format_decimal(summary.total_sum)),
        Cell::new(format_decimal(summary.tax_sum)),
        Cell::new(format_decimal(summary.subtotal_sum)),
        Cell::new(format_decimal(summary.average)),
    ]);
    table.to_string()
}

pub fn render_receipt_card(receipt: &Receipt) -> String {
    let supplier = or_placeholder(receipt.supplier.as_deref(), UNKNOWN_SUPPLIER);
    let number = or_placeholder(receipt.invoice_number.as_deref(), PLACEHOLDER);
    let date = or_placeholder(receipt.invoice_date.as_deref(), PLACEHOLDER);
    let file = or_placeholder(receipt.filename.as_deref(), PLACEHOLDER);

    format!(
        "#{id} {supplier}\n  Invoice #: {number}  Date: {date}\n  Subtotal: {subtotal}  Tax: {tax}  Total: {total}\n  File: {file}  Uploaded: {uploaded}",
        id = receipt.id,
        subtotal = amount_text(receipt.subtotal.as_ref()),
        tax = amount_text(receipt.tax.as_ref()),
        total = amount_text(receipt.total.as_ref()),
        uploaded = format_timestamp(receipt.uploaded_at.as_deref()),
    )
}

fn amount_text(amount: Option<&RawAmount>) -> String {
    match amount {
        Some(RawAmount::Text(text)) if text.trim().is_empty() => PLACEHOLDER.to_string(),
        Some(amount) => amount.display(),
        None => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::summary::compute_summary;
    use serde_json::json;

    fn bare_receipt(id: i64) -> Receipt {
        Receipt {
            id,
            supplier: None,
            invoice_number: None,
            invoice_date: None,
            subtotal: None,
            tax: None,
            total: None,
            filename: None,
            uploaded_at: None,
        }
    }

    #[test]
    fn card_uses_placeholders_for_missing_fields() {
        let card = render_receipt_card(&bare_receipt(3));
        assert!(card.starts_with("#3 Unknown Supplier"));
        assert!(card.contains("Invoice #: N/A"));
        assert!(card.contains("Total: N/A"));
        assert!(card.contains("Uploaded: N/A"));
        assert!(!card.contains("undefined"));
        assert!(!card.contains("None"));
    }

    #[test]
    fn card_shows_present_fields() {
        let receipt = Receipt {
            supplier: Some("Acme".to_string()),
            invoice_number: Some("INV-9".to_string()),
            total: Some(RawAmount::Text("$12.00".to_string())),
            filename: Some("acme.pdf".to_string()),
            ..bare_receipt(9)
        };
        let card = render_receipt_card(&receipt);
        assert!(card.starts_with("#9 Acme"));
        assert!(card.contains("Invoice #: INV-9"));
        assert!(card.contains("Total: $12.00"));
        assert!(card.contains("File: acme.pdf"));
    }

    #[test]
    fn empty_collection_renders_empty_state_and_zero_summary() {
        let view = ReceiptsView::Loaded {
            receipts: Vec::new(),
            summary: compute_summary(&[]),
        };
        let text = render_receipts(&view);
        assert!(text.contains(EMPTY_RECEIPTS));
        assert!(text.contains("0.00"));
        assert!(!text.contains("#"));
    }

    #[test]
    fn loading_and_cleared_views() {
        assert_eq!(render_receipts(&ReceiptsView::Loading), LOADING_RECEIPTS);
        assert_eq!(render_receipts(&ReceiptsView::Cleared), "");
    }

    #[test]
    fn tabs_mark_the_active_one() {
        assert_eq!(render_tabs(Tab::Receipts), " upload  [receipts]");
    }

    #[test]
    fn upload_view_shows_preview() {
        let mut state = UiState::new(Tab::Upload);
        state.upload_result = Some(UploadResult {
            invoice: json!({"total": "100.00"}),
        });
        let view = render_view(&state, Instant::now());
        assert!(view.contains("{\n  \"total\": \"100.00\"\n}"));
    }

    #[test]
    fn error_status_is_marked() {
        let banner = StatusBanner::persistent("Server error: bad", true);
        assert_eq!(render_status(&banner), "[error] Server error: bad");
    }
}
