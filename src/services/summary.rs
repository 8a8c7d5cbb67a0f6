use crate::models::{Receipt, ReceiptsSummary};
use crate::utils::coerce_amount;

pub fn compute_summary(receipts: &[Receipt]) -> ReceiptsSummary {
    let mut total_sum = 0.0;
    let mut tax_sum = 0.0;
    let mut subtotal_sum = 0.0;

    for receipt in receipts {
        total_sum += coerce_amount(receipt.total.as_ref());
        tax_sum += coerce_amount(receipt.tax.as_ref());
        subtotal_sum += coerce_amount(receipt.subtotal.as_ref());
    }

    let count = receipts.len();
    let average = if count > 0 { total_sum / count as f64 } else { 0.0 };

    ReceiptsSummary {
        count,
        total_sum,
        tax_sum,
        subtotal_sum,
        average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAmount;

    fn receipt(id: i64, total: Option<RawAmount>, tax: Option<RawAmount>, subtotal: Option<RawAmount>) -> Receipt {
        Receipt {
            id,
            supplier: None,
            invoice_number: None,
            invoice_date: None,
            subtotal,
            tax,
            total,
            filename: None,
            uploaded_at: None,
        }
    }

    fn text(value: &str) -> Option<RawAmount> {
        Some(RawAmount::Text(value.to_string()))
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_sum, 0.0);
        assert_eq!(summary.tax_sum, 0.0);
        assert_eq!(summary.subtotal_sum, 0.0);
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn sums_mixed_amounts() {
        let receipts = vec![
            receipt(1, text("$1,000.00"), text("100"), text("900")),
            receipt(2, Some(RawAmount::Number(50.0)), None, text("abc")),
            receipt(3, None, text("5.50"), None),
        ];
        let summary = compute_summary(&receipts);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_sum, 1050.0);
        assert_eq!(summary.tax_sum, 105.5);
        assert_eq!(summary.subtotal_sum, 900.0);
        assert!((summary.average - 350.0).abs() < 1e-9);
    }

    #[test]
    fn recomputing_is_identical() {
        let receipts = vec![
            receipt(1, text("10.10"), text("1.01"), text("9.09")),
            receipt(2, text("20.20"), text("2.02"), text("18.18")),
        ];
        let first = compute_summary(&receipts);
        let second = compute_summary(&receipts);
        assert_eq!(first.total_sum.to_bits(), second.total_sum.to_bits());
        assert_eq!(first.average.to_bits(), second.average.to_bits());
        assert_eq!(first, second);
    }
}
