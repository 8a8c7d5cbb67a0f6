use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Amount fields arrive either as JSON numbers or as free-form text
/// such as `"$1,234.56"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    pub fn display(&self) -> String {
        match self {
            RawAmount::Number(value) => value.to_string(),
            RawAmount::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub subtotal: Option<RawAmount>,
    #[serde(default)]
    pub tax: Option<RawAmount>,
    #[serde(default)]
    pub total: Option<RawAmount>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptsResponse {
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}

/// Body of a successful `/extract` call. The service has used both key
/// names over time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub invoice_json: Option<Value>,
    #[serde(default)]
    pub invoice: Option<Value>,
}

impl ExtractResponse {
    pub fn into_invoice(self) -> Value {
        self.invoice_json
            .filter(|value| !value.is_null())
            .or(self.invoice.filter(|value| !value.is_null()))
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// A PDF picked by the user, ready to be posted.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub invoice: Value,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiptsSummary {
    pub count: usize,
    pub total_sum: f64,
    pub tax_sum: f64,
    pub subtotal_sum: f64,
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_response_prefers_invoice_json() {
        let response: ExtractResponse = serde_json::from_value(json!({
            "invoice_json": {"total": "100.00"},
            "invoice": {"total": "1.00"}
        }))
        .unwrap();
        assert_eq!(response.into_invoice(), json!({"total": "100.00"}));
    }

    #[test]
    fn extract_response_falls_back_to_invoice_then_empty() {
        let response: ExtractResponse =
            serde_json::from_value(json!({"invoice_json": null, "invoice": {"tax": "5"}})).unwrap();
        assert_eq!(response.into_invoice(), json!({"tax": "5"}));

        let response: ExtractResponse = serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert_eq!(response.into_invoice(), json!({}));
    }

    #[test]
    fn receipt_tolerates_missing_and_mixed_fields() {
        let receipt: Receipt = serde_json::from_value(json!({
            "id": 7,
            "supplier": null,
            "total": 42.5,
            "tax": "$4.25"
        }))
        .unwrap();
        assert_eq!(receipt.id, 7);
        assert_eq!(receipt.supplier, None);
        assert_eq!(receipt.total, Some(RawAmount::Number(42.5)));
        assert_eq!(receipt.tax, Some(RawAmount::Text("$4.25".to_string())));
        assert_eq!(receipt.uploaded_at, None);
    }
}
