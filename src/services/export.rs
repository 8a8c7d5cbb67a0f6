use std::path::Path;

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

pub const EXPORT_FILE_NAME: &str = "invoice.json";
pub const EXPORT_MIME: &str = "application/json";

/// The current extraction result as a downloadable blob, independent of
/// how it is eventually saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedResult {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedResult {
    pub fn from_invoice(invoice: &Value) -> Result<Self> {
        let pretty = pretty_json(invoice)?;
        Ok(ExportedResult {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime: EXPORT_MIME,
            bytes: pretty.into_bytes(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};charset=utf-8;base64,{}",
            self.mime,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes).map_err(|e| anyhow!("Write {}: {}", path.display(), e))
    }
}

/// Two-space indented JSON, the same text shown in the preview.
pub fn pretty_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| anyhow!("Serialize invoice: {}", e))
}

/// Inverse of [`ExportedResult::to_data_uri`].
#[cfg(test)]
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| anyhow!("Not a base64 data URI"))?;
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| anyhow!("Decode data URI: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_and_download_share_content() {
        let invoice = json!({"total": "100.00"});
        let export = ExportedResult::from_invoice(&invoice).unwrap();
        let expected = "{\n  \"total\": \"100.00\"\n}";

        assert_eq!(pretty_json(&invoice).unwrap(), expected);
        assert_eq!(export.bytes, expected.as_bytes());
        assert_eq!(export.file_name, "invoice.json");

        let uri = export.to_data_uri();
        assert!(uri.starts_with("data:application/json;charset=utf-8;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), expected.as_bytes());
    }

    #[test]
    fn pretty_json_keeps_server_key_order() {
        let invoice: Value = serde_json::from_str(r#"{"supplier":"Acme","invoice_number":"7","total":"1"}"#).unwrap();
        let text = pretty_json(&invoice).unwrap();
        let supplier = text.find("supplier").unwrap();
        let number = text.find("invoice_number").unwrap();
        assert!(supplier < number);
    }

    #[test]
    fn save_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.json");
        let export = ExportedResult::from_invoice(&json!({"tax": null})).unwrap();
        export.save_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"tax\": null\n}");
    }
}
