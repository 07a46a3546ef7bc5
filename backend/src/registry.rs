//! Receipt Registry - Store extracted receipts
//!
//! Every extracted receipt is saved as one JSON file named after its id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};

/// Directory where receipts are stored (relative to current dir)
pub const DEFAULT_REGISTRY_DIR: &str = ".cashflow/receipts";

/// A stored receipt with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Unique identifier
    pub id: String,
    /// Name of the uploaded image
    pub original_filename: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Extracted receipt, as returned to the client
    pub data: Value,
}

impl ReceiptRecord {
    pub fn vendor(&self) -> &str {
        self.data
            .get("vendor_name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Vendor")
    }

    pub fn total(&self) -> Option<f64> {
        self.data.get("total").and_then(Value::as_f64)
    }
}

/// Registry of extracted receipts
pub struct ReceiptRegistry {
    registry_dir: PathBuf,
    receipts: HashMap<String, ReceiptRecord>,
}

impl ReceiptRegistry {
    /// Create a registry in the default directory, loading existing receipts
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_REGISTRY_DIR)
    }

    /// Create a registry with a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let mut registry = Self {
            registry_dir: dir.as_ref().to_path_buf(),
            receipts: HashMap::new(),
        };
        registry.load_all();
        registry
    }

    /// Load every readable receipt file; unreadable files are skipped
    fn load_all(&mut self) {
        let entries = match fs::read_dir(&self.registry_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                let record = fs::read_to_string(&path)
                    .ok()
                    .and_then(|content| serde_json::from_str::<ReceiptRecord>(&content).ok());
                match record {
                    Some(record) => {
                        self.receipts.insert(record.id.clone(), record);
                    }
                    None => tracing::warn!("Skipping unreadable receipt file {}", path.display()),
                }
            }
        }
    }

    /// All receipts, newest first
    pub fn list(&self) -> Vec<&ReceiptRecord> {
        let mut receipts: Vec<_> = self.receipts.values().collect();
        receipts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        receipts
    }

    pub fn get(&self, id: &str) -> Option<&ReceiptRecord> {
        self.receipts.get(id)
    }

    /// Save a new receipt and return its id
    pub fn save(&mut self, data: Value, original_filename: &str) -> RegistryResult<String> {
        fs::create_dir_all(&self.registry_dir)?;

        let id = Uuid::new_v4().to_string();
        let record = ReceiptRecord {
            id: id.clone(),
            original_filename: original_filename.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            data,
        };

        let content = serde_json::to_string_pretty(&record)?;
        fs::write(self.path_of(&id), content)?;

        self.receipts.insert(id.clone(), record);
        Ok(id)
    }

    /// Delete a receipt
    pub fn delete(&mut self, id: &str) -> RegistryResult<()> {
        if self.receipts.remove(id).is_none() {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        fs::remove_file(self.path_of(id))?;
        Ok(())
    }

    fn path_of(&self, id: &str) -> PathBuf {
        self.registry_dir.join(format!("{}.json", id))
    }
}

impl Default for ReceiptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_reload() {
        let dir = tempdir().unwrap();
        let mut registry = ReceiptRegistry::with_dir(dir.path());
        let id = registry
            .save(json!({ "vendor_name": "Test Store", "total": 18.48 }), "receipt.jpg")
            .unwrap();

        let reloaded = ReceiptRegistry::with_dir(dir.path());
        let record = reloaded.get(&id).unwrap();
        assert_eq!(record.vendor(), "Test Store");
        assert_eq!(record.total(), Some(18.48));
        assert_eq!(record.original_filename, "receipt.jpg");
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let mut registry = ReceiptRegistry::with_dir(dir.path());
        let id = registry.save(json!({}), "a.png").unwrap();

        registry.delete(&id).unwrap();
        assert!(registry.get(&id).is_none());
        assert!(ReceiptRegistry::with_dir(dir.path()).list().is_empty());
        assert!(matches!(registry.delete(&id), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_unreadable_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let registry = ReceiptRegistry::with_dir(dir.path());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let registry = ReceiptRegistry::with_dir("/nonexistent/cashflow/receipts");
        assert!(registry.list().is_empty());
        assert_eq!(
            ReceiptRecord {
                id: "x".into(),
                original_filename: "x.jpg".into(),
                created_at: String::new(),
                data: json!({}),
            }
            .vendor(),
            "Unknown Vendor"
        );
    }
}
