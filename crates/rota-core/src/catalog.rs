//! Message-code catalog
//!
//! Every client-visible failure carries a stable code from this catalog. The
//! catalog is a two-level map (`category -> key -> entry`) loaded from JSON.
//! A built-in copy ships with the binary; a deployment may install its own
//! file at startup, before any error is constructed.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG: &str = include_str!("../resources/message_codes.json");

static GLOBAL: OnceLock<MessageCatalog> = OnceLock::new();

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCodeEntry {
    /// Stable machine-readable code (e.g. `S0006`)
    #[serde(rename = "Code")]
    pub code: String,
    /// Human-readable text, safe to show to clients
    #[serde(rename = "Message")]
    pub message: String,
    /// HTTP status associated with this code
    #[serde(rename = "StatusCode")]
    pub status_code: u16,
}

impl MessageCodeEntry {
    /// HTTP status as a typed value
    ///
    /// Entries are validated on load, so the 500 fallback only applies to
    /// entries constructed by hand.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Address of an entry inside the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub category: &'static str,
    pub key: &'static str,
}

impl CatalogKey {
    #[must_use]
    pub const fn new(category: &'static str, key: &'static str) -> Self {
        Self { category, key }
    }
}

impl std::fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.category, self.key)
    }
}

/// Well-known catalog addresses
pub mod keys {
    use super::CatalogKey;

    pub const OPERATION_SUCCESS: CatalogKey = CatalogKey::new("Common", "OperationSuccess");
    pub const OPERATION_FAIL: CatalogKey = CatalogKey::new("Common", "OperationFail");
    pub const RESOURCE_NOT_FOUND: CatalogKey = CatalogKey::new("Common", "ResourceNotFound");
    pub const PARTIAL_SUCCESS: CatalogKey = CatalogKey::new("Common", "PartialSuccess");

    pub const SERVICE_OPERATION_FAIL: CatalogKey = CatalogKey::new("Service", "OperationFail");
    pub const CONTROLLER_OPERATION_FAIL: CatalogKey = CatalogKey::new("Controller", "OperationFail");

    pub const SQL_OPERATION_FAIL: CatalogKey = CatalogKey::new("Sql", "OperationFail");
    pub const SQL_CREATE_FAIL: CatalogKey = CatalogKey::new("Sql", "CreateFail");
    pub const SQL_READ_FAIL: CatalogKey = CatalogKey::new("Sql", "ReadFail");
    pub const SQL_UPDATE_FAIL: CatalogKey = CatalogKey::new("Sql", "UpdateFail");
    pub const SQL_DELETE_FAIL: CatalogKey = CatalogKey::new("Sql", "DeleteFail");
    pub const SQL_RECORD_NOT_FOUND: CatalogKey = CatalogKey::new("Sql", "RecordNotFound");
    pub const SQL_RECORD_EXISTS: CatalogKey = CatalogKey::new("Sql", "RecordExists");

    pub const AUTH_ACCESS_DENIED: CatalogKey = CatalogKey::new("Auth", "AccessDenied");
    pub const AUTH_TOKEN_MISSING: CatalogKey = CatalogKey::new("Auth", "TokenMissing");
    pub const AUTH_TOKEN_EXPIRED: CatalogKey = CatalogKey::new("Auth", "TokenExpired");
    pub const AUTH_TOKEN_INVALID: CatalogKey = CatalogKey::new("Auth", "TokenInvalid");
    pub const AUTH_INVALID_EMAIL: CatalogKey = CatalogKey::new("Auth", "InvalidEmail");
    pub const AUTH_INVALID_PASSWORD: CatalogKey = CatalogKey::new("Auth", "InvalidPassword");
    pub const AUTH_INVALID_CREDENTIALS: CatalogKey = CatalogKey::new("Auth", "InvalidCredentials");
    pub const AUTH_DUPLICATE_REGISTRATION: CatalogKey = CatalogKey::new("Auth", "DuplicateRegistration");

    pub const VALIDATION_INVALID_REQUEST: CatalogKey = CatalogKey::new("Validation", "InvalidRequest");
    pub const VALIDATION_INVALID_FORM: CatalogKey = CatalogKey::new("Validation", "InvalidForm");
    pub const VALIDATION_INVALID_PARAM: CatalogKey = CatalogKey::new("Validation", "InvalidParam");
    pub const VALIDATION_INVALID_QUERY: CatalogKey = CatalogKey::new("Validation", "InvalidQuery");

    /// Entries the error taxonomy depends on; a custom catalog must define all of them
    pub const REQUIRED: &[CatalogKey] = &[
        OPERATION_SUCCESS,
        OPERATION_FAIL,
        PARTIAL_SUCCESS,
        SERVICE_OPERATION_FAIL,
        CONTROLLER_OPERATION_FAIL,
        SQL_OPERATION_FAIL,
        SQL_CREATE_FAIL,
        SQL_READ_FAIL,
        SQL_UPDATE_FAIL,
        SQL_DELETE_FAIL,
        SQL_RECORD_NOT_FOUND,
        SQL_RECORD_EXISTS,
        AUTH_ACCESS_DENIED,
        AUTH_TOKEN_MISSING,
        AUTH_TOKEN_EXPIRED,
        AUTH_TOKEN_INVALID,
        AUTH_INVALID_EMAIL,
        AUTH_INVALID_PASSWORD,
        AUTH_INVALID_CREDENTIALS,
        AUTH_DUPLICATE_REGISTRATION,
        VALIDATION_INVALID_REQUEST,
    ];
}

/// Failure to load or install a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read message catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed message catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("message code {code} has invalid HTTP status {status}")]
    InvalidStatus { code: String, status: u16 },
    #[error("message code {code} is defined by both {first} and {second}")]
    DuplicateCode { code: String, first: String, second: String },
    #[error("message catalog is missing required entry {0}")]
    MissingEntry(CatalogKey),
    #[error("a message catalog has already been installed")]
    AlreadyInstalled,
}

/// In-memory message-code catalog
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    categories: IndexMap<String, IndexMap<String, MessageCodeEntry>>,
}

impl MessageCatalog {
    /// Parse and validate a catalog from its JSON text
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed, a status is outside the
    /// HTTP range, a code is reused, or a required entry is missing
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let categories = serde_json::from_str(raw)?;
        let catalog = Self { categories };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read a catalog file from disk
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or fails validation
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&raw)
    }

    /// The catalog embedded in the binary
    #[must_use]
    #[allow(clippy::missing_panics_doc)]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).expect("embedded message catalog must be valid")
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen: HashMap<&str, String> = HashMap::new();

        for (category, entries) in &self.categories {
            for (key, entry) in entries {
                if !(100..=599).contains(&entry.status_code) {
                    return Err(CatalogError::InvalidStatus {
                        code: entry.code.clone(),
                        status: entry.status_code,
                    });
                }

                let address = format!("{category}.{key}");
                if let Some(first) = seen.insert(entry.code.as_str(), address.clone()) {
                    return Err(CatalogError::DuplicateCode {
                        code: entry.code.clone(),
                        first,
                        second: address,
                    });
                }
            }
        }

        for key in keys::REQUIRED {
            if self.get(*key).is_none() {
                return Err(CatalogError::MissingEntry(*key));
            }
        }

        Ok(())
    }

    /// Exact lookup by a well-known address
    #[must_use]
    pub fn get(&self, key: CatalogKey) -> Option<&MessageCodeEntry> {
        self.lookup(key.category, key.key)
    }

    /// Exact lookup by category and key
    #[must_use]
    pub fn lookup(&self, category: &str, key: &str) -> Option<&MessageCodeEntry> {
        self.categories.get(category)?.get(key)
    }

    /// Find an entry by its code, scanning every category
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&MessageCodeEntry> {
        self.categories
            .values()
            .flat_map(IndexMap::values)
            .find(|entry| entry.code == code)
    }

    /// Entry for `key`, or the generic failure entry when it is absent
    #[must_use]
    pub fn entry_or_fallback(&self, key: CatalogKey) -> MessageCodeEntry {
        self.get(key)
            .or_else(|| self.get(keys::OPERATION_FAIL))
            .cloned()
            .unwrap_or_else(fallback_entry)
    }

    /// Total number of entries across all categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn fallback_entry() -> MessageCodeEntry {
    MessageCodeEntry {
        code: "C0001".to_owned(),
        message: "The operation could not be completed".to_owned(),
        status_code: 500,
    }
}

/// Install the process-wide catalog
///
/// Must run before the first call to [`global`].
///
/// # Errors
///
/// Returns [`CatalogError::AlreadyInstalled`] when a catalog is already in place
pub fn install(catalog: MessageCatalog) -> Result<(), CatalogError> {
    let entries = catalog.len();
    GLOBAL.set(catalog).map_err(|_| CatalogError::AlreadyInstalled)?;
    tracing::debug!(entries, "message catalog installed");
    Ok(())
}

/// The process-wide catalog, defaulting to the built-in one
pub fn global() -> &'static MessageCatalog {
    GLOBAL.get_or_init(MessageCatalog::builtin)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_catalog_has_every_required_entry() {
        let catalog = MessageCatalog::builtin();

        for key in keys::REQUIRED {
            assert!(catalog.get(*key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn lookup_by_address() {
        let catalog = MessageCatalog::builtin();
        let entry = catalog.get(keys::SQL_RECORD_NOT_FOUND).unwrap();

        assert_eq!(entry.code, "S0006");
        assert_eq!(entry.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lookup_by_code_scans_all_categories() {
        let catalog = MessageCatalog::builtin();
        let entry = catalog.find_by_code("A0003").unwrap();

        assert_eq!(entry, catalog.get(keys::AUTH_TOKEN_EXPIRED).unwrap());
        assert!(catalog.find_by_code("Z9999").is_none());
    }

    #[test]
    fn unknown_key_falls_back_to_operation_fail() {
        let catalog = MessageCatalog::builtin();
        let entry = catalog.entry_or_fallback(CatalogKey::new("Nope", "Missing"));

        assert_eq!(entry.code, "C0001");
        assert_eq!(entry.status_code, 500);
    }

    #[test]
    fn rejects_out_of_range_status() {
        let raw = r#"{"Common": {"OperationFail": {"Code": "C0001", "Message": "x", "StatusCode": 42}}}"#;
        let err = MessageCatalog::from_json(raw).unwrap_err();

        assert!(matches!(err, CatalogError::InvalidStatus { status: 42, .. }));
    }

    #[test]
    fn rejects_duplicate_codes() {
        let raw = r#"{
            "Common": {"OperationFail": {"Code": "X1", "Message": "a", "StatusCode": 500}},
            "Sql": {"ReadFail": {"Code": "X1", "Message": "b", "StatusCode": 500}}
        }"#;
        let err = MessageCatalog::from_json(raw).unwrap_err();

        let CatalogError::DuplicateCode { code, first, second } = err else {
            unreachable!("expected duplicate code error, got {err:?}");
        };
        assert_eq!(code, "X1");
        assert_eq!(first, "Common.OperationFail");
        assert_eq!(second, "Sql.ReadFail");
    }

    #[test]
    fn rejects_catalog_missing_required_entries() {
        let raw = r#"{"Common": {"OperationFail": {"Code": "C0001", "Message": "x", "StatusCode": 500}}}"#;
        let err = MessageCatalog::from_json(raw).unwrap_err();

        assert!(matches!(err, CatalogError::MissingEntry(key) if key == keys::OPERATION_SUCCESS));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = MessageCatalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUILTIN_CATALOG.as_bytes()).unwrap();

        let catalog = MessageCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), MessageCatalog::builtin().len());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MessageCatalog::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
