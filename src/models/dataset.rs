//! Dataset identifiers, file listings and the Dataverse response envelope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page size for `list_dataset_files`
pub const DEFAULT_FILE_LIMIT: u64 = 20;

/// Identifier for a dataset: a persistent DOI or a numeric database id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetIdentifier {
    /// Always carries the `doi:` prefix
    Persistent(String),
    /// Database id, digits only
    Numeric(String),
}

impl DatasetIdentifier {
    /// Normalize user input: DOI URL, bare DOI, `doi:` DOI or numeric id.
    ///
    /// Returns `None` for blank input.
    ///
    /// ```
    /// use borealis_mcp::models::DatasetIdentifier;
    ///
    /// let id = DatasetIdentifier::parse("https://doi.org/10.34990/FK2/ABC123").unwrap();
    /// assert_eq!(id.as_str(), "doi:10.34990/FK2/ABC123");
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if input.starts_with("http") {
            let tail = input.rsplit("doi.org/").next().unwrap_or(input);
            return Some(Self::persistent(tail));
        }

        if input.bytes().all(|b| b.is_ascii_digit()) {
            return Some(DatasetIdentifier::Numeric(input.to_string()));
        }

        Some(Self::persistent(input))
    }

    fn persistent(value: &str) -> Self {
        let bare = match value.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("doi:") => &value[4..],
            _ => value,
        };
        DatasetIdentifier::Persistent(format!("doi:{}", bare))
    }

    pub fn as_str(&self) -> &str {
        match self {
            DatasetIdentifier::Persistent(id) | DatasetIdentifier::Numeric(id) => id,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, DatasetIdentifier::Persistent(_))
    }
}

impl fmt::Display for DatasetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard Dataverse response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub data: Option<T>,

    /// Present on paged endpoints such as the file listing
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<u64>,

    #[serde(default)]
    pub message: Option<String>,

    /// Error code carried by `status: "ERROR"` envelopes
    #[serde(default)]
    pub code: Option<u16>,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("OK")
    }

    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("ERROR")
    }
}

/// One entry of `/datasets/.../versions/:latest/files`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub restricted: bool,

    #[serde(rename = "dataFile", default)]
    pub data_file: DataFile,
}

/// The `dataFile` member of a file entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub friendly_type: Option<String>,

    #[serde(default)]
    pub filesize: u64,

    #[serde(default)]
    pub md5: Option<String>,
}

impl FileEntry {
    /// Display name: the stored filename, then the label
    pub fn filename(&self) -> &str {
        self.data_file
            .filename
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or("Unnamed file")
    }

    pub fn friendly_type(&self) -> &str {
        self.data_file.friendly_type.as_deref().unwrap_or("Unknown")
    }

    /// Case-insensitive substring match on filename or friendly type
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let filename = self.data_file.filename.as_deref().unwrap_or_default();
        let friendly = self.data_file.friendly_type.as_deref().unwrap_or_default();
        filename.to_lowercase().contains(&needle) || friendly.to_lowercase().contains(&needle)
    }
}

/// A page of the file listing
#[derive(Debug, Clone, Default)]
pub struct FilePage {
    pub files: Vec<FileEntry>,

    /// Total files in the dataset version, not just this page
    pub total_count: u64,
}

impl FilePage {
    /// Keep only the files matching `needle`; the total is left untouched
    pub fn filtered(self, needle: Option<&str>) -> Self {
        match needle {
            Some(needle) => Self {
                files: self.files.into_iter().filter(|f| f.matches(needle)).collect(),
                total_count: self.total_count,
            },
            None => self,
        }
    }
}
