//! API request and response types
//!
//! Only the fields this client reads are modelled; everything else in the
//! Zenodo payloads is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Upload type sent with every metadata update
pub const UPLOAD_TYPE: &str = "software";

/// Community every deposition is submitted to
pub const COMMUNITY_IDENTIFIER: &str = "odf-sweden";

/// Notes field attached to every deposition
pub const ATTRIBUTION_NOTE: &str = "Attribution notice: The code used to generate this model can be found \
at https://github.com/ocean-data-factory-sweden/koster_data_management";

/// A deposition as returned by the account listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposition {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted: Option<bool>,
}

/// Body of a successful deposition creation
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedDeposition {
    pub id: u64,
    pub links: CreatedDepositionLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedDepositionLinks {
    pub bucket: String,
}

/// A freshly created draft deposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposition {
    pub id: u64,
    /// Endpoint that raw file bytes are PUT to
    pub bucket_url: String,
}

impl From<CreatedDeposition> for NewDeposition {
    fn from(created: CreatedDeposition) -> Self {
        Self {
            id: created.id,
            bucket_url: created.links.bucket,
        }
    }
}

/// Response of a bucket PUT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketFile {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

/// Public record representation
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub files: Option<Vec<RecordFile>>,
}

/// One file attached to a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFile {
    /// File name inside the record
    pub key: String,

    pub links: FileLinks,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Creator entry of the deposition metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub affiliation: String,
}

/// Build creators from (name, affiliation) pairs, keeping their order
pub fn creators_from_mapping<I, N, A>(pairs: I) -> Vec<Creator>
where
    I: IntoIterator<Item = (N, A)>,
    N: Into<String>,
    A: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, affiliation)| Creator {
            name: name.into(),
            affiliation: affiliation.into(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub identifier: String,
}

/// Metadata document attached to a deposition before publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositionMetadata {
    pub title: String,
    pub upload_type: String,
    pub description: String,
    pub creators: Vec<Creator>,
    pub communities: Vec<Community>,
    pub notes: String,
}

impl DepositionMetadata {
    /// Metadata with the fixed upload type, community and attribution note
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        creators: Vec<Creator>,
    ) -> Self {
        Self {
            title: title.into(),
            upload_type: UPLOAD_TYPE.to_string(),
            description: description.into(),
            creators,
            communities: vec![Community {
                identifier: COMMUNITY_IDENTIFIER.to_string(),
            }],
            notes: ATTRIBUTION_NOTE.to_string(),
        }
    }
}

/// Wire wrapper: Zenodo expects `{"metadata": {...}}`
#[derive(Debug, Serialize)]
pub(crate) struct MetadataRequest<'a> {
    pub metadata: &'a DepositionMetadata,
}

/// Error body Zenodo sends with 4xx/5xx answers
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
