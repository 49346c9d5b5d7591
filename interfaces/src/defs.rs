use serde::{Deserialize, Serialize};

/// Envelope every endpoint of the classification service answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Content-sensitivity label assigned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Safe,
    Questionable,
    Explicit,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::Questionable => "questionable",
            Rating::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[label, score]` pair as it appears on the wire.
pub type WireTag = (String, f64);

/// The `character` field is either a scored list or a preformatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacterField {
    Scored(Vec<WireTag>),
    Text(String),
}

impl Default for CharacterField {
    fn default() -> Self {
        CharacterField::Scored(Vec::new())
    }
}

/// `data` of `GET /api/ddr?id=<identifier>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub general: Vec<WireTag>,
    #[serde(default)]
    pub character: CharacterField,
    pub rating: Rating,
    /// Base64 encoded image bytes, when the service inlines them.
    #[serde(default)]
    pub image: Option<String>,
}

/// `data` of `POST /api/ddr_bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPayload {
    pub ok: u32,
    #[serde(default)]
    pub ok_list: Vec<String>,
}

pub type TagResponse = ApiResponse<TagPayload>;
pub type UploadResponse = ApiResponse<UploadPayload>;
