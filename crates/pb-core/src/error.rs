//! Error types for schema validation and render-link decoding.

/// A canonical-schema validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema has no nodes")]
    NoNodes,
    #[error("node at index {index} has an empty id")]
    EmptyNodeId { index: usize },
    #[error("duplicate node id `{id}`")]
    DuplicateNodeId { id: String },
    #[error("duplicate edge id `{id}`")]
    DuplicateEdgeId { id: String },
    #[error("edge `{id}` has an empty source or target")]
    EmptyEdgeEndpoint { id: String },
    #[error("node `{id}` has a non-finite position")]
    NonFinitePosition { id: String },
    #[error("node `{id}` has an empty component type")]
    EmptyComponentType { id: String },
}

/// Failure to turn a render-link query parameter back into a schema.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("missing `{param}` query parameter")]
    MissingParameter { param: String },
    #[error("schema parameter is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded schema is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("decoded schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
