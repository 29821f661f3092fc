use crate::core::header::Encoding;
use crate::core::ResourceId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataPackError {
    #[error("Unsupported pack file version: {0}")]
    WrongFileVersion(u32),

    #[error("Corrupt pack: {0}")]
    CorruptPack(String),

    #[error("Unknown text encoding tag: {0}")]
    UnknownEncoding(u8),

    #[error("Duplicate resource ids across repack inputs: {0:?}")]
    DuplicateKey(Vec<ResourceId>),

    #[error("Inconsistent encodings: {chosen:?} vs {found:?}")]
    InconsistentEncoding { chosen: Encoding, found: Encoding },

    #[error("Too many resources for one pack: {0} (max 65535)")]
    TooManyResources(usize),

    #[error("Pack data too large at resource {id}: offset {offset} does not fit in 32 bits")]
    ResourceTooLarge { id: ResourceId, offset: u64 },

    /// `line` is 0 when the complaint is about the whole file
    #[error("Invalid whitelist (line {line}): {reason}")]
    InvalidWhitelist { line: usize, reason: String },

    #[error("Missing provenance file: {0}")]
    MissingInfoFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataPackError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        DataPackError::CorruptPack(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DataPackError>;
