//! In-memory pack contents

use crate::error::Result;
use crate::header::Encoding;
use crate::{io, reader, writer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Numeric resource identifier, unique within one pack
pub type ResourceId = u16;

/// Logical contents of a pack: resource bytes keyed by id, plus the pack-wide
/// encoding
///
/// Two packs are equal when they hold the same `(id, bytes)` pairs and the
/// same encoding; how the bytes were laid out on disk does not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPack {
    pub resources: BTreeMap<ResourceId, Vec<u8>>,
    pub encoding: Encoding,
}

impl DataPack {
    /// Create an empty pack
    pub fn new(encoding: Encoding) -> Self {
        DataPack {
            resources: BTreeMap::new(),
            encoding,
        }
    }

    pub fn with_resources(resources: BTreeMap<ResourceId, Vec<u8>>, encoding: Encoding) -> Self {
        DataPack {
            resources,
            encoding,
        }
    }

    /// Insert a resource, returning the bytes it replaced
    pub fn insert(&mut self, id: ResourceId, bytes: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.resources.insert(id, bytes.into())
    }

    pub fn get(&self, id: ResourceId) -> Option<&[u8]> {
        self.resources.get(&id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.resources.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate resources in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &[u8])> {
        self.resources.iter().map(|(&id, bytes)| (id, bytes.as_slice()))
    }

    /// Decode a pack from bytes (any supported revision)
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        reader::decode(data)
    }

    /// Encode as the current pack revision
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        writer::encode(&self.resources, self.encoding)
    }

    /// Read and decode a pack file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening pack at {:?}", path.as_ref());
        Self::from_bytes(&io::read_file(path)?)
    }

    /// Encode and write to `path`, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        info!("Writing pack to {:?}", path.as_ref());
        io::write_file(path, &self.to_bytes()?)
    }
}

impl FromIterator<(ResourceId, Vec<u8>)> for DataPack {
    /// Collect into a `Binary` pack
    fn from_iter<I: IntoIterator<Item = (ResourceId, Vec<u8>)>>(iter: I) -> Self {
        DataPack::with_resources(iter.into_iter().collect(), Encoding::Binary)
    }
}
