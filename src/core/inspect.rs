//! Header-level summary of a pack, for tooling

use crate::error::Result;
use crate::header::{Encoding, Header};
use crate::reader;
use serde::{Deserialize, Serialize};

/// Summary of one pack buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub version: u32,
    pub encoding: Encoding,

    /// Logical resources, aliases included
    pub resource_count: usize,

    pub alias_count: usize,

    /// Resources whose bytes are stored once, shared through aliases
    pub unique_count: usize,

    /// Bytes of resource data in the logical view
    pub logical_bytes: usize,

    /// Total size of the pack buffer
    pub file_bytes: usize,

    /// v6 only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_entries_count: Option<u16>,

    /// v6 only: offsets in each 16-bit tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_counts: Option<[u16; 3]>,
}

impl PackInfo {
    /// Summarise a pack; the whole pack is decoded so a corrupt buffer fails
    /// here rather than producing a misleading summary
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = Header::from_bytes(data)?;
        let pack = reader::decode(data)?;

        let alias_count = header.alias_count as usize;
        let v6 = header.version == 6;

        Ok(PackInfo {
            version: header.version,
            encoding: header.encoding,
            resource_count: pack.len(),
            alias_count,
            unique_count: pack.len().saturating_sub(alias_count),
            logical_bytes: pack.iter().map(|(_, bytes)| bytes.len()).sum(),
            file_bytes: data.len(),
            id_entries_count: v6.then_some(header.id_entries_count),
            tier_counts: v6.then_some(header.tier_counts),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataPack;

    #[test]
    fn test_info_counts_aliases() {
        let mut pack = DataPack::new(Encoding::Utf8);
        pack.insert(1, "");
        pack.insert(4, "this is id 4");
        pack.insert(6, "this is id 6");
        pack.insert(10, "");

        let bytes = pack.to_bytes().unwrap();
        let info = PackInfo::from_bytes(&bytes).unwrap();
        assert_eq!(info.version, 6);
        assert_eq!(info.encoding, Encoding::Utf8);
        assert_eq!(info.resource_count, 4);
        assert_eq!(info.alias_count, 1);
        assert_eq!(info.unique_count, 3);
        assert_eq!(info.logical_bytes, 24);
        assert_eq!(info.file_bytes, bytes.len());
        assert_eq!(info.id_entries_count, Some(4));
        assert_eq!(info.tier_counts, Some([4, 0, 0]));
    }

    #[test]
    fn test_info_json() {
        let mut pack = DataPack::new(Encoding::Binary);
        pack.insert(7, vec![1, 2, 3]);

        let info = PackInfo::from_bytes(&pack.to_bytes().unwrap()).unwrap();
        let json = info.to_json().unwrap();
        let parsed: PackInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, info);
        assert!(json.contains("\"encoding\": \"Binary\""));
    }
}
