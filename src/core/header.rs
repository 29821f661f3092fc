use crate::error::{DataPackError, Result};
use crate::io::{write_u16, write_u32, write_u8, ByteReader};
use serde::{Deserialize, Serialize};

/// Version written by the encoder
pub const PACK_FILE_VERSION: u32 = 6;

/// Versions the decoder accepts
pub const SUPPORTED_VERSIONS: [u32; 3] = [4, 5, 6];

pub const HEADER_SIZE_V4: usize = 9;
pub const HEADER_SIZE_V5: usize = 12;
pub const HEADER_SIZE_V6: usize = 20;

/// v4/v5 main table entry: u16 id + u32 absolute offset
pub const INDEX_ENTRY_SIZE: usize = 6;

/// Alias entry (v5, v6) and v6 id-table entry: u16 id + u16 index
pub const ALIAS_ENTRY_SIZE: usize = 4;
pub const ID_ENTRY_SIZE: usize = 4;

/// Width of one 16-bit offset tier
pub const TIER_WINDOW: u32 = 0x1_0000;

/// Number of 16-bit offset tiers before the 32-bit overflow tier
pub const SHORT_TIERS: usize = 3;

/// Text encoding shared by every resource in a pack
///
/// `Binary` doubles as "don't care" when packs are merged.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Binary = 0,
    Utf8 = 1,
    Utf16 = 2,
}

impl Encoding {
    /// Parse the on-disk encoding byte
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Encoding::Binary),
            1 => Ok(Encoding::Utf8),
            2 => Ok(Encoding::Utf16),
            other => Err(DataPackError::UnknownEncoding(other)),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Pack header, normalised across the three on-disk revisions
///
/// # Layout
///
/// ```text
/// v4: version:u32 resource_count:u32 encoding:u8                              (9 bytes)
/// v5: version:u32 encoding:u8 pad[3] resource_count:u16 alias_count:u16       (12 bytes)
/// v6: v5 fields, then id_entries_count:u16 tier_counts:[u16; 3]               (20 bytes)
/// ```
///
/// Fields a revision does not carry read back as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub encoding: Encoding,
    /// v4/v5: entries in the main table. v6: logical resources, aliases included.
    pub resource_count: u32,
    pub alias_count: u16,
    /// v6 only: gap entries in the id table, closing sentinel excluded
    pub id_entries_count: u16,
    /// v6 only: offsets stored in each 16-bit tier
    pub tier_counts: [u16; SHORT_TIERS],
}

impl Header {
    /// Create a current-version header
    pub fn new(encoding: Encoding) -> Self {
        Header {
            version: PACK_FILE_VERSION,
            encoding,
            resource_count: 0,
            alias_count: 0,
            id_entries_count: 0,
            tier_counts: [0; SHORT_TIERS],
        }
    }

    /// Serialized size of this header's revision
    pub fn size(&self) -> usize {
        match self.version {
            4 => HEADER_SIZE_V4,
            5 => HEADER_SIZE_V5,
            _ => HEADER_SIZE_V6,
        }
    }

    /// Number of offsets held in the three 16-bit tiers
    pub fn short_offset_count(&self) -> usize {
        self.tier_counts.iter().map(|&c| c as usize).sum()
    }

    /// Read the version tag without parsing the rest of the header
    pub fn peek_version(bytes: &[u8]) -> Result<u32> {
        ByteReader::new(bytes).read_u32()
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.size());
        write_u32(&mut bytes, self.version);

        match self.version {
            4 => {
                write_u32(&mut bytes, self.resource_count);
                write_u8(&mut bytes, self.encoding.as_u8());
            }
            5 | 6 => {
                let resource_count = u16::try_from(self.resource_count)
                    .map_err(|_| DataPackError::TooManyResources(self.resource_count as usize))?;
                write_u8(&mut bytes, self.encoding.as_u8());
                bytes.extend_from_slice(&[0u8; 3]);
                write_u16(&mut bytes, resource_count);
                write_u16(&mut bytes, self.alias_count);
                if self.version == 6 {
                    write_u16(&mut bytes, self.id_entries_count);
                    for count in self.tier_counts {
                        write_u16(&mut bytes, count);
                    }
                }
            }
            other => return Err(DataPackError::WrongFileVersion(other)),
        }

        debug_assert_eq!(bytes.len(), self.size());
        Ok(bytes)
    }

    /// Deserialize header from bytes, dispatching on the version tag
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u32()?;

        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(DataPackError::WrongFileVersion(version));
        }

        let mut header = Header {
            version,
            ..Header::new(Encoding::Binary)
        };

        if version == 4 {
            header.resource_count = reader.read_u32()?;
            header.encoding = Encoding::from_u8(reader.read_u8()?)?;
            return Ok(header);
        }

        header.encoding = Encoding::from_u8(reader.read_u8()?)?;
        reader.skip(3)?;
        header.resource_count = reader.read_u16()? as u32;
        header.alias_count = reader.read_u16()?;

        if version == 6 {
            header.id_entries_count = reader.read_u16()?;
            for count in header.tier_counts.iter_mut() {
                *count = reader.read_u16()?;
            }
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_u8() {
        assert_eq!(Encoding::from_u8(0).unwrap(), Encoding::Binary);
        assert_eq!(Encoding::from_u8(1).unwrap(), Encoding::Utf8);
        assert_eq!(Encoding::from_u8(2).unwrap(), Encoding::Utf16);
        assert!(matches!(
            Encoding::from_u8(3),
            Err(DataPackError::UnknownEncoding(3))
        ));
    }

    #[test]
    fn test_v6_header_layout() {
        let mut header = Header::new(Encoding::Utf8);
        header.resource_count = 4;
        header.alias_count = 1;
        header.id_entries_count = 3;
        header.tier_counts = [5, 0, 0];

        let bytes = header.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE_V6);
        assert_eq!(
            bytes,
            vec![6, 0, 0, 0, 1, 0, 0, 0, 4, 0, 1, 0, 3, 0, 5, 0, 0, 0, 0, 0]
        );
        assert_eq!(Header::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_v5_header_layout() {
        let header = Header {
            version: 5,
            encoding: Encoding::Utf16,
            resource_count: 2,
            alias_count: 1,
            ..Header::new(Encoding::Binary)
        };
        let bytes = header.to_bytes().unwrap();
        assert_eq!(bytes, vec![5, 0, 0, 0, 2, 0, 0, 0, 2, 0, 1, 0]);

        let parsed = Header::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.resource_count, 2);
        assert_eq!(parsed.alias_count, 1);
        assert_eq!(parsed.size(), HEADER_SIZE_V5);
    }

    #[test]
    fn test_v4_header_layout() {
        let bytes = [4, 0, 0, 0, 3, 0, 0, 0, 1];
        let header = Header::from_bytes(&bytes).unwrap();
        assert_eq!(header.version, 4);
        assert_eq!(header.resource_count, 3);
        assert_eq!(header.encoding, Encoding::Utf8);
        assert_eq!(header.alias_count, 0);
        assert_eq!(header.to_bytes().unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_unknown_versions_rejected() {
        for version in [0u32, 1, 3, 7, 255, u32::MAX] {
            let mut bytes = version.to_le_bytes().to_vec();
            bytes.resize(HEADER_SIZE_V6, 0);
            assert!(matches!(
                Header::from_bytes(&bytes),
                Err(DataPackError::WrongFileVersion(v)) if v == version
            ));
        }
    }

    #[test]
    fn test_truncated_header() {
        let mut header = Header::new(Encoding::Binary);
        header.resource_count = 1;
        let bytes = header.to_bytes().unwrap();
        assert!(matches!(
            Header::from_bytes(&bytes[..HEADER_SIZE_V6 - 1]),
            Err(DataPackError::CorruptPack(_))
        ));
        assert!(matches!(
            Header::from_bytes(&[6, 0]),
            Err(DataPackError::CorruptPack(_))
        ));
    }

    #[test]
    fn test_v5_count_overflow() {
        let header = Header {
            version: 5,
            resource_count: 70_000,
            ..Header::new(Encoding::Binary)
        };
        assert!(matches!(
            header.to_bytes(),
            Err(DataPackError::TooManyResources(70_000))
        ));
    }
}
