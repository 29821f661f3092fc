//! Reading the legacy v4 and v5 layouts

mod common;

use common::{sample_pack, write_v4, write_v5};
use datapack::{DataPack, Encoding, PackInfo};

fn mixed_pack() -> DataPack {
    let mut pack = DataPack::new(Encoding::Utf16);
    pack.insert(2, "shared");
    pack.insert(3, "unique");
    pack.insert(9, "shared");
    pack.insert(500, "");
    pack.insert(501, "");
    pack
}

#[test]
fn test_v4_matches_v6() {
    for pack in [sample_pack(), mixed_pack()] {
        let from_v4 = DataPack::from_bytes(&write_v4(&pack)).unwrap();
        let from_v6 = DataPack::from_bytes(&pack.to_bytes().unwrap()).unwrap();
        assert_eq!(from_v4, pack);
        assert_eq!(from_v4, from_v6);
    }
}

#[test]
fn test_v5_matches_v6() {
    for pack in [sample_pack(), mixed_pack()] {
        let from_v5 = DataPack::from_bytes(&write_v5(&pack)).unwrap();
        let from_v6 = DataPack::from_bytes(&pack.to_bytes().unwrap()).unwrap();
        assert_eq!(from_v5, pack);
        assert_eq!(from_v5, from_v6);
    }
}

#[test]
fn test_v5_aliases_resolved() {
    let bytes = write_v5(&mixed_pack());
    let info = PackInfo::from_bytes(&bytes).unwrap();
    assert_eq!(info.version, 5);
    assert_eq!(info.alias_count, 2);
    assert_eq!(info.resource_count, 5);
    assert_eq!(info.id_entries_count, None);
    assert_eq!(info.tier_counts, None);

    let pack = DataPack::from_bytes(&bytes).unwrap();
    assert_eq!(pack.get(9), Some(&b"shared"[..]));
    assert_eq!(pack.get(501), Some(&b""[..]));
}

#[test]
fn test_legacy_pack_rewritten_as_current() {
    let legacy = write_v4(&mixed_pack());
    let upgraded = DataPack::from_bytes(&legacy).unwrap().to_bytes().unwrap();
    assert_eq!(&upgraded[..4], &6u32.to_le_bytes());
    assert_eq!(DataPack::from_bytes(&upgraded).unwrap(), mixed_pack());
}

#[test]
fn test_empty_legacy_packs() {
    let empty = DataPack::new(Encoding::Binary);
    assert_eq!(DataPack::from_bytes(&write_v4(&empty)).unwrap(), empty);
    assert_eq!(DataPack::from_bytes(&write_v5(&empty)).unwrap(), empty);
}
