//! Shared fixtures for integration tests
//!
//! Builds packs in the legacy v4/v5 layouts, which the crate reads but never
//! writes.

#![allow(dead_code)]

use datapack::{build_alias_map, DataPack, ResourceId};
use std::collections::HashMap;

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Version 4: `version:u32 count:u32 encoding:u8`, then `count + 1` main
/// table entries with absolute offsets. No aliases.
pub fn write_v4(pack: &DataPack) -> Vec<u8> {
    let count = pack.len();
    let mut out = Vec::new();
    push_u32(&mut out, 4);
    push_u32(&mut out, count as u32);
    out.push(pack.encoding as u8);

    let mut data_offset = (9 + (count + 1) * 6) as u32;
    for (id, bytes) in pack.iter() {
        push_u16(&mut out, id);
        push_u32(&mut out, data_offset);
        data_offset += bytes.len() as u32;
    }
    push_u16(&mut out, 0);
    push_u32(&mut out, data_offset);

    for (_, bytes) in pack.iter() {
        out.extend_from_slice(bytes);
    }
    out
}

/// Version 5: `version:u32 encoding:u8 pad[3] count:u16 alias_count:u16`,
/// main table of stored resources only, then the alias table.
pub fn write_v5(pack: &DataPack) -> Vec<u8> {
    let aliases = build_alias_map(&pack.resources);
    let stored: Vec<(ResourceId, &[u8])> = pack
        .iter()
        .filter(|(id, _)| !aliases.contains_key(id))
        .collect();
    let index_by_id: HashMap<ResourceId, u16> = stored
        .iter()
        .enumerate()
        .map(|(index, &(id, _))| (id, index as u16))
        .collect();

    let mut out = Vec::new();
    push_u32(&mut out, 5);
    out.extend_from_slice(&[pack.encoding as u8, 0, 0, 0]);
    push_u16(&mut out, stored.len() as u16);
    push_u16(&mut out, aliases.len() as u16);

    let mut data_offset = (12 + (stored.len() + 1) * 6 + aliases.len() * 4) as u32;
    for &(id, bytes) in &stored {
        push_u16(&mut out, id);
        push_u32(&mut out, data_offset);
        data_offset += bytes.len() as u32;
    }
    push_u16(&mut out, 0);
    push_u32(&mut out, data_offset);

    for (&id, canonical) in &aliases {
        push_u16(&mut out, id);
        push_u16(&mut out, index_by_id[canonical]);
    }

    for &(_, bytes) in &stored {
        out.extend_from_slice(bytes);
    }
    out
}

/// The four-resource pack used throughout the docs
pub fn sample_pack() -> DataPack {
    let mut pack = DataPack::new(datapack::Encoding::Utf8);
    pack.insert(1, "");
    pack.insert(4, "this is id 4");
    pack.insert(6, "this is id 6");
    pack.insert(10, "");
    pack
}
