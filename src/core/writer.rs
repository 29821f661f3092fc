//! Pack encoding (always the current revision)

use crate::core::ResourceId;
use crate::error::{DataPackError, Result};
use crate::header::{Encoding, Header, SHORT_TIERS, TIER_WINDOW};
use crate::io::{write_u16, write_u32};
use ahash::AHashMap;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub use crate::header::PACK_FILE_VERSION;

/// Map every resource whose bytes duplicate a lower-numbered resource to
/// that lowest id
///
/// Ids are folded in descending order so the smallest id sharing a content is
/// the last one written for it.
pub fn build_alias_map(
    resources: &BTreeMap<ResourceId, Vec<u8>>,
) -> BTreeMap<ResourceId, ResourceId> {
    let mut id_by_data: AHashMap<&[u8], ResourceId> = AHashMap::with_capacity(resources.len());
    for (&id, bytes) in resources.iter().rev() {
        id_by_data.insert(bytes.as_slice(), id);
    }

    resources
        .iter()
        .filter_map(|(&id, bytes)| {
            id_by_data
                .get(bytes.as_slice())
                .copied()
                .filter(|&canonical| canonical != id)
                .map(|canonical| (id, canonical))
        })
        .collect()
}

/// Tiered offset table under construction
///
/// Offsets arrive in non-decreasing order, so bucketing by value puts every
/// entry of a lower tier before every entry of a higher one.
#[derive(Debug, Default)]
struct OffsetTiers {
    short: [Vec<u16>; SHORT_TIERS],
    long: Vec<u32>,
}

impl OffsetTiers {
    fn push(&mut self, offset: u64) -> Option<()> {
        let window = TIER_WINDOW as u64;
        let tier = (offset / window) as usize;
        if tier < SHORT_TIERS {
            self.short[tier].push((offset - tier as u64 * window) as u16);
        } else {
            let stored = u32::try_from(offset - SHORT_TIERS as u64 * window).ok()?;
            self.long.push(stored);
        }
        Some(())
    }

    fn counts(&self) -> Result<[u16; SHORT_TIERS]> {
        let mut counts = [0u16; SHORT_TIERS];
        for (count, tier) in counts.iter_mut().zip(&self.short) {
            *count = u16::try_from(tier.len())
                .map_err(|_| DataPackError::TooManyResources(tier.len()))?;
        }
        Ok(counts)
    }

    fn write(&self, out: &mut Vec<u8>) {
        for tier in &self.short {
            for &offset in tier {
                write_u16(out, offset);
            }
        }
        for &offset in &self.long {
            write_u32(out, offset);
        }
    }
}

/// Encode resources as a version 6 pack
///
/// # Errors
///
/// - `TooManyResources` if there are more than 65535 resources
/// - `ResourceTooLarge` if the deduplicated data outgrows the 32-bit tier
pub fn encode(resources: &BTreeMap<ResourceId, Vec<u8>>, encoding: Encoding) -> Result<Vec<u8>> {
    let count = u16::try_from(resources.len())
        .map_err(|_| DataPackError::TooManyResources(resources.len()))?;

    let alias_map = build_alias_map(resources);

    // Id table: record only where the id sequence jumps
    let mut id_entries: Vec<(ResourceId, u16)> = Vec::new();
    let mut index_by_id: AHashMap<ResourceId, u16> = AHashMap::with_capacity(resources.len());
    let mut prev_id: Option<ResourceId> = None;
    for (index, &id) in resources.keys().enumerate() {
        let index = index as u16;
        if prev_id.map_or(true, |prev| id - prev > 1) {
            id_entries.push((id, index));
        }
        index_by_id.insert(id, index);
        prev_id = Some(id);
    }

    // One offset per resource; the last stored range ends at the end of the data
    let mut tiers = OffsetTiers::default();
    let mut blob = Vec::new();
    let mut data_offset: u64 = 0;
    for (&id, bytes) in resources {
        tiers
            .push(data_offset)
            .ok_or(DataPackError::ResourceTooLarge {
                id,
                offset: data_offset,
            })?;
        if !alias_map.contains_key(&id) {
            data_offset += bytes.len() as u64;
            blob.extend_from_slice(bytes);
        }
    }

    let mut header = Header::new(encoding);
    header.resource_count = count as u32;
    header.alias_count = alias_map.len() as u16;
    header.id_entries_count = id_entries.len() as u16;
    header.tier_counts = tiers.counts()?;

    debug!(
        "Pack layout: {} id entries, {} aliases, tiers {:?} + {} long offsets",
        header.id_entries_count,
        header.alias_count,
        header.tier_counts,
        tiers.long.len()
    );

    let mut out = header.to_bytes()?;
    for &(id, index) in &id_entries {
        write_u16(&mut out, id);
        write_u16(&mut out, index);
    }
    write_u16(&mut out, 0);
    write_u16(&mut out, count);

    for (&id, canonical) in &alias_map {
        let index = index_by_id.get(canonical).copied().ok_or_else(|| {
            DataPackError::corrupt(format!("alias target {} is not in the pack", canonical))
        })?;
        write_u16(&mut out, id);
        write_u16(&mut out, index);
    }

    tiers.write(&mut out);
    out.extend_from_slice(&blob);

    info!(
        "Encoded {} resources ({} aliased) into {} bytes",
        count,
        alias_map.len(),
        out.len()
    );
    Ok(out)
}
