//! Pack decoding for on-disk revisions 4, 5 and 6
//!
//! Legacy revisions (4, 5) store a main table of `{id: u16, offset: u32}`
//! entries with absolute file offsets and a trailing sentinel entry. Revision 6
//! stores a run-length id table, an alias table indexing into the expanded id
//! sequence, and tiered blob-relative offsets. See [`Header`].

use crate::core::{DataPack, ResourceId};
use crate::error::{DataPackError, Result};
use crate::header::{
    Header, ALIAS_ENTRY_SIZE, HEADER_SIZE_V6, ID_ENTRY_SIZE, INDEX_ENTRY_SIZE, SHORT_TIERS,
    TIER_WINDOW,
};
use crate::io::{slice_range, ByteReader};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

type Resources = BTreeMap<ResourceId, Vec<u8>>;

/// Decode a pack of any supported revision
///
/// # Errors
///
/// - `WrongFileVersion` if the version tag is not 4, 5 or 6
/// - `CorruptPack` on truncated or inconsistent tables
/// - `UnknownEncoding` if the encoding byte is not a known tag
pub fn decode(data: &[u8]) -> Result<DataPack> {
    let header = Header::from_bytes(data)?;
    debug!(
        "Decoding v{} pack: {} resources, {} aliases, {:?}",
        header.version, header.resource_count, header.alias_count, header.encoding
    );

    let resources = match header.version {
        4 | 5 => {
            warn!("Reading legacy v{} pack", header.version);
            read_legacy(data, &header)?
        }
        6 => read_v6(data, &header)?,
        other => return Err(DataPackError::WrongFileVersion(other)),
    };

    Ok(DataPack::with_resources(resources, header.encoding))
}

fn insert_unique(resources: &mut Resources, id: ResourceId, bytes: Vec<u8>) -> Result<()> {
    if resources.insert(id, bytes).is_some() {
        return Err(DataPackError::corrupt(format!(
            "resource id {} appears more than once",
            id
        )));
    }
    Ok(())
}

/// Entries a table may hold given the bytes left, so a forged count can't
/// drive a huge allocation
fn bounded_capacity(wanted: usize, reader: &ByteReader<'_>, entry_size: usize) -> usize {
    wanted.min(reader.remaining() / entry_size)
}

fn read_legacy(data: &[u8], header: &Header) -> Result<Resources> {
    let count = header.resource_count as usize;
    let mut reader = ByteReader::at(data, header.size())?;

    let mut entries = Vec::with_capacity(bounded_capacity(
        count.saturating_add(1),
        &reader,
        INDEX_ENTRY_SIZE,
    ));
    for _ in 0..=count {
        let id = reader.read_u16()?;
        let offset = reader.read_u32()? as usize;
        entries.push((id, offset));
    }

    let mut resources = Resources::new();
    for pair in entries.windows(2) {
        let (id, start) = pair[0];
        let (_, end) = pair[1];
        insert_unique(&mut resources, id, slice_range(data, start, end)?.to_vec())?;
    }

    for _ in 0..header.alias_count {
        let resource_id = reader.read_u16()?;
        let index = reader.read_u16()? as usize;
        // The sentinel entry is not a resource
        if index >= count {
            return Err(DataPackError::corrupt(format!(
                "alias {} points at index {} of a {} entry table",
                resource_id, index, count
            )));
        }
        let target = entries[index].0;
        let bytes = resources.get(&target).cloned().ok_or_else(|| {
            DataPackError::corrupt(format!("alias target {} has no data", target))
        })?;
        insert_unique(&mut resources, resource_id, bytes)?;
    }

    Ok(resources)
}

fn read_v6(data: &[u8], header: &Header) -> Result<Resources> {
    let count = header.resource_count as usize;
    let mut reader = ByteReader::at(data, HEADER_SIZE_V6)?;

    // resource_id_by_index
    let ids = expand_id_table(&mut reader, count, header.id_entries_count as usize)?;

    let mut aliases = Vec::with_capacity(bounded_capacity(
        header.alias_count as usize,
        &reader,
        ALIAS_ENTRY_SIZE,
    ));
    for _ in 0..header.alias_count {
        let resource_id = reader.read_u16()?;
        let index = reader.read_u16()? as usize;
        aliases.push((resource_id, index));
    }
    let alias_set: HashSet<ResourceId> = aliases.iter().map(|&(id, _)| id).collect();
    if alias_set.len() != aliases.len() {
        return Err(DataPackError::corrupt("alias table lists a resource twice"));
    }

    let offsets = read_offset_table(&mut reader, header, count)?;
    let blob = reader.take(reader.remaining())?;
    if let Some(&last) = offsets.last() {
        if last > blob.len() {
            return Err(DataPackError::corrupt(format!(
                "offset {} lies past the {} byte data blob",
                last,
                blob.len()
            )));
        }
    }

    // A stored range ends where the next index starts; the last one runs to
    // the end of the blob
    let mut resources = Resources::new();
    for (index, &id) in ids.iter().enumerate() {
        if alias_set.contains(&id) {
            continue;
        }
        let end = offsets.get(index + 1).copied().unwrap_or(blob.len());
        let bytes = slice_range(blob, offsets[index], end)?;
        insert_unique(&mut resources, id, bytes.to_vec())?;
    }

    for (resource_id, index) in aliases {
        let target = ids.get(index).copied().ok_or_else(|| {
            DataPackError::corrupt(format!(
                "alias {} points at index {} of a {} entry table",
                resource_id, index, count
            ))
        })?;
        // ids are strictly increasing
        if ids.binary_search(&resource_id).is_err() {
            return Err(DataPackError::corrupt(format!(
                "alias {} is missing from the id table",
                resource_id
            )));
        }
        if alias_set.contains(&target) {
            return Err(DataPackError::corrupt(format!(
                "alias {} targets {}, which is itself an alias",
                resource_id, target
            )));
        }
        let bytes = resources.get(&target).cloned().ok_or_else(|| {
            DataPackError::corrupt(format!(
                "alias {} targets {}, which has no stored data",
                resource_id, target
            ))
        })?;
        resources.insert(resource_id, bytes);
    }

    debug!(
        "Decoded {} resources from {} stored bytes",
        resources.len(),
        blob.len()
    );
    Ok(resources)
}

/// Expand the run-length id table into one id per index
///
/// Between two recorded entries both the id and the index advance by one per
/// step. The closing sentinel's index must equal the resource count.
fn expand_id_table(
    reader: &mut ByteReader<'_>,
    count: usize,
    entries_count: usize,
) -> Result<Vec<ResourceId>> {
    let mut entries =
        Vec::with_capacity(bounded_capacity(entries_count + 1, reader, ID_ENTRY_SIZE));
    for _ in 0..=entries_count {
        let id = reader.read_u16()?;
        let index = reader.read_u16()? as usize;
        entries.push((id, index));
    }

    let first_index = entries.first().map(|&(_, index)| index);
    let sentinel_index = entries.last().map(|&(_, index)| index);
    if sentinel_index != Some(count) || (entries_count > 0 && first_index != Some(0)) {
        return Err(DataPackError::corrupt(format!(
            "id table spans {:?}..{:?}, expected 0..{}",
            first_index, sentinel_index, count
        )));
    }

    let mut ids = Vec::with_capacity(count);
    for pair in entries.windows(2) {
        let (start_id, start_index) = pair[0];
        let (_, end_index) = pair[1];
        if end_index <= start_index {
            return Err(DataPackError::corrupt(format!(
                "id table indices not increasing at index {}",
                start_index
            )));
        }
        for step in 0..end_index - start_index {
            let id = ResourceId::try_from(start_id as usize + step).map_err(|_| {
                DataPackError::corrupt(format!("id run from {} overflows 16 bits", start_id))
            })?;
            ids.push(id);
        }
    }

    if ids.windows(2).any(|w| w[1] <= w[0]) {
        return Err(DataPackError::corrupt("id table ids are not strictly increasing"));
    }

    Ok(ids)
}

/// Read one offset per resource; the tier of each entry is fixed by its
/// position
fn read_offset_table(
    reader: &mut ByteReader<'_>,
    header: &Header,
    count: usize,
) -> Result<Vec<usize>> {
    let short = header.short_offset_count();
    if short > count {
        return Err(DataPackError::corrupt(format!(
            "tier counts {:?} exceed {} offsets",
            header.tier_counts, count
        )));
    }

    let window = TIER_WINDOW as usize;
    let mut offsets = Vec::with_capacity(count);
    for (tier, &tier_count) in header.tier_counts.iter().enumerate() {
        for _ in 0..tier_count {
            offsets.push(tier * window + reader.read_u16()? as usize);
        }
    }
    for _ in short..count {
        let stored = reader.read_u32()? as usize;
        let offset = (SHORT_TIERS * window).checked_add(stored).ok_or_else(|| {
            DataPackError::corrupt(format!("offset {} overflows the address space", stored))
        })?;
        offsets.push(offset);
    }

    if offsets.windows(2).any(|w| w[1] < w[0]) {
        return Err(DataPackError::corrupt("data offsets are not monotonic"));
    }

    Ok(offsets)
}
