//! # DataPack - Compact Random-Access Resource Packs
//!
//! `datapack` reads and writes pack files: many small numbered byte blobs
//! (localized strings, images, raw resource bytes) bundled into one file
//! behind a single text encoding tag.
//!
//! - **Three on-disk revisions** read back (4, 5 and 6); revision 6 is always written
//! - **Deduplication**: byte-identical resources are stored once and aliased
//! - **Tiered offsets**: 16-bit offset tables for the first 192 KiB of data
//! - **Repacking**: merge packs with strict id-disjointness and encoding checks
//!
//! ## Quick Start
//!
//! ```rust
//! use datapack::{DataPack, Encoding, Result};
//!
//! # fn main() -> Result<()> {
//! let mut pack = DataPack::new(Encoding::Utf8);
//! pack.insert(4, "this is id 4");
//! pack.insert(6, "this is id 6");
//!
//! let bytes = pack.to_bytes()?;
//! let decoded = DataPack::from_bytes(&bytes)?;
//! assert_eq!(decoded, pack);
//! # Ok(())
//! # }
//! ```
//!
//! ## Repacking
//!
//! ```rust,no_run
//! use datapack::{repack_files, RepackOptions, Result};
//!
//! # fn main() -> Result<()> {
//! let options = RepackOptions::new()
//!     .whitelist_file("whitelist.txt")
//!     .suppress_removed_key_output();
//!
//! let merged = repack_files("out.pak", &["strings.pak", "images.pak"], &options)?;
//! println!("{} resources", merged.len());
//! # Ok(())
//! # }
//! ```

pub mod core;

// Short crate:: paths for the codec modules
#[allow(unused_imports)]
pub(crate) use self::core::{error, header, inspect, io, pack, reader, repack, writer};

pub use crate::core::{
    error::{DataPackError, Result},
    header::{Encoding, PACK_FILE_VERSION, SUPPORTED_VERSIONS},
    inspect::PackInfo,
    pack::{DataPack, ResourceId},
    reader::decode,
    repack::{
        parse_whitelist, read_whitelist, repack, repack_files, repack_from_bytes, RepackOptions,
        Repacker,
    },
    writer::{build_alias_map, encode},
};
