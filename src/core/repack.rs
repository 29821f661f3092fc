//! Merging several packs into one
//!
//! Inputs must be disjoint by resource id and agree on their text encoding
//! (`Binary` is compatible with anything). An optional whitelist keeps only
//! the listed ids.

use crate::core::{DataPack, ResourceId};
use crate::error::{DataPackError, Result};
use crate::header::Encoding;
use crate::{io, reader};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of the provenance side file that travels with each pack
pub const INFO_EXTENSION: &str = ".info";

/// Options for [`repack_files`]
///
/// Build with the fluent setters or load from TOML:
///
/// ```
/// use datapack::RepackOptions;
///
/// let options = RepackOptions::from_toml_str(
///     r#"
///     whitelist = "resources/whitelist.txt"
///     suppress_removed_key_output = true
///     "#,
/// ).unwrap();
/// assert!(options.suppress_removed_key_output);
/// assert!(options.write_info);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepackOptions {
    /// File listing the ids to keep, one decimal id per line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<PathBuf>,

    /// Don't log each id the whitelist removes
    pub suppress_removed_key_output: bool,

    /// Concatenate the inputs' `.info` files next to the output
    pub write_info: bool,
}

impl RepackOptions {
    pub fn new() -> Self {
        RepackOptions {
            whitelist: None,
            suppress_removed_key_output: false,
            write_info: true,
        }
    }

    pub fn whitelist_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.whitelist = Some(path.into());
        self
    }

    pub fn suppress_removed_key_output(mut self) -> Self {
        self.suppress_removed_key_output = true;
        self
    }

    pub fn without_info(mut self) -> Self {
        self.write_info = false;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for RepackOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates packs one at a time
#[derive(Debug)]
pub struct Repacker<'a> {
    resources: BTreeMap<ResourceId, Vec<u8>>,
    encoding: Option<Encoding>,
    whitelist: Option<&'a BTreeSet<ResourceId>>,
    suppress_removed_key_output: bool,
    removed: usize,
}

impl<'a> Repacker<'a> {
    pub fn new(
        whitelist: Option<&'a BTreeSet<ResourceId>>,
        suppress_removed_key_output: bool,
    ) -> Self {
        Repacker {
            resources: BTreeMap::new(),
            encoding: None,
            whitelist,
            suppress_removed_key_output,
            removed: 0,
        }
    }

    /// Fold one pack into the result
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` if any id of `pack` is already present
    /// - `InconsistentEncoding` if `pack` has a different non-`Binary` encoding
    ///   than the one chosen so far
    pub fn add(&mut self, pack: DataPack) -> Result<()> {
        let duplicates: Vec<ResourceId> = pack
            .resources
            .keys()
            .copied()
            .filter(|id| self.resources.contains_key(id))
            .collect();
        if !duplicates.is_empty() {
            return Err(DataPackError::DuplicateKey(duplicates));
        }

        self.encoding = match self.encoding {
            None | Some(Encoding::Binary) => Some(pack.encoding),
            Some(chosen) if pack.encoding == Encoding::Binary || pack.encoding == chosen => {
                Some(chosen)
            }
            Some(chosen) => {
                return Err(DataPackError::InconsistentEncoding {
                    chosen,
                    found: pack.encoding,
                })
            }
        };

        let incoming = pack.resources.len();
        for (id, bytes) in pack.resources {
            match self.whitelist {
                Some(whitelist) if !whitelist.contains(&id) => {
                    self.removed += 1;
                    if !self.suppress_removed_key_output {
                        info!("RePack: {} not in whitelist", id);
                    }
                }
                _ => {
                    self.resources.insert(id, bytes);
                }
            }
        }

        debug!(
            "Merged {} resources ({} total so far)",
            incoming,
            self.resources.len()
        );
        Ok(())
    }

    /// Number of ids dropped by the whitelist so far
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// The merged pack; `Binary` if no input carried an encoding
    pub fn finish(self) -> DataPack {
        DataPack::with_resources(self.resources, self.encoding.unwrap_or_default())
    }
}

/// Merge decoded packs, left to right
pub fn repack<I>(
    inputs: I,
    whitelist: Option<&BTreeSet<ResourceId>>,
    suppress_removed_key_output: bool,
) -> Result<DataPack>
where
    I: IntoIterator<Item = DataPack>,
{
    let mut repacker = Repacker::new(whitelist, suppress_removed_key_output);
    for pack in inputs {
        repacker.add(pack)?;
    }
    let merged = repacker.finish();
    info!(
        "Repacked {} resources ({:?})",
        merged.len(),
        merged.encoding
    );
    Ok(merged)
}

/// Decode each buffer and merge them
pub fn repack_from_bytes<B: AsRef<[u8]>>(
    inputs: &[B],
    whitelist: Option<&BTreeSet<ResourceId>>,
    suppress_removed_key_output: bool,
) -> Result<DataPack> {
    let mut repacker = Repacker::new(whitelist, suppress_removed_key_output);
    for input in inputs {
        repacker.add(reader::decode(input.as_ref())?)?;
    }
    Ok(repacker.finish())
}

/// Parse a whitelist: one decimal id per line, blank lines ignored
///
/// A file that names no id at all is rejected rather than read as "remove
/// everything". Pass `Some(&BTreeSet::new())` to [`repack`] for that.
pub fn parse_whitelist(text: &str) -> Result<BTreeSet<ResourceId>> {
    let mut ids = BTreeSet::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let id = line
            .parse::<ResourceId>()
            .map_err(|_| DataPackError::InvalidWhitelist {
                line: line_no + 1,
                reason: format!("{:?} is not a resource id", line),
            })?;
        ids.insert(id);
    }

    if ids.is_empty() {
        return Err(DataPackError::InvalidWhitelist {
            line: 0,
            reason: "whitelist file should not be empty".to_string(),
        });
    }
    Ok(ids)
}

pub fn read_whitelist<P: AsRef<Path>>(path: P) -> Result<BTreeSet<ResourceId>> {
    let text = std::fs::read_to_string(path)?;
    parse_whitelist(&text)
}

/// `pack.pak` -> `pack.pak.info`
pub fn info_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(INFO_EXTENSION);
    PathBuf::from(name)
}

/// Repack files on disk into `output`
///
/// When `options.write_info` is set, each input's `.info` file is appended,
/// in input order, to the output's `.info` file. Every input must have one;
/// a missing file is `MissingInfoFile`. Nothing is written unless all inputs
/// and their `.info` files were read successfully.
pub fn repack_files<P, Q>(output: P, inputs: &[Q], options: &RepackOptions) -> Result<DataPack>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output = output.as_ref();
    let whitelist = options.whitelist.as_ref().map(read_whitelist).transpose()?;

    let mut repacker = Repacker::new(whitelist.as_ref(), options.suppress_removed_key_output);
    for input in inputs {
        debug!("Reading repack input {:?}", input.as_ref());
        repacker.add(DataPack::open(input)?)?;
    }
    let removed = repacker.removed_count();
    let merged = repacker.finish();

    let info = if options.write_info {
        let mut info = Vec::new();
        for input in inputs {
            let path = info_path(input.as_ref());
            if !path.is_file() {
                return Err(DataPackError::MissingInfoFile(path));
            }
            info.extend_from_slice(&io::read_file(&path)?);
        }
        Some(info)
    } else {
        None
    };

    merged.save(output)?;
    if let Some(info) = info {
        io::write_file(info_path(output), &info)?;
    }

    info!(
        "Repacked {} inputs into {:?}: {} resources, {} removed by whitelist",
        inputs.len(),
        output,
        merged.len(),
        removed
    );
    Ok(merged)
}
