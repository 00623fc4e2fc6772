use std::path::{Path, PathBuf};
use serde_derive::{Serialize, Deserialize};
use fxhash::FxHashMap;

use crate::constants::HEADER_SIZE_BYTES;
use crate::error::MetadataError;

/// Configured thresholds for one digitizer channel, as written by the DAQ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub trigger_threshold: i32,
    pub zle_threshold: i32
}

/// # RunMetadata
/// The run descriptor the DAQ drops next to the .ast file (pax_info.json).
/// event_size_bytes is the authoritative framing for the event stream;
/// event_size_cum is the parallel list of cumulative offsets, kept for
/// diagnostics but never used for reading. Channel settings are keyed by the
/// channel index, which JSON stores as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub is_zle: bool,
    pub event_size_bytes: Vec<usize>,
    pub event_size_cum: Vec<u64>,
    pub channel_settings: FxHashMap<String, ChannelSettings>,
    #[serde(default)]
    pub run_name: Option<String>,
    #[serde(default)]
    pub num_events: Option<usize>
}

impl RunMetadata {

    /// Read the run descriptor from its JSON file
    pub fn read_metadata_file(metadata_path: &Path) -> Result<Self, MetadataError> {
        if !metadata_path.exists() {
            return Err(MetadataError::BadFilePath(metadata_path.to_path_buf()));
        }

        let json_str = std::fs::read_to_string(metadata_path)?;

        Ok(serde_json::from_str::<Self>(&json_str)?)
    }

    pub fn number_of_events(&self) -> usize {
        self.event_size_bytes.len()
    }

    /// Total sample payload bytes in the run, headers excluded. Sizes the
    /// occupancy buffers up front so accumulation never reallocates.
    pub fn total_payload_bytes(&self) -> u64 {
        self.event_size_bytes
            .iter()
            .map(|size| size.saturating_sub(HEADER_SIZE_BYTES) as u64)
            .sum()
    }

    pub fn settings_for(&self, channel: usize) -> Option<&ChannelSettings> {
        self.channel_settings.get(&channel.to_string())
    }
}

/// The run name is the final component of the run directory
pub fn run_name_from_directory(run_dir: &Path) -> Result<String, MetadataError> {
    match run_dir.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => Err(MetadataError::BadRunDirectory(run_dir.to_path_buf()))
    }
}

pub fn metadata_file_path(run_dir: &Path) -> PathBuf {
    run_dir.join("pax_info.json")
}

/// Construct the path of the first run file using the DAQ naming scheme
pub fn ast_file_path(run_dir: &Path) -> Result<PathBuf, MetadataError> {
    let run_name = run_name_from_directory(run_dir)?;
    Ok(run_dir.join(format!("{}_{:0>6}.ast", run_name, 0)))
}
