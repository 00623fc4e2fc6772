use std::path::Path;

use fxhash::FxHashMap;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::analysis::{analyze, recommend_threshold};
use crate::ast_file::AstFile;
use crate::constants::{BYTES_PER_SAMPLE, HEADER_SIZE_BYTES};
use crate::error::ProcessorError;
use crate::metadata::{ast_file_path, metadata_file_path, RunMetadata};
use crate::sample_pool::{ChannelSamplePool, OccupancyAccumulator};

/// Decode a whole noise run into per-channel sample pools. Fails before any
/// event is read when the descriptor flags the run as zero-length encoded;
/// suppressed waveforms cannot feed an occupancy analysis.
pub fn decode_run(run_dir: &Path) -> Result<(RunMetadata, FxHashMap<usize, ChannelSamplePool>), ProcessorError> {
    let metadata = RunMetadata::read_metadata_file(&metadata_file_path(run_dir))?;
    if metadata.is_zle {
        return Err(ProcessorError::ZleRun);
    }
    info!("Metadata loaded, expecting {} events", metadata.number_of_events());

    let mut file = AstFile::new(&ast_file_path(run_dir)?, &metadata.event_size_bytes)?;

    let progress = ProgressBar::new(file.total_size_bytes());
    let style = ProgressStyle::with_template("[{elapsed}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}").unwrap();
    progress.set_style(style);

    let flush_frac = 0.01;
    let flush_val = (file.total_size_bytes() as f64 * flush_frac) as u64;
    let mut count: u64 = 0;

    let mut accumulator = OccupancyAccumulator::new(metadata.total_payload_bytes());
    loop {
        if let Some(event) = file.get_next_event()? {
            count += (HEADER_SIZE_BYTES + event.channels.len() * event.samples_per_channel() * BYTES_PER_SAMPLE) as u64;
            if count > flush_val {
                progress.inc(count);
                count = 0;
            }

            if event.header.is_zle() {
                warn!("Event {} carries the zle flag in a raw run", accumulator.events_seen());
            }

            accumulator.append_event(&event)?;
        } else { //No more size entries, the run is fully read
            break;
        }
    }

    progress.finish();
    info!("Loaded {} events on channels {:?}", accumulator.events_seen(), accumulator.channels());

    Ok((metadata, accumulator.into_pools()))
}

/// Run the full pipeline for one run directory: decode, accumulate, and report
/// an occupancy profile and threshold recommendation per channel.
pub fn process_run(run_dir: &Path, baseline: u16, max_code: u16, rate_jump_hz: f64) -> Result<(), ProcessorError> {
    let (metadata, pools) = decode_run(run_dir)?;

    let mut channels: Vec<usize> = pools.keys().copied().collect();
    channels.sort_unstable();

    if let Some(pool) = channels.first().and_then(|channel| pools.get(channel)) {
        info!("Looking at {:.3} ms of data per channel", pool.total_time_ms());
    }

    for channel in channels {
        let pool = &pools[&channel];
        info!("Ch {}: mean {:.2}, std {:.2}", channel, pool.mean(), pool.std_dev());
        match metadata.settings_for(channel) {
            Some(settings) => info!("    configured trigger {}, zle {}", settings.trigger_threshold, settings.zle_threshold),
            None => warn!("    no configured thresholds for channel {}", channel)
        }

        let curve = analyze(pool, baseline, max_code)?;
        match recommend_threshold(&curve, rate_jump_hz) {
            Some(code) => info!("    recommended zle threshold: {}", code),
            None => info!("    no rate jump of at least {} Hz below the baseline, nothing to recommend", rate_jump_hz)
        }
    }

    Ok(())
}
