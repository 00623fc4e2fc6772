use fxhash::FxHashMap;
use ndarray::ArrayView1;

use crate::ast_event::AstEvent;
use crate::constants::{BYTES_PER_SAMPLE, SAMPLE_PERIOD_MS};
use crate::error::AccumulatorError;

/// # ChannelSamplePool
/// Every ADC sample one channel produced over a whole run, flattened across
/// events in arrival order. The sample count doubles as the time base for rate
/// normalization (one sample every 10 ns).
#[derive(Debug)]
pub struct ChannelSamplePool {
    channel: usize,
    samples: Vec<u16>
}

impl ChannelSamplePool {

    fn new(channel: usize, capacity: usize) -> Self {
        ChannelSamplePool { channel, samples: Vec::with_capacity(capacity) }
    }

    /// Wrap an already flattened set of samples, for callers that source them
    /// somewhere other than an event stream
    #[allow(dead_code)]
    pub fn from_samples(channel: usize, samples: Vec<u16>) -> Self {
        ChannelSamplePool { channel, samples }
    }

    fn append_row(&mut self, row: ArrayView1<'_, u16>) {
        self.samples.extend(row.iter());
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn total_sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn total_time_ms(&self) -> f64 {
        self.samples.len() as f64 * SAMPLE_PERIOD_MS
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|sample| *sample as f64).sum();
        sum / self.samples.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance: f64 = self
            .samples
            .iter()
            .map(|sample| {
                let deviation = *sample as f64 - mean;
                deviation * deviation
            })
            .sum::<f64>()
            / self.samples.len() as f64;
        variance.sqrt()
    }
}

/// # OccupancyAccumulator
/// Folds decoded events into per-channel sample pools. The channel set of the
/// run is adopted from the first event and every later event must match it; a
/// run whose events disagree on the active channels is a configuration anomaly,
/// not something to merge through. Pool buffers are sized once from the
/// descriptor's byte totals.
#[derive(Debug)]
pub struct OccupancyAccumulator {
    total_payload_bytes: u64,
    expected_mask: u32,
    channels: Vec<usize>,
    pools: FxHashMap<usize, ChannelSamplePool>,
    events_seen: usize
}

impl OccupancyAccumulator {

    pub fn new(total_payload_bytes: u64) -> Self {
        OccupancyAccumulator {
            total_payload_bytes,
            expected_mask: 0,
            channels: Vec::new(),
            pools: FxHashMap::default(),
            events_seen: 0
        }
    }

    pub fn append_event(&mut self, event: &AstEvent) -> Result<(), AccumulatorError> {
        if self.events_seen == 0 {
            self.adopt_channel_set(event);
        } else if event.header.channel_mask != self.expected_mask {
            return Err(AccumulatorError::ChannelSetMismatch(self.events_seen, self.expected_mask, event.header.channel_mask));
        }

        //Row i of the sample block belongs to the i-th active channel
        for (position, channel) in event.channels.iter().enumerate() {
            if let Some(pool) = self.pools.get_mut(channel) {
                pool.append_row(event.samples.row(position));
            }
        }
        self.events_seen += 1;

        Ok(())
    }

    fn adopt_channel_set(&mut self, event: &AstEvent) {
        self.expected_mask = event.header.channel_mask;
        self.channels = event.channels.clone();
        let capacity = self.total_payload_bytes as usize / BYTES_PER_SAMPLE / event.channels.len();
        for channel in event.channels.iter() {
            self.pools.insert(*channel, ChannelSamplePool::new(*channel, capacity));
        }
    }

    pub fn channels(&self) -> &[usize] {
        &self.channels
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    pub fn into_pools(self) -> FxHashMap<usize, ChannelSamplePool> {
        self.pools
    }
}
