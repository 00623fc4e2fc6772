use crate::constants::SAMPLE_PERIOD_SECONDS;
use crate::error::AnalysisError;
use crate::sample_pool::ChannelSamplePool;

/// One point of the occupancy curve: the x value reported for histogram index j
/// is baseline - j, so it runs negative once j passes the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct RatePoint {
    pub code: i32,
    pub rate_hz: f64
}

/// # RateCurve
/// Reverse-cumulative occupancy of one channel. The point for histogram index j
/// (j = 1..max_code-1) carries the rate of samples with ADC code strictly below
/// j, normalized by the channel's total acquisition time. Points are ordered by
/// increasing j, so the rate is non-decreasing along the sequence and the
/// reported x value is strictly decreasing.
#[derive(Debug, Clone)]
pub struct RateCurve {
    baseline: u16,
    points: Vec<RatePoint>
}

impl RateCurve {

    pub fn baseline(&self) -> u16 {
        self.baseline
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }
}

/// Build the occupancy curve for one channel. Histograms the pool over ADC codes
/// 0..max_code-1 and folds the histogram into the reverse-cumulative rate with a
/// single prefix-sum pass. A sample outside the ADC range is an error, never
/// clipped; an empty pool yields an all-zero curve.
pub fn analyze(pool: &ChannelSamplePool, baseline: u16, max_code: u16) -> Result<RateCurve, AnalysisError> {
    let mut histogram: Vec<u64> = vec![0; max_code as usize];
    for sample in pool.samples() {
        if *sample >= max_code {
            return Err(AnalysisError::SampleOutOfRange(pool.channel(), *sample, max_code));
        }
        histogram[*sample as usize] += 1;
    }

    let total_time_seconds = pool.total_sample_count() as f64 * SAMPLE_PERIOD_SECONDS;

    let mut points: Vec<RatePoint> = Vec::with_capacity((max_code as usize).saturating_sub(1));
    let mut cumulative: u64 = 0;
    for j in 1..max_code as usize {
        cumulative += histogram[j - 1];
        let rate_hz = if total_time_seconds > 0.0 {
            cumulative as f64 / total_time_seconds
        } else {
            0.0
        };
        points.push(RatePoint { code: baseline as i32 - j as i32, rate_hz });
    }

    Ok(RateCurve { baseline, points })
}

/// Recommend a ZLE threshold from the occupancy curve. Walking code by code away
/// from the baseline, the difference between consecutive curve points is the rate
/// of samples sitting exactly at that code; the first code where it reaches
/// rate_jump_hz is the edge of the noise band and is returned as the
/// recommendation. Returns None when no code below the baseline qualifies.
pub fn recommend_threshold(curve: &RateCurve, rate_jump_hz: f64) -> Option<u16> {
    let points = curve.points();
    let baseline = curve.baseline() as usize;

    for depth in 1..=baseline {
        let code = baseline - depth;
        if code < 1 {
            break;
        }
        if code >= points.len() {
            continue;
        }
        let delta = points[code].rate_hz - points[code - 1].rate_hz;
        if delta >= rate_jump_hz {
            return Some(code as u16);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_rate_is_monotone_along_increasing_bin_index() {
        let samples = vec![10u16, 20, 20, 30, 100, 100, 100, 250];
        let pool = ChannelSamplePool::from_samples(0, samples);
        let curve = analyze(&pool, 300, 512).unwrap();

        for pair in curve.points().windows(2) {
            assert!(pair[0].rate_hz <= pair[1].rate_hz);
            assert!(pair[0].code > pair[1].code);
        }
    }

    #[test]
    fn curve_counts_samples_strictly_below_the_bin_index() {
        //100 samples at code 5: one sample every 10 ns, so 1 us of data
        let pool = ChannelSamplePool::from_samples(3, vec![5u16; 100]);
        let curve = analyze(&pool, 16000, 16384).unwrap();

        let points = curve.points();
        //points[j - 1] carries the cumulative rate for bin index j
        assert_eq!(points[4].rate_hz, 0.0);
        assert!((points[5].rate_hz - 1.0e8).abs() < 1.0);
        assert_eq!(points[5].code, 16000 - 6);
        assert_eq!(points.len(), 16383);
    }

    #[test]
    fn empty_pool_yields_an_all_zero_curve_and_no_recommendation() {
        let pool = ChannelSamplePool::from_samples(0, Vec::new());
        let curve = analyze(&pool, 16000, 16384).unwrap();

        assert!(curve.points().iter().all(|point| point.rate_hz == 0.0));
        assert_eq!(recommend_threshold(&curve, 200.0), None);
    }

    #[test]
    fn noise_band_edge_is_recommended() {
        //A run dominated by baseline samples with a small noise population 10 codes down.
        //The jump at code 15990 is ~1 kHz, far above the 200 Hz default.
        let mut samples = vec![16000u16; 1_000_000];
        samples.extend(vec![15990u16; 10]);
        let pool = ChannelSamplePool::from_samples(0, samples);

        let curve = analyze(&pool, 16000, 16384).unwrap();
        assert_eq!(recommend_threshold(&curve, 200.0), Some(15990));
    }

    #[test]
    fn analysis_is_idempotent() {
        let mut samples = vec![16000u16; 50_000];
        samples.extend(vec![15995u16; 100]);
        let pool = ChannelSamplePool::from_samples(1, samples);

        let first = analyze(&pool, 16000, 16384).unwrap();
        let second = analyze(&pool, 16000, 16384).unwrap();
        assert_eq!(first.points(), second.points());
        assert_eq!(
            recommend_threshold(&first, 200.0),
            recommend_threshold(&second, 200.0)
        );
    }

    #[test]
    fn quiet_channel_has_no_recommendation() {
        let pool = ChannelSamplePool::from_samples(0, vec![16000u16; 10_000]);
        let curve = analyze(&pool, 16000, 16384).unwrap();
        assert_eq!(recommend_threshold(&curve, 200.0), None);
    }

    #[test]
    fn out_of_range_sample_is_rejected() {
        let pool = ChannelSamplePool::from_samples(5, vec![16384u16]);
        assert!(matches!(
            analyze(&pool, 16000, 16384),
            Err(AnalysisError::SampleOutOfRange(5, 16384, 16384))
        ));
    }
}
