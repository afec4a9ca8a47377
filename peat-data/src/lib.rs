//! Grid determination and resampling for staged peatland observations.
//!
//! This crate holds the pure, storage-free half of a load: deriving the
//! uniform time grid and projecting raw samples onto it.

pub mod grid;

pub use grid::TimeGrid;

/// Piecewise-linear interpolation of the water level record.
pub mod interpolation {
    use crate::grid::TimeGrid;
    use peat_core::{AlignedWaterLevel, PeatError, Result, Series, TimestampedSample};

    /// Water level as a function of time, defined by staged samples (knots).
    ///
    /// Between knots the level is linearly interpolated. Before the first
    /// knot and after the last one it stays at the boundary value.
    #[derive(Debug, Clone)]
    pub struct WaterLevelCurve {
        knots: Vec<TimestampedSample>,
    }

    impl WaterLevelCurve {
        /// Build a curve from samples in any order.
        ///
        /// Fails with `EmptyOverlap` for no samples and `DuplicateEpoch` when
        /// two samples share an epoch.
        pub fn new(mut samples: Vec<TimestampedSample>) -> Result<Self> {
            if samples.is_empty() {
                return Err(PeatError::EmptyOverlap(
                    "no water level samples to interpolate".to_string(),
                ));
            }
            samples.sort_by_key(|sample| sample.epoch);
            if let Some(pair) = samples.windows(2).find(|pair| pair[0].epoch == pair[1].epoch) {
                return Err(PeatError::DuplicateEpoch {
                    series: Series::WaterLevel,
                    epoch: pair[0].epoch,
                });
            }
            Ok(Self { knots: samples })
        }

        /// First and last knot epochs.
        pub fn bounds(&self) -> (i64, i64) {
            (self.knots[0].epoch, self.knots[self.knots.len() - 1].epoch)
        }

        pub fn level_at(&self, epoch: i64) -> f64 {
            let first = self.knots[0];
            let last = self.knots[self.knots.len() - 1];
            if epoch <= first.epoch {
                return first.value;
            }
            if epoch >= last.epoch {
                return last.value;
            }
            // first.epoch < epoch < last.epoch, so 0 < idx < len
            let idx = self.knots.partition_point(|knot| knot.epoch <= epoch);
            let lo = self.knots[idx - 1];
            let hi = self.knots[idx];
            if lo.epoch == epoch {
                return lo.value;
            }
            let fraction = (epoch - lo.epoch) as f64 / (hi.epoch - lo.epoch) as f64;
            lo.value + (hi.value - lo.value) * fraction
        }

        /// Level at every grid point except the closing one.
        pub fn on_grid(&self, grid: &TimeGrid) -> Vec<AlignedWaterLevel> {
            grid.interval_starts()
                .iter()
                .map(|&epoch| AlignedWaterLevel {
                    epoch,
                    level: self.level_at(epoch),
                })
                .collect()
        }
    }

}

/// Exact-match binning of rainfall samples into grid intervals.
pub mod binning {
    use crate::grid::TimeGrid;
    use peat_core::{AlignedRainfallInterval, PeatError, Result, Series, TimestampedSample};

    /// Outcome of binning one rainfall record.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RainfallBins {
        /// Intervals ordered by `from_epoch`.
        pub intervals: Vec<AlignedRainfallInterval>,
        /// Samples that did not sit on an interval-opening grid point.
        pub excluded: usize,
    }

    /// Turn each sample sitting on a grid point (other than the closing
    /// point) into the interval that starts there.
    ///
    /// Samples at any other epoch are dropped without aggregation. Two
    /// samples on the same grid point fail with `DuplicateEpoch`.
    pub fn bin_rainfall(samples: &[TimestampedSample], grid: &TimeGrid) -> Result<RainfallBins> {
        let last_start = grid.last_interval_start();
        let mut intervals: Vec<AlignedRainfallInterval> = samples
            .iter()
            .filter(|sample| sample.epoch <= last_start && grid.contains(sample.epoch))
            .map(|sample| AlignedRainfallInterval {
                from_epoch: sample.epoch,
                thru_epoch: sample.epoch + grid.step(),
                intensity: sample.value,
            })
            .collect();
        intervals.sort_by_key(|interval| interval.from_epoch);
        if let Some(pair) = intervals
            .windows(2)
            .find(|pair| pair[0].from_epoch == pair[1].from_epoch)
        {
            return Err(PeatError::DuplicateEpoch {
                series: Series::RainfallIntensity,
                epoch: pair[0].from_epoch,
            });
        }
        let excluded = samples.len() - intervals.len();
        Ok(RainfallBins {
            intervals,
            excluded,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn samples(points: &[(i64, f64)]) -> Vec<TimestampedSample> {
            points
                .iter()
                .map(|&(epoch, value)| TimestampedSample::new(epoch, value))
                .collect()
        }

        #[test]
        fn bins_every_grid_aligned_sample() {
            let grid = TimeGrid::from_candidates(&[0, 3600, 7200]).unwrap();
            let bins = bin_rainfall(&samples(&[(0, 0.0), (3600, 5.0), (7200, 10.0)]), &grid).unwrap();
            assert_eq!(
                bins.intervals,
                vec![
                    AlignedRainfallInterval { from_epoch: 0, thru_epoch: 3600, intensity: 0.0 },
                    AlignedRainfallInterval { from_epoch: 3600, thru_epoch: 7200, intensity: 5.0 },
                    AlignedRainfallInterval { from_epoch: 7200, thru_epoch: 10800, intensity: 10.0 },
                ]
            );
            assert_eq!(bins.excluded, 0);
        }

        #[test]
        fn off_grid_and_out_of_range_samples_are_excluded() {
            let grid = TimeGrid::from_candidates(&[0, 3600, 7200]).unwrap();
            let raw = samples(&[
                (-3600, 1.0),
                (0, 2.0),
                (1800, 3.0),
                (3600, 4.0),
                (7200, 5.0),
                (10800, 6.0),
            ]);
            let bins = bin_rainfall(&raw, &grid).unwrap();
            let starts: Vec<i64> = bins.intervals.iter().map(|i| i.from_epoch).collect();
            assert_eq!(starts, vec![0, 3600, 7200]);
            // -3600 is before the grid, 1800 is off-grid, 10800 is the closing point
            assert_eq!(bins.excluded, 3);
        }

        #[test]
        fn intervals_tile_without_gaps() {
            let candidates: Vec<i64> = (0..24).map(|i| i * 900).collect();
            let grid = TimeGrid::from_candidates(&candidates).unwrap();
            let raw: Vec<TimestampedSample> = candidates
                .iter()
                .rev()
                .map(|&epoch| TimestampedSample::new(epoch, epoch as f64 / 900.0))
                .collect();
            let bins = bin_rainfall(&raw, &grid).unwrap();
            assert_eq!(bins.intervals.len(), grid.point_count() - 1);
            assert_eq!(bins.intervals[0].from_epoch, grid.first_epoch());
            assert_eq!(
                bins.intervals[bins.intervals.len() - 1].thru_epoch,
                grid.closing_epoch()
            );
            for pair in bins.intervals.windows(2) {
                assert_eq!(pair[0].thru_epoch, pair[1].from_epoch);
            }
        }

        #[test]
        fn duplicate_grid_samples_are_rejected() {
            let grid = TimeGrid::from_candidates(&[0, 3600, 7200]).unwrap();
            let err = bin_rainfall(&samples(&[(0, 1.0), (3600, 2.0), (3600, 2.5)]), &grid).unwrap_err();
            assert!(matches!(err, PeatError::DuplicateEpoch { epoch: 3600, .. }));
        }
    }
}
