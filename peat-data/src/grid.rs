//! Determination of the uniform time grid shared by all aligned outputs.
//!
//! The grid is taken from the rainfall record itself: every rainfall epoch
//! that lies inside the water level record becomes a grid point, and the
//! spacing between them must be constant. One extra point closes the last
//! rainfall interval.

use peat_core::{PeatError, Result, Series};
use serde::Serialize;
use std::collections::BTreeSet;

/// Strictly increasing, evenly spaced epochs.
///
/// A grid always holds at least two points. The last point only closes the
/// final rainfall interval and carries no samples of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeGrid {
    epochs: Vec<i64>,
    step: i64,
}

impl TimeGrid {
    /// Build the grid from the rainfall epochs inside the overlap window.
    ///
    /// Candidates are sorted first. Fails with `EmptyOverlap` when there are
    /// none, `DuplicateEpoch` when an epoch repeats, `UndeterminedTimeStep`
    /// for a single candidate and `NonuniformTimeStep` when the spacing
    /// varies.
    pub fn from_candidates(candidates: &[i64]) -> Result<Self> {
        let mut epochs = candidates.to_vec();
        epochs.sort_unstable();

        let first = match epochs.first() {
            Some(&epoch) => epoch,
            None => {
                return Err(PeatError::EmptyOverlap(
                    "no rainfall epochs fall within the water level record".to_string(),
                ))
            }
        };
        if let Some(pair) = epochs.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PeatError::DuplicateEpoch {
                series: Series::RainfallIntensity,
                epoch: pair[0],
            });
        }

        let step = uniform_step(&epochs)?.ok_or(PeatError::UndeterminedTimeStep { epoch: first })?;
        let closing = epochs[epochs.len() - 1] + step;
        epochs.push(closing);
        log::debug!(
            "grid: {} candidate epochs, step {} s, closing epoch {}",
            epochs.len() - 1,
            step,
            closing
        );
        Ok(Self { epochs, step })
    }

    /// Rebuild a grid that was persisted earlier, re-checking uniformity.
    pub fn from_parts(epochs: Vec<i64>, step: i64) -> Result<Self> {
        match epochs.as_slice() {
            [] => {
                return Err(PeatError::EmptyOverlap(
                    "persisted time grid has no points".to_string(),
                ))
            }
            [only] => return Err(PeatError::UndeterminedTimeStep { epoch: *only }),
            _ => {}
        }
        match uniform_step(&epochs)? {
            Some(found) if found == step && step > 0 => Ok(Self { epochs, step }),
            Some(found) => Err(PeatError::NonuniformTimeStep {
                steps: vec![found, step],
            }),
            None => Err(PeatError::UndeterminedTimeStep { epoch: epochs[0] }),
        }
    }

    pub fn epochs(&self) -> &[i64] {
        &self.epochs
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Number of grid points, the closing point included. Never below two.
    pub fn point_count(&self) -> usize {
        self.epochs.len()
    }

    pub fn first_epoch(&self) -> i64 {
        self.epochs[0]
    }

    /// The point that closes the last rainfall interval.
    pub fn closing_epoch(&self) -> i64 {
        self.epochs[self.epochs.len() - 1]
    }

    /// Every point that opens an interval, i.e. all but the closing point.
    pub fn interval_starts(&self) -> &[i64] {
        &self.epochs[..self.epochs.len() - 1]
    }

    pub fn last_interval_start(&self) -> i64 {
        self.epochs[self.epochs.len() - 2]
    }

    /// Whether `epoch` is exactly one of the grid points.
    pub fn contains(&self, epoch: i64) -> bool {
        epoch >= self.first_epoch()
            && epoch <= self.closing_epoch()
            && (epoch - self.first_epoch()) % self.step == 0
    }
}

/// Single positive spacing of a sorted epoch sequence, `None` when fewer
/// than two epochs are given.
fn uniform_step(epochs: &[i64]) -> Result<Option<i64>> {
    let steps: BTreeSet<i64> = epochs.windows(2).map(|pair| pair[1] - pair[0]).collect();
    match steps.len() {
        0 => Ok(None),
        1 => Ok(steps.into_iter().next()),
        _ => Err(PeatError::NonuniformTimeStep {
            steps: steps.into_iter().collect(),
        }),
    }
}
