//! Type-pair interaction coefficients and the radial force response.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive bounds for interaction coefficients.
pub const COEFFICIENT_MIN: f64 = -10.0;
pub const COEFFICIENT_MAX: f64 = 10.0;

fn random_coefficient<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(-10i32..=10) as f64
}

/// Radial force response for a normalized distance `r` (the interaction
/// cutoff sits at `r = 1`) and a coefficient `a` scaled to `[-1, 1]`.
///
/// Below `beta` the response is a purely repulsive core independent of
/// `a`; between `beta` and 1 it is a tent function peaking at the middle
/// of the band, signed and scaled by `a`; beyond the cutoff it is zero.
pub fn force_response(r: f64, a: f64, beta: f64) -> f64 {
    if r < beta {
        r / beta - 1.0
    } else if r < 1.0 {
        a * (1.0 - (2.0 * r - 1.0 - beta).abs() / (1.0 - beta))
    } else {
        0.0
    }
}

/// Square matrix of interaction coefficients, row = acting particle's
/// type, column = the other particle's type. Deliberately asymmetric:
/// `get(i, j)` need not equal `get(j, i)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceMatrix {
    coefficients: Vec<Vec<f64>>,
}

impl ForceMatrix {
    /// Builds a `size x size` matrix of fresh random coefficients.
    pub fn random<R: Rng>(size: usize, rng: &mut R) -> Self {
        let coefficients = (0..size)
            .map(|_| (0..size).map(|_| random_coefficient(rng)).collect())
            .collect();
        Self { coefficients }
    }

    pub fn size(&self) -> usize {
        self.coefficients.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.coefficients[i][j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.coefficients[i][j] = value;
    }

    /// Appends one row and one column of random coefficients, preserving
    /// every existing entry.
    pub fn grow<R: Rng>(&mut self, rng: &mut R) {
        for row in &mut self.coefficients {
            row.push(random_coefficient(rng));
        }
        let new_size = self.coefficients.len() + 1;
        self.coefficients
            .push((0..new_size).map(|_| random_coefficient(rng)).collect());
    }

    /// Drops the last row and column.
    pub fn shrink(&mut self) {
        self.coefficients.pop();
        for row in &mut self.coefficients {
            row.pop();
        }
    }

    pub fn snapshot(&self) -> MatrixSnapshot {
        MatrixSnapshot {
            type_count: self.size(),
            coefficients: self.coefficients.clone(),
        }
    }

    /// Rebuilds a matrix of `type_count` types from a saved snapshot.
    /// Entries inside the overlapping block are copied positionally; the
    /// rest are filled with fresh random coefficients. The snapshot is
    /// validated in full before anything is built, so a corrupt save
    /// never produces a half-loaded matrix.
    pub fn from_snapshot<R: Rng>(
        snapshot: &MatrixSnapshot,
        type_count: usize,
        rng: &mut R,
    ) -> Result<Self, SnapshotError> {
        snapshot.validate()?;

        let saved = snapshot.type_count;
        let coefficients = (0..type_count)
            .map(|i| {
                (0..type_count)
                    .map(|j| {
                        if i < saved && j < saved {
                            snapshot.coefficients[i][j]
                        } else {
                            random_coefficient(rng)
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Self { coefficients })
    }
}

/// Opaque persistence snapshot of a force matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub type_count: usize,
    pub coefficients: Vec<Vec<f64>>,
}

impl MatrixSnapshot {
    fn validate(&self) -> Result<(), SnapshotError> {
        if self.type_count == 0 {
            return Err(SnapshotError::Empty);
        }
        if self.coefficients.len() != self.type_count {
            return Err(SnapshotError::RowCountMismatch {
                declared: self.type_count,
                actual: self.coefficients.len(),
            });
        }
        for (row, values) in self.coefficients.iter().enumerate() {
            if values.len() != self.type_count {
                return Err(SnapshotError::RowLengthMismatch {
                    row,
                    expected: self.type_count,
                    actual: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || !(COEFFICIENT_MIN..=COEFFICIENT_MAX).contains(&value) {
                    return Err(SnapshotError::CoefficientOutOfRange { row, col, value });
                }
            }
        }
        Ok(())
    }
}

/// Reasons a saved force matrix cannot be loaded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot holds no types")]
    Empty,
    #[error("snapshot declares {declared} types but holds {actual} rows")]
    RowCountMismatch { declared: usize, actual: usize },
    #[error("row {row} holds {actual} coefficients, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("coefficient [{row}][{col}] = {value} is outside [{COEFFICIENT_MIN}, {COEFFICIENT_MAX}]")]
    CoefficientOutOfRange { row: usize, col: usize, value: f64 },
}
