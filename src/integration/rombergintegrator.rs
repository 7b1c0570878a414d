use std::mem::swap;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering
};

use log::{
    debug,
    info,
    warn
};

use crate::integration::integrationerror::IntegrationError;
use crate::integration::integrationresult::IntegrationResult;
use crate::math::curve::curve::Curve;
use crate::sample::sampleset::Interval;

/// Upper bound on table rows; row i evaluates 2^(i-1) new points.
pub const MAX_ROMBERG_ROWS: usize = 32;

// ─────────────────────────────────────────────
// RombergTable
// ─────────────────────────────────────────────

/// Lower triangular Romberg table kept as two rolling rows.
///
/// Row i only depends on row i-1, so older rows are dropped as soon as the
/// next one is complete. Column 0 of row i is the trapezoidal estimate with
/// 2^i panels, column j > 0 the j-th Richardson extrapolation.
pub struct RombergTable {
    previous: Vec<f64>,
    current: Vec<f64>,
}

impl RombergTable {
    pub fn new(first_trapezoid: f64, rows: usize) -> RombergTable {
        let mut current = Vec::with_capacity(rows);
        current.push(first_trapezoid);
        RombergTable {
            previous: Vec::with_capacity(rows),
            current,
        }
    }

    /// Index of the newest row.
    pub fn row(&self) -> usize {
        self.current.len() - 1
    }

    /// R[i][0] of the newest row.
    pub fn trapezoid(&self) -> f64 {
        self.current[0]
    }

    /// R[i][i] of the newest row.
    pub fn diagonal(&self) -> f64 {
        self.current[self.current.len() - 1]
    }

    /// R[i-1][i-1], once at least two rows exist.
    pub fn previous_diagonal(&self) -> Option<f64> {
        self.previous.last().copied()
    }

    /// Appends row i from its trapezoidal estimate:
    ///   R[i][j] = R[i][j-1] + (R[i][j-1] - R[i-1][j-1]) / (4^j - 1)
    pub fn push_row(&mut self, trapezoid: f64) {
        swap(&mut self.previous, &mut self.current);
        self.current.clear();
        self.current.push(trapezoid);
        for j in 1..=self.previous.len() {
            let factor = 4.0_f64.powi(j as i32);
            let refined = self.current[j - 1];
            let coarse = self.previous[j - 1];
            self.current.push(refined + (refined - coarse) / (factor - 1.0));
        }
    }
}

// ─────────────────────────────────────────────
// RombergIntegrator
// ─────────────────────────────────────────────

/// Romberg integration of a curve by Richardson extrapolation of trapezoidal
/// estimates on 1, 2, 4, ... panels.
///
/// Stops once two successive diagonal entries differ by less than
/// `tolerance` in absolute value. Running out of rows is reported through
/// `IntegrationResult::converged`, not as an error.
#[derive(Debug, Clone)]
pub struct RombergIntegrator {
    tolerance: f64,
    max_iterations: usize,
    cancellation: Option<Arc<AtomicBool>>,
}

impl RombergIntegrator {
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<RombergIntegrator, IntegrationError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(IntegrationError::InvalidParameter {
                name: "tolerance",
                value: tolerance,
                requirement: "must be finite and positive",
            });
        }
        if max_iterations == 0 || max_iterations > MAX_ROMBERG_ROWS {
            return Err(IntegrationError::InvalidParameter {
                name: "max_iterations",
                value: max_iterations as f64,
                requirement: "must be between 1 and 32",
            });
        }
        Ok(RombergIntegrator {
            tolerance,
            max_iterations,
            cancellation: None,
        })
    }

    /// Checks `flag` once per row and stops with `Cancelled` when it is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> RombergIntegrator {
        self.cancellation = Some(flag);
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn integrate<C: Curve + ?Sized>(&self,
                                        curve: &C,
                                        interval: &Interval) -> Result<IntegrationResult, IntegrationError> {
        let a = interval.a();
        let width = interval.width();

        let mut table = RombergTable::new(
            0.5 * width * (curve.value(a) + curve.value(interval.b())),
            self.max_iterations);
        let mut evaluations = 2;
        debug!("Romberg row 0: R = {:.16e}", table.diagonal());

        for i in 1..self.max_iterations {
            if self.is_cancelled() {
                return Err(IntegrationError::Cancelled { rows: i });
            }

            // only the 2^(i-1) midpoints introduced at this level are new
            let panels = 1_usize << i;
            let h = width / panels as f64;
            let midpoint_sum: f64 = (1..panels)
                .step_by(2)
                .map(|k| curve.value(a + k as f64 * h))
                .sum();
            evaluations += panels / 2;

            table.push_row(0.5 * table.trapezoid() + h * midpoint_sum);

            let change = table
                .previous_diagonal()
                .map_or(f64::INFINITY, |previous| (table.diagonal() - previous).abs());
            debug!("Romberg row {}: R = {:.16e}, change = {:.3e}", i, table.diagonal(), change);

            if change < self.tolerance {
                info!("Romberg converged after {} rows ({} evaluations)", i + 1, evaluations);
                return Ok(IntegrationResult::romberg(table.diagonal(), i, true, evaluations));
            }
        }

        if self.max_iterations > 1 {
            warn!("Romberg did not reach tolerance {:e} within {} rows",
                  self.tolerance,
                  self.max_iterations);
        }
        Ok(IntegrationResult::romberg(table.diagonal(), table.row(), false, evaluations))
    }
}
