use nalgebra::DVector;

/// Tridiagonal linear system `sub[i]*x[i-1] + diag[i]*x[i] + sup[i]*x[i+1] = rhs[i]`.
///
/// `sub[0]` and `sup[n-1]` are ignored.
pub struct TridiagonalSystem {
    sub: DVector<f64>,
    diag: DVector<f64>,
    sup: DVector<f64>,
    rhs: DVector<f64>,
}

impl TridiagonalSystem {
    pub fn zeros(n: usize) -> TridiagonalSystem {
        TridiagonalSystem {
            sub: DVector::zeros(n),
            diag: DVector::zeros(n),
            sup: DVector::zeros(n),
            rhs: DVector::zeros(n),
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn set_row(&mut self, i: usize, sub: f64, diag: f64, sup: f64, rhs: f64) {
        self.sub[i] = sub;
        self.diag[i] = diag;
        self.sup[i] = sup;
        self.rhs[i] = rhs;
    }

    /// Thomas algorithm, O(n). Returns the row whose pivot vanished on failure.
    pub fn solve(&self) -> Result<DVector<f64>, usize> {
        let n = self.len();
        let mut c_prime = DVector::<f64>::zeros(n);
        let mut d_prime = DVector::<f64>::zeros(n);

        for i in 0..n {
            let (lower, carried_c, carried_d) = if i > 0 {
                (self.sub[i], c_prime[i - 1], d_prime[i - 1])
            } else {
                (0.0, 0.0, 0.0)
            };
            let pivot = self.diag[i] - lower * carried_c;
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(i);
            }
            c_prime[i] = if i + 1 < n { self.sup[i] / pivot } else { 0.0 };
            d_prime[i] = (self.rhs[i] - lower * carried_d) / pivot;
        }

        let mut solution = d_prime;
        for i in (0..n.saturating_sub(1)).rev() {
            solution[i] -= c_prime[i] * solution[i + 1];
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_diagonally_dominant_system() {
        // [4 1 0; 1 4 1; 0 1 4] x = [5 6 5] -> x = [1 1 1]
        let mut system = TridiagonalSystem::zeros(3);
        system.set_row(0, 0.0, 4.0, 1.0, 5.0);
        system.set_row(1, 1.0, 4.0, 1.0, 6.0);
        system.set_row(2, 1.0, 4.0, 0.0, 5.0);

        let x = system.solve().unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(x[i], 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn reports_zero_pivot_row() {
        let mut system = TridiagonalSystem::zeros(2);
        system.set_row(0, 0.0, 1.0, 1.0, 1.0);
        system.set_row(1, 1.0, 1.0, 0.0, 1.0);

        assert_eq!(system.solve(), Err(1));
    }
}
