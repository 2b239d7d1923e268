//! Chebyshev series evaluation for SPK position records.

/// Evaluate a Chebyshev series at `x` in [-1, 1] with Clenshaw's recurrence.
pub fn clenshaw(coefficients: &[f64], x: f64) -> f64 {
    match coefficients {
        [] => 0.0,
        [only] => *only,
        _ => {
            let mut b1 = 0.0;
            let mut b2 = 0.0;
            for &c in coefficients[1..].iter().rev() {
                let b = 2.0 * x * b1 - b2 + c;
                b2 = b1;
                b1 = b;
            }
            coefficients[0] + x * b1 - b2
        }
    }
}

/// Map an epoch into the [-1, 1] domain of a record centered on `mid` with
/// half-width `radius`. Record selection keeps the epoch inside the record,
/// so any excursion is float fuzz at the boundaries.
pub fn normalize(et: f64, mid: f64, radius: f64) -> f64 {
    ((et - mid) / radius).clamp(-1.0, 1.0)
}
