// Copyright (C) 2026 The librewinds developers
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use midly::num::u7;

/// Errors raised when building a response curve.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CurveError {
    #[error("a response curve needs at least one point")]
    Empty,

    #[error("response curve point ({0}, {1}) is not a finite number")]
    NotFinite(f64, f64),
}

/// A response curve maps a controller value onto the unit interval.
///
/// The curve is a table of breakpoints in normalized coordinates, linearly
/// interpolated between points. Inputs before the first point or after the last
/// one hold the nearest point's output. Outputs are always within `[0, 1]` for
/// every controller value, whatever shape the user draws.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseCurve {
    points: Vec<(f64, f64)>,
}

impl ResponseCurve {
    /// The straight line from (0, 0) to (1, 1).
    pub fn identity() -> ResponseCurve {
        ResponseCurve {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    /// Creates a curve from `(input, output)` breakpoints. Coordinates are
    /// clamped to `[0, 1]` and points are sorted by input.
    pub fn from_points(points: &[(f64, f64)]) -> Result<ResponseCurve, CurveError> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }

        let mut clamped = Vec::with_capacity(points.len());
        for (x, y) in points.iter().copied() {
            if !x.is_finite() || !y.is_finite() {
                return Err(CurveError::NotFinite(x, y));
            }
            clamped.push((x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)));
        }
        // Stable, so points sharing an input keep their drawing order and form a step.
        clamped.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(ResponseCurve { points: clamped })
    }

    /// The breakpoints of the curve.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Evaluates the curve for a controller value.
    pub fn evaluate(&self, value: u7) -> f64 {
        self.evaluate_normalized(f64::from(value.as_int()) / 127.0)
    }

    fn evaluate_normalized(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };

        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        for window in self.points.windows(2) {
            let (x0, y0) = window[0];
            let (x1, y1) = window[1];
            if x >= x0 && x <= x1 {
                if x1 - x0 <= f64::EPSILON {
                    return y1;
                }
                return (y0 + (y1 - y0) * (x - x0) / (x1 - x0)).clamp(0.0, 1.0);
            }
        }

        last.1
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        ResponseCurve::identity()
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use midly::num::u7;

    use super::{CurveError, ResponseCurve};

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identity() {
        let curve = ResponseCurve::identity();

        assert_close(0.0, curve.evaluate(u7::from(0)));
        assert_close(50.0 / 127.0, curve.evaluate(u7::from(50)));
        assert_close(1.0, curve.evaluate(u7::from(127)));
    }

    #[test]
    fn interpolates_between_points() -> Result<(), Box<dyn Error>> {
        // Shallow first half, steep second half.
        let curve = ResponseCurve::from_points(&[(1.0, 1.0), (0.0, 0.0), (0.5, 0.2)])?;

        assert_eq!(&[(0.0, 0.0), (0.5, 0.2), (1.0, 1.0)], curve.points());
        assert_close(0.1, curve.evaluate_normalized(0.25));
        assert_close(0.6, curve.evaluate_normalized(0.75));
        Ok(())
    }

    #[test]
    fn holds_outside_points() -> Result<(), Box<dyn Error>> {
        let curve = ResponseCurve::from_points(&[(0.25, 0.4), (0.75, 0.6)])?;

        assert_close(0.4, curve.evaluate(u7::from(0)));
        assert_close(0.6, curve.evaluate(u7::from(127)));
        Ok(())
    }

    #[test]
    fn output_stays_in_unit_interval() -> Result<(), Box<dyn Error>> {
        let curve = ResponseCurve::from_points(&[(-2.0, 3.0), (0.3, -1.0), (0.6, 0.9), (4.0, 0.1)])?;

        for value in 0..=127u8 {
            let output = curve.evaluate(u7::from(value));
            assert!((0.0..=1.0).contains(&output), "{value} mapped to {output}");
        }
        Ok(())
    }

    #[test]
    fn constant_curve() -> Result<(), Box<dyn Error>> {
        let curve = ResponseCurve::from_points(&[(0.5, 0.7)])?;

        for value in [0u8, 64, 127] {
            assert_close(0.7, curve.evaluate(u7::from(value)));
        }
        Ok(())
    }

    #[test]
    fn rejects_bad_points() {
        assert_eq!(Err(CurveError::Empty), ResponseCurve::from_points(&[]));
        assert!(matches!(
            ResponseCurve::from_points(&[(0.0, f64::NAN)]),
            Err(CurveError::NotFinite(..))
        ));
    }
}
