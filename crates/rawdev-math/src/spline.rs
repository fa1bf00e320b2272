//! Monotone-preserving cubic Hermite splines (Fritsch-Carlson method).
//!
//! Every user curve in the pipeline - tone curves, the five color-grading
//! curves - is evaluated through this spline. The construction guarantees
//! that a curve through non-decreasing points stays non-decreasing, so tone
//! curves cannot overshoot and ring.
//!
//! # Endpoint defaults
//!
//! Curves arrive without guaranteed endpoints at x = 0 and x = 1; the
//! missing ones are inserted per curve family (see [`Endpoints`]):
//! tone and sat-vs-sat curves get the identity anchors (0,0)/(1,1),
//! additive curves (hue-vs-hue, hue-vs-luma) get y = 0, multiplicative
//! curves (hue-vs-sat, luma-vs-sat) get y = 1.

use serde::{Deserialize, Serialize};

/// A single curve control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Input coordinate, expected in [0, 1] and non-decreasing per curve.
    pub x: f32,
    /// Output coordinate.
    pub y: f32,
}

impl CurvePoint {
    /// Creates a curve point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Endpoint insertion rule for the curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoints {
    /// Identity anchors: (0, 0) and (1, 1). Tone curves and sat-vs-sat.
    Unit,
    /// Neutral-zero anchors: (0, 0) and (1, 0). Additive curves.
    Zero,
    /// Neutral-one anchors: (0, 1) and (1, 1). Multiplicative curves.
    One,
}

impl Endpoints {
    #[inline]
    fn anchor_y(&self, at_one: bool) -> f32 {
        match self {
            Endpoints::Unit => {
                if at_one {
                    1.0
                } else {
                    0.0
                }
            }
            Endpoints::Zero => 0.0,
            Endpoints::One => 1.0,
        }
    }
}

/// A monotone cubic Hermite spline over [0, 1].
#[derive(Debug, Clone)]
pub struct Spline {
    xs: Vec<f32>,
    ys: Vec<f32>,
    tangents: Vec<f32>,
}

impl Spline {
    /// Builds a monotone spline from control points.
    ///
    /// Missing endpoints at x = 0 / x = 1 are inserted per `endpoints`.
    /// An empty point list yields the pure anchor curve (identity line for
    /// [`Endpoints::Unit`], constant 0 or 1 otherwise). Points are sorted by
    /// x; callers validate strict monotonicity of user input beforehand.
    pub fn monotone(points: &[CurvePoint], endpoints: Endpoints) -> Self {
        let mut pts: Vec<CurvePoint> = points.to_vec();
        pts.sort_by(|a, b| a.x.total_cmp(&b.x));

        if pts.first().is_none_or(|p| p.x > 1e-6) {
            pts.insert(0, CurvePoint::new(0.0, endpoints.anchor_y(false)));
        }
        if pts.last().is_none_or(|p| p.x < 1.0 - 1e-6) {
            pts.push(CurvePoint::new(1.0, endpoints.anchor_y(true)));
        }

        let n = pts.len();
        let xs: Vec<f32> = pts.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = pts.iter().map(|p| p.y).collect();

        // Initial tangents: one-sided at the ends, central differences
        // inside. Two points degenerate to the secant slope on both ends.
        // Coincident knots contribute zero slope instead of dividing by
        // zero.
        let secant = |i: usize, j: usize| -> f32 {
            let dx = xs[j] - xs[i];
            if dx.abs() < 1e-6 {
                0.0
            } else {
                (ys[j] - ys[i]) / dx
            }
        };
        let mut tangents = vec![0.0f32; n];
        if n == 2 {
            let slope = secant(0, 1);
            tangents[0] = slope;
            tangents[1] = slope;
        } else {
            tangents[0] = secant(0, 1);
            for i in 1..n - 1 {
                tangents[i] = secant(i - 1, i + 1);
            }
            tangents[n - 1] = secant(n - 2, n - 1);
        }

        // Fritsch-Carlson monotonicity pass.
        for i in 0..n - 1 {
            let dx = xs[i + 1] - xs[i];
            let dy = ys[i + 1] - ys[i];
            if dx.abs() < 1e-6 {
                continue;
            }
            let slope = dy / dx;

            if slope.abs() < 1e-6 {
                tangents[i] = 0.0;
                tangents[i + 1] = 0.0;
            } else {
                if tangents[i].signum() != slope.signum() {
                    tangents[i] = 0.0;
                }
                if tangents[i + 1].signum() != slope.signum() {
                    tangents[i + 1] = 0.0;
                }
                let alpha = tangents[i] / slope;
                let beta = tangents[i + 1] / slope;
                let mag_sq = alpha * alpha + beta * beta;
                if mag_sq > 9.0 {
                    let tau = 3.0 / mag_sq.sqrt();
                    tangents[i] = tau * alpha * slope;
                    tangents[i + 1] = tau * beta * slope;
                }
            }
        }

        Self { xs, ys, tangents }
    }

    /// Number of knots.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns `true` if the spline has no knots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Evaluates the spline at `x`.
    pub fn evaluate(&self, x: f32) -> f32 {
        self.cursor().eval(x)
    }

    /// Returns a cursor for evaluating at non-decreasing x values.
    ///
    /// The cursor caches the active segment index so tight LUT loops pay a
    /// short forward walk instead of a search per sample.
    #[inline]
    pub fn cursor(&self) -> SplineCursor<'_> {
        SplineCursor {
            spline: self,
            seg: 0,
        }
    }

    #[inline]
    fn eval_segment(&self, seg: usize, x: f32) -> f32 {
        let h = self.xs[seg + 1] - self.xs[seg];
        let t = if h > 1e-6 { (x - self.xs[seg]) / h } else { 0.0 };
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        h00 * self.ys[seg]
            + h10 * h * self.tangents[seg]
            + h01 * self.ys[seg + 1]
            + h11 * h * self.tangents[seg + 1]
    }
}

/// Segment-caching evaluator for monotonically increasing query points.
#[derive(Debug)]
pub struct SplineCursor<'a> {
    spline: &'a Spline,
    seg: usize,
}

impl SplineCursor<'_> {
    /// Evaluates the spline at `x`, advancing the cached segment.
    ///
    /// Queries must be non-decreasing between calls on the same cursor;
    /// the cursor never walks backwards.
    #[inline]
    pub fn eval(&mut self, x: f32) -> f32 {
        let n = self.spline.xs.len();
        while self.seg < n - 2 && x > self.spline.xs[self.seg + 1] {
            self.seg += 1;
        }
        self.spline.eval_segment(self.seg, x)
    }
}

/// Returns `true` when the x coordinates are strictly non-decreasing.
pub fn is_x_monotone(points: &[CurvePoint]) -> bool {
    points.windows(2).all(|w| w[0].x <= w[1].x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_unit_is_identity() {
        let s = Spline::monotone(&[], Endpoints::Unit);
        for i in 0..=10 {
            let x = i as f32 / 10.0;
            assert_relative_eq!(s.evaluate(x), x, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_empty_one_is_constant() {
        let s = Spline::monotone(&[], Endpoints::One);
        assert_relative_eq!(s.evaluate(0.3), 1.0, epsilon = 1e-6);
        assert_relative_eq!(s.evaluate(0.9), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_zero_is_constant() {
        let s = Spline::monotone(&[], Endpoints::Zero);
        assert_relative_eq!(s.evaluate(0.5), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_interpolates_knots() {
        let pts = [
            CurvePoint::new(0.25, 0.15),
            CurvePoint::new(0.75, 0.85),
        ];
        let s = Spline::monotone(&pts, Endpoints::Unit);
        assert_relative_eq!(s.evaluate(0.0), 0.0, epsilon = 1e-5);
        assert_relative_eq!(s.evaluate(0.25), 0.15, epsilon = 1e-5);
        assert_relative_eq!(s.evaluate(0.75), 0.85, epsilon = 1e-5);
        assert_relative_eq!(s.evaluate(1.0), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_monotone_output_for_monotone_input() {
        let pts = [
            CurvePoint::new(0.2, 0.05),
            CurvePoint::new(0.4, 0.7),
            CurvePoint::new(0.6, 0.75),
        ];
        let s = Spline::monotone(&pts, Endpoints::Unit);
        let mut prev = s.evaluate(0.0);
        for i in 1..=200 {
            let v = s.evaluate(i as f32 / 200.0);
            assert!(v >= prev - 1e-6, "non-monotone at {i}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn test_flat_segment_has_zero_tangents() {
        let pts = [
            CurvePoint::new(0.3, 0.5),
            CurvePoint::new(0.7, 0.5),
        ];
        let s = Spline::monotone(&pts, Endpoints::Unit);
        assert_relative_eq!(s.evaluate(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_cursor_matches_evaluate() {
        let pts = [
            CurvePoint::new(0.25, 0.4),
            CurvePoint::new(0.5, 0.45),
            CurvePoint::new(0.75, 0.9),
        ];
        let s = Spline::monotone(&pts, Endpoints::Unit);
        let mut cursor = s.cursor();
        for i in 0..=100 {
            let x = i as f32 / 100.0;
            assert_relative_eq!(cursor.eval(x), s.evaluate(x), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_is_x_monotone() {
        let good = [CurvePoint::new(0.0, 0.0), CurvePoint::new(0.5, 0.2)];
        let bad = [CurvePoint::new(0.5, 0.0), CurvePoint::new(0.2, 0.2)];
        assert!(is_x_monotone(&good));
        assert!(!is_x_monotone(&bad));
    }

    #[test]
    fn test_duplicate_x_knots_stay_finite() {
        let pts = [
            CurvePoint::new(0.5, 0.2),
            CurvePoint::new(0.5, 0.8),
        ];
        let s = Spline::monotone(&pts, Endpoints::Unit);
        for i in 0..=100 {
            let v = s.evaluate(i as f32 / 100.0);
            assert!(v.is_finite(), "non-finite at {i}: {v}");
        }
    }

    #[test]
    fn test_inverting_curve() {
        let pts = [CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 0.0)];
        let s = Spline::monotone(&pts, Endpoints::Unit);
        assert_relative_eq!(s.evaluate(0.0), 1.0, epsilon = 1e-5);
        assert_relative_eq!(s.evaluate(1.0), 0.0, epsilon = 1e-5);
        assert_relative_eq!(s.evaluate(0.5), 0.5, epsilon = 1e-3);
    }
}
