//! Deformable polyline curves sampled as point-tangent pairs.
//!
//! A [`Curve`] is the embedded shape of a graph edge: an ordered, non-empty
//! sequence of samples whose first and last positions coincide with the
//! edge's endpoint vertices. Curves support the splicing primitives the
//! rewrite operations need (append with skip, reversal, front trimming) and a
//! pseudo-elastic deformation that drags one endpoint to a new position while
//! redistributing the interior samples.

use std::ops::{Index, IndexMut};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::tolerance::EPS_LEN;

/// One sample of an embedded curve: a position and the unit tangent there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointTangent {
    pub position: Vec3,
    pub tangent: Vec3,
}

impl PointTangent {
    pub fn new(position: Vec3, tangent: Vec3) -> Self {
        PointTangent { position, tangent }
    }
}

/// An ordered sequence of [`PointTangent`] samples.
///
/// Every constructor yields at least two samples; a curve with exactly two is
/// called *simple*. The remembered original shape anchors the pseudo-elastic
/// deformation so repeated drags relax towards the drawn geometry instead of
/// accumulating drift.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Curve {
    samples: Vec<PointTangent>,
    #[serde(skip)]
    original: Vec<PointTangent>,
}

impl Curve {
    /// Straight two-sample curve from `from` to `to`, both samples sharing
    /// the normalized direction as tangent.
    pub fn straight(from: Vec3, to: Vec3) -> Curve {
        let dir = (to - from).normalize_or_zero();
        Curve::between(PointTangent::new(from, dir), PointTangent::new(to, dir))
    }

    /// Curve spanning exactly the two given samples.
    pub fn between(front: PointTangent, back: PointTangent) -> Curve {
        let samples = vec![front, back];
        Curve {
            original: samples.clone(),
            samples,
        }
    }

    /// Builds a curve through discrete points, recomputing all tangents.
    /// Returns `None` for fewer than two points.
    pub fn from_points(points: &[Vec3]) -> Option<Curve> {
        if points.len() < 2 {
            return None;
        }
        let samples: Vec<PointTangent> = points
            .iter()
            .map(|&p| PointTangent::new(p, Vec3::ZERO))
            .collect();
        let mut curve = Curve {
            original: samples.clone(),
            samples,
        };
        curve.update_tangents();
        curve.set_original_shape();
        Some(curve)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn front(&self) -> &PointTangent {
        &self.samples[0]
    }

    pub fn back(&self) -> &PointTangent {
        &self.samples[self.samples.len() - 1]
    }

    /// The sample just before the back one.
    pub fn before_back(&self) -> &PointTangent {
        &self.samples[self.samples.len() - 2]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointTangent> {
        self.samples.iter()
    }

    pub fn push_back(&mut self, sample: PointTangent) {
        self.samples.push(sample);
    }

    pub fn pop_back(&mut self) -> Option<PointTangent> {
        if self.samples.len() > 1 {
            self.samples.pop()
        } else {
            None
        }
    }

    /// Inserts a sample just before the back one.
    pub fn add_middle_point(&mut self, sample: PointTangent) {
        let at = self.samples.len() - 1;
        self.samples.insert(at, sample);
    }

    /// A copy with the sample order flipped and every tangent negated.
    pub fn reversed(&self) -> Curve {
        let samples: Vec<PointTangent> = self
            .samples
            .iter()
            .rev()
            .map(|pt| PointTangent::new(pt.position, -pt.tangent))
            .collect();
        Curve {
            original: samples.clone(),
            samples,
        }
    }

    /// Appends `other`'s samples, skipping its first `skip` samples. Callers
    /// skip one sample when the junction position is already present.
    pub fn append(&mut self, other: &Curve, skip: usize) {
        self.samples
            .extend(other.samples.iter().skip(skip).copied());
    }

    /// Drops the first `n` samples, always leaving at least one.
    pub fn trim_front(&mut self, n: usize) {
        let n = n.min(self.samples.len() - 1);
        self.samples.drain(..n);
    }

    /// Polyline arc length over the sample positions.
    pub fn length(&self) -> f32 {
        self.samples
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum()
    }

    /// Recomputes every tangent from the neighboring sample positions:
    /// interior samples use the chord between their two neighbors, the ends
    /// use their single adjacent segment. Degenerate (zero-length) chords
    /// leave the previous tangent in place.
    pub fn update_tangents(&mut self) {
        let n = self.samples.len();
        if n < 2 {
            return;
        }
        for i in 0..n {
            let chord = if i == 0 {
                self.samples[1].position - self.samples[0].position
            } else if i == n - 1 {
                self.samples[n - 1].position - self.samples[n - 2].position
            } else {
                self.samples[i + 1].position - self.samples[i - 1].position
            };
            if chord.length() > EPS_LEN {
                self.samples[i].tangent = chord / chord.length();
            }
        }
    }

    /// Re-anchors the deformation reference to the current samples.
    pub fn set_original_shape(&mut self) {
        self.original = self.samples.clone();
    }

    /// Moves one endpoint to `target` and redistributes the interior samples
    /// by their arc-length parameter measured from the fixed end, so the
    /// displacement fades to zero there. With `maintain_shape` the weights
    /// follow a smoothstep instead of a straight ramp, which keeps the
    /// neighborhood of the moved tip nearly rigid, and the parameters come
    /// from the remembered original shape (when it still matches) so repeated
    /// drags do not accumulate parameterization drift. Tangents are
    /// refreshed.
    ///
    /// Returns `false` (and leaves the curve untouched) when there are fewer
    /// than two samples to work with.
    pub fn pseudo_elastic_deform(
        &mut self,
        from_front: bool,
        target: Vec3,
        maintain_shape: bool,
    ) -> bool {
        let n = self.samples.len();
        if n < 2 {
            return false;
        }
        let moved = if from_front { 0 } else { n - 1 };
        let displacement = target - self.samples[moved].position;
        if displacement.length() <= EPS_LEN {
            self.samples[moved].position = target;
            return true;
        }

        // Arc-length parameter from the fixed end towards the moved end.
        let reference: &[PointTangent] = if maintain_shape && self.original.len() == n {
            &self.original
        } else {
            &self.samples
        };
        let mut arc = vec![0.0f32; n];
        for i in 1..n {
            arc[i] = arc[i - 1] + reference[i - 1].position.distance(reference[i].position);
        }
        let total = arc[n - 1];
        if total <= EPS_LEN {
            // Fully degenerate curve: only the endpoint moves.
            self.samples[moved].position = target;
            self.update_tangents();
            return true;
        }

        for i in 0..n {
            let along = if from_front { total - arc[i] } else { arc[i] };
            let mut w = along / total;
            if maintain_shape {
                w = w * w * (3.0 - 2.0 * w);
            }
            self.samples[i].position += displacement * w;
        }
        self.samples[moved].position = target;
        self.update_tangents();
        true
    }
}

impl Index<usize> for Curve {
    type Output = PointTangent;

    fn index(&self, index: usize) -> &PointTangent {
        &self.samples[index]
    }
}

impl IndexMut<usize> for Curve {
    fn index_mut(&mut self, index: usize) -> &mut PointTangent {
        &mut self.samples[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tolerance::EPS_POS;

    fn v(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn straight_curve_spans_endpoints() {
        let c = Curve::straight(v(0.0, 0.0, 0.0), v(2.0, 0.0, 0.0));
        assert_eq!(c.len(), 2);
        assert_eq!(c.front().position, v(0.0, 0.0, 0.0));
        assert_eq!(c.back().position, v(2.0, 0.0, 0.0));
        assert_eq!(c.front().tangent, v(1.0, 0.0, 0.0));
        assert!((c.length() - 2.0).abs() < EPS_POS);
    }

    #[test]
    fn from_points_recomputes_tangents() {
        let c = Curve::from_points(&[v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0)])
            .expect("curve");
        assert_eq!(c.len(), 3);
        for i in 0..3 {
            assert!((c[i].tangent - v(1.0, 0.0, 0.0)).length() < EPS_POS);
        }
        assert!(Curve::from_points(&[v(1.0, 1.0, 1.0)]).is_none());
    }

    #[test]
    fn reversed_flips_order_and_tangents() {
        let c = Curve::from_points(&[v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(3.0, 0.0, 0.0)])
            .expect("curve");
        let r = c.reversed();
        assert_eq!(r.front().position, v(3.0, 0.0, 0.0));
        assert_eq!(r.back().position, v(0.0, 0.0, 0.0));
        assert!((r.front().tangent - v(-1.0, 0.0, 0.0)).length() < EPS_POS);
    }

    #[test]
    fn append_with_skip_drops_duplicate_junction() {
        let mut a = Curve::straight(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let b = Curve::straight(v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0));
        a.append(&b, 1);
        assert_eq!(a.len(), 3);
        assert_eq!(a.back().position, v(2.0, 0.0, 0.0));
        assert_eq!(a[1].position, v(1.0, 0.0, 0.0));
    }

    #[test]
    fn trim_front_keeps_at_least_one_sample() {
        let mut c = Curve::from_points(&[
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(3.0, 0.0, 0.0),
        ])
        .expect("curve");
        c.trim_front(2);
        assert_eq!(c.len(), 2);
        assert_eq!(c.front().position, v(2.0, 0.0, 0.0));
        c.trim_front(10);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn pseudo_elastic_deform_moves_tip_and_pins_other_end() {
        let mut c = Curve::from_points(&[
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(3.0, 0.0, 0.0),
        ])
        .expect("curve");
        assert!(c.pseudo_elastic_deform(false, v(3.0, 1.0, 0.0), true));
        assert_eq!(c.back().position, v(3.0, 1.0, 0.0));
        assert_eq!(c.front().position, v(0.0, 0.0, 0.0));
        // interior samples moved strictly less than the tip
        assert!(c[1].position.y < 1.0);
        assert!(c[2].position.y < 1.0);
        assert!(c[1].position.y <= c[2].position.y);
    }

    #[test]
    fn pseudo_elastic_deform_front_pins_back() {
        let mut c = Curve::from_points(&[v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0)])
            .expect("curve");
        assert!(c.pseudo_elastic_deform(true, v(0.0, -1.0, 0.0), false));
        assert_eq!(c.front().position, v(0.0, -1.0, 0.0));
        assert_eq!(c.back().position, v(2.0, 0.0, 0.0));
    }
}
