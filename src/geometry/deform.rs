//! Fast-path curve deformation.
//!
//! Tried before the pseudo-elastic fallback when a single sample has to reach
//! a new position: the displacement is applied to the sample and dragged onto
//! its neighbors with an arc-length falloff, keeping every other endpoint
//! pinned. If that would distort segment lengths past the tolerated bound the
//! curve is restored and the caller falls back to
//! [`Curve::pseudo_elastic_deform`].

use glam::Vec3;

use super::curve::Curve;
use super::tolerance::{EPS_LEN, MAX_DEFORM_DISTORTION};

/// Moves `curve[index]` to `target`, dragging nearby samples along.
///
/// Endpoints other than the moved sample stay pinned. Returns `false` and
/// leaves the curve unchanged when the curve is simple (two samples), the
/// index is out of range, or the deformation stretches some segment beyond
/// the tolerated distortion.
pub fn deform_curve(curve: &mut Curve, index: usize, target: Vec3) -> bool {
    let n = curve.len();
    if n <= 2 || index >= n {
        return false;
    }

    let before: Vec<Vec3> = (0..n).map(|i| curve[i].position).collect();
    let displacement = target - before[index];
    if displacement.length() <= EPS_LEN {
        return true;
    }

    let mut arc = vec![0.0f32; n];
    for i in 1..n {
        arc[i] = arc[i - 1] + before[i - 1].distance(before[i]);
    }
    // The displacement fades out over a neighborhood proportional to how far
    // the sample travels, never reaching a pinned endpoint.
    let radius = (2.0 * displacement.length()).max(arc[n - 1] / n as f32);

    for i in 0..n {
        let pinned_end = (i == 0 && index != 0) || (i == n - 1 && index != n - 1);
        if pinned_end {
            continue;
        }
        let distance = (arc[i] - arc[index]).abs();
        let w = (1.0 - distance / radius).max(0.0);
        curve[i].position = before[i] + displacement * w;
    }
    curve[index].position = target;

    // Reject the result if some segment stretched or shrank too much.
    for i in 1..n {
        let old = before[i - 1].distance(before[i]);
        if old <= EPS_LEN {
            continue;
        }
        let new = curve[i - 1].position.distance(curve[i].position);
        if ((new - old) / old).abs() > MAX_DEFORM_DISTORTION {
            for (j, &p) in before.iter().enumerate() {
                curve[j].position = p;
            }
            return false;
        }
    }

    curve.update_tangents();
    true
}
