// Centralized tolerances for curve and graph geometry

pub const EPS_LEN: f32 = 1e-6; // zero-length vector threshold
pub const EPS_POS: f32 = 1e-4; // point coincidence threshold

// Maximum relative segment-length distortion the fast-path deformer accepts
// before giving up in favor of the pseudo-elastic fallback.
pub const MAX_DEFORM_DISTORTION: f32 = 0.35;

#[inline]
pub fn near_zero(x: f32, eps: f32) -> bool {
    x.abs() <= eps
}

#[inline]
pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
