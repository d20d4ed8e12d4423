//! Oriented sample points and the handful of fixed-size vector helpers the
//! spatial structures share.

/// A sample of a point cloud: position, unit normal and an optional RGB colour.
///
/// A zero normal means "no normal available" and disables the normal test of
/// the default pair filter for pairs involving this point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3D {
    pub pos: [f64; 3],
    pub normal: [f64; 3],
    pub rgb: Option<[f64; 3]>,
}

impl Point3D {
    pub fn new(pos: [f64; 3], normal: [f64; 3]) -> Self {
        Self { pos, normal, rgb: None }
    }

    pub fn from_pos(pos: [f64; 3]) -> Self {
        Self::new(pos, [0.0; 3])
    }

    pub fn with_rgb(mut self, rgb: [f64; 3]) -> Self {
        self.rgb = Some(rgb);
        self
    }

    pub fn has_normal(&self) -> bool {
        norm_sq(&self.normal) > 0.0
    }
}

#[inline]
pub fn sub<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    std::array::from_fn(|d| a[d] - b[d])
}

#[inline]
pub fn add<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    std::array::from_fn(|d| a[d] + b[d])
}

#[inline]
pub fn scale<const D: usize>(a: &[f64; D], s: f64) -> [f64; D] {
    std::array::from_fn(|d| a[d] * s)
}

#[inline]
pub fn dot<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    (0..D).map(|d| a[d] * b[d]).sum()
}

#[inline]
pub fn norm_sq<const D: usize>(a: &[f64; D]) -> f64 {
    dot(a, a)
}

#[inline]
pub fn norm<const D: usize>(a: &[f64; D]) -> f64 {
    norm_sq(a).sqrt()
}

#[inline]
pub fn distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    norm(&sub(a, b))
}

#[inline]
pub fn distance_sq<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    norm_sq(&sub(a, b))
}

/// Unit vector along `a`; the zero vector stays zero.
#[inline]
pub fn normalized<const D: usize>(a: &[f64; D]) -> [f64; D] {
    let n = norm(a);
    if n > 0.0 { scale(a, 1.0 / n) } else { *a }
}

/// `a + t * (b - a)`
#[inline]
pub fn lerp<const D: usize>(a: &[f64; D], b: &[f64; D], t: f64) -> [f64; D] {
    std::array::from_fn(|d| a[d] + t * (b[d] - a[d]))
}

#[inline]
pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Rotates `v` by the shortest rotation taking `+Z` onto the unit vector `n`.
///
/// For `n` pointing to `-Z` the rotation is a half turn around `+X`.
pub fn rotate_from_z(n: &[f64; 3], v: &[f64; 3]) -> [f64; 3] {
    let c = n[2];
    if c <= -1.0 + 1e-12 {
        return [v[0], -v[1], -v[2]];
    }
    // axis = z x n, |axis| = sin(theta)
    let axis = [-n[1], n[0], 0.0];
    let axv = cross(&axis, v);
    let k = dot(&axis, v) / (1.0 + c);
    [
        v[0] * c + axv[0] + axis[0] * k,
        v[1] * c + axv[1] + axis[1] * k,
        v[2] * c + axv[2] + axis[2] * k,
    ]
}
