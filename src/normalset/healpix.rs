//! Equal-area bucketing of directions (HEALPix, RING numbering).
//!
//! Only the direction-to-pixel mapping is provided; it is the sole piece of the
//! pixelisation the angular index needs.

use std::f64::consts::{FRAC_PI_2, TAU};

/// Number of buckets for resolution `nside`.
pub fn bucket_count(nside: usize) -> usize {
    12 * nside * nside
}

/// Maps a direction (any non-zero length) to one of `bucket_count(nside)` buckets.
///
/// Returns `None` for `nside == 0` and for zero or non-finite vectors.
pub fn normal_to_bucket_index(v: &[f64; 3], nside: usize) -> Option<usize> {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if nside == 0 || !len.is_finite() || len == 0.0 {
        return None;
    }
    let z = (v[2] / len).clamp(-1.0, 1.0);
    let phi = v[1].atan2(v[0]);
    Some(pixel_from_z_phi(nside as i64, z, phi))
}

fn pixel_from_z_phi(nside: i64, z: f64, phi: f64) -> usize {
    let za = z.abs();
    // in [0, 4)
    let tt = phi.rem_euclid(TAU) / FRAC_PI_2;

    let pix = if za <= 2.0 / 3.0 {
        // equatorial belt
        let temp1 = nside as f64 * (0.5 + tt);
        let temp2 = nside as f64 * z * 0.75;
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;

        // ring counted from z = 2/3, in 1..=2*nside+1
        let ir = nside + 1 + jp - jm;
        let kshift = 1 - (ir & 1);

        let ip = ((jp + jm - nside + kshift + 1) / 2).rem_euclid(4 * nside);
        2 * nside * (nside - 1) + (ir - 1) * 4 * nside + ip
    } else {
        // polar caps
        let tp = tt - tt.trunc();
        let tmp = nside as f64 * (3.0 * (1.0 - za)).sqrt();

        let jp = (tp * tmp) as i64;
        let jm = ((1.0 - tp) * tmp) as i64;

        // ring counted from the closest pole
        let ir = jp + jm + 1;
        let ip = ((tt * ir as f64) as i64).rem_euclid(4 * ir);

        if z > 0.0 {
            2 * ir * (ir - 1) + ip
        } else {
            12 * nside * nside - 2 * ir * (ir + 1) + ip
        }
    };
    pix as usize
}
