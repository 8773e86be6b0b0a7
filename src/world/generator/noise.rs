//! Integer-hash value noise with a 3x3 smoothing kernel and cosine interpolation.

use std::f64::consts::PI;

/// Pseudo-random value in `[-1, 1]` for a lattice point. 32-bit wrapping arithmetic.
pub fn lattice_noise(x: i32, z: i32) -> f64 {
    let n = x.wrapping_add(z.wrapping_mul(57));
    let n = n.wrapping_shl(13) ^ n;
    let hashed = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(15731).wrapping_add(789_221))
        .wrapping_add(1_376_312_589);
    1.0 - f64::from(hashed & 0x7fff_ffff) / 1_073_741_824.0
}

/// Lattice noise blurred with its eight neighbors: corners /16, sides /8, center /4.
pub fn smooth_noise(x: i32, z: i32) -> f64 {
    let corners = (lattice_noise(x.wrapping_sub(1), z.wrapping_sub(1))
        + lattice_noise(x.wrapping_add(1), z.wrapping_sub(1))
        + lattice_noise(x.wrapping_sub(1), z.wrapping_add(1))
        + lattice_noise(x.wrapping_add(1), z.wrapping_add(1)))
        / 16.0;
    let sides = (lattice_noise(x.wrapping_sub(1), z)
        + lattice_noise(x.wrapping_add(1), z)
        + lattice_noise(x, z.wrapping_sub(1))
        + lattice_noise(x, z.wrapping_add(1)))
        / 8.0;
    let center = lattice_noise(x, z) / 4.0;
    corners + sides + center
}

pub fn cosine_interpolate(a: f64, b: f64, t: f64) -> f64 {
    let ft = (1.0 - (t * PI).cos()) * 0.5;
    a * (1.0 - ft) + b * ft
}

/// Smoothed noise sampled at a fractional position, blending the four
/// surrounding lattice points. The lattice cell is found with `floor`, so the
/// field stays continuous across zero.
pub fn interpolated_noise(x: f64, z: f64) -> f64 {
    let (cell_x, cell_z) = (x.floor(), z.floor());
    let (frac_x, frac_z) = (x - cell_x, z - cell_z);
    let (ix, iz) = (cell_x as i32, cell_z as i32);

    let v1 = smooth_noise(ix, iz);
    let v2 = smooth_noise(ix.wrapping_add(1), iz);
    let v3 = smooth_noise(ix, iz.wrapping_add(1));
    let v4 = smooth_noise(ix.wrapping_add(1), iz.wrapping_add(1));

    let i1 = cosine_interpolate(v1, v2, frac_x);
    let i2 = cosine_interpolate(v3, v4, frac_x);
    cosine_interpolate(i1, i2, frac_z)
}
