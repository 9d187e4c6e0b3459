//! Sobol' low-discrepancy sequence.
//!
//! Gray-code generator over the published Joe-Kuo `new-joe-kuo-6` direction
//! numbers, producing the quasi-random base matrix for the Saltelli
//! cross-sampler. The first row of the sequence is the origin.
//!
//! The bundled table covers [`MAX_DIMENSIONS`] dimensions; asking for more is
//! a reported configuration error, never a silent fallback to pseudo-random
//! points.
// TODO: extend the bundled table past d = 21 from the published Joe-Kuo set
// to lift the factor ceiling on the Saltelli sampler.

use ndarray::Array2;

use super::error::UncertaintyError;

/// Dimensions covered by the bundled direction numbers.
pub const MAX_DIMENSIONS: usize = 21;

/// Bits of resolution per coordinate.
const BITS: usize = 32;

/// Primitive polynomial degree, encoded inner coefficients, and initial
/// direction numbers for dimensions 2..=21 (dimension 1 is the van der
/// Corput sequence and needs no entry).
struct JoeKuo {
    s: usize,
    a: u32,
    m: &'static [u32],
}

#[rustfmt::skip]
static DIRECTIONS: [JoeKuo; 20] = [
    JoeKuo { s: 1, a: 0,  m: &[1] },
    JoeKuo { s: 2, a: 1,  m: &[1, 3] },
    JoeKuo { s: 3, a: 1,  m: &[1, 3, 1] },
    JoeKuo { s: 3, a: 2,  m: &[1, 1, 1] },
    JoeKuo { s: 4, a: 1,  m: &[1, 1, 3, 3] },
    JoeKuo { s: 4, a: 4,  m: &[1, 3, 5, 13] },
    JoeKuo { s: 5, a: 2,  m: &[1, 1, 5, 5, 17] },
    JoeKuo { s: 5, a: 4,  m: &[1, 1, 5, 5, 5] },
    JoeKuo { s: 5, a: 7,  m: &[1, 1, 7, 11, 19] },
    JoeKuo { s: 5, a: 11, m: &[1, 1, 5, 1, 1] },
    JoeKuo { s: 5, a: 13, m: &[1, 1, 1, 3, 11] },
    JoeKuo { s: 5, a: 14, m: &[1, 3, 5, 5, 31] },
    JoeKuo { s: 6, a: 1,  m: &[1, 3, 3, 9, 7, 49] },
    JoeKuo { s: 6, a: 13, m: &[1, 1, 1, 15, 21, 21] },
    JoeKuo { s: 6, a: 16, m: &[1, 3, 1, 13, 27, 49] },
    JoeKuo { s: 6, a: 19, m: &[1, 1, 1, 15, 7, 5] },
    JoeKuo { s: 6, a: 22, m: &[1, 3, 1, 15, 13, 25] },
    JoeKuo { s: 6, a: 25, m: &[1, 1, 5, 5, 19, 61] },
    JoeKuo { s: 7, a: 1,  m: &[1, 3, 7, 11, 23, 15, 103] },
    JoeKuo { s: 7, a: 4,  m: &[1, 3, 7, 13, 13, 15, 69] },
];

/// Direction numbers `v[1..=BITS]` for one dimension.
fn direction_numbers(dimension: usize) -> [u32; BITS + 1] {
    let mut v = [0u32; BITS + 1];
    if dimension == 0 {
        for (k, value) in v.iter_mut().enumerate().skip(1) {
            *value = 1 << (BITS - k);
        }
        return v;
    }

    let JoeKuo { s, a, m } = &DIRECTIONS[dimension - 1];
    for k in 1..=*s {
        v[k] = m[k - 1] << (BITS - k);
    }
    for k in (*s + 1)..=BITS {
        let mut value = v[k - s] ^ (v[k - s] >> s);
        for i in 1..*s {
            if (a >> (s - 1 - i)) & 1 == 1 {
                value ^= v[k - i];
            }
        }
        v[k] = value;
    }
    v
}

/// Generate the first `n` points of the `dim`-dimensional Sobol' sequence,
/// including the origin, as an `n x dim` matrix over `[0, 1)`.
pub fn sample(n: usize, dim: usize) -> Result<Array2<f64>, UncertaintyError> {
    if dim > MAX_DIMENSIONS {
        return Err(UncertaintyError::UnsupportedDimension {
            requested: dim,
            supported: MAX_DIMENSIONS,
        });
    }

    let directions: Vec<[u32; BITS + 1]> = (0..dim).map(direction_numbers).collect();

    let mut points = Array2::zeros((n, dim));
    let mut state = vec![0u32; dim];
    let scale = (1u64 << BITS) as f64;

    for i in 1..n {
        // Gray-code step: flip the direction number at the position of the
        // rightmost zero bit of the previous index.
        let c = (i - 1).trailing_ones() as usize + 1;
        for (j, x) in state.iter_mut().enumerate() {
            *x ^= directions[j][c];
            points[(i, j)] = *x as f64 / scale;
        }
    }

    Ok(points)
}
