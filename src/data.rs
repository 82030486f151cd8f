//! Auxiliary data files used by cuts
//!
//! Maps are read from the configured data directory on first use, then kept
//! around for the lifetime of the process.

use crate::{
    error::{CutError, Result},
    numeric::{functions::clip, reals, Float},
};

use log::debug;
use nalgebra::DMatrix;
use serde::Deserialize;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
};

/// File name of the S1 area-fraction-top map, measured with the Kr83m 32 keV
/// line
pub const S1_AFT_MAP_FILE: &str = "s1_aft_rz_02Mar2017.json";

/// Number of B-splines that are nonzero at any point (cubic splines)
const ORDER: usize = 4;

/// On-disk layout of an (r, z) map
#[derive(Debug, Deserialize)]
struct RawMap {
    r_pts: Vec<Float>,
    z_pts: Vec<Float>,
    /// Values for each r, then each z
    map: Vec<Float>,
}

/// Quantity tabulated on a rectangular (r, z) grid
///
/// The map is the bicubic spline going through every grid point, with the
/// "not-a-knot" end condition along each axis: knots sit at the grid points,
/// except the second and next-to-last ones. Outside of the grid, coordinates
/// are clamped to the nearest edge.
///
/// Each axis needs at least 4 points.
///
#[derive(Debug, Clone, PartialEq)]
pub struct RzMap {
    /// Knot vector along r
    r_knots: Vec<Float>,

    /// Knot vector along z
    z_knots: Vec<Float>,

    /// B-spline coefficients, indexed as (r, z)
    coefficients: DMatrix<Float>,
}
//
impl RzMap {
    /// Build a map from grid coordinates and values, indexed as (r, z)
    pub fn new(r_pts: Vec<Float>, z_pts: Vec<Float>, values: DMatrix<Float>) -> Result<Self> {
        let invalid = |reason: String| CutError::InvalidData {
            path: PathBuf::new(),
            reason,
        };
        for (axis, points) in [("r", &r_pts), ("z", &z_pts)] {
            if points.len() < ORDER {
                return Err(invalid(format!(
                    "{} {axis} grid point(s), need at least {ORDER}",
                    points.len()
                )));
            }
            if !points.iter().all(|p| p.is_finite()) {
                return Err(invalid(format!("{axis} grid has non-finite points")));
            }
            if !points.windows(2).all(|w| w[0] < w[1]) {
                return Err(invalid(format!("{axis} grid is not strictly increasing")));
            }
        }
        if values.shape() != (r_pts.len(), z_pts.len()) {
            return Err(invalid(format!(
                "map has shape {:?} for a {}x{} grid",
                values.shape(),
                r_pts.len(),
                z_pts.len()
            )));
        }

        // Interpolation conditions are Br * C * Bz^T = values, where Br and Bz
        // are the B-splines of each axis evaluated on its grid points
        let r_knots = not_a_knot(&r_pts);
        let z_knots = not_a_knot(&z_pts);
        let singular = || invalid("spline interpolation matrix is singular".to_owned());
        let partial = collocation(&r_knots, &r_pts)
            .lu()
            .solve(&values)
            .ok_or_else(singular)?;
        let coefficients = collocation(&z_knots, &z_pts)
            .lu()
            .solve(&partial.transpose())
            .ok_or_else(singular)?
            .transpose();
        Ok(Self {
            r_knots,
            z_knots,
            coefficients,
        })
    }

    /// Load a map from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CutError::DataFile {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawMap = serde_json::from_str(&text).map_err(|source| CutError::DataFormat {
            path: path.to_owned(),
            source,
        })?;

        let (num_r, num_z) = (raw.r_pts.len(), raw.z_pts.len());
        if raw.map.len() != num_r * num_z {
            return Err(CutError::InvalidData {
                path: path.to_owned(),
                reason: format!(
                    "{} map values for a {num_r}x{num_z} grid",
                    raw.map.len()
                ),
            });
        }
        let values = DMatrix::from_row_slice(num_r, num_z, &raw.map);
        Self::new(raw.r_pts, raw.z_pts, values).map_err(|e| match e {
            CutError::InvalidData { reason, .. } => CutError::InvalidData {
                path: path.to_owned(),
                reason,
            },
            other => other,
        })
    }

    /// Value of the map at some position (NaN if a coordinate is NaN)
    pub fn at(&self, r: Float, z: Float) -> Float {
        if r.is_nan() || z.is_nan() {
            return reals::NAN;
        }
        let (first_r, basis_r) = basis(&self.r_knots, r);
        let (first_z, basis_z) = basis(&self.z_knots, z);
        let mut result = 0.;
        for (i, br) in basis_r.iter().enumerate() {
            for (j, bz) in basis_z.iter().enumerate() {
                result += self.coefficients[(first_r + i, first_z + j)] * br * bz;
            }
        }
        result
    }
}

/// Knot vector of the not-a-knot cubic spline through `points`
fn not_a_knot(points: &[Float]) -> Vec<Float> {
    let (first, last) = (points[0], points[points.len() - 1]);
    let mut knots = vec![first; ORDER];
    knots.extend_from_slice(&points[2..points.len() - 2]);
    knots.extend(std::iter::repeat(last).take(ORDER));
    knots
}

/// Value of every B-spline at every point, one row per point
fn collocation(knots: &[Float], points: &[Float]) -> DMatrix<Float> {
    let num_splines = knots.len() - ORDER;
    let mut matrix = DMatrix::zeros(points.len(), num_splines);
    for (row, &x) in points.iter().enumerate() {
        let (first, values) = basis(knots, x);
        for (offset, value) in values.into_iter().enumerate() {
            matrix[(row, first + offset)] = value;
        }
    }
    matrix
}

/// Index of the first nonzero cubic B-spline at `x` (clamped to the knot
/// range) and the values of the 4 nonzero ones, by the Cox-de Boor recursion
fn basis(knots: &[Float], x: Float) -> (usize, [Float; ORDER]) {
    let degree = ORDER - 1;
    let num_splines = knots.len() - ORDER;
    let x = clip(x, knots[degree], knots[num_splines]);

    // Knot span [knots[span], knots[span + 1]) holding x, the last span being
    // closed on the right
    let span = knots
        .partition_point(|&k| k <= x)
        .saturating_sub(1)
        .clamp(degree, num_splines - 1);

    let mut values = [0.; ORDER];
    let mut left = [0.; ORDER];
    let mut right = [0.; ORDER];
    values[0] = 1.;
    for j in 1..ORDER {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.;
        for r in 0..j {
            let temp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    (span - degree, values)
}

/// Load a map, or fetch it from the cache of previously loaded maps
pub fn cached_map(path: &Path) -> Result<Arc<RzMap>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<RzMap>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(Default::default);

    // Maps are never left half-inserted, so a poisoned lock is still usable
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(map) = cache.get(path) {
        return Ok(map.clone());
    }
    debug!("Loading map {}", path.display());
    let map = Arc::new(RzMap::load(path)?);
    cache.insert(path.to_owned(), map.clone());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const R_PTS: [Float; 5] = [0., 5., 12., 20., 30.];
    const Z_PTS: [Float; 5] = [-40., -25., -12., -5., 0.];

    /// Polynomial of degree 3 in r and in z, which the map reproduces exactly
    fn bicubic(r: Float, z: Float) -> Float {
        1. + 0.5 * r - 2e-3 * r.powi(2) * z + 1e-4 * r.powi(3) + 1e-5 * z.powi(3)
            - 3e-6 * r.powi(3) * z.powi(2)
    }

    fn grid() -> RzMap {
        let values = DMatrix::from_fn(R_PTS.len(), Z_PTS.len(), |i, j| {
            bicubic(R_PTS[i], Z_PTS[j])
        });
        RzMap::new(R_PTS.to_vec(), Z_PTS.to_vec(), values).unwrap()
    }

    fn assert_close(actual: Float, expected: Float) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1.),
            "{actual} != {expected}"
        );
    }

    #[test]
    fn goes_through_grid_points() {
        let map = grid();
        for &r in &R_PTS {
            for &z in &Z_PTS {
                assert_close(map.at(r, z), bicubic(r, z));
            }
        }
    }

    #[test]
    fn reproduces_bicubic_polynomials() {
        let map = grid();
        for (r, z) in [(7.5, -18.), (25., -2.), (0.3, -39.), (16., -30.5)] {
            assert_close(map.at(r, z), bicubic(r, z));
        }
    }

    #[test]
    fn four_points_give_the_interpolating_cubic() {
        // On 4 points the spline is the Lagrange polynomial, here
        // x (x - 2) (x - 3) / 2 along r and constant along z
        let pts = vec![0., 1., 2., 3.];
        let values = DMatrix::from_fn(4, 4, |i, _| if i == 1 { 1. } else { 0. });
        let map = RzMap::new(pts.clone(), pts, values).unwrap();
        assert_close(map.at(1.5, 0.7), 0.5625);
        assert_close(map.at(0.5, 2.2), 0.9375);
        assert_close(map.at(2.5, 3.), -0.3125);
    }

    #[test]
    fn clamping_and_nan() {
        let map = grid();
        assert_eq!(map.at(100., 3.), map.at(30., 0.));
        assert_eq!(map.at(-5., -100.), map.at(0., -40.));
        assert_close(map.at(40., -12.), bicubic(30., -12.));
        assert!(map.at(reals::NAN, 0.).is_nan());
        assert!(map.at(0., reals::NAN).is_nan());
    }

    #[test]
    fn invalid_grids() {
        let pts = vec![0., 1., 2., 3.];
        let m = DMatrix::from_element(4, 4, 0.);
        assert!(RzMap::new(vec![0., 2., 1., 3.], pts.clone(), m.clone()).is_err());
        assert!(RzMap::new(vec![], pts.clone(), m.clone()).is_err());
        assert!(RzMap::new(vec![0., 1., 2.], pts.clone(), DMatrix::zeros(3, 4)).is_err());
        assert!(RzMap::new(vec![0., 1., 2., reals::INFINITY], pts.clone(), m.clone()).is_err());
        assert!(RzMap::new(vec![0., 1., 2., 3., 4.], pts, m).is_err());
    }

    #[test]
    fn loading_and_caching() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"r_pts": [0, 1, 2, 3], "z_pts": [0, 1, 2, 3],
                "map": [0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0]}}"#
        )
        .unwrap();
        let map = cached_map(file.path()).unwrap();
        assert_close(map.at(1.5, 0.7), 0.5625);
        let again = cached_map(file.path()).unwrap();
        assert!(Arc::ptr_eq(&map, &again));
    }

    #[test]
    fn loading_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(S1_AFT_MAP_FILE);
        assert!(matches!(RzMap::load(&missing), Err(CutError::DataFile { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{\"r_pts\": [0]}").unwrap();
        assert!(matches!(RzMap::load(&bad), Err(CutError::DataFormat { .. })));

        let short = dir.path().join("short.json");
        fs::write(&short, r#"{"r_pts": [0, 1], "z_pts": [0], "map": [1]}"#).unwrap();
        assert!(matches!(
            RzMap::load(&short),
            Err(CutError::InvalidData { ref path, .. }) if path == &short
        ));

        let coarse = dir.path().join("coarse.json");
        fs::write(&coarse, r#"{"r_pts": [0, 1], "z_pts": [0, 1], "map": [1, 1, 1, 1]}"#).unwrap();
        assert!(matches!(
            RzMap::load(&coarse),
            Err(CutError::InvalidData { ref path, .. }) if path == &coarse
        ));
    }
}
