use crate::pipeline::traits::LocalDistance;

/// Raw output of the warping search.
#[derive(Debug, Clone, PartialEq)]
pub struct Warp {
    pub path: Vec<(usize, usize)>,
    pub distance: f64,
}

const STEP_DIAGONAL: u8 = 0;
const STEP_USER: u8 = 1;
const STEP_REFERENCE: u8 = 2;

/// Diagonal moves pay the local distance twice, so paths of different shapes
/// between the same endpoints are weighed fairly.
const DIAGONAL_WEIGHT: f64 = 2.0;

/// Dynamic time warping with the symmetric step pattern.
///
/// Moves: diagonal `(i-1, j-1)`, user-only `(i-1, j)` and reference-only
/// `(i, j-1)`; no slope constraint. With `band_radius` set, cells farther than
/// the radius from the scaled diagonal are skipped. Ties resolve in move order
/// (diagonal first), so the result is deterministic.
pub fn dtw(
    user: &[Vec<f32>],
    reference: &[Vec<f32>],
    metric: &dyn LocalDistance,
    band_radius: Option<usize>,
) -> Warp {
    let n = user.len();
    let m = reference.len();
    if n == 0 || m == 0 {
        return Warp {
            path: Vec::new(),
            distance: 0.0,
        };
    }

    if let Some(radius) = band_radius {
        if let Some(warp) = dtw_in_band(user, reference, metric, Some(radius)) {
            return warp;
        }
        tracing::warn!(
            user_frames = n,
            ref_frames = m,
            radius,
            "dtw: band left the end cell unreachable, retrying without band"
        );
    }

    // The unbanded matrix always reaches the end cell.
    dtw_in_band(user, reference, metric, None).unwrap_or_else(|| Warp {
        path: Vec::new(),
        distance: 0.0,
    })
}

fn dtw_in_band(
    user: &[Vec<f32>],
    reference: &[Vec<f32>],
    metric: &dyn LocalDistance,
    band_radius: Option<usize>,
) -> Option<Warp> {
    let n = user.len();
    let m = reference.len();
    let band = band_radius.map(|radius| Band::new(n, m, radius));

    let mut cost = vec![f64::INFINITY; n * m];
    let mut bp = vec![STEP_DIAGONAL; n * m];

    for i in 0..n {
        let (j_start, j_end) = match &band {
            Some(band) => band.row(i),
            None => (0, m - 1),
        };
        for j in j_start..=j_end {
            let d = metric.distance(&user[i], &reference[j]);
            if i == 0 && j == 0 {
                cost[0] = d;
                continue;
            }

            let mut best = f64::INFINITY;
            let mut step = STEP_DIAGONAL;
            if i > 0 && j > 0 {
                best = cost[(i - 1) * m + (j - 1)] + DIAGONAL_WEIGHT * d;
            }
            if i > 0 {
                let cand = cost[(i - 1) * m + j] + d;
                if cand < best {
                    best = cand;
                    step = STEP_USER;
                }
            }
            if j > 0 {
                let cand = cost[i * m + (j - 1)] + d;
                if cand < best {
                    best = cand;
                    step = STEP_REFERENCE;
                }
            }
            cost[i * m + j] = best;
            bp[i * m + j] = step;
        }
    }

    let distance = cost[n * m - 1];
    if !distance.is_finite() {
        return None;
    }

    let (mut i, mut j) = (n - 1, m - 1);
    let mut path = Vec::with_capacity(n + m);
    path.push((i, j));
    while i > 0 || j > 0 {
        match bp[i * m + j] {
            STEP_USER => i -= 1,
            STEP_REFERENCE => j -= 1,
            _ => {
                i -= 1;
                j -= 1;
            }
        }
        path.push((i, j));
    }
    path.reverse();

    Some(Warp { path, distance })
}

/// Sakoe-Chiba window around the diagonal scaled to the matrix aspect ratio.
struct Band {
    m: usize,
    slope: f64,
    radius: f64,
    unbounded: bool,
}

impl Band {
    fn new(n: usize, m: usize, radius: usize) -> Self {
        if n < 2 || m < 2 {
            return Self {
                m,
                slope: 0.0,
                radius: 0.0,
                unbounded: true,
            };
        }
        let slope = (m - 1) as f64 / (n - 1) as f64;
        // Adjacent rows must overlap or the band splits into islands.
        let radius = (radius.max(1) as f64).max(slope.ceil());
        Self {
            m,
            slope,
            radius,
            unbounded: false,
        }
    }

    fn row(&self, i: usize) -> (usize, usize) {
        if self.unbounded {
            return (0, self.m - 1);
        }
        let center = i as f64 * self.slope;
        let start = (center - self.radius).ceil().max(0.0) as usize;
        let end = ((center + self.radius).floor() as usize).min(self.m - 1);
        (start.min(end), end)
    }
}
