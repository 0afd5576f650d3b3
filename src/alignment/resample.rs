// Resampling primitives shared by the distance, delta and ghost alignments

/// Number of points in every common grid unless the caller asks otherwise
pub const GRID_POINTS: usize = 500;

/// Evenly spaced grid over `[low, high]`, both ends included.
///
/// The last point is set to `high` exactly so callers can rely on the grid ending on the
/// overlap boundary regardless of rounding in the step.
pub fn common_grid(low: f64, high: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (points - 1) as f64;
            let mut grid: Vec<f64> = (0..points).map(|i| low + i as f64 * step).collect();
            grid[points - 1] = high;
            grid
        }
    }
}

/// Intersection of two closed ranges, `None` unless it has a positive length.
pub fn overlap(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
    let low = a.0.max(b.0);
    let high = a.1.min(b.1);
    if low < high { Some((low, high)) } else { None }
}

/// Index of the key closest to `target` in an ascending slice.
///
/// When `target` sits exactly halfway between two keys the larger one wins. An exact hit
/// on duplicated keys returns the first of them.
pub fn nearest_index(sorted_keys: &[f64], target: f64) -> Option<usize> {
    if sorted_keys.is_empty() {
        return None;
    }
    let right = sorted_keys.partition_point(|k| *k < target);
    if right == 0 {
        return Some(0);
    }
    if right == sorted_keys.len() {
        return Some(right - 1);
    }
    let left = right - 1;
    if target - sorted_keys[left] < sorted_keys[right] - target {
        Some(left)
    } else {
        Some(right)
    }
}

/// Value of the nearest sample for every grid point. Missing sample values stay missing.
pub fn nearest_values(sorted_keys: &[f64], values: &[Option<f64>], grid: &[f64]) -> Vec<Option<f64>> {
    grid.iter()
        .map(|g| nearest_index(sorted_keys, *g).and_then(|i| values[i]))
        .collect()
}

/// Fills missing values by linear interpolation over the grid positions.
///
/// Gaps between two defined values are interpolated, trailing gaps repeat the last
/// defined value and leading gaps are left undefined.
pub fn fill_gaps(grid: &[f64], seeded: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut filled = seeded.to_vec();
    let mut prev: Option<(f64, f64)> = None;
    let mut i = 0;
    while i < seeded.len() {
        if let Some(v) = seeded[i] {
            prev = Some((grid[i], v));
            i += 1;
            continue;
        }
        let gap_end = (i..seeded.len())
            .find(|j| seeded[*j].is_some())
            .unwrap_or(seeded.len());
        if let Some((x0, y0)) = prev {
            let next = seeded
                .get(gap_end)
                .copied()
                .flatten()
                .map(|y1| (grid[gap_end], y1));
            for (k, slot) in filled.iter_mut().enumerate().take(gap_end).skip(i) {
                *slot = Some(match next {
                    // Grid points can collapse onto one value over a very narrow span
                    Some((x1, y1)) if x1 > x0 => y0 + (y1 - y0) * (grid[k] - x0) / (x1 - x0),
                    _ => y0,
                });
            }
        }
        i = gap_end;
    }
    filled
}

/// Piecewise linear interpolation of `values` at `target`, keys ascending.
///
/// Targets outside the key range clamp to the first or last value and a target on
/// duplicated keys takes the last of them.
pub fn interpolate(sorted_keys: &[f64], values: &[f64], target: f64) -> Option<f64> {
    let n = sorted_keys.len().min(values.len());
    if n == 0 {
        return None;
    }
    if target < sorted_keys[0] {
        return Some(values[0]);
    }
    if target >= sorted_keys[n - 1] {
        return Some(values[n - 1]);
    }
    let lo = sorted_keys[..n].partition_point(|k| *k <= target) - 1;
    let hi = lo + 1;
    let frac = (target - sorted_keys[lo]) / (sorted_keys[hi] - sorted_keys[lo]);
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}

/// Shifts every value so the sequence starts at zero.
pub fn rezero(values: &[f64]) -> Vec<f64> {
    match values.first() {
        Some(first) => values.iter().map(|v| v - first).collect(),
        None => Vec::new(),
    }
}
