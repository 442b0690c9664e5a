//! Bracketed root finding.

/// Outcome of [`bisect_decreasing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
    /// Midpoint of the final bracket.
    pub root: f64,
    pub iterations: usize,
    /// Whether the bracket shrank below the tolerance.
    pub converged: bool,
}

/// Root of a continuous non-increasing `f` on `[lo, hi]`.
///
/// Assumes `f(lo) >= 0 >= f(hi)`; the bracket keeps `f(lo) >= 0` and
/// `f(hi) < 0` throughout, so the returned point is the right end of the zero
/// set when `f` is flat at zero. Errors from `f` abort the search.
pub fn bisect_decreasing<E, F>(
    mut f: F,
    lo: f64,
    hi: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Bisection, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if f(hi)? >= 0.0 {
        return Ok(Bisection {
            root: hi,
            iterations: 0,
            converged: true,
        });
    }
    if f(lo)? < 0.0 {
        return Ok(Bisection {
            root: lo,
            iterations: 0,
            converged: true,
        });
    }
    let mut iterations = 0;
    while hi - lo > tolerance && iterations < max_iterations {
        let mid = lo + (hi - lo) / 2.0;
        if mid <= lo || mid >= hi {
            break;
        }
        if f(mid)? >= 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }
    Ok(Bisection {
        root: lo + (hi - lo) / 2.0,
        iterations,
        converged: hi - lo <= tolerance || iterations < max_iterations,
    })
}
