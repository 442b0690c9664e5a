//! Vertex enumeration for bounded polyhedra.
//!
//! An [`HRep`] holds rows `b + a·x ≥ 0` (or `= 0` for equality rows). The
//! vertices are found with the double-description method applied to the
//! homogenized cone `{(t, x) : b·t + a·x ≥ 0, t ≥ 0}`: starting from the whole
//! space (every unit vector a line), constraints are intersected one at a
//! time, and the extreme rays with `t > 0` are scaled back to vertices.
//!
//! Adjacency of rays uses the combinatorial test on zero sets, which is exact
//! for rationals and epsilon-guarded for floats.

use super::field::Field;
use thiserror::Error;
use tracing::debug;

/// Failures during vertex enumeration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolytopeError {
    #[error("polyhedron is unbounded")]
    Unbounded,

    #[error("expected {expected} coefficients, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vertex enumeration exceeded {limit} intermediate rays")]
    RayLimit { limit: usize },
}

/// One row `constant + coefficients·x ≥ 0` (or `= 0`).
#[derive(Debug, Clone, PartialEq)]
pub struct HRow<T> {
    pub constant: T,
    pub coefficients: Vec<T>,
    pub equality: bool,
}

/// Half-space representation of a polyhedron in `dimension` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct HRep<T> {
    dimension: usize,
    rows: Vec<HRow<T>>,
}

impl<T: Field> HRep<T> {
    pub fn new(dimension: usize) -> Self {
        HRep {
            dimension,
            rows: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn rows(&self) -> &[HRow<T>] {
        &self.rows
    }

    pub fn add_inequality(&mut self, constant: T, coefficients: Vec<T>) -> Result<(), PolytopeError> {
        self.push(constant, coefficients, false)
    }

    pub fn add_equality(&mut self, constant: T, coefficients: Vec<T>) -> Result<(), PolytopeError> {
        self.push(constant, coefficients, true)
    }

    fn push(&mut self, constant: T, coefficients: Vec<T>, equality: bool) -> Result<(), PolytopeError> {
        if coefficients.len() != self.dimension {
            return Err(PolytopeError::DimensionMismatch {
                expected: self.dimension,
                actual: coefficients.len(),
            });
        }
        self.rows.push(HRow {
            constant,
            coefficients,
            equality,
        });
        Ok(())
    }

    /// Whether `point` satisfies every row.
    pub fn contains(&self, point: &[T]) -> bool {
        point.len() == self.dimension
            && self.rows.iter().all(|row| {
                let value = row
                    .coefficients
                    .iter()
                    .zip(point)
                    .fold(row.constant.clone(), |acc, (a, x)| acc + a.clone() * x.clone());
                if row.equality {
                    value.is_zero()
                } else {
                    !value.is_negative()
                }
            })
    }

    /// Lazily enumerate the vertices.
    pub fn vertices(self) -> Vertices<T> {
        Vertices {
            pending: Some(self),
            ray_limit: None,
            ready: Vec::new().into_iter(),
        }
    }
}

/// Lazy vertex sequence; the enumeration runs on the first call to `next`.
#[derive(Debug)]
pub struct Vertices<T> {
    pending: Option<HRep<T>>,
    ray_limit: Option<usize>,
    ready: std::vec::IntoIter<Vec<T>>,
}

impl<T: Field> Vertices<T> {
    /// Abort when an intermediate cone has more than `limit` extreme rays.
    pub fn with_ray_limit(mut self, limit: Option<usize>) -> Self {
        self.ray_limit = limit;
        self
    }
}

impl<T: Field> Iterator for Vertices<T> {
    type Item = Result<Vec<T>, PolytopeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(hrep) = self.pending.take() {
            match double_description(&hrep, self.ray_limit) {
                Ok(vertices) => self.ready = vertices.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
        self.ready.next().map(Ok)
    }
}

#[derive(Debug, Clone)]
struct ZeroSet(Vec<u64>);

impl ZeroSet {
    fn empty(words: usize) -> Self {
        ZeroSet(vec![0; words])
    }

    fn first(count: usize, words: usize) -> Self {
        let mut set = ZeroSet::empty(words);
        for k in 0..count {
            set.insert(k);
        }
        set
    }

    fn insert(&mut self, k: usize) {
        self.0[k / 64] |= 1 << (k % 64);
    }

    fn intersect(&self, other: &ZeroSet) -> ZeroSet {
        ZeroSet(self.0.iter().zip(&other.0).map(|(a, b)| a & b).collect())
    }

    fn is_superset(&self, other: &ZeroSet) -> bool {
        self.0.iter().zip(&other.0).all(|(a, b)| a & b == *b)
    }
}

#[derive(Debug, Clone)]
struct Ray<T> {
    coords: Vec<T>,
    zeros: ZeroSet,
}

fn dot<T: Field>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (x, y)| acc + x.clone() * y.clone())
}

/// `target -= factor * source`.
fn subtract_scaled<T: Field>(target: &mut [T], factor: &T, source: &[T]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t = t.clone() - factor.clone() * s.clone();
    }
}

fn double_description<T: Field>(
    hrep: &HRep<T>,
    ray_limit: Option<usize>,
) -> Result<Vec<Vec<T>>, PolytopeError> {
    let dim = hrep.dimension + 1;
    let homogenize = |row: &HRow<T>| {
        let mut h = Vec::with_capacity(dim);
        h.push(row.constant.clone());
        h.extend(row.coefficients.iter().cloned());
        h
    };

    let mut constraints: Vec<(Vec<T>, bool)> = Vec::with_capacity(hrep.rows.len() + 1);
    constraints.extend(hrep.rows.iter().filter(|r| r.equality).map(|r| (homogenize(r), true)));
    let mut positivity = vec![T::zero(); dim];
    positivity[0] = T::one();
    constraints.push((positivity, false));
    constraints.extend(hrep.rows.iter().filter(|r| !r.equality).map(|r| (homogenize(r), false)));

    let words = constraints.len().div_ceil(64).max(1);
    let mut lines: Vec<Vec<T>> = (0..dim)
        .map(|i| {
            let mut e = vec![T::zero(); dim];
            e[i] = T::one();
            e
        })
        .collect();
    let mut rays: Vec<Ray<T>> = Vec::new();

    for (k, (h, equality)) in constraints.iter().enumerate() {
        if let Some(p) = lines.iter().position(|l| !dot(h, l).is_zero()) {
            // The constraint cuts the lineality space: project along one line.
            let pivot = lines.swap_remove(p);
            let pivot_value = dot(h, &pivot);
            for line in lines.iter_mut() {
                let v = dot(h, line);
                if !v.is_zero() {
                    subtract_scaled(line, &(v / pivot_value.clone()), &pivot);
                }
            }
            for ray in rays.iter_mut() {
                let v = dot(h, &ray.coords);
                if !v.is_zero() {
                    subtract_scaled(&mut ray.coords, &(v / pivot_value.clone()), &pivot);
                    T::normalize(&mut ray.coords);
                }
                ray.zeros.insert(k);
            }
            if !equality {
                let mut coords = if pivot_value.is_negative() {
                    pivot.into_iter().map(|x| -x).collect()
                } else {
                    pivot
                };
                T::normalize(&mut coords);
                rays.push(Ray {
                    coords,
                    zeros: ZeroSet::first(k, words),
                });
            }
            continue;
        }

        let values: Vec<T> = rays.iter().map(|r| dot(h, &r.coords)).collect();
        let positive: Vec<usize> = (0..rays.len()).filter(|&i| values[i].is_positive()).collect();
        let negative: Vec<usize> = (0..rays.len()).filter(|&i| values[i].is_negative()).collect();

        let mut next: Vec<Ray<T>> = Vec::with_capacity(rays.len());
        for &p in &positive {
            for &n in &negative {
                if !adjacent(&rays, p, n) {
                    continue;
                }
                let mut coords: Vec<T> = rays[n]
                    .coords
                    .iter()
                    .zip(&rays[p].coords)
                    .map(|(rn, rp)| values[p].clone() * rn.clone() - values[n].clone() * rp.clone())
                    .collect();
                T::normalize(&mut coords);
                let mut zeros = rays[p].zeros.intersect(&rays[n].zeros);
                zeros.insert(k);
                next.push(Ray { coords, zeros });
            }
        }
        for (i, mut ray) in rays.into_iter().enumerate() {
            if values[i].is_zero() {
                ray.zeros.insert(k);
                next.push(ray);
            } else if values[i].is_positive() && !equality {
                next.push(ray);
            }
        }
        rays = next;

        if let Some(limit) = ray_limit {
            if rays.len() > limit {
                return Err(PolytopeError::RayLimit { limit });
            }
        }
    }

    let mut vertices: Vec<Vec<T>> = Vec::new();
    let mut recession = !lines.is_empty();
    for ray in &rays {
        let t = &ray.coords[0];
        if t.is_positive() {
            let vertex: Vec<T> = ray.coords[1..].iter().map(|x| x.clone() / t.clone()).collect();
            if !vertices.iter().any(|v| same_point(v, &vertex)) {
                vertices.push(vertex);
            }
        } else {
            recession = true;
        }
    }
    debug!(
        dimension = hrep.dimension,
        constraints = hrep.rows.len(),
        vertices = vertices.len(),
        "double description finished"
    );
    if recession && !vertices.is_empty() {
        return Err(PolytopeError::Unbounded);
    }
    Ok(vertices)
}

/// Combinatorial adjacency: no third ray is tight on every constraint that
/// both `p` and `n` are tight on.
fn adjacent<T>(rays: &[Ray<T>], p: usize, n: usize) -> bool {
    let common = rays[p].zeros.intersect(&rays[n].zeros);
    !rays
        .iter()
        .enumerate()
        .any(|(i, r)| i != p && i != n && r.zeros.is_superset(&common))
}

fn same_point<T: Field>(a: &[T], b: &[T]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x.clone() - y.clone()).is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::rational::BigRational;
    use num::BigInt;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn sorted(mut points: Vec<Vec<BigRational>>) -> Vec<Vec<BigRational>> {
        points.sort();
        points
    }

    #[test]
    fn test_unit_square() {
        let mut h = HRep::<BigRational>::new(2);
        h.add_inequality(q(0), vec![q(1), q(0)]).unwrap();
        h.add_inequality(q(0), vec![q(0), q(1)]).unwrap();
        h.add_inequality(q(1), vec![q(-1), q(0)]).unwrap();
        h.add_inequality(q(1), vec![q(0), q(-1)]).unwrap();
        let vertices: Vec<_> = h.vertices().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            sorted(vertices),
            vec![
                vec![q(0), q(0)],
                vec![q(0), q(1)],
                vec![q(1), q(0)],
                vec![q(1), q(1)],
            ]
        );
    }

    #[test]
    fn test_probability_simplex_with_equality() {
        let mut h = HRep::<f64>::new(3);
        h.add_equality(-1.0, vec![1.0, 1.0, 1.0]).unwrap();
        for i in 0..3 {
            let mut a = vec![0.0; 3];
            a[i] = 1.0;
            h.add_inequality(0.0, a).unwrap();
        }
        let vertices: Vec<_> = h.vertices().collect::<Result<_, _>>().unwrap();
        assert_eq!(vertices.len(), 3);
        for v in &vertices {
            assert!((v.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert_eq!(v.iter().filter(|x| (**x - 1.0).abs() < 1e-9).count(), 1);
        }
    }

    #[test]
    fn test_redundant_constraints_ignored() {
        let mut h = HRep::<BigRational>::new(1);
        h.add_inequality(q(0), vec![q(1)]).unwrap();
        h.add_inequality(q(1), vec![q(-1)]).unwrap();
        h.add_inequality(q(5), vec![q(-1)]).unwrap();
        let vertices: Vec<_> = h.vertices().collect::<Result<_, _>>().unwrap();
        assert_eq!(sorted(vertices), vec![vec![q(0)], vec![q(1)]]);
    }

    #[test]
    fn test_unbounded_rejected() {
        let mut h = HRep::<BigRational>::new(2);
        h.add_inequality(q(0), vec![q(1), q(0)]).unwrap();
        h.add_inequality(q(0), vec![q(0), q(1)]).unwrap();
        let first = h.vertices().next().unwrap();
        assert_eq!(first, Err(PolytopeError::Unbounded));
    }

    #[test]
    fn test_empty_has_no_vertices() {
        let mut h = HRep::<BigRational>::new(1);
        h.add_inequality(q(-1), vec![q(1)]).unwrap();
        h.add_inequality(q(0), vec![q(-1)]).unwrap();
        assert_eq!(h.vertices().count(), 0);
    }

    #[test]
    fn test_ray_limit() {
        let mut h = HRep::<BigRational>::new(2);
        h.add_inequality(q(0), vec![q(1), q(0)]).unwrap();
        h.add_inequality(q(0), vec![q(0), q(1)]).unwrap();
        h.add_inequality(q(1), vec![q(-1), q(-1)]).unwrap();
        let result: Result<Vec<_>, _> = h.vertices().with_ray_limit(Some(1)).collect();
        assert_eq!(result, Err(PolytopeError::RayLimit { limit: 1 }));
    }

    #[test]
    fn test_contains() {
        let mut h = HRep::<BigRational>::new(1);
        h.add_inequality(q(0), vec![q(1)]).unwrap();
        assert!(h.contains(&[q(3)]));
        assert!(!h.contains(&[q(-3)]));
    }
}
