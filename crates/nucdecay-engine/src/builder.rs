//! Construction of the decay-rate matrix Λ and its eigenvector matrices.
//!
//! With nuclides in topological order, Λ is lower triangular:
//!
//! - `Λ_ii = -λ_i`
//! - `Λ_ij = b_ji·λ_j` for `i > j`, where `b_ji` is the branching fraction from `j` to `i`
//!
//! Its eigenvector matrix `C` and inverse `C⁻¹` have unit diagonals and are
//! filled by forward substitution:
//!
//! - `C_ij = (Σ_{k=j}^{i-1} Λ_ik·C_kj) / (Λ_jj - Λ_ii)`
//! - `C⁻¹_ij = -Σ_{k=j}^{i-1} C_ik·C⁻¹_kj`
//!
//! Only rows reachable from column `j` along decay branches can be non-zero,
//! so each column visits just the descendants of its nuclide.

use std::collections::{BTreeSet, HashMap};

use nucdecay_core::{DatasetError, DecayScalar, Nuclide};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::index::NuclideIndex;
use crate::sparse::SparseMatrix;

/// Λ, C and C⁻¹ for one dataset in one numeric strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition<N> {
    /// Decay constants λ in topological order.
    pub decay_consts: Vec<N>,
    pub lambda: SparseMatrix<N>,
    pub c: SparseMatrix<N>,
    pub c_inv: SparseMatrix<N>,
}

impl<N: DecayScalar> Decomposition<N> {
    pub fn dim(&self) -> usize {
        self.decay_consts.len()
    }

    /// Structural checks for a decomposition loaded from outside.
    pub fn validate(&self) -> Result<(), String> {
        let dim = self.dim();
        for (name, m) in [("lambda", &self.lambda), ("c", &self.c), ("c_inv", &self.c_inv)] {
            if m.dim() != dim {
                return Err(format!("{name} has dimension {} instead of {dim}", m.dim()));
            }
            m.validate().map_err(|e| format!("{name}: {e}"))?;
            if !m.is_lower_triangular() {
                return Err(format!("{name} is not lower triangular"));
            }
        }
        if !self.c.has_unit_diagonal() || !self.c_inv.has_unit_diagonal() {
            return Err("eigenvector matrices must have a unit diagonal".to_string());
        }
        Ok(())
    }
}

/// Builds [`Decomposition`]s for nuclides listed in [`NuclideIndex`] order.
#[derive(Debug)]
pub struct DecayMatrixBuilder<'a> {
    nuclides: &'a [Nuclide],
    /// Row `i`: `(parent position, summed branching fraction)`.
    parents: Vec<Vec<(usize, f64)>>,
    /// Column `j`: positions reachable from `j`, ascending, excluding `j`.
    reach: Vec<Vec<usize>>,
}

impl<'a> DecayMatrixBuilder<'a> {
    /// `nuclides[i]` must be the nuclide at position `i` of `index`.
    pub fn new(nuclides: &'a [Nuclide], index: &NuclideIndex) -> Result<Self, DatasetError> {
        let n = nuclides.len();
        let mut parents: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (j, nuclide) in nuclides.iter().enumerate() {
            if index.position(nuclide.id) != Some(j) {
                return Err(DatasetError::UnknownNuclide(nuclide.id.to_string()));
            }
            let mut branches: HashMap<usize, f64> = HashMap::new();
            for branch in &nuclide.progeny {
                let i = index.position(branch.id).ok_or_else(|| DatasetError::UnknownProgeny {
                    parent: nuclide.id.to_string(),
                    progeny: branch.id.to_string(),
                })?;
                *branches.entry(i).or_default() += branch.branching_fraction;
            }
            for (i, b) in branches {
                parents[i].push((j, b));
                children[j].push(i);
            }
        }
        for row in &mut parents {
            row.sort_by_key(|(j, _)| *j);
        }

        let reach = (0..n).map(|j| descendants(j, &children)).collect();
        Ok(Self {
            nuclides,
            parents,
            reach,
        })
    }

    /// Number of structurally non-zero off-diagonal entries in C.
    pub fn reach_count(&self) -> usize {
        self.reach.iter().map(Vec::len).sum()
    }

    fn lift<N: DecayScalar>(value: f64, nuclide: &Nuclide) -> Result<N, DatasetError> {
        N::try_from_f64(value).ok_or_else(|| DatasetError::InvalidHalfLife {
            nuclide: nuclide.id.to_string(),
            value,
        })
    }

    /// Build Λ, C and C⁻¹ in numeric strategy `N`.
    pub fn build<N: DecayScalar>(&self) -> Result<Decomposition<N>, DatasetError> {
        let n = self.nuclides.len();
        let decay_consts: Vec<N> = self
            .nuclides
            .iter()
            .map(|nuc| Self::lift(nuc.decay_constant, nuc))
            .collect::<Result<_, _>>()?;

        // Off-diagonal Λ by row.
        let mut lambda_rows: Vec<Vec<(usize, N)>> = Vec::with_capacity(n);
        for row in &self.parents {
            let mut entries = Vec::with_capacity(row.len());
            for &(j, b) in row {
                let b: N = Self::lift(b, &self.nuclides[j])?;
                entries.push((j, b * decay_consts[j].clone()));
            }
            lambda_rows.push(entries);
        }

        let mut lambda_cols: Vec<Vec<(usize, N)>> = (0..n)
            .map(|j| vec![(j, -decay_consts[j].clone())])
            .collect();
        for (i, row) in lambda_rows.iter().enumerate() {
            for (j, v) in row {
                lambda_cols[*j].push((i, v.clone()));
            }
        }
        let lambda = SparseMatrix::from_columns(n, lambda_cols);

        // C by forward substitution, one column at a time.
        let mut c_cols: Vec<Vec<(usize, N)>> = Vec::with_capacity(n);
        for j in 0..n {
            let mut column: HashMap<usize, N> = HashMap::new();
            column.insert(j, N::one());
            for &i in &self.reach[j] {
                let mut numer = N::zero();
                for (k, l_ik) in &lambda_rows[i] {
                    if let Some(c_kj) = column.get(k) {
                        numer = numer + l_ik.clone() * c_kj.clone();
                    }
                }
                if numer.is_zero() {
                    continue;
                }
                // Λ_jj - Λ_ii = λ_i - λ_j
                let denom = decay_consts[i].clone() - decay_consts[j].clone();
                if denom.is_zero() {
                    return Err(DatasetError::DegenerateHalfLife {
                        ancestor: self.nuclides[j].id.to_string(),
                        descendant: self.nuclides[i].id.to_string(),
                    });
                }
                column.insert(i, numer / denom);
            }
            c_cols.push(column.into_iter().collect());
        }
        let c = SparseMatrix::from_columns(n, c_cols);
        let c_rows = c.rows();

        // C⁻¹ by forward substitution.
        let mut inv_cols: Vec<Vec<(usize, N)>> = Vec::with_capacity(n);
        for j in 0..n {
            let mut column: HashMap<usize, N> = HashMap::new();
            column.insert(j, N::one());
            for &i in &self.reach[j] {
                let mut sum = N::zero();
                for (k, c_ik) in &c_rows[i] {
                    if *k >= i {
                        break;
                    }
                    if let Some(inv_kj) = column.get(k) {
                        sum = sum + c_ik.clone() * inv_kj.clone();
                    }
                }
                if !sum.is_zero() {
                    column.insert(i, -sum);
                }
            }
            inv_cols.push(column.into_iter().collect());
        }
        let c_inv = SparseMatrix::from_columns(n, inv_cols);

        debug!(
            precision = N::LABEL,
            nuclides = n,
            lambda_nnz = lambda.nnz(),
            c_nnz = c.nnz(),
            c_inv_nnz = c_inv.nnz(),
            "builder: decomposition built"
        );

        Ok(Decomposition {
            decay_consts,
            lambda,
            c,
            c_inv,
        })
    }
}

/// Positions reachable from `start`, ascending. Children always sit at higher
/// positions than their parents.
fn descendants(start: usize, children: &[Vec<usize>]) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<usize> = children[start].clone();
    while let Some(node) = stack.pop() {
        if seen.insert(node) {
            stack.extend(children[node].iter().copied());
        }
    }
    seen.into_iter().collect()
}
