//! # Data model
//!
//! Column descriptors and the read-only table a ranking run works on. Missing values
//! are stored as `NaN`; discrete columns hold value indices as floats.

use std::collections::HashSet;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Result, VizRankError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    Continuous,
    /// Value labels, indexed by the stored float.
    Discrete(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Feature,
    Target,
}

/// A named column of a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    role: Role,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            kind: VariableKind::Continuous,
            role: Role::Feature,
        }
    }

    pub fn discrete<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Variable {
            name: name.into(),
            kind: VariableKind::Discrete(values.into_iter().map(Into::into).collect()),
            role: Role::Feature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self.kind, VariableKind::Continuous)
    }

    pub fn is_discrete(&self) -> bool {
        !self.is_continuous()
    }

    fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Feature matrix plus target column, immutable for the duration of a run.
///
/// The host can restrict the usable rows with a mask (e.g. rows it cannot draw);
/// rows with a missing target are never usable regardless of the mask.
#[derive(Debug, Clone)]
pub struct Dataset {
    variables: Vec<Variable>,
    x: Array2<f64>,
    target: Variable,
    y: Array1<f64>,
    row_mask: Option<Vec<bool>>,
}

impl Dataset {
    /// Builds a dataset from feature columns `x` (rows = instances) and a target column `y`.
    pub fn new(variables: Vec<Variable>, x: Array2<f64>, target: Variable, y: Array1<f64>) -> Result<Self> {
        if variables.len() != x.ncols() {
            return Err(VizRankError::InvalidDataset(format!(
                "{} variables for a matrix with {} columns",
                variables.len(),
                x.ncols()
            )));
        }
        if y.len() != x.nrows() {
            return Err(VizRankError::InvalidDataset(format!(
                "target has {} values for a matrix with {} rows",
                y.len(),
                x.nrows()
            )));
        }

        let mut seen = HashSet::with_capacity(variables.len() + 1);
        for name in variables.iter().map(Variable::name).chain(std::iter::once(target.name())) {
            if !seen.insert(name) {
                return Err(VizRankError::InvalidDataset(format!(
                    "duplicate variable name `{}`",
                    name
                )));
            }
        }

        Ok(Dataset {
            variables: variables.into_iter().map(|v| v.with_role(Role::Feature)).collect(),
            x,
            target: target.with_role(Role::Target),
            y,
            row_mask: None,
        })
    }

    /// Restricts the usable rows to those flagged `true`.
    pub fn with_row_mask(mut self, mask: Vec<bool>) -> Result<Self> {
        if mask.len() != self.n_rows() {
            return Err(VizRankError::InvalidDataset(format!(
                "row mask has {} entries for {} rows",
                mask.len(),
                self.n_rows()
            )));
        }
        self.row_mask = Some(mask);
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, column: usize) -> &Variable {
        &self.variables[column]
    }

    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name() == name)
    }

    pub fn target(&self) -> &Variable {
        &self.target
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    /// Indices of continuous feature columns, in column order.
    pub fn continuous_columns(&self) -> Vec<usize> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_continuous())
            .map(|(i, _)| i)
            .collect()
    }

    /// Rows allowed by the host mask that have a target value.
    pub fn valid_rows(&self) -> Vec<usize> {
        (0..self.n_rows())
            .filter(|&i| self.row_mask.as_ref().map_or(true, |m| m[i]) && !self.y[i].is_nan())
            .collect()
    }

    /// Valid rows that additionally have every column in `columns` present.
    pub fn complete_rows(&self, columns: &[usize]) -> Vec<usize> {
        self.valid_rows()
            .into_iter()
            .filter(|&i| columns.iter().all(|&c| !self.x[[i, c]].is_nan()))
            .collect()
    }

    /// Gathers `columns` over `rows` into a new matrix.
    pub fn sub_matrix(&self, rows: &[usize], columns: &[usize]) -> Array2<f64> {
        self.x.select(Axis(0), rows).select(Axis(1), columns)
    }

    pub fn sub_target(&self, rows: &[usize]) -> Array1<f64> {
        self.y.select(Axis(0), rows)
    }

    /// Number of distinct non-missing target values.
    pub fn distinct_targets(&self) -> usize {
        let mut values: Vec<f64> = self.y.iter().copied().filter(|v| !v.is_nan()).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values.len()
    }
}
