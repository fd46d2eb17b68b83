//! Coordinates for drawing a chosen projection.
//!
//! The host draws one labelled axis per variable ([`anchors`]) and the projected
//! instances ([`embedding`]), both recomputed whenever the variable selection or
//! the placement changes.

use ndarray::{Array2, Axis};

use crate::data::Dataset;
use crate::dense::column_stats;
use crate::dimred::{circular_placement, Placement};
use crate::error::{Result, VizRankError};
use crate::scoring::ProjectionScorer;
use crate::utils::safe_divisor;

/// One drawn axis: direction in the plane plus the variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub point: [f64; 2],
    pub label: String,
}

fn resolve_columns(data: &Dataset, variables: &[&str]) -> Result<Vec<usize>> {
    if variables.is_empty() {
        return Err(VizRankError::InvalidConfiguration(
            "at least one variable is required".into(),
        ));
    }
    variables
        .iter()
        .map(|name| {
            data.column_of(name)
                .filter(|&c| data.variable(c).is_continuous())
                .ok_or_else(|| {
                    VizRankError::InvalidConfiguration(format!(
                        "`{}` is not a continuous variable of the dataset",
                        name
                    ))
                })
        })
        .collect()
}

/// Axis directions for `variables` under `placement`.
///
/// Circular placement does not depend on the data; LDA and PCA anchors are the
/// columns of the fitted component matrix.
pub fn anchors(data: &Dataset, placement: Placement, variables: &[&str]) -> Result<Vec<Anchor>> {
    let columns = resolve_columns(data, variables)?;
    let points = match placement {
        Placement::Circular => circular_placement(columns.len())?,
        _ => {
            let rows = data.complete_rows(&columns);
            let x = data.sub_matrix(&rows, &columns);
            let y = data.sub_target(&rows);
            let projection = placement
                .fit(x.view(), y.view())
                .map_err(|e| VizRankError::DegenerateProjection(format!("{:#}", e)))?;
            projection.components().t().to_owned()
        }
    };

    Ok(points
        .rows()
        .into_iter()
        .zip(variables)
        .map(|(p, name)| Anchor {
            point: [p[0], p[1]],
            label: name.to_string(),
        })
        .collect())
}

/// Projected coordinates of the usable rows, each axis centred on zero and
/// divided by its range (a zero range divides by one).
///
/// Returns the `n × 2` coordinates and the dataset rows they belong to.
pub fn embedding(data: &Dataset, placement: Placement, variables: &[&str]) -> Result<(Array2<f64>, Vec<usize>)> {
    let columns = resolve_columns(data, variables)?;
    let scorer = ProjectionScorer::new(placement, 1);
    let (mut coords, rows) = scorer.embed(data, &columns)?;

    for mut axis in coords.axis_iter_mut(Axis(1)) {
        if let Some((mean, min, max)) = column_stats(axis.view()) {
            let span = safe_divisor(max - min);
            axis.mapv_inplace(|v| (v - mean) / span);
        }
    }
    Ok((coords, rows))
}
