use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Geometry of one sampled grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDimension {
    pub origin: [f64; 3],
    /// Step vectors along the grid's i, j and k axes.
    pub steps: [[f64; 3]; 3],
    /// Number of samples along i, j and k.
    pub counts: [usize; 3],
    pub frame: Option<usize>,
    pub label: i64,
}

impl FieldDimension {
    /// A cube spanning `[rmin, rmax]` on every axis with `n` samples per axis.
    pub fn cubic(rmin: f64, rmax: f64, n: usize, frame: Option<usize>, label: i64) -> Self {
        let step = if n > 1 {
            (rmax - rmin) / (n - 1) as f64
        } else {
            0.0
        };
        Self {
            origin: [rmin; 3],
            steps: [[step, 0.0, 0.0], [0.0, step, 0.0], [0.0, 0.0, step]],
            counts: [n; 3],
            frame,
            label,
        }
    }

    /// Number of grid points.
    pub fn sample_count(&self) -> usize {
        self.counts.iter().product()
    }

    /// Cartesian coordinates of every grid point, i varying slowest.
    pub fn grid_points(&self) -> Vec<[f64; 3]> {
        let [ni, nj, nk] = self.counts;
        let mut points = Vec::with_capacity(self.sample_count());
        for i in 0..ni {
            for j in 0..nj {
                for k in 0..nk {
                    let idx = [i as f64, j as f64, k as f64];
                    let mut p = self.origin;
                    for (axis, step) in self.steps.iter().enumerate() {
                        for c in 0..3 {
                            p[c] += idx[axis] * step[c];
                        }
                    }
                    points.push(p);
                }
            }
        }
        points
    }
}

/// Sampled values of one field entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValues {
    Scalar(Vec<f64>),
    /// One array per component.
    Vector(Vec<Vec<f64>>),
}

impl FieldValues {
    pub fn components(&self) -> Vec<&[f64]> {
        match self {
            Self::Scalar(v) => vec![v.as_slice()],
            Self::Vector(vs) => vs.iter().map(Vec::as_slice).collect(),
        }
    }

    /// Memory held by the value arrays.
    pub fn bytes(&self) -> usize {
        self.components()
            .iter()
            .map(|c| std::mem::size_of_val(*c))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub dimension: FieldDimension,
    pub values: FieldValues,
}

/// Append-only store of sampled fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    entries: Vec<FieldEntry>,
}

impl Field {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FieldEntry> {
        self.entries.get(index)
    }

    pub fn by_label(&self, label: i64) -> Option<&FieldEntry> {
        self.entries.iter().find(|e| e.dimension.label == label)
    }

    pub fn bytes(&self) -> usize {
        self.entries.iter().map(|e| e.values.bytes()).sum()
    }

    /// Appends `dimensions[i]` paired with `values[i]` in order.
    ///
    /// The whole batch is validated before anything is stored, so a failed
    /// append leaves the store unchanged.
    pub fn append(
        &mut self,
        dimensions: Vec<FieldDimension>,
        values: Vec<FieldValues>,
    ) -> Result<(), Error> {
        if dimensions.len() != values.len() {
            return Err(Error::FieldArity {
                dimensions: dimensions.len(),
                values: values.len(),
            });
        }

        let mut labels: Vec<i64> = self.entries.iter().map(|e| e.dimension.label).collect();
        for (dimension, value) in dimensions.iter().zip(&values) {
            if labels.contains(&dimension.label) {
                return Err(Error::DuplicateFieldLabel(dimension.label));
            }
            labels.push(dimension.label);

            let expected = dimension.sample_count();
            if let Some(bad) = value.components().iter().find(|c| c.len() != expected) {
                return Err(Error::FieldLength {
                    label: dimension.label,
                    expected,
                    found: bad.len(),
                });
            }
        }

        self.entries.extend(
            dimensions
                .into_iter()
                .zip(values)
                .map(|(dimension, values)| FieldEntry { dimension, values }),
        );
        Ok(())
    }

    /// Entries attached to one of `frames` or to no frame at all.
    pub(crate) fn restrict(&self, frames: &[usize]) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|e| e.dimension.frame.is_none_or(|f| frames.contains(&f)))
            .cloned()
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn cubic_grid_spans_requested_range() {
        let dim = FieldDimension::cubic(-1.0, 1.0, 3, Some(0), 7);
        assert_eq!(dim.sample_count(), 27);
        assert!(approx_eq(dim.steps[0][0], 1.0));

        let points = dim.grid_points();
        assert_eq!(points.len(), 27);
        assert_eq!(points[0], [-1.0, -1.0, -1.0]);
        assert_eq!(points[1], [-1.0, -1.0, 0.0]);
        assert_eq!(points[9], [0.0, -1.0, -1.0]);
        assert_eq!(points[26], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn single_sample_cube_has_zero_step() {
        let dim = FieldDimension::cubic(2.0, 5.0, 1, None, 0);
        assert_eq!(dim.grid_points(), vec![[2.0, 2.0, 2.0]]);
    }

    #[test]
    fn append_is_additive_and_ordered() {
        let mut field = Field::new();
        let dim = |label| FieldDimension::cubic(0.0, 1.0, 2, None, label);

        let first = FieldEntry {
            dimension: FieldDimension::cubic(-0.5, 0.5, 2, Some(0), 1),
            values: FieldValues::Scalar((0..8).map(|i| i as f64 * 0.25).collect()),
        };
        field
            .append(vec![first.dimension.clone()], vec![first.values.clone()])
            .unwrap();
        assert_eq!(field.by_label(1), Some(&first));

        field
            .append(
                vec![dim(2), dim(3)],
                vec![
                    FieldValues::Scalar(vec![1.0; 8]),
                    FieldValues::Vector(vec![vec![0.0; 8], vec![1.0; 8], vec![2.0; 8]]),
                ],
            )
            .unwrap();

        assert_eq!(field.len(), 3);
        assert_eq!(field.by_label(1), Some(&first));
        assert_eq!(field.get(0), Some(&first));
        let labels: Vec<_> = field.iter().map(|e| e.dimension.label).collect();
        assert_eq!(labels, vec![1, 2, 3]);
        assert_eq!(field.bytes(), (8 + 8 + 24) * std::mem::size_of::<f64>());
        assert!(matches!(
            field.by_label(3).unwrap().values,
            FieldValues::Vector(_)
        ));
    }

    #[test]
    fn invalid_batches_leave_store_untouched() {
        let mut field = Field::new();
        let dim = |label| FieldDimension::cubic(0.0, 1.0, 2, None, label);
        field
            .append(vec![dim(1)], vec![FieldValues::Scalar(vec![0.0; 8])])
            .unwrap();

        let err = field
            .append(vec![dim(2), dim(3)], vec![FieldValues::Scalar(vec![0.0; 8])])
            .unwrap_err();
        assert!(matches!(err, Error::FieldArity { dimensions: 2, values: 1 }));

        let err = field
            .append(
                vec![dim(2), dim(1)],
                vec![
                    FieldValues::Scalar(vec![0.0; 8]),
                    FieldValues::Scalar(vec![0.0; 8]),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFieldLabel(1)));

        let err = field
            .append(vec![dim(4)], vec![FieldValues::Scalar(vec![0.0; 5])])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FieldLength {
                label: 4,
                expected: 8,
                found: 5
            }
        ));

        assert_eq!(field.len(), 1);
    }

    #[test]
    fn restrict_keeps_unattached_entries() {
        let mut field = Field::new();
        field
            .append(
                vec![
                    FieldDimension::cubic(0.0, 1.0, 1, Some(0), 1),
                    FieldDimension::cubic(0.0, 1.0, 1, Some(1), 2),
                    FieldDimension::cubic(0.0, 1.0, 1, None, 3),
                ],
                vec![
                    FieldValues::Scalar(vec![0.0]),
                    FieldValues::Scalar(vec![0.0]),
                    FieldValues::Scalar(vec![0.0]),
                ],
            )
            .unwrap();

        let sub = field.restrict(&[1]);
        let labels: Vec<_> = sub.iter().map(|e| e.dimension.label).collect();
        assert_eq!(labels, vec![2, 3]);
    }
}
