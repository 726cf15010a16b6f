use crate::error::Error;
use crate::model::frame::{CellVectors, Frame};
use nalgebra::{Matrix3, Vector3};

const MIN_VOLUME: f64 = 1e-8;

/// Invertible unit cell of a periodic frame.
///
/// The matrix holds the cell vectors as columns, so a fractional coordinate
/// maps to Cartesian space by a single multiplication.
#[derive(Debug, Clone)]
pub struct Cell {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Cell {
    pub fn new(vectors: CellVectors) -> Result<Self, &'static str> {
        let matrix = Matrix3::from_columns(&[
            Vector3::from(vectors[0]),
            Vector3::from(vectors[1]),
            Vector3::from(vectors[2]),
        ]);
        if matrix.determinant().abs() < MIN_VOLUME {
            return Err("cell has zero or near-zero volume");
        }
        let inverse = matrix.try_inverse().ok_or("cell matrix is not invertible")?;
        Ok(Self { matrix, inverse })
    }

    /// Cell of frame `id`, which must be periodic.
    pub fn for_frame(id: usize, frame: &Frame) -> Result<Self, Error> {
        let vectors = frame
            .cell
            .ok_or_else(|| Error::invalid_cell(id, "cell vectors are missing"))?;
        Self::new(vectors).map_err(|detail| Error::invalid_cell(id, detail))
    }

    pub fn to_fractional(&self, position: [f64; 3]) -> [f64; 3] {
        (self.inverse * Vector3::from(position)).into()
    }

    pub fn to_cartesian(&self, fractional: [f64; 3]) -> [f64; 3] {
        (self.matrix * Vector3::from(fractional)).into()
    }

    /// `position` shifted by whole cell vectors.
    pub fn translate(&self, position: [f64; 3], shift: [i32; 3]) -> [f64; 3] {
        let shift = Vector3::new(f64::from(shift[0]), f64::from(shift[1]), f64::from(shift[2]));
        (Vector3::from(position) + self.matrix * shift).into()
    }
}
