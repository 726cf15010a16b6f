use anyhow::{Result, bail};

use atomverse::CellVectors;

use crate::cli::CellOptions;

/// Cell vectors requested on the command line, if any.
pub fn build_cell(opts: &CellOptions) -> Result<Option<CellVectors>> {
    if let Some(sides) = &opts.cell {
        let [a, b, c] = sides.as_slice() else {
            bail!("--cell expects 3 side lengths, got {}", sides.len());
        };
        return Ok(Some([[*a, 0.0, 0.0], [0.0, *b, 0.0], [0.0, 0.0, *c]]));
    }

    if let Some(values) = &opts.cell_matrix {
        if values.len() != 9 {
            bail!("--cell-matrix expects 9 values, got {}", values.len());
        }
        let mut cell = [[0.0; 3]; 3];
        for (i, v) in values.iter().enumerate() {
            cell[i / 3][i % 3] = *v;
        }
        return Ok(Some(cell));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(cell: Option<Vec<f64>>, cell_matrix: Option<Vec<f64>>) -> CellOptions {
        CellOptions { cell, cell_matrix }
    }

    #[test]
    fn side_lengths_build_an_orthorhombic_cell() {
        let cell = build_cell(&options(Some(vec![10.0, 10.0, 12.0]), None)).unwrap();
        assert_eq!(cell, Some([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 12.0]]));
        assert_eq!(build_cell(&options(None, None)).unwrap(), None);
    }

    #[test]
    fn matrix_values_fill_rows() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let cell = build_cell(&options(None, Some(values))).unwrap().unwrap();
        assert_eq!(cell[1], [4.0, 5.0, 6.0]);
    }

    #[test]
    fn wrong_value_counts_are_rejected() {
        assert!(build_cell(&options(Some(vec![10.0, 10.0]), None)).is_err());
        assert!(build_cell(&options(None, Some(vec![1.0; 8]))).is_err());
    }
}
