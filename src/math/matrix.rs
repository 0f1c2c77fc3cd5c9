use serde::{Serialize, Deserialize};
use std::ops::Mul;

/// Dense row-major matrix. In a weight matrix a row is a destination neuron
/// and a column a source neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a `rows x cols` matrix from values listed row by row.
    /// Returns `None` when `values.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, values: Vec<f64>) -> Option<Matrix> {
        if values.len() != rows * cols {
            return None;
        }
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            values.chunks(cols).map(|row| row.to_vec()).collect()
        };
        Some(Matrix { rows, cols, data })
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    /// Diagonal matrix with `diag` on the main diagonal.
    pub fn diagonal(diag: &[f64]) -> Matrix {
        let mut res = Matrix::zeros(diag.len(), diag.len());
        for (i, d) in diag.iter().enumerate() {
            res.data[i][i] = *d;
        }
        res
    }

    /// True when `data` actually has `rows` rows of `cols` entries each.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }

    /// Matrix-vector product `self · v`.
    ///
    /// # Panics
    /// Panics if `v.len() != self.cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        if v.len() != self.cols {
            panic!("Matrix and vector are of incorrect sizes")
        }
        self.data
            .iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }

    /// Scales row `i` by `factors[i]`.
    pub fn scale_rows(&self, factors: &[f64]) -> Matrix {
        assert_eq!(self.rows, factors.len());
        Matrix::from_data(
            self.data
                .iter()
                .zip(factors)
                .map(|(row, f)| row.iter().map(|x| x * f).collect())
                .collect(),
        )
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        res
    }
}
