use super::Matrix;
use ndarray::Axis;

/// Activation function enum, supporting Linear, Sigmoid, ReLU, TanH, and Softmax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Sigmoid,
    ReLU,
    TanH,
    Softmax,
}

impl Activation {
    /// Applies the activation function to `z` in place.
    ///
    /// Softmax operates row-wise so that every row of the result sums to one;
    /// all other variants are element-wise. Linear leaves the buffer
    /// untouched.
    ///
    /// # Parameters
    ///
    /// * `z` - Buffer to transform, one example per row
    pub fn apply(&self, z: &mut Matrix) {
        match self {
            Activation::Linear => {}
            Activation::ReLU => z.mapv_inplace(|x| if x > 0.0 { x } else { 0.0 }),
            Activation::Sigmoid => z.mapv_inplace(|x| 1.0 / (1.0 + (-x).exp())),
            Activation::TanH => z.mapv_inplace(f64::tanh),
            Activation::Softmax => {
                for mut row in z.axis_iter_mut(Axis(0)) {
                    // shift by the row maximum so exp never overflows
                    let max_val = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    row.map_inplace(|x| *x = (*x - max_val).exp());
                    let sum = row.sum();
                    row.map_inplace(|x| *x /= sum);
                }
            }
        }
    }
}
