/// Module that contains the activation function catalog
pub mod activation;
/// Module that contains the feedforward network implementation
pub mod feedforward;
/// Module that contains layer and connection building blocks
pub mod layer;
/// Module that contains the plain text model file format
pub mod serialize;

pub use activation::*;
pub use feedforward::*;
pub use layer::*;

use crate::error::NetworkError;
use ndarray::Array2;

/// Type alias for the dense 2-D buffers flowing through the network
pub type Matrix = Array2<f64>;
