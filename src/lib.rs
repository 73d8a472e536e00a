/// Error types shared across the crate.
///
/// - `NetworkError` - construction and evaluation failures (invalid sizes,
///   mismatched shapes, prediction before any forward pass)
/// - `IoError` - model file failures (file system errors, malformed or
///   truncated model files)
pub mod error;

/// Components for assembling and running feedforward classifier networks.
///
/// This module provides a small inference engine for fully connected
/// feedforward networks: a layered architecture is assembled from
/// configuration, batched input is propagated through it, predictions are
/// scored against ground truth, and trained parameters are persisted to a
/// plain text format that round-trips bit-for-bit.
///
/// # Core Components
///
/// - **Network**: owns the ordered chain of layers and connections and
///   orchestrates forward propagation, evaluation, and persistence
/// - **Layer**: one pipeline stage holding a role, a unit count, an
///   activation, and the buffer most recently produced for that stage
/// - **Connection**: the weight matrix and bias vector linking two adjacent
///   layers
/// - **Activation**: closed catalog of transforms (Linear, Sigmoid, ReLU,
///   TanH, Softmax) applied in place during propagation
/// - **Matrix**: type alias for the dense 2-D buffers flowing through the
///   network
///
/// # Examples
/// ```rust
/// use forwardnet::prelude::*;
/// use ndarray::array;
///
/// // Two features, one hidden layer of four units, two classes
/// let mut network = Network::new(2, &[4], &[Activation::ReLU], 2, Activation::Softmax).unwrap();
///
/// // Propagate a batch and read off the predicted class per row
/// network.forward_pass(&array![[0.5, -0.25], [1.0, 2.0]]).unwrap();
/// let predictions = network.predict().unwrap();
/// assert_eq!(predictions.len(), 2);
/// ```
pub mod network;

/// A convenience module that re-exports the most commonly used types and
/// functions from this crate.
pub mod prelude;

pub use error::{IoError, NetworkError};
