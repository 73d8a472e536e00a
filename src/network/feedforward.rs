use super::*;

/// A feedforward classifier network for batched inference.
///
/// The network owns an ordered chain of layers and the connections linking
/// adjacent pairs. `layers[0]` is the input layer, the last layer is the
/// output layer, and `connections[i]` joins `layers[i]` to `layers[i + 1]`.
/// Dropping the network drops every layer, connection, and buffer it owns.
///
/// # Fields
///
/// - `layers` - the layer arena, `num_hidden + 2` entries
/// - `connections` - one weight/bias pair per adjacent layer pair
///
/// # Example
/// ```rust
/// use forwardnet::prelude::*;
/// use ndarray::array;
///
/// let mut network = Network::new(
///     2,
///     &[8, 4],
///     &[Activation::ReLU, Activation::TanH],
///     3,
///     Activation::Softmax,
/// )
/// .unwrap();
///
/// network.forward_pass(&array![[0.2, 0.7]]).unwrap();
/// let predictions = network.predict().unwrap();
/// assert!(predictions[0] < 3);
///
/// // Persist the trained parameters and rebuild an identical network
/// network.save_to_path("model.txt").unwrap();
/// let restored = Network::load_from_path("model.txt").unwrap();
/// assert_eq!(restored.num_layers(), network.num_layers());
/// # std::fs::remove_file("model.txt").unwrap();
/// ```
pub struct Network {
    layers: Vec<Layer>,
    connections: Vec<Connection>,
}

impl Network {
    /// Builds a network from configuration.
    ///
    /// The layer chain is `[Input(num_features)]`, one hidden layer per entry
    /// of `hidden_sizes` paired with the matching entry of
    /// `hidden_activations`, then `[Output(num_classes, output_activation)]`.
    /// Every connection is freshly initialized.
    ///
    /// # Parameters
    ///
    /// - `num_features` - number of input layer units, must be positive
    /// - `hidden_sizes` - unit count per hidden layer, each must be positive
    /// - `hidden_activations` - activation per hidden layer, same length as `hidden_sizes`
    /// - `num_classes` - number of output layer units, must be positive
    /// - `output_activation` - activation applied to the output layer
    ///
    /// # Returns
    ///
    /// - `Ok(Network)` - the assembled network
    /// - `Err(NetworkError::InputValidationError)` - if any size is zero or
    ///   the hidden arrays disagree in length
    pub fn new(
        num_features: usize,
        hidden_sizes: &[usize],
        hidden_activations: &[Activation],
        num_classes: usize,
        output_activation: Activation,
    ) -> Result<Self, NetworkError> {
        if num_features == 0 {
            return Err(NetworkError::InputValidationError(
                "Number of features must be positive".to_string(),
            ));
        }
        if num_classes == 0 {
            return Err(NetworkError::InputValidationError(
                "Number of classes must be positive".to_string(),
            ));
        }
        if hidden_sizes.len() != hidden_activations.len() {
            return Err(NetworkError::InputValidationError(format!(
                "Got {} hidden sizes but {} hidden activations",
                hidden_sizes.len(),
                hidden_activations.len()
            )));
        }
        if let Some(position) = hidden_sizes.iter().position(|&size| size == 0) {
            return Err(NetworkError::InputValidationError(format!(
                "Hidden layer {} has size 0, sizes must be positive",
                position
            )));
        }

        let num_layers = hidden_sizes.len() + 2;
        let mut layers = Vec::with_capacity(num_layers);
        layers.push(Layer::new(LayerRole::Input, num_features, None));
        for (&size, &activation) in hidden_sizes.iter().zip(hidden_activations) {
            layers.push(Layer::new(LayerRole::Hidden, size, Some(activation)));
        }
        layers.push(Layer::new(
            LayerRole::Output,
            num_classes,
            Some(output_activation),
        ));

        let mut connections = Vec::with_capacity(num_layers - 1);
        for i in 0..num_layers - 1 {
            connections.push(Connection::new(
                i,
                layers[i].size(),
                i + 1,
                layers[i + 1].size(),
            ));
        }

        Ok(Self {
            layers,
            connections,
        })
    }

    /// Returns the number of layers in the chain, input and output included
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the number of connections, always `num_layers() - 1`
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Returns the layer arena in pipeline order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the connections in pipeline order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub(crate) fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    /// Returns the input layer's unit count
    pub fn input_size(&self) -> usize {
        self.layers[0].size()
    }

    /// Returns the output layer's unit count
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    /// Propagates a batch through the entire network.
    ///
    /// The input layer receives an owned copy of `input`, then each
    /// connection in order multiplies its upstream buffer by its weights,
    /// broadcast-adds its bias, moves the result into the downstream layer
    /// (dropping that layer's previous buffer), and applies the downstream
    /// activation in place. The final result stays readable through the
    /// output layer until the next forward pass.
    ///
    /// # Parameters
    ///
    /// * `input` - batch to propagate, one example per row, with exactly
    ///   `input_size()` columns
    ///
    /// # Returns
    ///
    /// - `Ok(())` - the batch was propagated
    /// - `Err(NetworkError::InputValidationError)` - if the column count does
    ///   not match the input layer
    pub fn forward_pass(&mut self, input: &Matrix) -> Result<(), NetworkError> {
        if input.ncols() != self.input_size() {
            return Err(NetworkError::InputValidationError(format!(
                "Input has {} columns, the input layer expects {}",
                input.ncols(),
                self.input_size()
            )));
        }

        self.layers[0].set_input(input.to_owned());
        for i in 0..self.connections.len() {
            let activated = {
                let connection = &self.connections[i];
                let upstream = self.layers[connection.from()]
                    .input()
                    .expect("upstream buffer is installed before each connection fires");
                upstream.dot(connection.weights()) + connection.bias()
            };
            let to = self.connections[i].to();
            self.layers[to].set_input(activated);
            self.layers[to].activate();
        }
        Ok(())
    }

    /// Returns the predicted class index for every example of the most
    /// recently propagated batch.
    ///
    /// Reads the output layer's stored buffer and returns, per row, the
    /// column index of the maximum value. The scan is ascending with strict
    /// comparison, so the lowest-indexed maximum wins ties.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<usize>)` - one index in `[0, output_size())` per row
    /// - `Err(NetworkError::ForwardPassNotRun)` - if no batch has been
    ///   propagated yet
    pub fn predict(&self) -> Result<Vec<usize>, NetworkError> {
        let output = self.layers[self.layers.len() - 1]
            .input()
            .ok_or(NetworkError::ForwardPassNotRun)?;

        let mut predictions = Vec::with_capacity(output.nrows());
        for row in output.rows() {
            let mut max = 0;
            for j in 1..row.len() {
                if row[j] > row[max] {
                    max = j;
                }
            }
            predictions.push(max);
        }
        Ok(predictions)
    }

    /// Scores the network on a labeled dataset.
    ///
    /// Runs a fresh forward pass on `data` (replacing every layer's stored
    /// buffer as a side effect), then counts the rows whose predicted index
    /// lands on a `1.0` in the corresponding one-hot `classes` row.
    ///
    /// # Parameters
    ///
    /// - `data` - batch to classify, one example per row
    /// - `classes` - one-hot ground truth, one row per example with
    ///   `output_size()` columns
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - fraction of correctly classified rows, in [0, 1]
    /// - `Err(NetworkError::InputValidationError)` - if the dataset is
    ///   empty, the row counts disagree, or the shapes do not match the
    ///   network
    pub fn accuracy(&mut self, data: &Matrix, classes: &Matrix) -> Result<f64, NetworkError> {
        if data.nrows() == 0 {
            return Err(NetworkError::InputValidationError(
                "Data must contain at least one row".to_string(),
            ));
        }
        if data.nrows() != classes.nrows() {
            return Err(NetworkError::InputValidationError(format!(
                "Data has {} rows but classes has {} rows",
                data.nrows(),
                classes.nrows()
            )));
        }
        if classes.ncols() != self.output_size() {
            return Err(NetworkError::InputValidationError(format!(
                "Classes has {} columns, the output layer expects {}",
                classes.ncols(),
                self.output_size()
            )));
        }

        self.forward_pass(data)?;
        let predictions = self.predict()?;
        let correct = predictions
            .iter()
            .enumerate()
            .filter(|&(i, &predicted)| classes[[i, predicted]] == 1.0)
            .count();
        Ok(correct as f64 / classes.nrows() as f64)
    }
}

/// Computes the mean negative log-likelihood between predictions and one-hot
/// (or soft-label) ground truth, with optional L2 regularization.
///
/// The per-element term is `actual * ln(max(prediction, f64::MIN_POSITIVE))`;
/// the epsilon floor keeps `ln(0)` out of the sum. When a network is
/// supplied, `regularization_strength * 0.5 * Σ w²` over every connection's
/// weight matrix (bias excluded) is added; passing `None` disables
/// regularization regardless of the strength argument. Pure function, no side
/// effects.
///
/// # Parameters
///
/// - `network` - network whose weights contribute the L2 penalty, or `None`
/// - `prediction` - predicted probabilities, one row per example
/// - `actual` - ground truth with the same shape as `prediction`
/// - `regularization_strength` - scalar multiplier on the L2 penalty
///
/// # Returns
///
/// - `Ok(f64)` - the loss value
/// - `Err(NetworkError::InputValidationError)` - if the shapes disagree or
///   the matrices are empty
pub fn cross_entropy_loss(
    network: Option<&Network>,
    prediction: &Matrix,
    actual: &Matrix,
    regularization_strength: f64,
) -> Result<f64, NetworkError> {
    if prediction.dim() != actual.dim() {
        return Err(NetworkError::InputValidationError(format!(
            "Prediction shape {:?} does not match actual shape {:?}",
            prediction.dim(),
            actual.dim()
        )));
    }
    if prediction.nrows() == 0 {
        return Err(NetworkError::InputValidationError(
            "Prediction must contain at least one row".to_string(),
        ));
    }

    let mut total_err = 0.0;
    for (p, a) in prediction.iter().zip(actual.iter()) {
        total_err += a * p.max(f64::MIN_POSITIVE).ln();
    }

    let mut reg_err = 0.0;
    if let Some(network) = network {
        for connection in network.connections() {
            reg_err += connection.weights().iter().map(|w| w * w).sum::<f64>();
        }
    }

    Ok((-1.0 / actual.nrows() as f64) * total_err + regularization_strength * 0.5 * reg_err)
}
