use super::*;
use ndarray::Array;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;

/// Position of a layer within the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Input,
    Hidden,
    Output,
}

/// One pipeline stage: a role, a unit count, an optional activation, and the
/// buffer most recently produced for this stage.
///
/// For the input layer the buffer is an owned copy of the last batch fed in;
/// for hidden and output layers it is the post-activation output of the
/// preceding connection. The buffer is replaced (and the old one dropped) on
/// every forward pass.
pub struct Layer {
    role: LayerRole,
    size: usize,
    activation: Option<Activation>,
    input: Option<Matrix>,
}

impl Layer {
    pub(crate) fn new(role: LayerRole, size: usize, activation: Option<Activation>) -> Self {
        Self {
            role,
            size,
            activation,
            input: None,
        }
    }

    /// Returns the role of this layer within the pipeline
    pub fn role(&self) -> LayerRole {
        self.role
    }

    /// Returns the number of units in this layer
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the activation applied to this layer's buffer, `None` for the
    /// input layer
    pub fn activation(&self) -> Option<Activation> {
        self.activation
    }

    /// Returns the buffer currently held by this layer, `None` until the
    /// first forward pass
    pub fn input(&self) -> Option<&Matrix> {
        self.input.as_ref()
    }

    /// Installs a freshly produced buffer, dropping the previous one.
    pub(crate) fn set_input(&mut self, buffer: Matrix) {
        self.input = Some(buffer);
    }

    /// Applies this layer's activation to its stored buffer in place.
    pub(crate) fn activate(&mut self) {
        if let (Some(activation), Some(buffer)) = (self.activation, self.input.as_mut()) {
            activation.apply(buffer);
        }
    }
}

/// The weight matrix and bias vector linking two adjacent layers.
///
/// `from` and `to` are indices into the owning network's layer arena rather
/// than references, so a connection never outlives or dangles off the layers
/// it joins. Weights have shape `[from.size, to.size]`, the bias has shape
/// `[1, to.size]` and is broadcast across every row of a batch.
pub struct Connection {
    from: usize,
    to: usize,
    weights: Matrix,
    bias: Matrix,
}

impl Connection {
    /// Creates a connection with freshly initialized parameters: weights
    /// uniform in [-0.05, 0.05], bias zero.
    pub(crate) fn new(from: usize, from_size: usize, to: usize, to_size: usize) -> Self {
        let weights = Array::random((from_size, to_size), Uniform::new(-0.05, 0.05));
        let bias = Array::zeros((1, to_size));
        Self {
            from,
            to,
            weights,
            bias,
        }
    }

    /// Returns the layer index this connection reads from
    pub fn from(&self) -> usize {
        self.from
    }

    /// Returns the layer index this connection feeds into
    pub fn to(&self) -> usize {
        self.to
    }

    /// Returns a reference to the weight matrix with shape `[from.size, to.size]`
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Returns a reference to the bias vector with shape `[1, to.size]`
    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Matrix {
        &mut self.weights
    }

    pub(crate) fn bias_mut(&mut self) -> &mut Matrix {
        &mut self.bias
    }
}
