pub use crate::error::{IoError, NetworkError};
pub use crate::network::Matrix;
pub use crate::network::activation::Activation;
pub use crate::network::feedforward::{Network, cross_entropy_loss};
pub use crate::network::layer::{Connection, Layer, LayerRole};
pub use crate::network::serialize::{format_hex, parse_hex};
