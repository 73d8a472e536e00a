use super::*;
use crate::error::IoError;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

/// Formats a value in C `%a` style hexadecimal floating-point notation, for
/// example `0x1.921fb54442d18p+1` for pi.
///
/// The textual form carries the full significand, so a written value parses
/// back to the exact same bit pattern (including negative zero and
/// subnormals). Infinities and NaN are written as `inf`, `-inf`, and `nan`.
pub fn format_hex(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let bits = value.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let biased_exp = ((bits >> 52) & 0x7ff) as i32;
    let mantissa = bits & 0x000f_ffff_ffff_ffff;

    if biased_exp == 0 {
        if mantissa == 0 {
            format!("{}0x0p+0", sign)
        } else {
            // subnormal: no implicit leading bit, exponent pinned at -1022
            format!("{}0x0.{:013x}p-1022", sign, mantissa)
        }
    } else {
        format!("{}0x1.{:013x}p{:+}", sign, mantissa, biased_exp - 1023)
    }
}

/// Parses a C `%a` style hexadecimal floating-point token.
///
/// Accepts an optional sign, `0x` or `0X`, hexadecimal digits with an
/// optional point, and a mandatory `p`-exponent in decimal, plus the `inf`
/// and `nan` spellings emitted by [`format_hex`]. Values written by
/// [`format_hex`] reload bit-for-bit.
///
/// # Returns
///
/// - `Ok(f64)` - the parsed value
/// - `Err(IoError::FormatError)` - if the token is not a hex float
pub fn parse_hex(token: &str) -> Result<f64, IoError> {
    let err = || IoError::FormatError(format!("invalid hex float: {:?}", token));

    let mut s = token;
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    match s {
        "inf" | "infinity" => return Ok(sign * f64::INFINITY),
        "nan" => return Ok(f64::NAN),
        _ => {}
    }

    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(err)?;
    let (digits, exp_part) = s.split_once(['p', 'P']).ok_or_else(err)?;
    let exp: i32 = exp_part.parse().map_err(|_| err())?;
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(err());
    }

    // Fold the digit string into a single integer significand. Digits past
    // the 64-bit capacity cannot sharpen the value further and only shift its
    // magnitude.
    let mut significand: u64 = 0;
    let mut dropped = 0i32;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = c.to_digit(16).ok_or_else(err)? as u64;
        if significand >> 59 == 0 {
            significand = significand * 16 + digit;
        } else {
            dropped += 1;
        }
    }

    let scale = exp - 4 * (frac_part.len() as i32 - dropped);
    Ok(sign * ldexp(significand as f64, scale))
}

/// Multiplies by a power of two in steps that stay inside the representable
/// exponent range, so gradual underflow into the subnormals rounds once at
/// most.
fn ldexp(value: f64, exp: i32) -> f64 {
    let mut value = value;
    let mut exp = exp;
    while exp > 1023 {
        value *= 2f64.powi(1023);
        exp -= 1023;
    }
    while exp < -1022 {
        value *= 2f64.powi(-1022);
        exp += 1022;
    }
    value * 2f64.powi(exp)
}

/// The file format name for a hidden layer activation. Anything outside the
/// three recognized hidden activations falls back to `tanH`, matching the
/// historical format.
fn hidden_token(activation: Activation) -> &'static str {
    match activation {
        Activation::Sigmoid => "sigmoid",
        Activation::ReLU => "relu",
        _ => "tanH",
    }
}

/// The inverse mapping as the file format defines it: any unrecognized token
/// decodes as softmax.
fn parse_activation(token: &str) -> Activation {
    match token {
        "sigmoid" => Activation::Sigmoid,
        "relu" => Activation::ReLU,
        "tanH" => Activation::TanH,
        _ => Activation::Softmax,
    }
}

fn next_line<I>(lines: &mut I) -> Result<String, IoError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    match lines.next() {
        Some(Ok(line)) => Ok(line.trim().to_string()),
        Some(Err(e)) => Err(IoError::StdIoError(e)),
        None => Err(IoError::FormatError("unexpected end of file".to_string())),
    }
}

fn next_usize<I>(lines: &mut I) -> Result<usize, IoError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let line = next_line(lines)?;
    line.parse()
        .map_err(|_| IoError::FormatError(format!("invalid integer: {:?}", line)))
}

fn next_f64<I>(lines: &mut I) -> Result<f64, IoError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    parse_hex(&next_line(lines)?)
}

impl Network {
    /// Writes the network's structure and parameters to a plain text file.
    ///
    /// The layout is one token per line: the layer count, every layer size,
    /// one activation name per hidden layer, the output activation name only
    /// when it is softmax, then all weights connection by connection in
    /// row-major order, then all biases connection by connection. Numeric
    /// values use hexadecimal floating-point notation so the file reloads
    /// bit-for-bit.
    ///
    /// Note the asymmetry: a non-softmax output activation is never written,
    /// and such a file will not reload (the reader always expects
    /// `num_layers - 1` activation names). This matches the historical
    /// format; see `load_from_path`.
    ///
    /// # Parameters
    ///
    /// * `path` - file path where the model will be written
    ///
    /// # Returns
    ///
    /// - `Ok(())` - model successfully saved
    /// - `Err(IoError::StdIoError)` - file creation or write failed
    pub fn save_to_path(&self, path: &str) -> Result<(), IoError> {
        let file = File::create(path).map_err(IoError::StdIoError)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", self.num_layers()).map_err(IoError::StdIoError)?;
        for layer in self.layers() {
            writeln!(writer, "{}", layer.size()).map_err(IoError::StdIoError)?;
        }

        for layer in &self.layers()[1..self.num_layers() - 1] {
            let activation = layer
                .activation()
                .expect("hidden layers always carry an activation");
            writeln!(writer, "{}", hidden_token(activation)).map_err(IoError::StdIoError)?;
        }
        let output_layer = &self.layers()[self.num_layers() - 1];
        if output_layer.activation() == Some(Activation::Softmax) {
            writeln!(writer, "softmax").map_err(IoError::StdIoError)?;
        }

        for connection in self.connections() {
            for row in connection.weights().rows() {
                for weight in row {
                    writeln!(writer, "{}", format_hex(*weight)).map_err(IoError::StdIoError)?;
                }
            }
        }
        for connection in self.connections() {
            for bias in connection.bias().iter() {
                writeln!(writer, "{}", format_hex(*bias)).map_err(IoError::StdIoError)?;
            }
        }

        writer.flush().map_err(IoError::StdIoError)?;
        Ok(())
    }

    /// Reads a model file and builds a brand-new network from it.
    ///
    /// The structure is reconstructed through [`Network::new`] before the
    /// learned parameters are filled in; an existing network is never mutated
    /// in place. The reader always consumes `num_layers - 1` activation
    /// names, mapping `sigmoid`, `relu`, and `tanH` to themselves and any
    /// other token to softmax.
    ///
    /// # Parameters
    ///
    /// * `path` - file path to read the model from
    ///
    /// # Returns
    ///
    /// - `Ok(Network)` - the reconstructed network
    /// - `Err(IoError::StdIoError)` - the file could not be opened or read
    /// - `Err(IoError::FormatError)` - the file is truncated or contains a
    ///   malformed token
    pub fn load_from_path(path: &str) -> Result<Network, IoError> {
        let reader = IoError::load_in_buf_reader(path)?;
        let mut lines = reader.lines();

        let num_layers = next_usize(&mut lines)?;
        if num_layers < 2 {
            return Err(IoError::FormatError(format!(
                "network must have at least 2 layers, file declares {}",
                num_layers
            )));
        }

        let mut sizes = Vec::with_capacity(num_layers);
        for _ in 0..num_layers {
            sizes.push(next_usize(&mut lines)?);
        }

        let mut activations = Vec::with_capacity(num_layers - 1);
        for _ in 0..num_layers - 1 {
            activations.push(parse_activation(&next_line(&mut lines)?));
        }

        let mut network = Network::new(
            sizes[0],
            &sizes[1..num_layers - 1],
            &activations[..num_layers - 2],
            sizes[num_layers - 1],
            activations[num_layers - 2],
        )
        .map_err(|e| IoError::FormatError(e.to_string()))?;

        for connection in network.connections_mut() {
            let (rows, cols) = connection.weights().dim();
            for i in 0..rows {
                for j in 0..cols {
                    connection.weights_mut()[[i, j]] = next_f64(&mut lines)?;
                }
            }
        }
        for connection in network.connections_mut() {
            let cols = connection.bias().ncols();
            for j in 0..cols {
                connection.bias_mut()[[0, j]] = next_f64(&mut lines)?;
            }
        }

        Ok(network)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_round_trip_preserves_bits() {
        let values = [
            0.0,
            -0.0,
            1.0,
            -1.5,
            0.1,
            std::f64::consts::PI,
            -std::f64::consts::E,
            f64::MIN_POSITIVE,
            5e-324,
            -5e-324,
            f64::MAX,
            f64::MIN,
            1.0 / 3.0,
        ];
        for value in values {
            let token = format_hex(value);
            let parsed = parse_hex(&token).unwrap();
            assert_eq!(
                parsed.to_bits(),
                value.to_bits(),
                "round trip of {} via {:?}",
                value,
                token
            );
        }
    }

    #[test]
    fn hex_format_matches_c_notation() {
        assert_eq!(format_hex(3.0), "0x1.8000000000000p+1");
        assert_eq!(format_hex(0.0), "0x0p+0");
        assert_eq!(format_hex(-0.0), "-0x0p+0");
        assert_eq!(format_hex(-0.25), "-0x1.0000000000000p-2");
    }

    #[test]
    fn hex_parse_accepts_short_c_forms() {
        assert_eq!(parse_hex("0x1.8p+1").unwrap(), 3.0);
        assert_eq!(parse_hex("0x1p-2").unwrap(), 0.25);
        assert_eq!(parse_hex("-0x1.8p1").unwrap(), -3.0);
        assert_eq!(
            parse_hex("0x1.921fb54442d18p+1").unwrap(),
            std::f64::consts::PI
        );
        assert_eq!(parse_hex("inf").unwrap(), f64::INFINITY);
        assert_eq!(parse_hex("-inf").unwrap(), f64::NEG_INFINITY);
        assert!(parse_hex("nan").unwrap().is_nan());
    }

    #[test]
    fn hex_parse_rejects_garbage() {
        for token in ["", "0x", "0xp+1", "1.5", "0x1.8", "0x1.8p", "0xg.0p+0"] {
            assert!(
                parse_hex(token).is_err(),
                "token {:?} should not parse",
                token
            );
        }
    }

    #[test]
    fn activation_tokens_follow_the_format() {
        assert_eq!(hidden_token(Activation::Sigmoid), "sigmoid");
        assert_eq!(hidden_token(Activation::ReLU), "relu");
        assert_eq!(hidden_token(Activation::TanH), "tanH");
        // unrecognized hidden activations serialize as tanH
        assert_eq!(hidden_token(Activation::Linear), "tanH");

        assert_eq!(parse_activation("sigmoid"), Activation::Sigmoid);
        assert_eq!(parse_activation("relu"), Activation::ReLU);
        assert_eq!(parse_activation("tanH"), Activation::TanH);
        // anything else decodes as softmax
        assert_eq!(parse_activation("softmax"), Activation::Softmax);
        assert_eq!(parse_activation("0x1.8p+1"), Activation::Softmax);
    }
}
