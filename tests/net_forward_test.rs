use approx::assert_abs_diff_eq;
use forwardnet::prelude::*;
use ndarray::array;

#[test]
fn construction_builds_matching_shapes() {
    let network = Network::new(
        4,
        &[5, 3],
        &[Activation::ReLU, Activation::TanH],
        2,
        Activation::Softmax,
    )
    .unwrap();

    assert_eq!(network.num_layers(), 4);
    assert_eq!(network.num_connections(), 3);
    assert_eq!(network.input_size(), 4);
    assert_eq!(network.output_size(), 2);

    let sizes: Vec<usize> = network.layers().iter().map(|layer| layer.size()).collect();
    assert_eq!(sizes, vec![4, 5, 3, 2]);

    assert_eq!(network.layers()[0].role(), LayerRole::Input);
    assert_eq!(network.layers()[1].role(), LayerRole::Hidden);
    assert_eq!(network.layers()[2].role(), LayerRole::Hidden);
    assert_eq!(network.layers()[3].role(), LayerRole::Output);
    assert_eq!(network.layers()[0].activation(), None);
    assert_eq!(network.layers()[3].activation(), Some(Activation::Softmax));

    // every connection's weight matrix matches the two layer sizes it joins
    for (i, connection) in network.connections().iter().enumerate() {
        assert_eq!(connection.from(), i);
        assert_eq!(connection.to(), i + 1);
        let from_size = network.layers()[i].size();
        let to_size = network.layers()[i + 1].size();
        assert_eq!(connection.weights().dim(), (from_size, to_size));
        assert_eq!(connection.bias().dim(), (1, to_size));
    }
}

#[test]
fn construction_without_hidden_layers() {
    let network = Network::new(2, &[], &[], 3, Activation::Softmax).unwrap();
    assert_eq!(network.num_layers(), 2);
    assert_eq!(network.num_connections(), 1);
    assert_eq!(network.connections()[0].weights().dim(), (2, 3));
}

#[test]
fn construction_rejects_invalid_sizes() {
    assert!(Network::new(0, &[], &[], 2, Activation::Softmax).is_err());
    assert!(Network::new(2, &[], &[], 0, Activation::Softmax).is_err());
    assert!(Network::new(2, &[0], &[Activation::ReLU], 2, Activation::Softmax).is_err());
    // hidden sizes and activations must agree in length
    let result = Network::new(2, &[3, 4], &[Activation::ReLU], 2, Activation::Softmax);
    assert!(matches!(
        result,
        Err(NetworkError::InputValidationError(_))
    ));
}

#[test]
fn forward_pass_preserves_batch_size() {
    let mut network = Network::new(
        4,
        &[6, 5],
        &[Activation::Sigmoid, Activation::ReLU],
        3,
        Activation::Softmax,
    )
    .unwrap();

    let batch = array![
        [0.1, -0.2, 0.3, 0.4],
        [1.0, 2.0, -1.0, 0.0],
        [0.0, 0.0, 0.0, 0.0]
    ];
    network.forward_pass(&batch).unwrap();

    // row count propagates unchanged, column count equals each layer's size
    for layer in network.layers() {
        let buffer = layer.input().unwrap();
        assert_eq!(buffer.nrows(), 3);
        assert_eq!(buffer.ncols(), layer.size());
    }
}

#[test]
fn forward_pass_replaces_previous_batch() {
    let mut network = Network::new(2, &[3], &[Activation::TanH], 2, Activation::Softmax).unwrap();

    network.forward_pass(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
    assert_eq!(network.layers()[0].input().unwrap().nrows(), 2);

    network.forward_pass(&array![[5.0, 6.0]]).unwrap();
    assert_eq!(network.layers()[0].input().unwrap(), &array![[5.0, 6.0]]);
    assert_eq!(network.layers()[2].input().unwrap().nrows(), 1);
}

#[test]
fn forward_pass_rejects_wrong_width() {
    let mut network = Network::new(3, &[], &[], 2, Activation::Softmax).unwrap();
    let result = network.forward_pass(&array![[1.0, 2.0]]);
    assert!(matches!(
        result,
        Err(NetworkError::InputValidationError(_))
    ));
    // the failed pass must not have installed a batch
    assert!(network.layers()[0].input().is_none());
    assert!(network.layers()[1].input().is_none());
}

#[test]
fn softmax_output_rows_sum_to_one() {
    let mut network = Network::new(2, &[], &[], 2, Activation::Softmax).unwrap();
    network.forward_pass(&array![[1.0, 0.0]]).unwrap();

    let output = network.layers()[1].input().unwrap();
    assert_eq!(output.dim(), (1, 2));
    assert_abs_diff_eq!(output.row(0).sum(), 1.0, epsilon = 1e-12);
    for value in output.iter() {
        assert!(*value > 0.0 && *value < 1.0);
    }
}

#[test]
fn predict_before_forward_pass_errors() {
    let network = Network::new(2, &[], &[], 2, Activation::Softmax).unwrap();
    assert!(matches!(
        network.predict(),
        Err(NetworkError::ForwardPassNotRun)
    ));
}

#[test]
fn predict_stays_in_output_range() {
    let mut network = Network::new(
        5,
        &[7],
        &[Activation::ReLU],
        4,
        Activation::Softmax,
    )
    .unwrap();

    let batch = array![
        [0.3, -1.2, 0.8, 0.0, 2.0],
        [1.0, 1.0, 1.0, 1.0, 1.0],
        [-4.0, 2.5, 0.1, -0.1, 0.9]
    ];
    network.forward_pass(&batch).unwrap();
    let predictions = network.predict().unwrap();

    assert_eq!(predictions.len(), 3);
    for prediction in predictions {
        assert!(prediction < 4);
    }
}

#[test]
fn predict_returns_strictly_greatest_column() {
    // identity-like weights make the argmax fully determined by the input
    let mut network = write_and_load_identity_network("forwardnet_forward_identity.txt");
    network
        .forward_pass(&array![[1.0, 0.0], [0.0, 1.0]])
        .unwrap();
    assert_eq!(network.predict().unwrap(), vec![0, 1]);
}

/// Builds a 2-feature, 2-class softmax network with weights `[[5, 0], [0, 5]]`
/// and zero bias by writing a model file by hand and loading it back.
fn write_and_load_identity_network(name: &str) -> Network {
    let path = std::env::temp_dir().join(name);
    let mut lines = vec![
        "2".to_string(),
        "2".to_string(),
        "2".to_string(),
        "softmax".to_string(),
    ];
    for weight in [5.0, 0.0, 0.0, 5.0] {
        lines.push(format_hex(weight));
    }
    for bias in [0.0, 0.0] {
        lines.push(format_hex(bias));
    }
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let network = Network::load_from_path(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    network
}

#[test]
fn predict_breaks_ties_toward_lowest_index() {
    // zero weights and bias leave every class score equal
    let path = std::env::temp_dir().join("forwardnet_forward_ties.txt");
    let mut lines = vec![
        "2".to_string(),
        "2".to_string(),
        "3".to_string(),
        "softmax".to_string(),
    ];
    for _ in 0..6 {
        lines.push(format_hex(0.0));
    }
    for _ in 0..3 {
        lines.push(format_hex(0.0));
    }
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let mut network = Network::load_from_path(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();

    network
        .forward_pass(&array![[0.4, -0.9], [7.0, 7.0]])
        .unwrap();
    assert_eq!(network.predict().unwrap(), vec![0, 0]);
}
