//! Glyph classification: the classifier seam and a JSON-loadable MLP.

use image::imageops::{self, FilterType};
use image::GrayImage;
use nalgebra::{DMatrix, DVector};

use crate::error::{load_json, ReadError};

/// Square binary bitmap fed to a [`DigitClassifier`], row-major, values 0.0 / 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPattern {
    size: u32,
    values: Vec<f32>,
}

impl GlyphPattern {
    /// Resample a glyph crop to `size x size` and binarize it (`> threshold`).
    pub fn from_mask(glyph: &GrayImage, size: u32, threshold: u8) -> Self {
        let resized = imageops::resize(glyph, size, size, FilterType::Triangle);
        let values = resized
            .pixels()
            .map(|p| if p[0] > threshold { 1.0 } else { 0.0 })
            .collect();
        Self { size, values }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Fraction of set cells.
    pub fn fill_ratio(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }
}

/// Maps a normalized glyph bitmap to a digit label.
///
/// Any label outside `0..=9` is treated as a rejection of the glyph.
pub trait DigitClassifier: Send + Sync {
    /// Side length of the square pattern this classifier expects.
    fn input_size(&self) -> u32 {
        28
    }

    fn classify(&self, pattern: &GlyphPattern) -> u8;
}

impl<F> DigitClassifier for F
where
    F: Fn(&GlyphPattern) -> u8 + Send + Sync,
{
    fn classify(&self, pattern: &GlyphPattern) -> u8 {
        self(pattern)
    }
}

/// Neuron activation used by every layer of an [`MlpClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activation {
    /// `beta * (1 - exp(-alpha x)) / (1 + exp(-alpha x))`.
    SymmetricSigmoid { alpha: f64, beta: f64 },
    Identity,
}

impl Default for Activation {
    fn default() -> Self {
        Self::SymmetricSigmoid {
            alpha: 2.0 / 3.0,
            beta: 1.7159,
        }
    }
}

impl Activation {
    fn apply(self, v: &mut DVector<f64>) {
        if let Self::SymmetricSigmoid { alpha, beta } = self {
            v.apply(|x| {
                let e = (-alpha * *x).exp();
                *x = beta * (1.0 - e) / (1.0 + e);
            });
        }
    }
}

/// One fully connected layer: `weights` is `outputs x inputs`, row-major.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LayerSpec {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// On-disk description of a trained perceptron.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MlpSpec {
    pub input_size: u32,
    pub layers: Vec<LayerSpec>,
    /// Label reported for each output neuron.
    pub labels: Vec<u8>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone)]
struct Layer {
    weights: DMatrix<f64>,
    bias: DVector<f64>,
}

/// Multi-layer perceptron; the label of the strongest output wins.
#[derive(Debug, Clone)]
pub struct MlpClassifier {
    input_size: u32,
    layers: Vec<Layer>,
    labels: Vec<u8>,
    activation: Activation,
}

impl MlpClassifier {
    pub fn from_spec(spec: MlpSpec) -> Result<Self, ReadError> {
        let invalid = |msg: String| ReadError::InvalidClassifier(msg);
        if spec.input_size == 0 {
            return Err(invalid("input size must be positive".into()));
        }
        if spec.layers.is_empty() {
            return Err(invalid("no layers".into()));
        }
        let mut expected_inputs = (spec.input_size * spec.input_size) as usize;
        let mut layers = Vec::with_capacity(spec.layers.len());
        for (i, layer) in spec.layers.iter().enumerate() {
            let rows = layer.weights.len();
            if rows == 0 || layer.bias.len() != rows {
                return Err(invalid(format!(
                    "layer {}: {} weight rows but {} biases",
                    i,
                    rows,
                    layer.bias.len()
                )));
            }
            if let Some(bad) = layer.weights.iter().find(|r| r.len() != expected_inputs) {
                return Err(invalid(format!(
                    "layer {}: expected {} inputs, got a row of {}",
                    i,
                    expected_inputs,
                    bad.len()
                )));
            }
            let flat: Vec<f64> = layer.weights.iter().flatten().copied().collect();
            layers.push(Layer {
                weights: DMatrix::from_row_slice(rows, expected_inputs, &flat),
                bias: DVector::from_column_slice(&layer.bias),
            });
            expected_inputs = rows;
        }
        if spec.labels.len() != expected_inputs {
            return Err(invalid(format!(
                "{} labels for {} outputs",
                spec.labels.len(),
                expected_inputs
            )));
        }
        Ok(Self {
            input_size: spec.input_size,
            layers,
            labels: spec.labels,
            activation: spec.activation,
        })
    }

    pub fn from_json_file(path: &std::path::Path) -> Result<Self, ReadError> {
        Self::from_spec(load_json(path)?)
    }

    /// Raw output activations for a pattern of the expected size.
    pub fn forward(&self, pattern: &GlyphPattern) -> DVector<f64> {
        let mut x = DVector::from_iterator(
            pattern.values().len(),
            pattern.values().iter().map(|&v| v as f64),
        );
        for layer in &self.layers {
            let mut y = &layer.weights * &x + &layer.bias;
            self.activation.apply(&mut y);
            x = y;
        }
        x
    }
}

impl DigitClassifier for MlpClassifier {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn classify(&self, pattern: &GlyphPattern) -> u8 {
        let expected = (self.input_size * self.input_size) as usize;
        if pattern.values().len() != expected {
            tracing::debug!(
                got = pattern.values().len(),
                expected,
                "pattern size mismatch"
            );
            return u8::MAX;
        }
        let out = self.forward(pattern);
        self.labels[out.argmax().0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Luma;

    fn pattern(values: Vec<f32>) -> GlyphPattern {
        let size = (values.len() as f64).sqrt() as u32;
        GlyphPattern { size, values }
    }

    /// 2x2 input, one hidden unit per row, labels 3 (top heavy) and 7 (bottom heavy).
    fn row_detector() -> MlpSpec {
        MlpSpec {
            input_size: 2,
            layers: vec![
                LayerSpec {
                    weights: vec![vec![1.0, 1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 1.0]],
                    bias: vec![0.0, 0.0],
                },
                LayerSpec {
                    weights: vec![vec![2.0, -2.0], vec![-2.0, 2.0]],
                    bias: vec![0.0, 0.0],
                },
            ],
            labels: vec![3, 7],
            activation: Activation::default(),
        }
    }

    #[test]
    fn forward_picks_strongest_output() {
        let mlp = MlpClassifier::from_spec(row_detector()).unwrap();
        assert_eq!(mlp.input_size(), 2);
        assert_eq!(mlp.classify(&pattern(vec![1.0, 1.0, 0.0, 0.0])), 3);
        assert_eq!(mlp.classify(&pattern(vec![0.0, 0.0, 1.0, 1.0])), 7);
    }

    #[test]
    fn symmetric_sigmoid_values() {
        let mut v = DVector::from_vec(vec![0.0, 100.0, -100.0]);
        Activation::default().apply(&mut v);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1], 1.7159, epsilon = 1e-9);
        assert_abs_diff_eq!(v[2], -1.7159, epsilon = 1e-9);
    }

    #[test]
    fn identity_activation_is_linear() {
        let mut spec = row_detector();
        spec.activation = Activation::Identity;
        let mlp = MlpClassifier::from_spec(spec).unwrap();
        let out = mlp.forward(&pattern(vec![1.0, 0.0, 0.0, 0.0]));
        assert_abs_diff_eq!(out[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn inconsistent_shapes_are_rejected() {
        let mut spec = row_detector();
        spec.layers[1].weights[0].push(1.0);
        assert!(matches!(
            MlpClassifier::from_spec(spec),
            Err(ReadError::InvalidClassifier(_))
        ));

        let mut spec = row_detector();
        spec.labels.pop();
        assert!(MlpClassifier::from_spec(spec).is_err());

        let mut spec = row_detector();
        spec.layers[0].bias.pop();
        assert!(MlpClassifier::from_spec(spec).is_err());
    }

    #[test]
    fn zero_input_size_is_rejected() {
        let spec = MlpSpec {
            input_size: 0,
            layers: vec![LayerSpec {
                weights: vec![vec![]],
                bias: vec![0.0],
            }],
            labels: vec![0],
            activation: Activation::default(),
        };
        assert!(matches!(
            MlpClassifier::from_spec(spec),
            Err(ReadError::InvalidClassifier(_))
        ));
    }

    #[test]
    fn spec_parses_from_json_with_default_activation() {
        let json = r#"{
            "input_size": 1,
            "layers": [{"weights": [[1.0], [-1.0]], "bias": [0.0, 0.0]}],
            "labels": [4, 9]
        }"#;
        let spec: MlpSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.activation, Activation::default());
        let mlp = MlpClassifier::from_spec(spec).unwrap();
        assert_eq!(mlp.classify(&pattern(vec![1.0])), 4);
        assert_eq!(mlp.classify(&pattern(vec![0.0, 1.0])), u8::MAX);
    }

    #[test]
    fn pattern_from_mask_binarizes() {
        let mut glyph = GrayImage::new(10, 20);
        for y in 0..10 {
            for x in 0..10 {
                glyph.put_pixel(x, y, Luma([255]));
            }
        }
        let p = GlyphPattern::from_mask(&glyph, 4, 20);
        assert_eq!(p.size(), 4);
        assert_eq!(p.values().len(), 16);
        assert_eq!(&p.values()[0..4], &[1.0; 4]);
        assert_eq!(&p.values()[12..16], &[0.0; 4]);
    }

    #[test]
    fn fill_ratio_counts_set_cells() {
        assert_abs_diff_eq!(pattern(vec![1.0, 0.0, 0.0, 1.0]).fill_ratio(), 0.5);
        assert_abs_diff_eq!(pattern(Vec::new()).fill_ratio(), 0.0);
    }

    #[test]
    fn closures_are_classifiers() {
        let c = |p: &GlyphPattern| if p.fill_ratio() > 0.5 { 8 } else { 0 };
        assert_eq!(c.input_size(), 28);
        assert_eq!(DigitClassifier::classify(&c, &pattern(vec![1.0; 4])), 8);
    }
}
