//! Portable inference-graph export for fitted linear models.
//!
//! A fitted [`LinearRegressionModel`] is described as a one-node graph:
//!
//! ```text
//!   input (batch, d) ──┐
//!   weight (k, d) ─────┼── Gemm(trans_b = 1) ──> output (batch, k)
//!   bias (k) ──────────┘
//! ```
//!
//! The `Gemm` node computes `input · weightᵀ + bias`, the weight and bias are
//! embedded as constant initializers, and the batch dimension of both the
//! input and the output is symbolic. Documents are stored as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegressionError, Result};
use crate::{LinearRegressionModel, Matrix, Vector};

pub const IR_VERSION: u32 = 7;
pub const DEFAULT_OPSET: u32 = 13;
pub const PRODUCER_NAME: &str = env!("CARGO_PKG_NAME");

const WEIGHT_NAME: &str = "weight";
const BIAS_NAME: &str = "bias";

/// Names and versions written into an exported graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
    input_name: String,
    output_name: String,
    batch_dim: String,
    graph_name: String,
    opset_version: u32,
}

impl ExportConfig {
    pub fn new() -> Self {
        Self {
            input_name: "input".to_string(),
            output_name: "output".to_string(),
            batch_dim: "batch_size".to_string(),
            graph_name: "linear_regression".to_string(),
            opset_version: DEFAULT_OPSET,
        }
    }

    pub fn input_name(mut self, name: &str) -> Self {
        self.input_name = name.to_string();
        self
    }

    pub fn output_name(mut self, name: &str) -> Self {
        self.output_name = name.to_string();
        self
    }

    pub fn batch_dim(mut self, name: &str) -> Self {
        self.batch_dim = name.to_string();
        self
    }

    pub fn graph_name(mut self, name: &str) -> Self {
        self.graph_name = name.to_string();
        self
    }

    pub fn opset_version(mut self, opset_version: u32) -> Self {
        self.opset_version = opset_version;
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Element type of graph tensors. Parameters are always stored as 64-bit
/// floats, so documents declaring any other type fail to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElemType {
    Double,
}

/// A tensor dimension: either a fixed size or a named symbolic size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dim {
    Value(usize),
    Param(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueInfo {
    pub name: String,
    pub elem_type: ElemType,
    pub shape: Vec<Dim>,
}

/// Constant tensor stored in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub name: String,
    pub elem_type: ElemType,
    pub dims: Vec<usize>,
    pub data: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op_type")]
pub enum Node {
    /// `Y = A · op(B) + C`, where `op(B)` is `Bᵀ` when `trans_b` is set.
    Gemm {
        name: String,
        inputs: Vec<String>,
        outputs: Vec<String>,
        #[serde(default)]
        trans_b: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub inputs: Vec<ValueInfo>,
    pub outputs: Vec<ValueInfo>,
    pub initializers: Vec<Initializer>,
    pub nodes: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceGraph {
    pub ir_version: u32,
    pub opset_version: u32,
    pub producer_name: String,
    pub producer_version: String,
    pub graph: Graph,
}

/// Parameters resolved from a validated graph, with the weight in `(k, d)`
/// layout regardless of how the node stores it.
struct AffineParams {
    weight: Matrix,
    bias: Vector,
}

impl InferenceGraph {
    pub fn from_model(model: &LinearRegressionModel, config: &ExportConfig) -> Self {
        if !model.is_fitted() {
            log::warn!("exporting a model that has not been fitted; all parameters are zero");
        }

        let batch = Dim::Param(config.batch_dim.clone());
        let input = ValueInfo {
            name: config.input_name.clone(),
            elem_type: ElemType::Double,
            shape: vec![batch.clone(), Dim::Value(model.in_features())],
        };
        let output = ValueInfo {
            name: config.output_name.clone(),
            elem_type: ElemType::Double,
            shape: vec![batch, Dim::Value(model.out_features())],
        };

        let weight = Initializer {
            name: WEIGHT_NAME.to_string(),
            elem_type: ElemType::Double,
            dims: vec![model.out_features(), model.in_features()],
            data: model.weight().iter().copied().collect(),
        };
        let bias = Initializer {
            name: BIAS_NAME.to_string(),
            elem_type: ElemType::Double,
            dims: vec![model.out_features()],
            data: model.bias().to_vec(),
        };

        let gemm = Node::Gemm {
            name: "Gemm_0".to_string(),
            inputs: vec![
                config.input_name.clone(),
                WEIGHT_NAME.to_string(),
                BIAS_NAME.to_string(),
            ],
            outputs: vec![config.output_name.clone()],
            trans_b: true,
        };

        Self {
            ir_version: IR_VERSION,
            opset_version: config.opset_version,
            producer_name: PRODUCER_NAME.to_string(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
            graph: Graph {
                name: config.graph_name.clone(),
                inputs: vec![input],
                outputs: vec![output],
                initializers: vec![weight, bias],
                nodes: vec![gemm],
            },
        }
    }

    pub fn input(&self) -> Option<&ValueInfo> {
        self.graph.inputs.first()
    }

    pub fn output(&self) -> Option<&ValueInfo> {
        self.graph.outputs.first()
    }

    /// Serializes a validated graph; invalid documents are never written.
    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let graph: Self = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        log::info!(
            "exported graph '{}' (opset {}) to {}",
            self.graph.name,
            self.opset_version,
            path.display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let graph: Self = serde_json::from_reader(reader)?;
        graph.validate()?;

        log::info!("loaded graph '{}' from {}", graph.graph.name, path.display());
        Ok(graph)
    }

    /// Checks that the document describes exactly one affine transform with
    /// consistent shapes and fully populated constants.
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    /// Runs the graph on an `(m, d)` input.
    pub fn evaluate(&self, x: &Matrix) -> Result<Matrix> {
        let params = self.resolve()?;
        if x.ncols() != params.weight.ncols() {
            return Err(RegressionError::mismatch(
                "graph input columns",
                params.weight.ncols(),
                x.ncols(),
            ));
        }

        Ok(x.dot(&params.weight.t()) + &params.bias)
    }

    /// Rebuilds the model whose parameters are embedded in the graph.
    pub fn to_model(&self) -> Result<LinearRegressionModel> {
        let params = self.resolve()?;
        LinearRegressionModel::from_parameters(params.weight, params.bias)
    }

    fn resolve(&self) -> Result<AffineParams> {
        let graph = &self.graph;
        let [input] = graph.inputs.as_slice() else {
            return Err(invalid(format!("expected 1 input, found {}", graph.inputs.len())));
        };
        let [output] = graph.outputs.as_slice() else {
            return Err(invalid(format!("expected 1 output, found {}", graph.outputs.len())));
        };
        let [Node::Gemm { inputs, outputs, trans_b, .. }] = graph.nodes.as_slice() else {
            return Err(invalid(format!("expected 1 Gemm node, found {} nodes", graph.nodes.len())));
        };

        let [a_name, b_name, c_name] = inputs.as_slice() else {
            return Err(invalid(format!("Gemm expects 3 inputs, found {}", inputs.len())));
        };
        if a_name != &input.name {
            return Err(invalid(format!(
                "Gemm reads '{}' but the graph input is '{}'",
                a_name, input.name
            )));
        }
        if outputs.as_slice() != [output.name.clone()] {
            return Err(invalid(format!(
                "Gemm must produce exactly the graph output '{}'",
                output.name
            )));
        }

        let b = self.initializer(b_name)?;
        let c = self.initializer(c_name)?;

        let [rows, cols] = b.dims.as_slice() else {
            return Err(invalid(format!("'{}' must be 2-dimensional", b.name)));
        };
        if *rows == 0 || *cols == 0 {
            return Err(invalid(format!("'{}' has an empty shape {:?}", b.name, b.dims)));
        }
        let stored = Matrix::from_shape_vec((*rows, *cols), b.data.clone())
            .map_err(|e| invalid(format!("'{}': {}", b.name, e)))?;
        let weight = if *trans_b { stored } else { stored.reversed_axes() };
        let (k, d) = weight.dim();

        if c.dims.as_slice() != [k] || c.data.len() != k {
            return Err(invalid(format!(
                "'{}' must have shape [{}], found {:?} with {} values",
                c.name,
                k,
                c.dims,
                c.data.len()
            )));
        }

        if b.data.iter().chain(c.data.iter()).any(|v| !v.is_finite()) {
            return Err(invalid("initializers contain NaN or infinite values".to_string()));
        }

        check_value_shape(input, d)?;
        check_value_shape(output, k)?;

        Ok(AffineParams {
            weight: weight.as_standard_layout().into_owned(),
            bias: Vector::from(c.data.clone()),
        })
    }

    fn initializer(&self, name: &str) -> Result<&Initializer> {
        self.graph
            .initializers
            .iter()
            .find(|init| init.name == name)
            .ok_or_else(|| invalid(format!("missing initializer '{}'", name)))
    }
}

fn check_value_shape(value: &ValueInfo, features: usize) -> Result<()> {
    match value.shape.as_slice() {
        [Dim::Param(_), Dim::Value(n)] if *n == features => Ok(()),
        [Dim::Param(_), Dim::Value(n)] => Err(RegressionError::mismatch(
            "graph value columns",
            features,
            *n,
        )),
        _ => Err(invalid(format!(
            "'{}' must have shape (batch, {}) with a symbolic batch dimension",
            value.name, features
        ))),
    }
}

fn invalid(message: String) -> RegressionError {
    RegressionError::InvalidGraph(message)
}
