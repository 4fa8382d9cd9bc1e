//! Neural Network inference.

use std::{ops::Index, path::Path, sync::Arc};

use anyhow::{bail, Context};
use tract_onnx::prelude::{
    Framework, Graph, InferenceModelExt, SimplePlan, TValue, TVec, TypedFact, TypedOp,
};

use crate::image::{Color, Image, Rect, Resolution};

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A dense `f32` tensor.
#[derive(Debug, Clone)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Box<[f32]>,
}

impl Tensor {
    /// Creates a tensor of the given shape by calling `f` for each element, in row-major order.
    pub fn from_array_shape_fn<const N: usize, F: FnMut([usize; N]) -> f32>(
        shape: [usize; N],
        mut f: F,
    ) -> Self {
        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        let mut index = [0; N];
        for _ in 0..len {
            data.push(f(index));
            for dim in (0..N).rev() {
                index[dim] += 1;
                if index[dim] < shape[dim] {
                    break;
                }
                index[dim] = 0;
            }
        }
        Self {
            shape: shape.to_vec(),
            data: data.into_boxed_slice(),
        }
    }

    /// Creates a tensor of the given shape by pulling elements from an iterator.
    ///
    /// # Panics
    ///
    /// `iter` must yield exactly as many elements as specified by `shape`, otherwise this method
    /// will panic.
    pub fn from_iter<I: IntoIterator<Item = f32>>(shape: &[usize], iter: I) -> Self {
        let data: Box<[f32]> = iter.into_iter().collect();
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "tensor data does not match shape {shape:?}"
        );
        Self {
            shape: shape.to_vec(),
            data,
        }
    }

    fn from_tract(tract: &tract_onnx::prelude::Tensor) -> anyhow::Result<Self> {
        Ok(Self {
            shape: tract.shape().to_vec(),
            data: tract.as_slice::<f32>()?.into(),
        })
    }

    fn to_tract(&self) -> anyhow::Result<tract_onnx::prelude::Tensor> {
        tract_onnx::prelude::Tensor::from_shape(&self.shape, self.as_slice())
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the elements of this tensor, in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// The result of a neural network inference pass.
///
/// This is a list of tensors corresponding to the network's output nodes.
#[derive(Debug)]
pub struct Outputs {
    inner: Vec<Tensor>,
}

impl Outputs {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<Vec<Tensor>> for Outputs {
    fn from(inner: Vec<Tensor>) -> Self {
        Self { inner }
    }
}

impl Index<usize> for Outputs {
    type Output = Tensor;

    fn index(&self, index: usize) -> &Tensor {
        &self.inner[index]
    }
}

/// A neural network that can be used for inference.
pub struct NeuralNetwork {
    model: Model,
}

impl NeuralNetwork {
    /// Loads and optimizes a pre-trained model from an ONNX file path.
    ///
    /// The path must have a `.onnx` extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::from_path_impl(path.as_ref())
    }

    fn from_path_impl(path: &Path) -> anyhow::Result<Self> {
        match path.extension() {
            Some(ext) if ext == "onnx" => {}
            _ => bail!("neural network file must have `.onnx` extension"),
        }

        let model_data = std::fs::read(path)
            .with_context(|| format!("failed to read model from '{}'", path.display()))?;
        Self::from_onnx(&model_data)
    }

    /// Loads and optimizes a pre-trained model from an in-memory ONNX file.
    pub fn from_onnx(mut raw: &[u8]) -> anyhow::Result<Self> {
        let graph = tract_onnx::onnx()
            .model_for_read(&mut raw)?
            .into_optimized()?;
        Ok(Self {
            model: SimplePlan::new(graph)?,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.model.model().inputs.len()
    }

    /// Returns the tensor shape of an input node.
    pub fn input_shape(&self, index: usize) -> anyhow::Result<&[usize]> {
        self.model
            .model()
            .input_fact(index)?
            .shape
            .as_concrete()
            .with_context(|| format!("network input {index} has a symbolic shape"))
    }

    /// Runs the network on a set of inputs (one per input node).
    #[doc(alias = "infer")]
    pub fn estimate(&self, inputs: &[Tensor]) -> anyhow::Result<Outputs> {
        let inputs = inputs
            .iter()
            .map(|t| Ok(TValue::from_const(Arc::new(t.to_tract()?))))
            .collect::<anyhow::Result<TVec<_>>>()?;
        let outputs = self
            .model
            .run(inputs)?
            .iter()
            .map(|tract| Tensor::from_tract(tract))
            .collect::<anyhow::Result<_>>()?;
        Ok(Outputs { inner: outputs })
    }
}

/// Describes in what order a CNN expects its input image data.
///
/// - `N` is the number of images, fixed at 1.
/// - `C` is the number of color channels, 3 for RGB inputs.
/// - `H` and `W` are the height and width of the input, respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CnnInputShape {
    /// Shape is `[N, C, H, W]`.
    NCHW,
    /// Shape is `[N, H, W, C]`.
    NHWC,
}

impl CnnInputShape {
    fn detect(shape: &[usize]) -> anyhow::Result<(Self, Resolution)> {
        let (layout, w, h) = match *shape {
            [1, 3, h, w] => (Self::NCHW, w, h),
            [1, h, w, 3] => (Self::NHWC, w, h),
            _ => bail!("unsupported CNN input shape {shape:?}"),
        };
        Ok((layout, Resolution::new(w.try_into()?, h.try_into()?)))
    }
}

/// A convolutional neural network (CNN) that operates on image data.
pub struct Cnn {
    nn: NeuralNetwork,
    shape: CnnInputShape,
    input_res: Resolution,
}

impl Cnn {
    /// Creates a CNN wrapper from a [`NeuralNetwork`].
    ///
    /// The network must have exactly one input of shape `[1, 3, H, W]` or `[1, H, W, 3]`.
    pub fn new(nn: NeuralNetwork) -> anyhow::Result<Self> {
        if nn.num_inputs() != 1 {
            bail!(
                "CNN network has to take exactly 1 input, this one takes {}",
                nn.num_inputs(),
            );
        }
        let (shape, input_res) = CnnInputShape::detect(nn.input_shape(0)?)?;
        log::debug!("CNN input: {input_res} {shape:?}");

        Ok(Self {
            nn,
            shape,
            input_res,
        })
    }

    /// Returns the expected input image size.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.input_res
    }

    /// Runs the network on the area `roi` of `image`.
    ///
    /// The area is stretched to the network's input size. Parts of `roi` outside of `image` are
    /// treated as black. Color channels are mapped to `[0, 1]`.
    pub fn estimate(&self, image: &Image, roi: Rect) -> anyhow::Result<Outputs> {
        let tensor = self.sample(image, roi);
        self.nn.estimate(&[tensor])
    }

    fn sample(&self, image: &Image, roi: Rect) -> Tensor {
        let (w, h) = (
            self.input_res.width() as usize,
            self.input_res.height() as usize,
        );
        let pixel = |x: usize, y: usize| {
            let [px, py] = roi.transform_out(
                (x as f32 + 0.5) / w as f32,
                (y as f32 + 0.5) / h as f32,
            );
            let (px, py) = (px.floor(), py.floor());
            let color = if px >= 0.0
                && py >= 0.0
                && px < image.width() as f32
                && py < image.height() as f32
            {
                image.get(px as u32, py as u32)
            } else {
                Color::BLACK
            };
            [color.r(), color.g(), color.b()].map(|c| f32::from(c) / 255.0)
        };

        match self.shape {
            CnnInputShape::NCHW => {
                Tensor::from_array_shape_fn([1, 3, h, w], |[_, c, y, x]| pixel(x, y)[c])
            }
            CnnInputShape::NHWC => {
                Tensor::from_array_shape_fn([1, h, w, 3], |[_, y, x, c]| pixel(x, y)[c])
            }
        }
    }
}
