//! The closed set of compute kernels and the static description each one
//! ships with.

use crate::error::{ResourceLimit, Result, VulkanError};

/// Binding slots available to storage buffers (numbered from 1).
pub const MAX_BUFFER_BINDINGS: u32 = 8;
pub const IMAGE_MAX_COUNT: u32 = 4;
pub const SAMPLER_MAX_COUNT: u32 = 4;

pub const BUFFER_BINDING_BASE: u32 = 1;
pub const IMAGE_BINDING_BASE: u32 = BUFFER_BINDING_BASE + MAX_BUFFER_BINDINGS;
pub const SAMPLER_BINDING_BASE: u32 = IMAGE_BINDING_BASE + IMAGE_MAX_COUNT;

/// Bytes at the start of the push-constant block reserved for one `ivec2`
/// size per image and sampler slot. Kernel parameters follow.
pub const PUSH_CONSTANT_PARAM_OFFSET: u32 = 8 * (IMAGE_MAX_COUNT + SAMPLER_MAX_COUNT);

macro_rules! shader_ids {
    ($($name:ident),* $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ShaderId {
            $($name),*
        }

        impl ShaderId {
            pub const ALL: &'static [ShaderId] = &[$(ShaderId::$name),*];
            pub const COUNT: usize = Self::ALL.len();

            pub const fn index(self) -> usize {
                self as usize
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(ShaderId::$name => stringify!($name)),*
                }
            }
        }
    };
}

shader_ids! {
    VectorFillScalar,
    Transpose,
    BlobConvolution,
    BlobConvolutionAdreno,
    BlobConvolution8,
    BlobConvolution8Adreno,
    BlobConvolutionBackward,
    BlobConvolutionBackwardAdreno,
    BlobConvolutionLearnAdd,
    PrepareFilterForConvolutionBackwardAdreno,
    VectorElu,
    VectorEluDiff,
    VectorEluDiffOp,
    VectorRelu,
    VectorRelu4,
    VectorReluDiff,
    VectorLeakyRelu,
    VectorLeakyReluDiff,
    VectorHardSwish,
    VectorHardSwishDiff,
    VectorEltwiseMax,
    VectorEltwiseMin,
    VectorAbs,
    VectorAbsDiff,
    VectorHinge,
    VectorHingeDiff,
    VectorSquaredHinge,
    VectorSquaredHingeDiff,
    VectorHuber,
    VectorHardTanh,
    VectorHardTanhDiff,
    VectorHardSigmoid,
    VectorHardSigmoidDiff,
    VectorHardSigmoidDiffOp,
    VectorExp,
    VectorLog,
    VectorBernoulliKlDerivative,
    VectorFillBernoulli,
    BlobMaxPooling,
    BlobMeanPooling,
    PrepareBlobForConvolution,
    PrepareBlobForConvolutionAdreno,
    PrepareBlobWithPaddingBuffers,
    PrepareBlobWithPaddingAdreno,
    PrepareFilter3x3ForConvolutionAdreno,
    BlobConvolution3x3s1d1,
    BlobConvolution3x3s1d1Adreno,
    MultiplyMatrixByMatrix,
    BatchMultiplyMatrixByMatrixBorders,
    BatchMultiplyMatrixByTransposedMatrix,
    BatchMultiplyMatrixByTransposedMatrixBorders,
    BatchMultiplyTransposedMatrixByMatrix,
    BatchMultiplyTransposedMatrixByMatrixBorders,
    BatchInitAddMultiplyMatrixByTransposedMatrix,
    BatchInitMultiplyMatrixByTransposedMatrixBorders,
    Matrix2InterleavedAdreno,
    MultiplyMatrixInterleavedAdreno,
    MultiplyMatrixInterleavedBordersAdreno,
    MultiplyMatrixByDiagMatrixAdreno,
    MultiplyMatrixByDiagMatrix,
    MultiplyDiagMatrixByMatrixAdreno,
    MultiplyDiagMatrixByMatrix,
    MultiplyDiagMatrixByMatrixAndAdd,
    MultiplySparseMatrixByTransposedMatrix,
    MultiplyTransposedMatrixBySparseMatrix,
    AddVectorToMatrixRowsAdreno,
    SetVectorToMatrixRowsAdreno,
    SetVectorToMatrixRows,
    SumMatrixRows,
    SumMatrixColumns,
    Blob3dConvolution,
    Blob3dConvolutionBackward,
    BlobChannelwiseConvolutionAdreno,
    BlobChannelwiseConvolution,
    BlobChannelwiseConvolution3x3s1,
    BlobChannelwiseConvolution3x3s2,
    VectorAddFloat4,
    VectorAddFloat1,
    VectorAddValue,
    VectorAddInt,
    VectorSub,
    VectorMultiply,
    VectorMultiplyAndAdd,
    VectorMultiplyAndSub,
    VectorEltwiseDivide,
    VectorEltwisePower,
    VectorSqrt,
    VectorInv,
    VectorMinMax,
    VectorSigmoid,
    VectorSigmoidDiff,
    VectorSigmoidDiffOp,
    VectorTanh,
    VectorTanhDiff,
    VectorTanhDiffOp,
    VectorPower,
    VectorPowerDiff,
    VectorPowerDiffOp,
    VectorL1DiffAdd,
    VectorDotProduct,
    VectorEltwiseLogSumExp,
    VectorSum,
    RowMultiplyMatrixByMatrix,
    VectorEqual,
    VectorToImage,
    SetVectorToMatrixElements,
    LookupAndSum,
    Upsampling2DForward,
    Blob3dMaxPoolingNoIndices,
    Blob3dMeanPooling,
    BlobMaxOverTimePoolingNoIndices,
    FindMaxValueInRows,
    FindMaxValueInRowsNoIndices,
    BatchFindMaxValueInColumns,
    BlobGlobalMaxPooling,
    AddMatrixElementsToVector,
    AddMatrixElementsToVectorEx,
    AddVectorToMatrixColumnsInt,
    AddVectorToMatrixColumnsFloatAdreno,
    AddVectorToMatrixColumnsFloat,
    BatchAddVectorToMatrixRows,
    EnumBinarizationFloat,
    EnumBinarizationInt,
    BitSetBinarization,
    BlobResizeImage,
    MatrixLogSumExpByRows,
    MatrixSoftmaxByRows,
    MatrixSoftmaxByColumns,
    BlobSpatialDropout,
    BuildIntegerHist,
    VectorFindMaxValueInSetNoIndices,
    VectorFindMaxValueInSet,
    MatrixSpreadRowsFloat,
    MatrixSpreadRowsFloatAdd,
    MatrixSpreadRowsInt,
    FindMaxValueInColumns,
    FindMaxValueInColumnsNoIndices,
    FindMinValueInColumns,
    BlobGetSubSequence,
    BlobGetSubSequenceNoIndices,
    BlobConvertFromRle,
    BlobSplitByDim,
    BlobMergeByDim,
    VectorMultichannelLookupAndCopyFloat,
    VectorMultichannelCopyFloat,
    VectorMultichannelLookupAndCopyInt,
    VectorMultichannelCopyInt,
    BlobTimeConvolutionPrepare,
    BlobReorgFloat,
    BlobReorgInt,
}

impl std::fmt::Display for ShaderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the cache needs to know about one kernel. Kernel modules define
/// these as constants next to their SPIR-V.
#[derive(Clone, Copy, Debug)]
pub struct ShaderDescriptor {
    pub id: ShaderId,
    pub code: &'static [u32],
    /// Whether the kernel may read its image/sampler slots as real images.
    pub image_eligible: bool,
    /// Size of the kernel's parameter struct in bytes, 0 when it has none.
    pub param_size: u32,
    pub buffer_count: u32,
    pub image_count: u32,
    pub sampler_count: u32,
    pub dimensions: u32,
}

impl ShaderDescriptor {
    pub const fn new(id: ShaderId, code: &'static [u32], dimensions: u32) -> Self {
        Self {
            id,
            code,
            image_eligible: false,
            param_size: 0,
            buffer_count: 0,
            image_count: 0,
            sampler_count: 0,
            dimensions,
        }
    }

    pub const fn with_params(mut self, param_size: u32) -> Self {
        self.param_size = param_size;
        self
    }

    pub const fn with_buffers(mut self, count: u32) -> Self {
        self.buffer_count = count;
        self
    }

    pub const fn with_images(mut self, count: u32) -> Self {
        self.image_count = count;
        self
    }

    pub const fn with_samplers(mut self, count: u32) -> Self {
        self.sampler_count = count;
        self
    }

    pub const fn image_eligible(mut self) -> Self {
        self.image_eligible = true;
        self
    }

    /// SPIR-V size in bytes.
    pub fn code_len(&self) -> usize {
        std::mem::size_of_val(self.code)
    }

    pub fn binding_count(&self) -> u32 {
        self.buffer_count + self.image_count + self.sampler_count
    }

    /// Kernels with parameters or image/sampler slots get a push-constant block.
    pub fn needs_push_constants(&self) -> bool {
        self.param_size > 0 || self.image_count > 0 || self.sampler_count > 0
    }

    pub fn push_constant_size(&self) -> u64 {
        PUSH_CONSTANT_PARAM_OFFSET as u64 + self.param_size as u64
    }

    /// Checks that do not depend on the device.
    pub fn validate(&self) -> Result<()> {
        if self.code.is_empty() {
            return Err(VulkanError::InvalidArgument(format!(
                "shader {} has no code",
                self.id
            )));
        }
        if !(1..=3).contains(&self.dimensions) {
            return Err(VulkanError::InvalidArgument(format!(
                "shader {} declares {} dimensions; expected 1, 2 or 3",
                self.id, self.dimensions
            )));
        }
        let counts = [
            (ResourceLimit::BufferBindings, self.buffer_count, MAX_BUFFER_BINDINGS),
            (ResourceLimit::ImageBindings, self.image_count, IMAGE_MAX_COUNT),
            (ResourceLimit::SamplerBindings, self.sampler_count, SAMPLER_MAX_COUNT),
        ];
        for (resource, requested, limit) in counts {
            if requested > limit {
                return Err(VulkanError::ResourceLimitExceeded {
                    resource,
                    requested: requested as u64,
                    limit: limit as u64,
                });
            }
        }
        Ok(())
    }
}
