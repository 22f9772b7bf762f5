use crate::types::{MemoryProperties, NativeResult};
use std::fmt;
use thiserror::Error;

/// The native call that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeStep {
    CreateBuffer,
    AllocateMemory,
    BindBufferMemory,
    CreateShaderModule,
    CreateDescriptorSetLayout,
    CreatePipelineLayout,
    CreateComputePipeline,
}

impl NativeStep {
    pub fn as_str(self) -> &'static str {
        match self {
            NativeStep::CreateBuffer => "vkCreateBuffer",
            NativeStep::AllocateMemory => "vkAllocateMemory",
            NativeStep::BindBufferMemory => "vkBindBufferMemory",
            NativeStep::CreateShaderModule => "vkCreateShaderModule",
            NativeStep::CreateDescriptorSetLayout => "vkCreateDescriptorSetLayout",
            NativeStep::CreatePipelineLayout => "vkCreatePipelineLayout",
            NativeStep::CreateComputePipeline => "vkCreateComputePipelines",
        }
    }
}

impl fmt::Display for NativeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceLimit {
    PushConstantBytes,
    BufferBindings,
    ImageBindings,
    SamplerBindings,
    StageBindings,
}

impl fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceLimit::PushConstantBytes => "push constant bytes",
            ResourceLimit::BufferBindings => "buffer bindings",
            ResourceLimit::ImageBindings => "image bindings",
            ResourceLimit::SamplerBindings => "sampler bindings",
            ResourceLimit::StageBindings => "per-stage bindings",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VulkanError {
    #[error("{step} failed with {code}")]
    NativeCallFailed { step: NativeStep, code: NativeResult },
    #[error(
        "no memory type matches type bits {type_bits:#b} with required properties {required:?}"
    )]
    NoCompatibleMemoryType {
        type_bits: u32,
        required: MemoryProperties,
    },
    #[error("{resource} requested {requested}, device limit is {limit}")]
    ResourceLimitExceeded {
        resource: ResourceLimit,
        requested: u64,
        limit: u64,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl VulkanError {
    pub(crate) fn native(step: NativeStep) -> impl FnOnce(NativeResult) -> VulkanError {
        move |code| VulkanError::NativeCallFailed { step, code }
    }
}

pub type Result<T> = std::result::Result<T, VulkanError>;
