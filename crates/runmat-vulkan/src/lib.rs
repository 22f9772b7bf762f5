//! RunMat Vulkan: resource plumbing for the Vulkan compute backend.
//!
//! - [`MemoryAllocator`] creates storage and staging buffers bound to their own
//!   device memory, all or nothing.
//! - [`ShaderCache`] turns a [`ShaderDescriptor`] and a grid shape into a
//!   ready-to-dispatch pipeline, caching shader objects per kernel and
//!   pipeline variants per work-group shape.
//!
//! Both sit on top of a [`DeviceApi`] implementation owned by the backend.

pub mod bindings;
pub mod cache;
pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod metrics;
pub mod scoped;
pub mod shaders;
pub mod types;

pub use cache::{DispatchableShader, ShaderCache, ShaderObject};
pub use config::{ImageDispatchPolicy, ShaderCacheOptions};
pub use device::{
    BufferHandle, ComputePipelineDesc, DescriptorSetLayoutHandle, DeviceApi, MemoryHandle,
    PipelineHandle, PipelineLayoutHandle, ShaderModuleHandle,
};
pub use error::{NativeStep, ResourceLimit, Result, VulkanError};
pub use geometry::{optimal_work_group, GridShape, WorkGroup, MAX_GROUP_DEPTH, WORK_GROUP_SIZE};
pub use memory::{find_memory_type, MemoryAllocator, MemoryBlock};
pub use metrics::CacheStats;
pub use shaders::{ShaderDescriptor, ShaderId};
pub use types::{
    BufferDesc, BufferUsage, DescriptorBinding, DescriptorType, DeviceLimits, MemoryProperties,
    MemoryRequirements, MemoryType, NativeResult, PushConstantRange, ShaderStages,
    SpecializationInfo, SpecializationMapEntry,
};
