//! The native device seen by this crate.
//!
//! Instance/device selection lives elsewhere; whatever owns the real
//! `VkDevice` implements [`DeviceApi`] and hands an `Arc` of it to the
//! allocator and the shader cache.

use crate::types::{
    BufferDesc, DescriptorBinding, DeviceLimits, MemoryRequirements, MemoryType, NativeResult,
    PushConstantRange, SpecializationInfo,
};
use std::fmt;

macro_rules! native_handle {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash)]
            #[repr(transparent)]
            pub struct $name(u64);

            impl $name {
                pub const fn from_raw(raw: u64) -> Self {
                    Self(raw)
                }

                pub const fn as_raw(self) -> u64 {
                    self.0
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({:#x})", stringify!($name), self.0)
                }
            }
        )*
    };
}

native_handle!(
    BufferHandle,
    MemoryHandle,
    ShaderModuleHandle,
    DescriptorSetLayoutHandle,
    PipelineLayoutHandle,
    PipelineHandle,
);

pub struct ComputePipelineDesc<'a> {
    pub module: ShaderModuleHandle,
    pub entry_point: &'a str,
    pub layout: PipelineLayoutHandle,
    pub specialization: SpecializationInfo<'a>,
}

/// Capability and factory surface of one logical device.
///
/// Create calls either hand back a fresh handle or the native status code;
/// destroy calls never fail. Callers guarantee a handle is destroyed at most
/// once and only after every object created from it is gone.
pub trait DeviceApi {
    fn memory_types(&self) -> &[MemoryType];
    fn limits(&self) -> &DeviceLimits;
    /// Whether image-backed bindings can be used for compute dispatch.
    fn supports_image_dispatch(&self) -> bool;

    fn create_buffer(&self, desc: &BufferDesc) -> Result<BufferHandle, NativeResult>;
    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> MemoryRequirements;
    fn destroy_buffer(&self, buffer: BufferHandle);

    fn allocate_memory(
        &self,
        size: u64,
        memory_type_index: u32,
    ) -> Result<MemoryHandle, NativeResult>;
    fn free_memory(&self, memory: MemoryHandle);
    fn bind_buffer_memory(
        &self,
        buffer: BufferHandle,
        memory: MemoryHandle,
        offset: u64,
    ) -> Result<(), NativeResult>;

    /// `code` is SPIR-V; its byte size is `4 * code.len()`.
    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleHandle, NativeResult>;
    fn destroy_shader_module(&self, module: ShaderModuleHandle);

    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorBinding],
    ) -> Result<DescriptorSetLayoutHandle, NativeResult>;
    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle);

    fn create_pipeline_layout(
        &self,
        set_layouts: &[DescriptorSetLayoutHandle],
        push_constants: Option<PushConstantRange>,
    ) -> Result<PipelineLayoutHandle, NativeResult>;
    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle);

    fn create_compute_pipeline(
        &self,
        desc: &ComputePipelineDesc<'_>,
    ) -> Result<PipelineHandle, NativeResult>;
    fn destroy_pipeline(&self, pipeline: PipelineHandle);
}
