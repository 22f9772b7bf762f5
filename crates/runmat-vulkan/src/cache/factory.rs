use crate::device::{
    ComputePipelineDesc, DescriptorSetLayoutHandle, DeviceApi, PipelineHandle,
    PipelineLayoutHandle, ShaderModuleHandle,
};
use crate::error::{NativeStep, Result, VulkanError};
use crate::geometry::WorkGroup;
use crate::types::{DescriptorBinding, PushConstantRange, SpecializationInfo, SpecializationMapEntry};

pub const ENTRY_POINT: &str = "main";

/// Constant ids 0, 1 and 2 carry the work-group x, y and z.
pub const WORK_GROUP_SPECIALIZATION: [SpecializationMapEntry; 3] = [
    SpecializationMapEntry {
        constant_id: 0,
        offset: 0,
        size: std::mem::size_of::<u32>(),
    },
    SpecializationMapEntry {
        constant_id: 1,
        offset: 4,
        size: std::mem::size_of::<u32>(),
    },
    SpecializationMapEntry {
        constant_id: 2,
        offset: 8,
        size: std::mem::size_of::<u32>(),
    },
];

pub fn create_shader_module<D: DeviceApi + ?Sized>(
    device: &D,
    code: &[u32],
) -> Result<ShaderModuleHandle> {
    device
        .create_shader_module(code)
        .map_err(VulkanError::native(NativeStep::CreateShaderModule))
}

pub fn create_descriptor_set_layout<D: DeviceApi + ?Sized>(
    device: &D,
    bindings: &[DescriptorBinding],
) -> Result<DescriptorSetLayoutHandle> {
    device
        .create_descriptor_set_layout(bindings)
        .map_err(VulkanError::native(NativeStep::CreateDescriptorSetLayout))
}

pub fn create_pipeline_layout_single<D: DeviceApi + ?Sized>(
    device: &D,
    set_layout: DescriptorSetLayoutHandle,
    push_constants: Option<PushConstantRange>,
) -> Result<PipelineLayoutHandle> {
    device
        .create_pipeline_layout(&[set_layout], push_constants)
        .map_err(VulkanError::native(NativeStep::CreatePipelineLayout))
}

/// Compute pipeline with the work-group shape baked in as specialization constants.
pub fn create_compute_pipeline<D: DeviceApi + ?Sized>(
    device: &D,
    module: ShaderModuleHandle,
    layout: PipelineLayoutHandle,
    group: WorkGroup,
) -> Result<PipelineHandle> {
    let data = group.as_array();
    let desc = ComputePipelineDesc {
        module,
        entry_point: ENTRY_POINT,
        layout,
        specialization: SpecializationInfo {
            entries: &WORK_GROUP_SPECIALIZATION,
            data: bytemuck::cast_slice(&data),
        },
    };
    device
        .create_compute_pipeline(&desc)
        .map_err(VulkanError::native(NativeStep::CreateComputePipeline))
}
