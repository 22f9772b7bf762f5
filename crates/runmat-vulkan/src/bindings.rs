use crate::shaders::{
    ShaderDescriptor, BUFFER_BINDING_BASE, IMAGE_BINDING_BASE, IMAGE_MAX_COUNT,
    MAX_BUFFER_BINDINGS, SAMPLER_BINDING_BASE, SAMPLER_MAX_COUNT,
};
use crate::types::{DescriptorBinding, DescriptorType, ShaderStages};
use smallvec::SmallVec;

pub const MAX_SHADER_BINDINGS: usize =
    (MAX_BUFFER_BINDINGS + IMAGE_MAX_COUNT + SAMPLER_MAX_COUNT) as usize;

pub type BindingList = SmallVec<[DescriptorBinding; MAX_SHADER_BINDINGS]>;

fn compute_entry(binding: u32, descriptor_type: DescriptorType) -> DescriptorBinding {
    DescriptorBinding {
        binding,
        descriptor_type,
        count: 1,
        stages: ShaderStages::COMPUTE,
    }
}

pub fn storage_buffer_entry(binding: u32) -> DescriptorBinding {
    compute_entry(binding, DescriptorType::StorageBuffer)
}

/// Image slot: a storage image when image-backed, otherwise a plain buffer.
pub fn image_entry(binding: u32, image_based: bool) -> DescriptorBinding {
    if image_based {
        compute_entry(binding, DescriptorType::StorageImage)
    } else {
        storage_buffer_entry(binding)
    }
}

/// Sampler slot: a combined image sampler when image-backed, otherwise a plain buffer.
pub fn sampler_entry(binding: u32, image_based: bool) -> DescriptorBinding {
    if image_based {
        compute_entry(binding, DescriptorType::CombinedImageSampler)
    } else {
        storage_buffer_entry(binding)
    }
}

/// Buffers first, then images, then samplers.
pub fn shader_bindings(desc: &ShaderDescriptor, image_based: bool) -> BindingList {
    let mut entries = BindingList::new();
    for i in 0..desc.buffer_count {
        entries.push(storage_buffer_entry(BUFFER_BINDING_BASE + i));
    }
    for i in 0..desc.image_count {
        entries.push(image_entry(IMAGE_BINDING_BASE + i, image_based));
    }
    for i in 0..desc.sampler_count {
        entries.push(sampler_entry(SAMPLER_BINDING_BASE + i, image_based));
    }
    entries
}
