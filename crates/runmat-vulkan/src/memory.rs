use crate::device::{BufferHandle, DeviceApi, MemoryHandle};
use crate::error::{NativeStep, Result, VulkanError};
use crate::scoped::Scoped;
use crate::types::{BufferDesc, BufferUsage, MemoryProperties, MemoryType};
use std::fmt;
use std::sync::Arc;

/// Index of the first memory type allowed by `type_bits` whose flags include
/// all of `required`. First match wins, so table order is the preference.
pub fn find_memory_type(
    types: &[MemoryType],
    type_bits: u32,
    required: MemoryProperties,
) -> Option<u32> {
    types
        .iter()
        .enumerate()
        .take(u32::BITS as usize)
        .find(|(index, ty)| type_bits & (1u32 << index) != 0 && ty.property_flags.contains(required))
        .map(|(index, _)| index as u32)
}

/// Creates buffers bound to freshly allocated device memory. Holds no registry
/// of the blocks it hands out.
pub struct MemoryAllocator<D: DeviceApi + ?Sized> {
    device: Arc<D>,
}

impl<D: DeviceApi + ?Sized> Clone for MemoryAllocator<D> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
        }
    }
}

impl<D: DeviceApi + ?Sized> MemoryAllocator<D> {
    pub fn new(device: Arc<D>) -> Self {
        Self { device }
    }

    /// Buffer + memory + bind, all or nothing. Nothing created by a failed call
    /// survives it.
    pub fn allocate(
        &self,
        size: u64,
        usage: BufferUsage,
        required: MemoryProperties,
    ) -> Result<MemoryBlock<D>> {
        if size == 0 {
            return Err(VulkanError::InvalidArgument(
                "device memory block size must be non-zero".to_string(),
            ));
        }
        let device = self.device.as_ref();

        let buffer = device
            .create_buffer(&BufferDesc { size, usage })
            .map_err(VulkanError::native(NativeStep::CreateBuffer))?;
        let buffer = Scoped::new(device, buffer);

        let requirements = device.buffer_memory_requirements(buffer.get());
        let memory_types = device.memory_types();
        let type_index =
            match find_memory_type(memory_types, requirements.memory_type_bits, required) {
                Some(index) => index,
                None => {
                    log::warn!(
                        "vk_memory: no memory type for bits={:#b} required={:?} size={}",
                        requirements.memory_type_bits,
                        required,
                        size
                    );
                    return Err(VulkanError::NoCompatibleMemoryType {
                        type_bits: requirements.memory_type_bits,
                        required,
                    });
                }
            };

        let memory = device
            .allocate_memory(requirements.size, type_index)
            .map_err(VulkanError::native(NativeStep::AllocateMemory))?;
        let memory = Scoped::new(device, memory);

        device
            .bind_buffer_memory(buffer.get(), memory.get(), 0)
            .map_err(VulkanError::native(NativeStep::BindBufferMemory))?;

        let memory = memory.commit();
        let buffer = buffer.commit();
        let properties = memory_types[type_index as usize].property_flags;
        log::debug!(
            "vk_memory: allocated size={} alloc={} type={} props={:?}",
            size,
            requirements.size,
            type_index,
            properties
        );
        Ok(MemoryBlock {
            device: Arc::clone(&self.device),
            buffer: Some(buffer),
            memory: Some(memory),
            size,
            allocation_size: requirements.size,
            usage,
            requested_properties: required,
            properties,
            memory_type_index: type_index,
        })
    }

    /// Storage buffer in device-local memory, the layout used for tensor data.
    pub fn allocate_device_local(&self, size: u64) -> Result<MemoryBlock<D>> {
        self.allocate(
            size,
            BufferUsage::STORAGE_BUFFER | BufferUsage::TRANSFER_SRC | BufferUsage::TRANSFER_DST,
            MemoryProperties::DEVICE_LOCAL,
        )
    }

    /// Host-visible, coherent transfer buffer for uploads and downloads.
    pub fn allocate_staging(&self, size: u64) -> Result<MemoryBlock<D>> {
        self.allocate(
            size,
            BufferUsage::TRANSFER_SRC | BufferUsage::TRANSFER_DST,
            MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT,
        )
    }
}

/// One buffer bound at offset 0 to its own memory allocation.
pub struct MemoryBlock<D: DeviceApi + ?Sized> {
    device: Arc<D>,
    buffer: Option<BufferHandle>,
    memory: Option<MemoryHandle>,
    size: u64,
    allocation_size: u64,
    usage: BufferUsage,
    requested_properties: MemoryProperties,
    properties: MemoryProperties,
    memory_type_index: u32,
}

impl<D: DeviceApi + ?Sized> MemoryBlock<D> {
    /// `None` once the block has been released.
    pub fn buffer(&self) -> Option<BufferHandle> {
        self.buffer
    }

    pub fn memory(&self) -> Option<MemoryHandle> {
        self.memory
    }

    /// Size the caller asked for.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Size of the backing allocation, as reported by the buffer's requirements.
    pub fn allocation_size(&self) -> u64 {
        self.allocation_size
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Full property flags of the memory type that was selected.
    pub fn properties(&self) -> MemoryProperties {
        self.properties
    }

    pub fn requested_properties(&self) -> MemoryProperties {
        self.requested_properties
    }

    pub fn memory_type_index(&self) -> u32 {
        self.memory_type_index
    }

    pub fn is_host_visible(&self) -> bool {
        self.properties.contains(MemoryProperties::HOST_VISIBLE)
    }

    pub fn is_released(&self) -> bool {
        self.buffer.is_none() && self.memory.is_none()
    }

    /// Destroys the buffer, then frees its memory. Calling it again is a no-op.
    pub fn release(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.device.destroy_buffer(buffer);
        }
        if let Some(memory) = self.memory.take() {
            self.device.free_memory(memory);
            log::trace!("vk_memory: released size={}", self.size);
        }
    }
}

impl<D: DeviceApi + ?Sized> Drop for MemoryBlock<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: DeviceApi + ?Sized> fmt::Debug for MemoryBlock<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("buffer", &self.buffer)
            .field("memory", &self.memory)
            .field("size", &self.size)
            .field("allocation_size", &self.allocation_size)
            .field("usage", &self.usage)
            .field("properties", &self.properties)
            .field("memory_type_index", &self.memory_type_index)
            .finish()
    }
}
