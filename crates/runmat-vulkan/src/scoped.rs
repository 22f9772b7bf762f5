//! Drop guards for native handles created during a multi-step build.
//!
//! A build keeps each freshly created handle in a [`Scoped`] until every step
//! has succeeded, then `commit`s them into the long-lived owner. Any early
//! return drops the guards, and locals drop in reverse declaration order, so
//! later objects are released before the ones they were created from.

use crate::device::{
    BufferHandle, DescriptorSetLayoutHandle, DeviceApi, MemoryHandle, PipelineHandle,
    PipelineLayoutHandle, ShaderModuleHandle,
};

pub trait DeviceObject: Copy + std::fmt::Debug {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D);
}

impl DeviceObject for BufferHandle {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D) {
        device.destroy_buffer(self);
    }
}

impl DeviceObject for MemoryHandle {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D) {
        device.free_memory(self);
    }
}

impl DeviceObject for ShaderModuleHandle {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D) {
        device.destroy_shader_module(self);
    }
}

impl DeviceObject for DescriptorSetLayoutHandle {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D) {
        device.destroy_descriptor_set_layout(self);
    }
}

impl DeviceObject for PipelineLayoutHandle {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D) {
        device.destroy_pipeline_layout(self);
    }
}

impl DeviceObject for PipelineHandle {
    fn destroy<D: DeviceApi + ?Sized>(self, device: &D) {
        device.destroy_pipeline(self);
    }
}

pub struct Scoped<'d, D: DeviceApi + ?Sized, H: DeviceObject> {
    device: &'d D,
    handle: Option<H>,
}

impl<'d, D: DeviceApi + ?Sized, H: DeviceObject> Scoped<'d, D, H> {
    pub fn new(device: &'d D, handle: H) -> Self {
        Self {
            device,
            handle: Some(handle),
        }
    }

    pub fn get(&self) -> H {
        // Only `commit` clears the handle, and it consumes the guard.
        match self.handle {
            Some(handle) => handle,
            None => unreachable!("scoped handle read after commit"),
        }
    }

    /// Hands ownership to the caller; the handle is no longer released on drop.
    pub fn commit(mut self) -> H {
        let handle = self.get();
        self.handle = None;
        handle
    }
}

impl<D: DeviceApi + ?Sized, H: DeviceObject> Drop for Scoped<'_, D, H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::trace!("scoped: rollback {:?}", handle);
            handle.destroy(self.device);
        }
    }
}
