//! Shader objects and their pipeline variants.
//!
//! The first request for a [`ShaderId`] builds its module, descriptor-set
//! layout and pipeline layout. Every distinct work-group shape then gets its
//! own pipeline, specialised from that module. Everything lives until the
//! cache is cleared or dropped.

pub mod factory;
pub mod registry;

use crate::bindings::shader_bindings;
use crate::config::{ImageDispatchPolicy, ShaderCacheOptions};
use crate::device::{
    DescriptorSetLayoutHandle, DeviceApi, PipelineHandle, PipelineLayoutHandle,
    ShaderModuleHandle,
};
use crate::error::{ResourceLimit, Result, VulkanError};
use crate::geometry::{optimal_work_group, GridShape, WorkGroup, WORK_GROUP_SIZE};
use crate::metrics::CacheStats;
use crate::scoped::Scoped;
use crate::shaders::{ShaderDescriptor, ShaderId};
use crate::types::{PushConstantRange, ShaderStages};
use registry::PipelineRegistry;
use std::sync::Arc;

/// Native objects shared by every pipeline variant of one shader.
#[derive(Debug)]
pub struct ShaderObject {
    pub module: ShaderModuleHandle,
    pub descriptor_set_layout: DescriptorSetLayoutHandle,
    pub pipeline_layout: PipelineLayoutHandle,
    pub image_based: bool,
    pub pipelines: PipelineRegistry,
}

impl ShaderObject {
    fn build<D: DeviceApi + ?Sized>(
        device: &D,
        desc: &ShaderDescriptor,
        image_based: bool,
    ) -> Result<Self> {
        let module = Scoped::new(device, factory::create_shader_module(device, desc.code)?);

        let bindings = shader_bindings(desc, image_based);
        let set_layout = Scoped::new(
            device,
            factory::create_descriptor_set_layout(device, &bindings)?,
        );

        let push_constants = desc.needs_push_constants().then(|| PushConstantRange {
            stages: ShaderStages::COMPUTE,
            offset: 0,
            size: desc.push_constant_size() as u32,
        });
        let layout = Scoped::new(
            device,
            factory::create_pipeline_layout_single(device, set_layout.get(), push_constants)?,
        );

        Ok(Self {
            pipeline_layout: layout.commit(),
            descriptor_set_layout: set_layout.commit(),
            module: module.commit(),
            image_based,
            pipelines: PipelineRegistry::new(),
        })
    }

    /// Pipelines first, then the layouts, then the module.
    fn destroy<D: DeviceApi + ?Sized>(mut self, device: &D) {
        for (_, pipeline) in self.pipelines.drain() {
            device.destroy_pipeline(pipeline);
        }
        device.destroy_pipeline_layout(self.pipeline_layout);
        device.destroy_descriptor_set_layout(self.descriptor_set_layout);
        device.destroy_shader_module(self.module);
    }
}

/// A pipeline ready to bind, plus the work-group shape it was specialised for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchableShader {
    pub module: ShaderModuleHandle,
    pub descriptor_set_layout: DescriptorSetLayoutHandle,
    pub pipeline_layout: PipelineLayoutHandle,
    pub image_based: bool,
    pub pipeline: PipelineHandle,
    pub group_size: WorkGroup,
}

impl DispatchableShader {
    pub const fn group_size_total(&self) -> u32 {
        WORK_GROUP_SIZE
    }

    /// Work-group counts for `vkCmdDispatch`.
    pub fn dispatch_size(&self, grid: GridShape) -> [u32; 3] {
        self.group_size.dispatch_size(grid)
    }
}

/// Not synchronised: every method takes `&mut self`, so callers sharing a
/// cache across threads wrap it in their own lock.
pub struct ShaderCache<D: DeviceApi + ?Sized> {
    device: Arc<D>,
    options: ShaderCacheOptions,
    shaders: Vec<Option<ShaderObject>>,
    stats: CacheStats,
}

impl<D: DeviceApi + ?Sized> ShaderCache<D> {
    pub fn new(device: Arc<D>) -> Self {
        Self::with_options(device, ShaderCacheOptions::global().clone())
    }

    pub fn with_options(device: Arc<D>, options: ShaderCacheOptions) -> Self {
        let mut shaders = Vec::with_capacity(ShaderId::COUNT);
        shaders.resize_with(ShaderId::COUNT, || None);
        Self {
            device,
            options,
            shaders,
            stats: CacheStats::default(),
        }
    }

    pub fn options(&self) -> &ShaderCacheOptions {
        &self.options
    }

    /// Pipeline and work-group shape for one dispatch of `desc` over `grid`,
    /// building whatever is not cached yet.
    pub fn get_shader_data(
        &mut self,
        desc: &ShaderDescriptor,
        grid: GridShape,
    ) -> Result<DispatchableShader> {
        desc.validate()?;
        let group = optimal_work_group(desc.dimensions, grid)?;
        if self.options.trace_geometry {
            log::debug!(
                "vk_shader_cache: {} dims={} grid={}x{}x{} -> group={}x{}x{}",
                desc.id,
                desc.dimensions,
                grid.width,
                grid.height,
                grid.depth,
                group.x,
                group.y,
                group.z
            );
        }

        let image_based = self.image_based(desc);
        let Self {
            device,
            shaders,
            stats,
            ..
        } = self;
        let device: &D = &**device;

        let slot = &mut shaders[desc.id.index()];
        let object = match slot {
            Some(object) => object,
            None => {
                let _span = tracing::debug_span!("vk_shader_object", shader = desc.id.name())
                    .entered();
                let built = check_device_limits(device, desc)
                    .and_then(|()| ShaderObject::build(device, desc, image_based));
                match built {
                    Ok(object) => {
                        stats.object_builds += 1;
                        log::debug!(
                            "vk_shader_cache: built {} image_based={} bindings={} push={}",
                            desc.id,
                            object.image_based,
                            desc.binding_count(),
                            desc.needs_push_constants()
                        );
                        slot.insert(object)
                    }
                    Err(err) => {
                        stats.failures += 1;
                        log::warn!("vk_shader_cache: failed to build {}: {}", desc.id, err);
                        return Err(err);
                    }
                }
            }
        };

        let pipeline = match object.pipelines.get(&group) {
            Some(pipeline) => {
                stats.pipeline_hits += 1;
                log::trace!(
                    "vk_shader_cache: hit {} group={}x{}x{}",
                    desc.id,
                    group.x,
                    group.y,
                    group.z
                );
                pipeline
            }
            None => {
                let _span = tracing::debug_span!(
                    "vk_pipeline",
                    shader = desc.id.name(),
                    x = group.x,
                    y = group.y,
                    z = group.z
                )
                .entered();
                let pipeline = match factory::create_compute_pipeline(
                    device,
                    object.module,
                    object.pipeline_layout,
                    group,
                ) {
                    Ok(pipeline) => pipeline,
                    Err(err) => {
                        stats.failures += 1;
                        log::warn!(
                            "vk_shader_cache: pipeline for {} group={}x{}x{} failed: {}",
                            desc.id,
                            group.x,
                            group.y,
                            group.z,
                            err
                        );
                        return Err(err);
                    }
                };
                object.pipelines.insert(group, pipeline);
                stats.pipeline_builds += 1;
                log::debug!(
                    "vk_shader_cache: miss {} group={}x{}x{} variants={}",
                    desc.id,
                    group.x,
                    group.y,
                    group.z,
                    object.pipelines.len()
                );
                pipeline
            }
        };

        Ok(DispatchableShader {
            module: object.module,
            descriptor_set_layout: object.descriptor_set_layout,
            pipeline_layout: object.pipeline_layout,
            image_based: object.image_based,
            pipeline,
            group_size: group,
        })
    }

    fn image_based(&self, desc: &ShaderDescriptor) -> bool {
        desc.image_eligible
            && self.options.image_dispatch != ImageDispatchPolicy::Disabled
            && self.device.supports_image_dispatch()
    }

    pub fn contains(&self, id: ShaderId) -> bool {
        self.shaders[id.index()].is_some()
    }

    pub fn shader_object(&self, id: ShaderId) -> Option<&ShaderObject> {
        self.shaders[id.index()].as_ref()
    }

    pub fn pipeline_count(&self, id: ShaderId) -> usize {
        self.shaders[id.index()]
            .as_ref()
            .map_or(0, |object| object.pipelines.len())
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Destroys every shader object built so far. The cache stays usable and
    /// rebuilds on demand.
    pub fn clear(&mut self) {
        let device = self.device.as_ref();
        let mut destroyed = 0usize;
        for slot in self.shaders.iter_mut() {
            if let Some(object) = slot.take() {
                object.destroy(device);
                destroyed += 1;
            }
        }
        if destroyed > 0 {
            log::debug!("vk_shader_cache: destroyed {} shader objects", destroyed);
        }
    }
}

impl<D: DeviceApi + ?Sized> Drop for ShaderCache<D> {
    fn drop(&mut self) {
        self.clear();
    }
}

fn check_device_limits<D: DeviceApi + ?Sized>(device: &D, desc: &ShaderDescriptor) -> Result<()> {
    let limits = device.limits();
    if desc.needs_push_constants()
        && desc.push_constant_size() > limits.max_push_constants_size as u64
    {
        return Err(VulkanError::ResourceLimitExceeded {
            resource: ResourceLimit::PushConstantBytes,
            requested: desc.push_constant_size(),
            limit: limits.max_push_constants_size as u64,
        });
    }
    if desc.binding_count() > limits.max_per_stage_bindings {
        return Err(VulkanError::ResourceLimitExceeded {
            resource: ResourceLimit::StageBindings,
            requested: desc.binding_count() as u64,
            limit: limits.max_per_stage_bindings as u64,
        });
    }
    Ok(())
}
