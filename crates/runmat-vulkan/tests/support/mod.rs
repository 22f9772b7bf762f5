#![allow(dead_code)]

use runmat_vulkan::{
    BufferDesc, BufferHandle, ComputePipelineDesc, DescriptorBinding, DescriptorSetLayoutHandle,
    DeviceApi, DeviceLimits, MemoryHandle, MemoryProperties, MemoryRequirements, MemoryType,
    NativeResult, NativeStep, PipelineHandle, PipelineLayoutHandle, PushConstantRange,
    ShaderModuleHandle, SpecializationMapEntry,
};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Buffer,
    Memory,
    ShaderModule,
    DescriptorSetLayout,
    PipelineLayout,
    Pipeline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Create(Kind, u64),
    Destroy(Kind, u64),
}

#[derive(Clone, Debug)]
pub struct PipelineRecord {
    pub handle: u64,
    pub module: u64,
    pub layout: u64,
    pub entry_point: String,
    pub entries: Vec<SpecializationMapEntry>,
    pub data: Vec<u8>,
}

impl PipelineRecord {
    /// Specialization payload read back as the three work-group dimensions.
    pub fn work_group(&self) -> [u32; 3] {
        let mut out = [0u32; 3];
        for (i, chunk) in self.data.chunks_exact(4).take(3).enumerate() {
            out[i] = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        out
    }
}

#[derive(Default)]
struct State {
    next: u64,
    live: HashMap<u64, Kind>,
    events: Vec<Event>,
    bad_destroys: Vec<(Kind, u64)>,
    calls: HashMap<NativeStep, usize>,
    failures: HashMap<NativeStep, (usize, NativeResult)>,
    buffer_sizes: HashMap<u64, u64>,
    memory_types: HashMap<u64, u32>,
    memory_sizes: HashMap<u64, u64>,
    bindings: HashMap<u64, (u64, u64)>,
    set_layouts: HashMap<u64, Vec<DescriptorBinding>>,
    pipeline_layouts: HashMap<u64, Option<PushConstantRange>>,
    pipelines: Vec<PipelineRecord>,
    module_sizes: Vec<usize>,
}

/// Device double that hands out unique handles and records every create and
/// destroy in order.
pub struct RecordingDevice {
    memory_types: Vec<MemoryType>,
    memory_type_bits: u32,
    alignment: u64,
    limits: DeviceLimits,
    image_dispatch: bool,
    state: Mutex<State>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            memory_types: vec![
                MemoryType::new(MemoryProperties::DEVICE_LOCAL, 0),
                MemoryType::new(
                    MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT,
                    1,
                ),
                MemoryType::new(
                    MemoryProperties::HOST_VISIBLE
                        | MemoryProperties::HOST_COHERENT
                        | MemoryProperties::HOST_CACHED,
                    1,
                ),
            ],
            memory_type_bits: 0b111,
            alignment: 256,
            limits: DeviceLimits::default(),
            image_dispatch: false,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_memory_types(mut self, types: Vec<MemoryType>) -> Self {
        self.memory_types = types;
        self
    }

    pub fn with_memory_type_bits(mut self, bits: u32) -> Self {
        self.memory_type_bits = bits;
        self
    }

    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_image_dispatch(mut self, enabled: bool) -> Self {
        self.image_dispatch = enabled;
        self
    }

    /// Makes the `nth` call (1-based) to `step` fail.
    pub fn fail_at(self, step: NativeStep, nth: usize) -> Self {
        self.fail_at_with(step, nth, NativeResult::ERROR_OUT_OF_DEVICE_MEMORY)
    }

    pub fn fail_at_with(self, step: NativeStep, nth: usize, code: NativeResult) -> Self {
        self.state.lock().unwrap().failures.insert(step, (nth, code));
        self
    }

    pub fn calls(&self, step: NativeStep) -> usize {
        self.state.lock().unwrap().calls.get(&step).copied().unwrap_or(0)
    }

    pub fn create_count(&self, kind: Kind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Create(k, _) if *k == kind))
            .count()
    }

    pub fn destroy_count(&self, kind: Kind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Destroy(k, _) if *k == kind))
            .count()
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    /// Destroys of handles that were not alive (double destroy or wrong kind).
    pub fn bad_destroys(&self) -> Vec<(Kind, u64)> {
        self.state.lock().unwrap().bad_destroys.clone()
    }

    /// Every handle created so far was destroyed exactly once.
    pub fn assert_balanced(&self) {
        assert!(self.bad_destroys().is_empty(), "bad destroys: {:?}", self.bad_destroys());
        assert_eq!(self.live_count(), 0, "leaked handles");
        for kind in [
            Kind::Buffer,
            Kind::Memory,
            Kind::ShaderModule,
            Kind::DescriptorSetLayout,
            Kind::PipelineLayout,
            Kind::Pipeline,
        ] {
            assert_eq!(self.create_count(kind), self.destroy_count(kind), "{kind:?}");
        }
    }

    pub fn memory_type_of(&self, memory: MemoryHandle) -> Option<u32> {
        self.state.lock().unwrap().memory_types.get(&memory.as_raw()).copied()
    }

    pub fn memory_size_of(&self, memory: MemoryHandle) -> Option<u64> {
        self.state.lock().unwrap().memory_sizes.get(&memory.as_raw()).copied()
    }

    /// Memory and offset a buffer was bound to.
    pub fn binding_of(&self, buffer: BufferHandle) -> Option<(u64, u64)> {
        self.state.lock().unwrap().bindings.get(&buffer.as_raw()).copied()
    }

    pub fn set_layout(&self, layout: DescriptorSetLayoutHandle) -> Vec<DescriptorBinding> {
        self.state
            .lock()
            .unwrap()
            .set_layouts
            .get(&layout.as_raw())
            .cloned()
            .unwrap_or_default()
    }

    pub fn push_constants(&self, layout: PipelineLayoutHandle) -> Option<PushConstantRange> {
        self.state
            .lock()
            .unwrap()
            .pipeline_layouts
            .get(&layout.as_raw())
            .copied()
            .flatten()
    }

    pub fn pipeline(&self, pipeline: PipelineHandle) -> Option<PipelineRecord> {
        self.state
            .lock()
            .unwrap()
            .pipelines
            .iter()
            .find(|p| p.handle == pipeline.as_raw())
            .cloned()
    }

    pub fn module_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().module_sizes.clone()
    }

    fn call(&self, state: &mut State, step: NativeStep) -> Result<(), NativeResult> {
        let count = state.calls.entry(step).or_insert(0);
        *count += 1;
        match state.failures.get(&step) {
            Some(&(nth, code)) if nth == *count => Err(code),
            _ => Ok(()),
        }
    }

    fn create(&self, step: NativeStep, kind: Kind) -> Result<u64, NativeResult> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, step)?;
        state.next += 1;
        let raw = 0x1000 + state.next;
        state.live.insert(raw, kind);
        state.events.push(Event::Create(kind, raw));
        Ok(raw)
    }

    fn destroy(&self, kind: Kind, raw: u64) {
        let mut state = self.state.lock().unwrap();
        match state.live.remove(&raw) {
            Some(live_kind) if live_kind == kind => state.events.push(Event::Destroy(kind, raw)),
            _ => state.bad_destroys.push((kind, raw)),
        }
    }
}

impl DeviceApi for RecordingDevice {
    fn memory_types(&self) -> &[MemoryType] {
        &self.memory_types
    }

    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn supports_image_dispatch(&self) -> bool {
        self.image_dispatch
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<BufferHandle, NativeResult> {
        let raw = self.create(NativeStep::CreateBuffer, Kind::Buffer)?;
        self.state.lock().unwrap().buffer_sizes.insert(raw, desc.size);
        Ok(BufferHandle::from_raw(raw))
    }

    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> MemoryRequirements {
        let size = self
            .state
            .lock()
            .unwrap()
            .buffer_sizes
            .get(&buffer.as_raw())
            .copied()
            .unwrap_or(0);
        MemoryRequirements {
            size: size.div_ceil(self.alignment) * self.alignment,
            alignment: self.alignment,
            memory_type_bits: self.memory_type_bits,
        }
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        self.destroy(Kind::Buffer, buffer.as_raw());
    }

    fn allocate_memory(
        &self,
        size: u64,
        memory_type_index: u32,
    ) -> Result<MemoryHandle, NativeResult> {
        let raw = self.create(NativeStep::AllocateMemory, Kind::Memory)?;
        let mut state = self.state.lock().unwrap();
        state.memory_types.insert(raw, memory_type_index);
        state.memory_sizes.insert(raw, size);
        Ok(MemoryHandle::from_raw(raw))
    }

    fn free_memory(&self, memory: MemoryHandle) {
        self.destroy(Kind::Memory, memory.as_raw());
    }

    fn bind_buffer_memory(
        &self,
        buffer: BufferHandle,
        memory: MemoryHandle,
        offset: u64,
    ) -> Result<(), NativeResult> {
        let mut state = self.state.lock().unwrap();
        self.call(&mut state, NativeStep::BindBufferMemory)?;
        state
            .bindings
            .insert(buffer.as_raw(), (memory.as_raw(), offset));
        Ok(())
    }

    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleHandle, NativeResult> {
        let raw = self.create(NativeStep::CreateShaderModule, Kind::ShaderModule)?;
        self.state
            .lock()
            .unwrap()
            .module_sizes
            .push(std::mem::size_of_val(code));
        Ok(ShaderModuleHandle::from_raw(raw))
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        self.destroy(Kind::ShaderModule, module.as_raw());
    }

    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorBinding],
    ) -> Result<DescriptorSetLayoutHandle, NativeResult> {
        let raw = self.create(NativeStep::CreateDescriptorSetLayout, Kind::DescriptorSetLayout)?;
        self.state
            .lock()
            .unwrap()
            .set_layouts
            .insert(raw, bindings.to_vec());
        Ok(DescriptorSetLayoutHandle::from_raw(raw))
    }

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle) {
        self.destroy(Kind::DescriptorSetLayout, layout.as_raw());
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[DescriptorSetLayoutHandle],
        push_constants: Option<PushConstantRange>,
    ) -> Result<PipelineLayoutHandle, NativeResult> {
        assert_eq!(set_layouts.len(), 1, "one descriptor set per shader");
        let raw = self.create(NativeStep::CreatePipelineLayout, Kind::PipelineLayout)?;
        self.state
            .lock()
            .unwrap()
            .pipeline_layouts
            .insert(raw, push_constants);
        Ok(PipelineLayoutHandle::from_raw(raw))
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        self.destroy(Kind::PipelineLayout, layout.as_raw());
    }

    fn create_compute_pipeline(
        &self,
        desc: &ComputePipelineDesc<'_>,
    ) -> Result<PipelineHandle, NativeResult> {
        let raw = self.create(NativeStep::CreateComputePipeline, Kind::Pipeline)?;
        self.state.lock().unwrap().pipelines.push(PipelineRecord {
            handle: raw,
            module: desc.module.as_raw(),
            layout: desc.layout.as_raw(),
            entry_point: desc.entry_point.to_string(),
            entries: desc.specialization.entries.to_vec(),
            data: desc.specialization.data.to_vec(),
        });
        Ok(PipelineHandle::from_raw(raw))
    }

    fn destroy_pipeline(&self, pipeline: PipelineHandle) {
        self.destroy(Kind::Pipeline, pipeline.as_raw());
    }
}
