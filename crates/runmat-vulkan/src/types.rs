use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* const $flag:ident = $value:expr; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            bits: u32,
        }

        impl $name {
            $( $(#[$fmeta])* pub const $flag: Self = Self { bits: $value }; )*

            const NAMED: &'static [(&'static str, u32)] = &[$((stringify!($flag), $value)),*];

            pub const fn empty() -> Self {
                Self { bits: 0 }
            }

            pub const fn from_bits(bits: u32) -> Self {
                Self { bits }
            }

            pub const fn bits(self) -> u32 {
                self.bits
            }

            pub const fn is_empty(self) -> bool {
                self.bits == 0
            }

            /// True when every flag in `other` is also set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.bits & other.bits == other.bits
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self { bits: self.bits | rhs.bits }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.bits == 0 {
                    return write!(f, "{}(empty)", stringify!($name));
                }
                let mut known = 0u32;
                let mut names = Vec::new();
                for (name, bits) in Self::NAMED {
                    if self.bits & bits == *bits {
                        names.push(*name);
                        known |= bits;
                    }
                }
                let unknown = self.bits & !known;
                write!(f, "{}({}", stringify!($name), names.join(" | "))?;
                if unknown != 0 {
                    if !names.is_empty() {
                        write!(f, " | ")?;
                    }
                    write!(f, "{unknown:#x}")?;
                }
                write!(f, ")")
            }
        }
    };
}

flag_set! {
    /// How a buffer will be bound. Bit values follow `VkBufferUsageFlagBits`.
    pub struct BufferUsage {
        const TRANSFER_SRC = 0x0000_0001;
        const TRANSFER_DST = 0x0000_0002;
        const UNIFORM_TEXEL_BUFFER = 0x0000_0004;
        const STORAGE_TEXEL_BUFFER = 0x0000_0008;
        const UNIFORM_BUFFER = 0x0000_0010;
        const STORAGE_BUFFER = 0x0000_0020;
    }
}

flag_set! {
    /// Memory type capabilities. Bit values follow `VkMemoryPropertyFlagBits`.
    pub struct MemoryProperties {
        const DEVICE_LOCAL = 0x0000_0001;
        const HOST_VISIBLE = 0x0000_0002;
        const HOST_COHERENT = 0x0000_0004;
        const HOST_CACHED = 0x0000_0008;
        const LAZILY_ALLOCATED = 0x0000_0010;
    }
}

flag_set! {
    pub struct ShaderStages {
        const COMPUTE = 0x0000_0020;
    }
}

/// Raw status code returned by a native call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeResult(pub i32);

impl NativeResult {
    pub const SUCCESS: Self = Self(0);
    pub const ERROR_OUT_OF_HOST_MEMORY: Self = Self(-1);
    pub const ERROR_OUT_OF_DEVICE_MEMORY: Self = Self(-2);
    pub const ERROR_INITIALIZATION_FAILED: Self = Self(-3);
    pub const ERROR_DEVICE_LOST: Self = Self(-4);
    pub const ERROR_MEMORY_MAP_FAILED: Self = Self(-5);
    pub const ERROR_TOO_MANY_OBJECTS: Self = Self(-10);
    pub const ERROR_UNKNOWN: Self = Self(-13);
    pub const ERROR_INVALID_SHADER_NV: Self = Self(-1_000_012_000);

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::SUCCESS => "VK_SUCCESS",
            Self::ERROR_OUT_OF_HOST_MEMORY => "VK_ERROR_OUT_OF_HOST_MEMORY",
            Self::ERROR_OUT_OF_DEVICE_MEMORY => "VK_ERROR_OUT_OF_DEVICE_MEMORY",
            Self::ERROR_INITIALIZATION_FAILED => "VK_ERROR_INITIALIZATION_FAILED",
            Self::ERROR_DEVICE_LOST => "VK_ERROR_DEVICE_LOST",
            Self::ERROR_MEMORY_MAP_FAILED => "VK_ERROR_MEMORY_MAP_FAILED",
            Self::ERROR_TOO_MANY_OBJECTS => "VK_ERROR_TOO_MANY_OBJECTS",
            Self::ERROR_UNKNOWN => "VK_ERROR_UNKNOWN",
            Self::ERROR_INVALID_SHADER_NV => "VK_ERROR_INVALID_SHADER_NV",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for NativeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "VkResult({})", self.0),
        }
    }
}

impl fmt::Debug for NativeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// One entry of the device memory-type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryType {
    pub property_flags: MemoryProperties,
    pub heap_index: u32,
}

impl MemoryType {
    pub const fn new(property_flags: MemoryProperties, heap_index: u32) -> Self {
        Self {
            property_flags,
            heap_index,
        }
    }
}

/// What a buffer actually needs from the allocator. `size` may exceed the
/// requested buffer size because of alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRequirements {
    pub size: u64,
    pub alignment: u64,
    /// Bit `i` is set when memory type `i` can back the buffer.
    pub memory_type_bits: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
    pub max_push_constants_size: u32,
    pub max_per_stage_bindings: u32,
}

impl Default for DeviceLimits {
    /// Minimums guaranteed by the Vulkan specification.
    fn default() -> Self {
        Self {
            max_push_constants_size: 128,
            max_per_stage_bindings: 20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDesc {
    pub size: u64,
    pub usage: BufferUsage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    StorageBuffer,
    StorageImage,
    CombinedImageSampler,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub count: u32,
    pub stages: ShaderStages,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushConstantRange {
    pub stages: ShaderStages,
    pub offset: u32,
    pub size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecializationMapEntry {
    pub constant_id: u32,
    pub offset: u32,
    pub size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecializationInfo<'a> {
    pub entries: &'a [SpecializationMapEntry],
    pub data: &'a [u8],
}
