/// Program descriptors and binding slots
///
/// A program is identified by its source reference plus the list of entry
/// points compiled from it. Bindings are addressed by `BindingSlot`, which
/// always names the scope explicitly: a miss shader or hit group is selected
/// by index, never implied by the binding name.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Kind of program, which decides how `dispatch` interprets the extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Fullscreen pass writing a render target
    Fullscreen,
    /// Compute dispatch
    Compute,
    /// Ray tracing launch (needs a bound scene)
    RayTracing,
}

/// Shader stage of one entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Pixel,
    Compute,
    RayGen,
    Miss,
    ClosestHit,
    AnyHit,
}

/// One compiled entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub stage: ShaderStage,
    pub name: String,
    /// Miss or hit group index (0 for other stages)
    pub group: u32,
}

impl EntryPoint {
    pub fn new(stage: ShaderStage, name: impl Into<String>, group: u32) -> Self {
        Self { stage, name: name.into(), group }
    }
}

/// Descriptor for building a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDesc {
    /// Source reference (file path or library key)
    pub source: String,
    pub kind: ProgramKind,
    pub entry_points: Vec<EntryPoint>,
}

impl ProgramDesc {
    /// Fullscreen program with a single pixel entry point
    pub fn fullscreen(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: ProgramKind::Fullscreen,
            entry_points: vec![EntryPoint::new(ShaderStage::Pixel, "main", 0)],
        }
    }

    /// Compute program with a single entry point
    pub fn compute(source: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: ProgramKind::Compute,
            entry_points: vec![EntryPoint::new(ShaderStage::Compute, entry, 0)],
        }
    }

    /// Number of miss entry points
    pub fn miss_count(&self) -> u32 {
        self.entry_points.iter().filter(|e| e.stage == ShaderStage::Miss).count() as u32
    }

    /// Number of hit groups (closest hit and any hit share a group index)
    pub fn hit_group_count(&self) -> u32 {
        self.entry_points
            .iter()
            .filter(|e| matches!(e.stage, ShaderStage::ClosestHit | ShaderStage::AnyHit))
            .map(|e| e.group + 1)
            .max()
            .unwrap_or(0)
    }
}

// ===== BINDINGS =====

/// Which part of a program a binding targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramScope {
    /// Visible to every entry point
    Global,
    /// Ray generation entry point
    RayGen,
    /// Miss shader at this index
    Miss(u32),
    /// Hit group at this index
    HitGroup(u32),
}

/// Named binding inside a scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    pub scope: ProgramScope,
    pub name: String,
}

impl BindingSlot {
    pub fn new(scope: ProgramScope, name: impl Into<String>) -> Self {
        Self { scope, name: name.into() }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self::new(ProgramScope::Global, name)
    }

    pub fn ray_gen(name: impl Into<String>) -> Self {
        Self::new(ProgramScope::RayGen, name)
    }

    pub fn miss(index: u32, name: impl Into<String>) -> Self {
        Self::new(ProgramScope::Miss(index), name)
    }

    pub fn hit_group(index: u32, name: impl Into<String>) -> Self {
        Self::new(ProgramScope::HitGroup(index), name)
    }
}

/// Constant value bound to a program
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
    Bool(bool),
    UInt(u32),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl ShaderValue {
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            ShaderValue::Float(v) => Some(v),
            ShaderValue::UInt(v) => Some(v as f32),
            ShaderValue::Int(v) => Some(v as f32),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            ShaderValue::UInt(v) => Some(v),
            ShaderValue::Int(v) if v >= 0 => Some(v as u32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ShaderValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match *self {
            ShaderValue::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<Vec4> {
        match *self {
            ShaderValue::Vec4(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ShaderValue {
    fn from(v: bool) -> Self {
        ShaderValue::Bool(v)
    }
}

impl From<u32> for ShaderValue {
    fn from(v: u32) -> Self {
        ShaderValue::UInt(v)
    }
}

impl From<i32> for ShaderValue {
    fn from(v: i32) -> Self {
        ShaderValue::Int(v)
    }
}

impl From<f32> for ShaderValue {
    fn from(v: f32) -> Self {
        ShaderValue::Float(v)
    }
}

impl From<Vec2> for ShaderValue {
    fn from(v: Vec2) -> Self {
        ShaderValue::Vec2(v)
    }
}

impl From<Vec3> for ShaderValue {
    fn from(v: Vec3) -> Self {
        ShaderValue::Vec3(v)
    }
}

impl From<Vec4> for ShaderValue {
    fn from(v: Vec4) -> Self {
        ShaderValue::Vec4(v)
    }
}

impl From<Mat4> for ShaderValue {
    fn from(v: Mat4) -> Self {
        ShaderValue::Mat4(v)
    }
}
