/*!
# Raylume Engine

Core types for a frame-oriented render pipeline.

A pipeline is an ordered list of render stages sharing one resource registry
of named channels. Stages declare the channels they read and write during
initialization, then run once per frame in index order. The execution backend
that compiles and dispatches programs is consumed through the
`GraphicsDevice` trait, so the pipeline runs the same way on a real GPU
backend or on the CPU reference device shipped with this crate.

## Architecture

- **ResourceRegistry**: name-keyed arena of channels, resized in place
- **RenderStage**: lifecycle contract implemented by every stage
- **Pipeline**: owns the stages and the registry, fans out events
- **GraphicsDevice**: execution backend (textures, programs, dispatch)
- **Scene**: scene provider (active camera, ray tracing capability)
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod shaders;
pub mod device;
pub mod registry;
pub mod scene;
pub mod launch;
pub mod stage;
pub mod stages;
pub mod pipeline;

// Main raylume namespace module
pub mod raylume {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Pipeline configuration
    pub use crate::config::PipelineConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Execution backend sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Resource registry sub-module
    pub mod registry {
        pub use crate::registry::*;
    }

    // Scene provider sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Program launch helpers
    pub mod launch {
        pub use crate::launch::*;
    }

    // Stage contract sub-module
    pub mod stage {
        pub use crate::stage::*;
    }

    // Concrete stages
    pub mod stages {
        pub use crate::stages::*;
    }

    // Orchestrator sub-module
    pub mod pipeline {
        pub use crate::pipeline::*;
    }
}

// Re-export math library at crate root
pub use glam;
