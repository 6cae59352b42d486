pub use crate::core::error::Error;
pub use crate::core::settings::*;

pub use crate::backend::traits::*;
pub use crate::backend::headless::{HeadlessBackend, HeadlessBuffer, HeadlessRenderTarget, HeadlessTexture};

pub use crate::graph::virtual_resource::*;
pub use crate::graph::pipeline_data::PipelineData;
pub use crate::graph::physical_resource::PipelineResources;
pub use crate::graph::pass::{CallbackPass, PassBuilder, PassId, RenderPass};
pub use crate::graph::builder::{GraphBuilder, PassEdges};
pub use crate::graph::pipeline::RenderPipeline;
pub use crate::graph::task_graph::{GraphViz, PassDependencyGraph};

pub use crate::profiler::{PassTimings, Profiler};
