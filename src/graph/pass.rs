//! This module exposes the [`RenderPass`] trait, and the [`PassBuilder`] struct used for defining ad-hoc passes from closures.
//!
//! For documentation on how to use the render pipeline, refer to the [`graph`](crate::graph) module level documentation.
//! Every pass has two phases. `setup` runs exactly once, the moment the pass is added to a
//! [`RenderPipeline`](crate::RenderPipeline). Here the pass creates or imports virtual resources, declares which resources
//! it reads and writes, and publishes [`PipelineData`] for later passes. No GPU work may happen in `setup`.
//! `execute` runs once per [`RenderPipeline::execute`](crate::RenderPipeline::execute), in the order the passes were added.
//! This is where all GPU work happens, using only objects obtained from the [`PipelineResources`] and the [`PipelineData`].
//!
//! # Example
//!
//! A reusable pass is a struct implementing [`RenderPass`].
//! ```
//! use deimos::prelude::*;
//!
//! #[derive(Default)]
//! struct Blur {
//!     target: Option<RenderTargetResource>,
//! }
//!
//! impl<B: Backend> RenderPass<B> for Blur {
//!     fn setup(&mut self, graph: &mut GraphBuilder<'_, B>, _data: &mut PipelineData) -> anyhow::Result<()> {
//!         let mut target = graph.create_render_target("blur", 256, 256);
//!         graph.create_color_attachment(&mut target, "blur.color", TextureOptions::default());
//!         graph.writes(&target)?;
//!         self.target = Some(target);
//!         Ok(())
//!     }
//!
//!     fn execute(&mut self, _data: &mut PipelineData, resources: &mut PipelineResources<B>) -> anyhow::Result<()> {
//!         let Some(target) = &self.target else { return Ok(()) };
//!         let target = resources.create_render_target(target)?;
//!         target.bind()?;
//!         target.clear()
//!     }
//! }
//! ```
//!
//! Ad-hoc passes can be built from closures instead.
//! ```
//! use deimos::prelude::*;
//!
//! let pass = PassBuilder::<HeadlessBackend>::new("clear backbuffer")
//!     .execute_fn(|_data, _resources| {
//!         // Draw something
//!         Ok(())
//!     })
//!     .build();
//! assert_eq!(RenderPass::<HeadlessBackend>::name(&pass), "clear backbuffer");
//! ```

use std::fmt::{Display, Formatter};

use anyhow::Result;

use crate::backend::traits::Backend;
use crate::graph::builder::GraphBuilder;
use crate::graph::physical_resource::PipelineResources;
use crate::graph::pipeline_data::PipelineData;

/// Identifies a pass inside one render pipeline. Passes are numbered in the order they are added.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(pub(crate) u32);

impl PassId {
    /// Registration index of this pass.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for PassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "pass {}", self.0)
    }
}

/// A unit of rendering work in a [`RenderPipeline`](crate::RenderPipeline).
pub trait RenderPass<B: Backend> {
    /// Name of this pass, used for logging and profiler labels. Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Declare resource usage, create resources and publish pipeline data. Called once when the pass is added.
    /// # Errors
    /// Any error aborts adding the pass.
    fn setup(&mut self, graph: &mut GraphBuilder<'_, B>, data: &mut PipelineData) -> Result<()>;

    /// Do the GPU work of this pass. Called once per pipeline execution.
    /// # Errors
    /// Any error aborts the remaining passes of this execution.
    fn execute(&mut self, data: &mut PipelineData, resources: &mut PipelineResources<B>) -> Result<()>;
}

/// Setup callback of a [`CallbackPass`].
pub type BoxedSetupFn<'cb, B> = Box<dyn for<'g> FnMut(&mut GraphBuilder<'g, B>, &mut PipelineData) -> Result<()> + 'cb>;
/// Execute callback of a [`CallbackPass`].
pub type BoxedExecuteFn<'cb, B> = Box<dyn FnMut(&mut PipelineData, &mut PipelineResources<B>) -> Result<()> + 'cb>;

fn empty_setup<B: Backend>(_graph: &mut GraphBuilder<'_, B>, _data: &mut PipelineData) -> Result<()> {
    Ok(())
}

fn empty_execute<B: Backend>(_data: &mut PipelineData, _resources: &mut PipelineResources<B>) -> Result<()> {
    Ok(())
}

/// A pass that forwards both phases to closures. You can obtain one using a [`PassBuilder`].
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct CallbackPass<'cb, B: Backend> {
    name: String,
    #[derivative(Debug = "ignore")]
    setup: BoxedSetupFn<'cb, B>,
    #[derivative(Debug = "ignore")]
    execute: BoxedExecuteFn<'cb, B>,
}

impl<'cb, B: Backend> RenderPass<B> for CallbackPass<'cb, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, graph: &mut GraphBuilder<'_, B>, data: &mut PipelineData) -> Result<()> {
        (self.setup)(graph, data)
    }

    fn execute(&mut self, data: &mut PipelineData, resources: &mut PipelineResources<B>) -> Result<()> {
        (self.execute)(data, resources)
    }
}

/// Used to create [`CallbackPass`] objects. Both callbacks default to doing nothing.
/// # Example
/// See the [`pass`](crate::graph::pass) module level documentation.
pub struct PassBuilder<'cb, B: Backend> {
    inner: CallbackPass<'cb, B>,
}

impl<'cb, B: Backend + 'cb> PassBuilder<'cb, B> {
    /// Create a new pass builder.
    pub fn new(name: impl Into<String>) -> Self {
        PassBuilder {
            inner: CallbackPass {
                name: name.into(),
                setup: Box::new(empty_setup::<B>),
                execute: Box::new(empty_execute::<B>),
            },
        }
    }

    /// Set the function called when the pass is added to a pipeline.
    pub fn setup_fn<F>(mut self, setup: F) -> Self
    where
        F: for<'g> FnMut(&mut GraphBuilder<'g, B>, &mut PipelineData) -> Result<()> + 'cb, {
        self.inner.setup = Box::new(setup);
        self
    }

    /// Set the function called every time the pipeline executes.
    pub fn execute_fn<F>(mut self, execute: F) -> Self
    where
        F: FnMut(&mut PipelineData, &mut PipelineResources<B>) -> Result<()> + 'cb, {
        self.inner.execute = Box::new(execute);
        self
    }

    /// Obtain the built pass.
    pub fn build(self) -> CallbackPass<'cb, B> {
        self.inner
    }
}
