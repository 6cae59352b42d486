//! Exposes the [`RenderPipeline`], the ordered collection of passes that make up one frame.
//!
//! A pipeline borrows a [`PipelineResources`] backing store for its lifetime. The store usually outlives many
//! pipelines, one per frame, so concrete objects created in one frame can be reused by the next as long as they keep
//! being used. See the [`graph`](crate::graph) module level documentation for a full example.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use anyhow::Result;

use crate::backend::traits::{Backend, RenderTarget};
use crate::core::settings::{PipelineSettings, ScheduleMode};
use crate::graph::builder::GraphBuilder;
use crate::graph::pass::{PassId, RenderPass};
use crate::graph::physical_resource::PipelineResources;
use crate::graph::pipeline_data::PipelineData;
use crate::graph::task_graph::{GraphViz, PassDependencyGraph};
use crate::graph::virtual_resource::{RenderTargetResource, VirtualResource};
use crate::profiler::Profiler;

struct PassNode<'r, B: Backend> {
    pass: Box<dyn RenderPass<B> + 'r>,
    executions: u64,
}

/// Ordered list of passes together with the resources and data they share.
///
/// Passes are set up the moment they are added through [`RenderPipeline::add_pass`], and executed on every call to
/// [`RenderPipeline::execute`]. The pipeline dereferences to its [`GraphBuilder`], so resources can also be created
/// outside of any pass.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct RenderPipeline<'r, B: Backend> {
    #[derivative(Debug = "ignore")]
    graph: GraphBuilder<'r, B>,
    #[derivative(Debug = "ignore")]
    passes: Vec<PassNode<'r, B>>,
    data: PipelineData,
    settings: PipelineSettings,
    backbuffer: RenderTargetResource,
}

impl<'r, B: Backend> RenderPipeline<'r, B> {
    /// Create a pipeline with default settings. The backbuffer is imported and bound immediately.
    /// # Errors
    /// * Fails if binding the backbuffer fails.
    pub fn new(resources: &'r mut PipelineResources<B>, backbuffer: impl Into<Rc<B::RenderTarget>>) -> Result<Self> {
        Self::with_settings(resources, backbuffer, PipelineSettings::default())
    }

    /// Create a pipeline with the given settings. The backbuffer is imported under
    /// [`PipelineSettings::backbuffer_name`] and bound immediately.
    /// # Errors
    /// * Fails if binding the backbuffer fails.
    pub fn with_settings(
        resources: &'r mut PipelineResources<B>,
        backbuffer: impl Into<Rc<B::RenderTarget>>,
        settings: PipelineSettings,
    ) -> Result<Self> {
        let target = backbuffer.into();
        target.bind()?;
        let mut graph = GraphBuilder::new(resources);
        let backbuffer = graph.import_render_target(settings.backbuffer_name.clone(), target);
        debug!(
            "Created pipeline `{}` with backbuffer `{}` ({}x{})",
            settings.name,
            backbuffer.name(),
            backbuffer.width(),
            backbuffer.height()
        );
        Ok(Self {
            graph,
            passes: vec![],
            data: PipelineData::new(),
            settings,
            backbuffer,
        })
    }

    /// Add a pass to the pipeline and run its setup.
    /// # Errors
    /// * Propagates any error from [`RenderPass::setup`]. In this case the pass is not added, and every read or write
    ///   it declared is forgotten.
    pub fn add_pass(&mut self, pass: impl RenderPass<B> + 'r) -> Result<PassId> {
        self.add_boxed_pass(Box::new(pass))
    }

    /// Add an already boxed pass. See [`RenderPipeline::add_pass`].
    pub fn add_boxed_pass(&mut self, mut pass: Box<dyn RenderPass<B> + 'r>) -> Result<PassId> {
        let id = PassId(self.passes.len() as u32);
        self.graph.begin_pass(id);
        let result = pass.setup(&mut self.graph, &mut self.data);
        self.graph.end_pass();
        if let Err(err) = result {
            self.graph.edges_mut().remove_pass(id);
            return Err(err);
        }

        debug!("Added {id} `{}` to pipeline `{}`", pass.name(), self.settings.name);
        self.passes.push(PassNode {
            pass,
            executions: 0,
        });
        Ok(id)
    }

    /// Execute every pass once.
    ///
    /// The backing store is moved to `tick` first, and the backbuffer is bound again so every frame starts with a
    /// valid render target. Each pass is bracketed by `profiler.start` and `profiler.end`, labeled with its name.
    /// Once all passes succeeded, objects that were not used during this tick are evicted, unless disabled in the
    /// [`PipelineSettings`].
    ///
    /// The frame driver is responsible for incrementing `tick` once per frame. Reusing a tick never evicts anything.
    /// # Errors
    /// * Fails if the backbuffer was evicted from the backing store.
    /// * Fails with [`Error::GraphHasCycle`](crate::Error::GraphHasCycle) when scheduling by dependency and the
    ///   declared usages form a cycle.
    /// * Propagates the first error returned by a pass. Remaining passes are not executed and no garbage is collected.
    pub fn execute(&mut self, tick: u64, mut profiler: Option<&mut dyn Profiler>) -> Result<()> {
        let resources = self.graph.resources_mut();
        if tick < resources.current_tick() {
            warn!(
                "Pipeline `{}` executed with tick {tick}, which is before the current tick {}",
                self.settings.name,
                resources.current_tick()
            );
        }
        resources.set_current_tick(tick);
        resources.get_render_target(&self.backbuffer)?.bind()?;

        for id in self.execution_order()? {
            let node = &mut self.passes[id.index()];
            let name = node.pass.name().to_owned();
            if let Some(profiler) = profiler.as_deref_mut() {
                profiler.start(&name);
            }
            let result = node.pass.execute(&mut self.data, self.graph.resources_mut());
            if let Some(profiler) = profiler.as_deref_mut() {
                profiler.end(&name);
            }
            node.executions += 1;
            if let Err(err) = result {
                error!("Pass `{name}` of pipeline `{}` failed at tick {tick}: {err}", self.settings.name);
                return Err(err);
            }
        }

        if self.settings.collect_garbage {
            self.graph.resources_mut().collect_garbage();
        }
        Ok(())
    }

    /// The order in which the next [`RenderPipeline::execute`] runs the passes.
    /// # Errors
    /// * Fails with [`Error::GraphHasCycle`](crate::Error::GraphHasCycle) when scheduling by dependency and the
    ///   declared usages form a cycle.
    pub fn execution_order(&self) -> Result<Vec<PassId>> {
        let order = match self.settings.schedule {
            ScheduleMode::Registration => (0..self.passes.len()).collect::<Vec<_>>(),
            ScheduleMode::Dependency => self.dependency_graph().schedule()?,
        };
        Ok(order.into_iter().map(|index| PassId(index as u32)).collect())
    }

    /// Build the dependency graph between passes from their declared reads and writes.
    pub fn dependency_graph(&self) -> PassDependencyGraph {
        PassDependencyGraph::new(self.pass_names(), self.graph.edges(), |handle| {
            self.graph
                .resource(handle)
                .map_or_else(|| handle.to_string(), |resource| resource.name().to_owned())
        })
    }

    /// Amount of passes that were set up successfully.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Names of all passes, in registration order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|node| node.pass.name())
    }

    /// Find the first pass with this name.
    pub fn pass_id(&self, name: &str) -> Option<PassId> {
        self.passes
            .iter()
            .position(|node| node.pass.name() == name)
            .map(|index| PassId(index as u32))
    }

    /// How many times the execute function of a pass was called, including calls that failed.
    pub fn executions(&self, pass: PassId) -> Option<u64> {
        self.passes.get(pass.index()).map(|node| node.executions)
    }

    /// The render target imported on construction.
    pub fn backbuffer(&self) -> &RenderTargetResource {
        &self.backbuffer
    }

    /// Data published by the passes of this pipeline.
    pub fn data(&self) -> &PipelineData {
        &self.data
    }

    /// Mutable access to the data published by the passes, for example to seed it before adding passes.
    pub fn data_mut(&mut self) -> &mut PipelineData {
        &mut self.data
    }

    /// Remove all pipeline data, so passes can publish it again.
    pub fn reset_data(&mut self) {
        self.data.clear();
    }

    /// Settings this pipeline was created with.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}

impl<'r, B: Backend> Deref for RenderPipeline<'r, B> {
    type Target = GraphBuilder<'r, B>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl<'r, B: Backend> DerefMut for RenderPipeline<'r, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.graph
    }
}

impl<'r, B: Backend> GraphViz for RenderPipeline<'r, B> {
    fn dot(&self) -> Result<String> {
        self.dependency_graph().dot()
    }
}
