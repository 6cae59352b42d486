//! The render graph lets independent passes share GPU resources and typed data within a frame, without knowing about
//! each other. Each pass declares the resources it creates, reads and writes during setup, and does its actual work
//! during execution. All resources are referred to through [`VirtualResource`](virtual_resource::VirtualResource)s,
//! identified by a [`ResourceHandle`](virtual_resource::ResourceHandle) that is unique within one pipeline.
//!
//! Concrete objects need to be bound to each virtual resource before a pass can use them.
//! This is done through the [`PipelineResources`](physical_resource::PipelineResources) backing store, which also
//! evicts objects that are no longer used.
//!
//! Through the [`GraphViz`](task_graph::GraphViz) trait, it's possible to export a graphviz-compatible dot file
//! to display the dependencies between passes.
//!
//! # Example
//!
//! ```
//! use deimos::prelude::*;
//!
//! struct Camera {
//!     exposure: f32,
//! }
//!
//! // The backing store outlives the pipeline, and is usually kept for the whole application.
//! let mut resources = PipelineResources::new(HeadlessBackend::new());
//! let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
//!
//! let scene = PassBuilder::<HeadlessBackend>::new("scene")
//!     .setup_fn(|graph, data| {
//!         let target = graph.create_render_target("scene", 400, 300);
//!         graph.writes(&target)?;
//!         data.set(target)?;
//!         data.set(Camera { exposure: 1.5 })?;
//!         Ok(())
//!     })
//!     .execute_fn(|data, resources| {
//!         let target = data.get::<RenderTargetResource>()?;
//!         let target = resources.create_render_target(target)?;
//!         target.bind()?;
//!         target.clear()
//!     })
//!     .build();
//!
//! let tonemap = PassBuilder::<HeadlessBackend>::new("tonemap")
//!     .setup_fn(|graph, data| {
//!         let scene = data.get::<RenderTargetResource>()?.clone();
//!         graph.reads(&scene)
//!     })
//!     .execute_fn(|data, resources| {
//!         let scene = resources.get_render_target(data.get::<RenderTargetResource>()?)?;
//!         assert_eq!(scene.width(), 400);
//!         assert_eq!(data.get::<Camera>()?.exposure, 1.5);
//!         Ok(())
//!     })
//!     .build();
//!
//! pipeline.add_pass(scene)?;
//! pipeline.add_pass(tonemap)?;
//! // Execute all passes for frame 1. Objects that were not used in this frame are evicted afterwards.
//! pipeline.execute(1, None)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! For reusable passes, see the [`pass`] module documentation.
//!
//! # Scheduling
//!
//! By default passes execute in the order they were added, and declared reads and writes are only recorded.
//! With [`ScheduleMode::Dependency`](crate::ScheduleMode::Dependency), every writer of a resource runs before the
//! passes that only read it. Passes without conflicting usages keep their registration order.

pub mod virtual_resource;
pub mod physical_resource;
pub mod pipeline_data;
pub mod pass;
pub mod builder;
pub mod pipeline;
pub mod task_graph;
