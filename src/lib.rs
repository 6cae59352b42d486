//! Render graph resource and execution model
//!
//! Deimos lets independent rendering passes declare the resources they produce and consume, share typed data
//! between each other, and execute in a controlled order, while concrete objects that are no longer used are
//! reclaimed automatically. It does not talk to a graphics API itself, instead everything goes through the
//! [`Backend`](crate::Backend) traits.
//!
//! To get started, the easiest way is to simply
//! ```
//! // Import all types and traits
//! use deimos::prelude::*;
//! // Or, import them under a namespace.
//! use deimos::prelude as dm;
//! ```
//!
//! # Example
//!
//! First, create a [`PipelineResources`](crate::PipelineResources) backing store. It owns every concrete object and
//! is meant to be kept alive across frames. Here we use the [`HeadlessBackend`](crate::HeadlessBackend), a real
//! application would implement the backend traits for its graphics API.
//! ```
//! use deimos::prelude::*;
//!
//! let mut resources = PipelineResources::new(HeadlessBackend::new());
//! ```
//! Every frame, create a [`RenderPipeline`](crate::RenderPipeline) around the surface to present to,
//! add the passes and execute them.
//! ```
//! use deimos::prelude::*;
//!
//! # let mut resources = PipelineResources::new(HeadlessBackend::new());
//! for frame in 1..=3 {
//!     let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(1280, 720))?;
//!     let backbuffer = pipeline.backbuffer().clone();
//!     pipeline.add_pass(
//!         PassBuilder::<HeadlessBackend>::new("clear")
//!             .setup_fn({
//!                 let backbuffer = backbuffer.clone();
//!                 move |graph, _| graph.writes(&backbuffer)
//!             })
//!             // Passes fetch concrete objects again every frame, the backing store may have evicted them.
//!             .execute_fn(move |_, resources| resources.get_render_target(&backbuffer)?.clear())
//!             .build(),
//!     )?;
//!     pipeline.execute(frame, None)?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//! See the [`graph`] module for a complete description of passes, resources and pipeline data.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod core;
pub mod backend;
pub mod graph;
pub mod profiler;
