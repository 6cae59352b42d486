//! The backend module connects the render graph to a graphics API.
//! <br>
//! <br>
//! # Backend traits
//! These are defined in [`traits`], and must be implemented to supply concrete render targets, textures and buffers
//! to the [`PipelineResources`](crate::PipelineResources) backing store. The render graph never touches a graphics API
//! directly, it only calls the operations exposed here.
//! # Headless backend
//! A CPU-only implementation that performs no rendering is available in [`headless`]. It keeps track of how its objects
//! were used, which makes it useful for testing pass composition without a GPU.

pub mod traits;
pub mod headless;
