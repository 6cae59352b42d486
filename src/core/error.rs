//! Exposes the deimos error type

use thiserror::Error;

use crate::graph::virtual_resource::ResourceHandle;

/// Error type that deimos can return.
///
/// All fallible functions return [`anyhow::Result`], so to inspect the failure use
/// `err.downcast_ref::<deimos::Error>()`.
#[derive(Error, Debug)]
pub enum Error {
    /// Pipeline data of this type was already created or set. Usually means two passes
    /// publish the same data, or the data container was not reset between frames.
    #[error("Pipeline data of type `{0}` is already registered.")]
    DuplicateData(&'static str),
    /// Pipeline data of this type was requested, but no pass published it.
    #[error("No pipeline data of type `{0}` registered. Was the producing pass added before this one?")]
    MissingData(&'static str),
    /// No backing object registered for a resource handle, or it was garbage collected.
    #[error("No backing object registered for resource `{name}` ({handle}).")]
    ResourceNotFound {
        /// Handle of the requested resource
        handle: ResourceHandle,
        /// Name of the requested resource
        name: String,
    },
    /// Named static resource was never stored.
    #[error("Static resource `{0}` not found.")]
    StaticResourceNotFound(String),
    /// Named static resource exists, but holds a value of a different type.
    #[error("Static resource `{name}` is not of type `{expected}`.")]
    StaticResourceTypeMismatch {
        /// Name of the static resource
        name: String,
        /// Type that was requested
        expected: &'static str,
    },
    /// Tried to declare a read or write outside of [`RenderPass::setup`](crate::RenderPass::setup).
    #[error("Resource usage declared outside of a pass setup.")]
    NoActivePass,
    /// Pass dependencies contain a cycle and cannot be scheduled.
    #[error("Pass graph contains cycle.")]
    GraphHasCycle,
    /// Backend refused to create an object with this extent.
    #[error("Invalid extent {width}x{height} for resource `{name}`.")]
    InvalidExtent {
        /// Name of the resource being created
        name: String,
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// Uncategorized error.
    #[error("Uncategorized error: `{0}`")]
    Uncategorized(&'static str),
}
