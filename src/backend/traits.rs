use std::rc::Rc;

use anyhow::Result;

use crate::graph::virtual_resource::{BufferResource, RenderTargetResource, TextureResource};

/// A render target owned by the graphics API. Typically a framebuffer with its attachments.
pub trait RenderTarget {
    /// Make this the active render target for subsequent draw calls.
    fn bind(&self) -> Result<()>;
    /// Clear all attachments of this render target.
    fn clear(&self) -> Result<()>;
    /// Width in device pixels.
    fn width(&self) -> u32;
    /// Height in device pixels.
    fn height(&self) -> u32;
    /// Ratio between device pixels and logical pixels, on both axes.
    fn content_scale(&self) -> (f32, f32) {
        (1.0, 1.0)
    }
}

/// A texture owned by the graphics API.
pub trait Texture {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Bind this texture to a texture unit.
    fn bind(&self, unit: u32) -> Result<()>;
}

/// A buffer owned by the graphics API.
pub trait Buffer {
    /// Size in bytes.
    fn size(&self) -> u64;
    /// Bind this buffer to a binding point.
    fn bind(&self, binding: u32) -> Result<()>;
}

/// Creates concrete objects for virtual resources declared in a render graph.
pub trait Backend {
    type RenderTarget: RenderTarget;
    type Texture: Texture;
    type Buffer: Buffer;

    /// Create a texture matching the resource description.
    fn create_texture(&self, resource: &TextureResource) -> Result<Self::Texture>;
    /// Create a render target matching the resource description. Its attachments were created beforehand through
    /// [`Backend::create_texture`] and are given in the same order as [`RenderTargetResource::color_attachments`].
    fn create_render_target(
        &self,
        resource: &RenderTargetResource,
        color: &[Rc<Self::Texture>],
        depth: Option<&Rc<Self::Texture>>,
    ) -> Result<Self::RenderTarget>;
    /// Create a buffer matching the resource description.
    fn create_buffer(&self, resource: &BufferResource) -> Result<Self::Buffer>;
}
