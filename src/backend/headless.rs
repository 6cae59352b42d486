//! A backend that creates CPU-side objects and performs no rendering.
//!
//! Every object counts how often it was bound or cleared, and the backend counts how many objects it created.
//! This is enough to verify how passes compose without a GPU.
//!
//! # Example
//! ```
//! use deimos::prelude::*;
//!
//! let mut resources = PipelineResources::new(HeadlessBackend::new());
//! let mut pipeline = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
//! let mut target = pipeline.create_render_target("scene", 800, 600);
//! pipeline.create_color_attachment(&mut target, "scene.color", TextureOptions::default());
//! pipeline.resources_mut().create_render_target(&target)?;
//! assert_eq!(pipeline.backing_store().backend().created_textures(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

use crate::backend::traits::{Backend, Buffer, RenderTarget, Texture};
use crate::graph::virtual_resource::{BufferResource, RenderTargetResource, TextureOptions, TextureResource, VirtualResource};
use crate::Error;

/// Largest width or height accepted by default.
pub const DEFAULT_MAX_EXTENT: u32 = 16384;

/// Creates headless objects. Rejects objects with a zero extent, or an extent larger than its limit.
#[derive(Debug)]
pub struct HeadlessBackend {
    max_extent: u32,
    render_targets: Cell<usize>,
    textures: Cell<usize>,
    buffers: Cell<usize>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::with_max_extent(DEFAULT_MAX_EXTENT)
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects widths or heights above `max_extent`.
    pub fn with_max_extent(max_extent: u32) -> Self {
        Self {
            max_extent,
            render_targets: Cell::new(0),
            textures: Cell::new(0),
            buffers: Cell::new(0),
        }
    }

    pub fn max_extent(&self) -> u32 {
        self.max_extent
    }

    /// Amount of render targets created so far.
    pub fn created_render_targets(&self) -> usize {
        self.render_targets.get()
    }

    /// Amount of textures created so far, including render target attachments.
    pub fn created_textures(&self) -> usize {
        self.textures.get()
    }

    /// Amount of buffers created so far.
    pub fn created_buffers(&self) -> usize {
        self.buffers.get()
    }

    fn check_extent(&self, name: &str, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 || width > self.max_extent || height > self.max_extent {
            return Err(anyhow::Error::from(Error::InvalidExtent {
                name: name.to_owned(),
                width,
                height,
            }));
        }
        Ok(())
    }
}

fn increment(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl Backend for HeadlessBackend {
    type RenderTarget = HeadlessRenderTarget;
    type Texture = HeadlessTexture;
    type Buffer = HeadlessBuffer;

    fn create_texture(&self, resource: &TextureResource) -> Result<HeadlessTexture> {
        self.check_extent(resource.name(), resource.width(), resource.height())?;
        increment(&self.textures);
        #[cfg(feature = "log-objects")]
        trace!("Created headless texture `{}` ({}x{})", resource.name(), resource.width(), resource.height());
        Ok(HeadlessTexture::new(resource.width(), resource.height(), *resource.options()))
    }

    fn create_render_target(
        &self,
        resource: &RenderTargetResource,
        color: &[Rc<HeadlessTexture>],
        depth: Option<&Rc<HeadlessTexture>>,
    ) -> Result<HeadlessRenderTarget> {
        self.check_extent(resource.name(), resource.width(), resource.height())?;
        increment(&self.render_targets);
        #[cfg(feature = "log-objects")]
        trace!("Created headless render target `{}` ({}x{})", resource.name(), resource.width(), resource.height());
        let (x, y) = resource.content_scale();
        Ok(HeadlessRenderTarget {
            color: color.to_vec(),
            depth: depth.cloned(),
            ..HeadlessRenderTarget::new(resource.width(), resource.height()).with_content_scale(x, y)
        })
    }

    fn create_buffer(&self, resource: &BufferResource) -> Result<HeadlessBuffer> {
        increment(&self.buffers);
        #[cfg(feature = "log-objects")]
        trace!("Created headless buffer `{}` ({} bytes)", resource.name(), resource.size());
        Ok(HeadlessBuffer::new(resource.size()))
    }
}

/// Render target that only records how it was used.
#[derive(Debug)]
pub struct HeadlessRenderTarget {
    width: u32,
    height: u32,
    content_scale: (f32, f32),
    color: Vec<Rc<HeadlessTexture>>,
    depth: Option<Rc<HeadlessTexture>>,
    binds: Cell<usize>,
    clears: Cell<usize>,
}

impl HeadlessRenderTarget {
    /// Create a render target without attachments, for example to act as a backbuffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            content_scale: (1.0, 1.0),
            color: vec![],
            depth: None,
            binds: Cell::new(0),
            clears: Cell::new(0),
        }
    }

    pub fn with_content_scale(mut self, x: f32, y: f32) -> Self {
        self.content_scale = (x, y);
        self
    }

    pub fn bind_count(&self) -> usize {
        self.binds.get()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }

    pub fn color_attachments(&self) -> &[Rc<HeadlessTexture>] {
        &self.color
    }

    pub fn depth_attachment(&self) -> Option<&Rc<HeadlessTexture>> {
        self.depth.as_ref()
    }
}

impl RenderTarget for HeadlessRenderTarget {
    fn bind(&self) -> Result<()> {
        increment(&self.binds);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        increment(&self.clears);
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn content_scale(&self) -> (f32, f32) {
        self.content_scale
    }
}

/// Texture that only records how it was used.
#[derive(Debug)]
pub struct HeadlessTexture {
    width: u32,
    height: u32,
    options: TextureOptions,
    binds: Cell<usize>,
    unit: Cell<Option<u32>>,
}

impl HeadlessTexture {
    pub fn new(width: u32, height: u32, options: TextureOptions) -> Self {
        Self {
            width,
            height,
            options,
            binds: Cell::new(0),
            unit: Cell::new(None),
        }
    }

    pub fn options(&self) -> &TextureOptions {
        &self.options
    }

    pub fn bind_count(&self) -> usize {
        self.binds.get()
    }

    /// Texture unit used by the most recent bind.
    pub fn bound_unit(&self) -> Option<u32> {
        self.unit.get()
    }
}

impl Texture for HeadlessTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bind(&self, unit: u32) -> Result<()> {
        increment(&self.binds);
        self.unit.set(Some(unit));
        Ok(())
    }
}

/// Buffer that only records how it was used.
#[derive(Debug)]
pub struct HeadlessBuffer {
    size: u64,
    binds: Cell<usize>,
}

impl HeadlessBuffer {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            binds: Cell::new(0),
        }
    }

    pub fn bind_count(&self) -> usize {
        self.binds.get()
    }
}

impl Buffer for HeadlessBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn bind(&self, _binding: u32) -> Result<()> {
        increment(&self.binds);
        Ok(())
    }
}
