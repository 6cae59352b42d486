//! Virtual resources name a logical GPU resource inside one render graph. They only carry a description,
//! the concrete object is looked up in the [`PipelineResources`](crate::PipelineResources) through the handle.

use std::fmt::{Display, Formatter};

use static_assertions::assert_impl_all;

use crate::backend::traits::RenderTarget;

/// Identifies a virtual resource. Handles are assigned by a monotonic counter of the backing store, and never reused by
/// any graph that shares it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub(crate) u32);

assert_impl_all!(ResourceHandle: Copy, Send, Sync, std::hash::Hash, Ord);

impl ResourceHandle {
    /// Get the raw value of this handle.
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl Display for ResourceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type of a resource in the render graph.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum ResourceType {
    /// Render target resource
    #[default]
    RenderTarget,
    /// Texture resource
    Texture,
    /// Buffer resource
    Buffer,
}

/// Common interface of all virtual resources.
pub trait VirtualResource {
    /// Get the handle of this resource.
    fn handle(&self) -> ResourceHandle;
    /// Get the name of this resource. Only used for diagnostics.
    fn name(&self) -> &str;
    /// Get the resource type of this resource.
    fn resource_type(&self) -> ResourceType;
}

/// Pixel format of a texture.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum TextureFormat {
    #[default]
    Rgba8,
    Rgba8Srgb,
    Rgba16F,
    Rgba32F,
    R8,
    R16F,
    R32F,
    Depth24Stencil8,
    Depth32F,
}

impl TextureFormat {
    /// Whether this format can be used as a depth attachment.
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8 | TextureFormat::Depth32F)
    }
}

/// Sampling filter of a texture.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

/// Addressing mode for coordinates outside of the texture.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    #[default]
    ClampToEdge,
}

/// Creation options for a texture. These are not interpreted by the render graph, they are handed to the
/// [`Backend`](crate::Backend) when the texture is created.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub struct TextureOptions {
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    pub mipmaps: bool,
}

impl TextureOptions {
    /// Default options for a depth attachment.
    pub fn depth() -> Self {
        Self {
            format: TextureFormat::Depth24Stencil8,
            filter: TextureFilter::Nearest,
            ..Default::default()
        }
    }

    /// Replace the pixel format.
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the sampling filter.
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the wrap mode.
    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap = wrap;
        self
    }
}

/// Texture in the render graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureResource {
    pub(crate) handle: ResourceHandle,
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) options: TextureOptions,
}

impl TextureResource {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn options(&self) -> &TextureOptions {
        &self.options
    }
}

/// Render target in the render graph. Owns the descriptions of its attachments, which are created through the
/// [`GraphBuilder`](crate::GraphBuilder) so they match the size of the target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetResource {
    pub(crate) handle: ResourceHandle,
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) content_scale: (f32, f32),
    pub(crate) color_attachments: Vec<TextureResource>,
    pub(crate) depth_attachment: Option<TextureResource>,
}

impl RenderTargetResource {
    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ratio between device pixels and logical pixels.
    pub fn content_scale(&self) -> (f32, f32) {
        self.content_scale
    }

    /// Size in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.width as f32 / self.content_scale.0,
            self.height as f32 / self.content_scale.1,
        )
    }

    /// Color attachments, in attachment order.
    pub fn color_attachments(&self) -> &[TextureResource] {
        &self.color_attachments
    }

    pub fn depth_attachment(&self) -> Option<&TextureResource> {
        self.depth_attachment.as_ref()
    }
}

/// Buffer in the render graph.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferResource {
    pub(crate) handle: ResourceHandle,
    pub(crate) name: String,
    pub(crate) size: u64,
}

impl BufferResource {
    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

macro_rules! impl_virtual_resource {
    ($ty:ty, $kind:expr) => {
        impl VirtualResource for $ty {
            fn handle(&self) -> ResourceHandle {
                self.handle
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn resource_type(&self) -> ResourceType {
                $kind
            }
        }
    };
}

impl_virtual_resource!(RenderTargetResource, ResourceType::RenderTarget);
impl_virtual_resource!(TextureResource, ResourceType::Texture);
impl_virtual_resource!(BufferResource, ResourceType::Buffer);

/// Any resource recorded in a render graph.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyResource {
    RenderTarget(RenderTargetResource),
    Texture(TextureResource),
    Buffer(BufferResource),
}

impl AnyResource {
    pub fn as_render_target(&self) -> Option<&RenderTargetResource> {
        match self {
            AnyResource::RenderTarget(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&TextureResource> {
        match self {
            AnyResource::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&BufferResource> {
        match self {
            AnyResource::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }
}

impl VirtualResource for AnyResource {
    fn handle(&self) -> ResourceHandle {
        match self {
            AnyResource::RenderTarget(target) => target.handle(),
            AnyResource::Texture(texture) => texture.handle(),
            AnyResource::Buffer(buffer) => buffer.handle(),
        }
    }

    fn name(&self) -> &str {
        match self {
            AnyResource::RenderTarget(target) => target.name(),
            AnyResource::Texture(texture) => texture.name(),
            AnyResource::Buffer(buffer) => buffer.name(),
        }
    }

    fn resource_type(&self) -> ResourceType {
        match self {
            AnyResource::RenderTarget(_) => ResourceType::RenderTarget,
            AnyResource::Texture(_) => ResourceType::Texture,
            AnyResource::Buffer(_) => ResourceType::Buffer,
        }
    }
}

impl From<RenderTargetResource> for AnyResource {
    fn from(value: RenderTargetResource) -> Self {
        AnyResource::RenderTarget(value)
    }
}

impl From<TextureResource> for AnyResource {
    fn from(value: TextureResource) -> Self {
        AnyResource::Texture(value)
    }
}

impl From<BufferResource> for AnyResource {
    fn from(value: BufferResource) -> Self {
        AnyResource::Buffer(value)
    }
}

/// Description of a render target to create.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub content_scale: (f32, f32),
}

impl RenderTargetDesc {
    /// Describe a render target with a content scale of one.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            content_scale: (1.0, 1.0),
        }
    }

    /// Describe a render target with the same size and content scale as an existing one.
    pub fn like<T: RenderTarget + ?Sized>(target: &T) -> Self {
        Self {
            width: target.width(),
            height: target.height(),
            content_scale: target.content_scale(),
        }
    }
}

/// Description of a texture to create.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub options: TextureOptions,
}

/// Description of a buffer to create.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
}

/// Implemented by every virtual resource that can be created by
/// [`GraphBuilder::create_resource`](crate::GraphBuilder::create_resource).
pub trait CreateResource: VirtualResource + Clone + Into<AnyResource> {
    /// Description needed to create this resource.
    type Descriptor;

    /// Build the resource from a freshly allocated handle.
    fn from_descriptor(handle: ResourceHandle, name: String, desc: Self::Descriptor) -> Self;
}

impl CreateResource for RenderTargetResource {
    type Descriptor = RenderTargetDesc;

    fn from_descriptor(handle: ResourceHandle, name: String, desc: Self::Descriptor) -> Self {
        RenderTargetResource {
            handle,
            name,
            width: desc.width,
            height: desc.height,
            content_scale: desc.content_scale,
            color_attachments: vec![],
            depth_attachment: None,
        }
    }
}

impl CreateResource for TextureResource {
    type Descriptor = TextureDesc;

    fn from_descriptor(handle: ResourceHandle, name: String, desc: Self::Descriptor) -> Self {
        TextureResource {
            handle,
            name,
            width: desc.width,
            height: desc.height,
            options: desc.options,
        }
    }
}

impl CreateResource for BufferResource {
    type Descriptor = BufferDesc;

    fn from_descriptor(handle: ResourceHandle, name: String, desc: Self::Descriptor) -> Self {
        BufferResource {
            handle,
            name,
            size: desc.size,
        }
    }
}
