use std::any::{type_name, Any};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use crate::backend::traits::Backend;
use crate::graph::virtual_resource::{BufferResource, RenderTargetResource, ResourceHandle, TextureResource, VirtualResource};
use crate::Error;

/// Owns the concrete objects bound to virtual resources, and cached objects that are shared between passes.
///
/// Every successful lookup of a render target, texture or buffer marks its handle as used in the current tick.
/// [`PipelineResources::collect_garbage`] evicts every object that was looked up before, but not during the current
/// tick, so an object that should persist across frames must be read at least once per tick. Objects that were never
/// looked up are not tracked. Looking up a render target that was created through
/// [`PipelineResources::create_render_target`] also marks its attachments, and evicting it evicts them.
///
/// Resource handles are allocated from the backing store, so they are unique across every pipeline that uses it.
/// A resource declared by a later pipeline never resolves to an object bound by an earlier one.
///
/// # Example usage
/// ```
/// use deimos::prelude::*;
///
/// let mut resources = PipelineResources::new(HeadlessBackend::new());
/// let mut graph = RenderPipeline::new(&mut resources, HeadlessRenderTarget::new(800, 600))?;
/// let target = graph.create_render_target("offscreen", 400, 300);
/// // Create the concrete render target and bind it to the virtual resource
/// graph.resources_mut().create_render_target(&target)?;
/// // ... Later, look up the concrete render target from the virtual resource
/// let concrete = graph.resources_mut().get_render_target(&target)?;
/// assert_eq!(concrete.width(), 400);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct PipelineResources<B: Backend> {
    backend: B,
    render_targets: HashMap<ResourceHandle, Rc<B::RenderTarget>>,
    textures: HashMap<ResourceHandle, Rc<B::Texture>>,
    buffers: HashMap<ResourceHandle, Rc<B::Buffer>>,
    names: HashMap<ResourceHandle, String>,
    static_storage: HashMap<String, Box<dyn Any>>,
    attachments: HashMap<ResourceHandle, Vec<ResourceHandle>>,
    use_tick: HashMap<ResourceHandle, u64>,
    tick: u64,
    next_handle: u32,
}

impl<B: Backend> std::fmt::Debug for PipelineResources<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineResources")
            .field("render_targets", &self.render_targets.len())
            .field("textures", &self.textures.len())
            .field("buffers", &self.buffers.len())
            .field("static_resources", &self.static_storage.len())
            .field("tick", &self.tick)
            .finish()
    }
}

macro_rules! lookup {
    ($self:ident, $map:ident, $resource:ident) => {{
        let handle = $resource.handle();
        match $self.$map.get(&handle) {
            Some(object) => {
                $self.use_tick.insert(handle, $self.tick);
                Ok(object.clone())
            }
            None => Err(anyhow::Error::from(Error::ResourceNotFound {
                handle,
                name: $resource.name().to_owned(),
            })),
        }
    }};
}

impl<B: Backend> PipelineResources<B> {
    /// Create an empty backing store that creates objects through the given backend.
    pub fn new(backend: B) -> Self {
        PipelineResources {
            backend,
            render_targets: Default::default(),
            textures: Default::default(),
            buffers: Default::default(),
            names: Default::default(),
            static_storage: Default::default(),
            attachments: Default::default(),
            use_tick: Default::default(),
            tick: 0,
            next_handle: 0,
        }
    }

    /// Get the backend used to create objects.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Allocate a handle that was never returned before by this backing store.
    pub(crate) fn allocate_handle(&mut self) -> ResourceHandle {
        let handle = ResourceHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn register(&mut self, resource: &impl VirtualResource) {
        #[cfg(feature = "log-objects")]
        trace!("Registered backing object for `{}` ({})", resource.name(), resource.handle());
        self.names.insert(resource.handle(), resource.name().to_owned());
    }

    /// Bind a render target to a virtual resource. An existing binding is replaced.
    pub fn set_render_target(&mut self, resource: &RenderTargetResource, target: impl Into<Rc<B::RenderTarget>>) {
        self.register(resource);
        self.attachments.remove(&resource.handle());
        self.render_targets.insert(resource.handle(), target.into());
    }

    /// Bind a texture to a virtual resource. An existing binding is replaced.
    pub fn set_texture(&mut self, resource: &TextureResource, texture: impl Into<Rc<B::Texture>>) {
        self.register(resource);
        self.textures.insert(resource.handle(), texture.into());
    }

    /// Bind a buffer to a virtual resource. An existing binding is replaced.
    pub fn set_buffer(&mut self, resource: &BufferResource, buffer: impl Into<Rc<B::Buffer>>) {
        self.register(resource);
        self.buffers.insert(resource.handle(), buffer.into());
    }

    /// Look up the render target bound to a virtual resource, and mark it as used this tick.
    /// # Errors
    /// * Fails with [`Error::ResourceNotFound`] if nothing is bound to this resource.
    pub fn get_render_target(&mut self, resource: &RenderTargetResource) -> Result<Rc<B::RenderTarget>> {
        let target = lookup!(self, render_targets, resource)?;
        if let Some(attachments) = self.attachments.get(&resource.handle()) {
            for attachment in attachments {
                if self.textures.contains_key(attachment) {
                    self.use_tick.insert(*attachment, self.tick);
                }
            }
        }
        Ok(target)
    }

    /// Look up the texture bound to a virtual resource, and mark it as used this tick.
    /// # Errors
    /// * Fails with [`Error::ResourceNotFound`] if nothing is bound to this resource.
    pub fn get_texture(&mut self, resource: &TextureResource) -> Result<Rc<B::Texture>> {
        lookup!(self, textures, resource)
    }

    /// Look up the buffer bound to a virtual resource, and mark it as used this tick.
    /// # Errors
    /// * Fails with [`Error::ResourceNotFound`] if nothing is bound to this resource.
    pub fn get_buffer(&mut self, resource: &BufferResource) -> Result<Rc<B::Buffer>> {
        lookup!(self, buffers, resource)
    }

    /// Create a texture through the backend and bind it to the resource.
    pub fn create_texture(&mut self, resource: &TextureResource) -> Result<Rc<B::Texture>> {
        let texture = Rc::new(self.backend.create_texture(resource)?);
        self.set_texture(resource, texture.clone());
        Ok(texture)
    }

    /// Create a render target through the backend and bind it to the resource. Every attachment is created first
    /// and bound to its own texture resource.
    pub fn create_render_target(&mut self, resource: &RenderTargetResource) -> Result<Rc<B::RenderTarget>> {
        let color = resource
            .color_attachments()
            .iter()
            .map(|attachment| self.create_texture(attachment))
            .collect::<Result<Vec<_>>>()?;
        let depth = match resource.depth_attachment() {
            Some(attachment) => Some(self.create_texture(attachment)?),
            None => None,
        };
        let target = Rc::new(self.backend.create_render_target(resource, &color, depth.as_ref())?);
        self.set_render_target(resource, target.clone());
        let attachments = resource
            .color_attachments()
            .iter()
            .chain(resource.depth_attachment())
            .map(|attachment| attachment.handle())
            .collect();
        self.attachments.insert(resource.handle(), attachments);
        Ok(target)
    }

    /// Create a buffer through the backend and bind it to the resource.
    pub fn create_buffer(&mut self, resource: &BufferResource) -> Result<Rc<B::Buffer>> {
        let buffer = Rc::new(self.backend.create_buffer(resource)?);
        self.set_buffer(resource, buffer.clone());
        Ok(buffer)
    }

    /// Whether any object is bound to this handle.
    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.render_targets.contains_key(&handle) || self.textures.contains_key(&handle) || self.buffers.contains_key(&handle)
    }

    /// Store a named value that is not part of the resource graph, such as a shader or a lookup texture.
    /// An existing value with the same name is replaced.
    pub fn set_static_resource<T: Any>(&mut self, name: impl Into<String>, value: T) {
        self.static_storage.insert(name.into(), Box::new(value));
    }

    /// Get a named value stored with [`PipelineResources::set_static_resource`].
    /// # Errors
    /// * Fails with [`Error::StaticResourceNotFound`] if no value has this name.
    /// * Fails with [`Error::StaticResourceTypeMismatch`] if the value is not a `T`.
    pub fn get_static_resource<T: Any>(&self, name: &str) -> Result<&T> {
        let value = self
            .static_storage
            .get(name)
            .ok_or_else(|| Error::StaticResourceNotFound(name.to_owned()))?;
        value.downcast_ref::<T>().ok_or_else(|| {
            anyhow::Error::from(Error::StaticResourceTypeMismatch {
                name: name.to_owned(),
                expected: type_name::<T>(),
            })
        })
    }

    /// Get a named value, creating it with `factory` if it does not exist yet. The factory is called at most once
    /// per name, and its error is returned unmodified.
    pub fn cache_static_resource<T: Any, F: FnOnce(&B) -> Result<T>>(&mut self, name: &str, factory: F) -> Result<&T> {
        if !self.static_storage.contains_key(name) {
            let value = factory(&self.backend)?;
            self.static_storage.insert(name.to_owned(), Box::new(value));
        }
        self.get_static_resource(name)
    }

    /// Remove a named value, returning whether it existed.
    pub fn remove_static_resource(&mut self, name: &str) -> bool {
        self.static_storage.remove(name).is_some()
    }

    /// Set the tick index used to mark resources as used. Called by the render pipeline before executing passes.
    pub fn set_current_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Get the tick index used to mark resources as used.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the last tick at which the object bound to this handle was looked up.
    pub fn last_used_tick(&self, handle: ResourceHandle) -> Option<u64> {
        self.use_tick.get(&handle).copied()
    }

    /// Evict every object that was last used before the current tick, together with the attachments of evicted render
    /// targets. Returns the amount of evicted objects.
    pub fn collect_garbage(&mut self) -> usize {
        let tick = self.tick;
        let mut stale = self
            .use_tick
            .iter()
            .filter(|(_, last_used)| **last_used < tick)
            .map(|(&handle, _)| handle)
            .collect::<Vec<_>>();
        let owned = stale
            .iter()
            .filter_map(|handle| self.attachments.remove(handle))
            .flatten()
            .collect::<Vec<_>>();
        for attachment in owned {
            if !stale.contains(&attachment) && self.contains(attachment) {
                stale.push(attachment);
            }
        }

        for handle in &stale {
            self.use_tick.remove(handle);
            self.attachments.remove(handle);
            self.render_targets.remove(handle);
            self.textures.remove(handle);
            self.buffers.remove(handle);
            let _name = self.names.remove(handle);
            #[cfg(feature = "log-objects")]
            trace!("Evicted backing object for `{}` ({handle})", _name.unwrap_or_default());
        }
        if !stale.is_empty() {
            debug!("Collected {} backing object(s) unused since before tick {tick}", stale.len());
        }
        stale.len()
    }
}
