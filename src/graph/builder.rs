//! Setup-time interface of a render pipeline. Passes use it to create virtual resources and declare how they use them.

use std::rc::Rc;

use anyhow::Result;
use multimap::MultiMap;

use crate::backend::traits::{Backend, Buffer, Texture};
use crate::graph::pass::PassId;
use crate::graph::physical_resource::PipelineResources;
use crate::graph::virtual_resource::*;
use crate::Error;

/// Declared resource usage of every pass, stored as adjacency lists in both directions.
/// This is only bookkeeping, the [`ScheduleMode`](crate::ScheduleMode) decides whether it affects execution order.
#[derive(Debug, Default, Clone)]
pub struct PassEdges {
    writes: MultiMap<PassId, ResourceHandle>,
    reads: MultiMap<PassId, ResourceHandle>,
    writers: MultiMap<ResourceHandle, PassId>,
    readers: MultiMap<ResourceHandle, PassId>,
}

fn insert_unique<K: std::hash::Hash + Eq, V: PartialEq>(map: &mut MultiMap<K, V>, key: K, value: V) -> bool {
    if map.get_vec(&key).map_or(false, |values| values.contains(&value)) {
        return false;
    }
    map.insert(key, value);
    true
}

fn remove_value<K: std::hash::Hash + Eq, V: PartialEq>(map: &mut MultiMap<K, V>, value: &V) {
    map.retain(|_, v| v != value);
}

impl PassEdges {
    pub(crate) fn add_write(&mut self, pass: PassId, resource: ResourceHandle) {
        if insert_unique(&mut self.writes, pass, resource) {
            self.writers.insert(resource, pass);
        }
    }

    pub(crate) fn add_read(&mut self, pass: PassId, resource: ResourceHandle) {
        if insert_unique(&mut self.reads, pass, resource) {
            self.readers.insert(resource, pass);
        }
    }

    /// Forget every usage declared by this pass.
    pub(crate) fn remove_pass(&mut self, pass: PassId) {
        self.writes.remove(&pass);
        self.reads.remove(&pass);
        remove_value(&mut self.writers, &pass);
        remove_value(&mut self.readers, &pass);
    }

    /// Resources written by a pass, in declaration order.
    pub fn writes_of(&self, pass: PassId) -> &[ResourceHandle] {
        self.writes.get_vec(&pass).map_or(&[], |v| v.as_slice())
    }

    /// Resources read by a pass, in declaration order.
    pub fn reads_of(&self, pass: PassId) -> &[ResourceHandle] {
        self.reads.get_vec(&pass).map_or(&[], |v| v.as_slice())
    }

    /// Passes writing a resource, in registration order.
    pub fn writers_of(&self, resource: ResourceHandle) -> &[PassId] {
        self.writers.get_vec(&resource).map_or(&[], |v| v.as_slice())
    }

    /// Passes reading a resource, in registration order.
    pub fn readers_of(&self, resource: ResourceHandle) -> &[PassId] {
        self.readers.get_vec(&resource).map_or(&[], |v| v.as_slice())
    }

    /// Every resource with at least one declared writer.
    pub fn written_resources(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.writers.keys().copied()
    }

    /// Every resource with at least one declared reader.
    pub fn read_resources(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.readers.keys().copied()
    }
}

/// Creates virtual resources and records declared resource usage. Obtained in [`RenderPass::setup`](crate::RenderPass::setup),
/// or by dereferencing a [`RenderPipeline`](crate::RenderPipeline).
pub struct GraphBuilder<'r, B: Backend> {
    resources: &'r mut PipelineResources<B>,
    table: Vec<AnyResource>,
    edges: PassEdges,
    current_pass: Option<PassId>,
}

impl<'r, B: Backend> GraphBuilder<'r, B> {
    pub(crate) fn new(resources: &'r mut PipelineResources<B>) -> Self {
        Self {
            resources,
            table: vec![],
            edges: PassEdges::default(),
            current_pass: None,
        }
    }

    pub(crate) fn begin_pass(&mut self, pass: PassId) {
        self.current_pass = Some(pass);
    }

    pub(crate) fn end_pass(&mut self) {
        self.current_pass = None;
    }

    pub(crate) fn edges_mut(&mut self) -> &mut PassEdges {
        &mut self.edges
    }

    fn next_resource_handle(&mut self) -> ResourceHandle {
        self.resources.allocate_handle()
    }

    fn position(&self, handle: ResourceHandle) -> Option<usize> {
        self.table.binary_search_by_key(&handle, |resource| resource.handle()).ok()
    }

    /// Create any kind of virtual resource from its description. The returned resource has a handle that is unique
    /// within the backing store, so it never collides with resources of other pipelines sharing it.
    pub fn create_resource<R: CreateResource>(&mut self, name: impl Into<String>, desc: R::Descriptor) -> R {
        let handle = self.next_resource_handle();
        let resource = R::from_descriptor(handle, name.into(), desc);
        self.table.push(resource.clone().into());
        resource
    }

    /// Create a render target. No concrete object is bound to it, a pass must do this before it is read.
    pub fn create_render_target(&mut self, name: impl Into<String>, width: u32, height: u32) -> RenderTargetResource {
        self.create_resource(name, RenderTargetDesc::new(width, height))
    }

    /// Create a render target with the same size and content scale as an existing concrete render target.
    pub fn create_render_target_like(&mut self, name: impl Into<String>, template: &B::RenderTarget) -> RenderTargetResource {
        self.create_resource(name, RenderTargetDesc::like(template))
    }

    /// Create a render target and immediately bind an externally owned concrete render target to it.
    pub fn import_render_target(
        &mut self,
        name: impl Into<String>,
        target: impl Into<Rc<B::RenderTarget>>,
    ) -> RenderTargetResource {
        let target = target.into();
        let resource = self.create_resource(name, RenderTargetDesc::like(&*target));
        self.resources.set_render_target(&resource, target);
        resource
    }

    /// Create a texture.
    pub fn create_texture(&mut self, name: impl Into<String>, width: u32, height: u32, options: TextureOptions) -> TextureResource {
        self.create_resource(name, TextureDesc { width, height, options })
    }

    /// Create a texture and immediately bind an externally owned concrete texture to it.
    pub fn import_texture(&mut self, name: impl Into<String>, texture: impl Into<Rc<B::Texture>>) -> TextureResource {
        let texture = texture.into();
        let resource = self.create_texture(name, texture.width(), texture.height(), TextureOptions::default());
        self.resources.set_texture(&resource, texture);
        resource
    }

    /// Create a buffer.
    pub fn create_buffer(&mut self, name: impl Into<String>, size: u64) -> BufferResource {
        self.create_resource(name, BufferDesc { size })
    }

    /// Create a buffer and immediately bind an externally owned concrete buffer to it.
    pub fn import_buffer(&mut self, name: impl Into<String>, buffer: impl Into<Rc<B::Buffer>>) -> BufferResource {
        let buffer = buffer.into();
        let resource = self.create_buffer(name, buffer.size());
        self.resources.set_buffer(&resource, buffer);
        resource
    }

    /// Create a texture with the size of the render target, and append it to its color attachments.
    pub fn create_color_attachment(
        &mut self,
        target: &mut RenderTargetResource,
        name: impl Into<String>,
        options: TextureOptions,
    ) -> TextureResource {
        let texture = self.create_texture(name, target.width, target.height, options);
        target.color_attachments.push(texture.clone());
        self.update_render_target(target);
        texture
    }

    /// Create a texture with the size of the render target, and set it as its depth attachment. A previous depth
    /// attachment is replaced.
    pub fn create_depth_attachment(&mut self, target: &mut RenderTargetResource, options: TextureOptions) -> TextureResource {
        let name = format!("{}.depth", target.name);
        let texture = self.create_texture(name, target.width, target.height, options);
        target.depth_attachment = Some(texture.clone());
        self.update_render_target(target);
        texture
    }

    fn update_render_target(&mut self, target: &RenderTargetResource) {
        if let Some(index) = self.position(target.handle) {
            self.table[index] = AnyResource::RenderTarget(target.clone());
        }
    }

    /// Declare that the pass currently being set up writes to this resource.
    /// # Errors
    /// * Fails with [`Error::NoActivePass`] if called outside of [`RenderPass::setup`](crate::RenderPass::setup).
    pub fn writes(&mut self, resource: &impl VirtualResource) -> Result<()> {
        let pass = self.current_pass.ok_or(Error::NoActivePass)?;
        self.edges.add_write(pass, resource.handle());
        Ok(())
    }

    /// Declare that the pass currently being set up reads from this resource.
    /// # Errors
    /// * Fails with [`Error::NoActivePass`] if called outside of [`RenderPass::setup`](crate::RenderPass::setup).
    pub fn reads(&mut self, resource: &impl VirtualResource) -> Result<()> {
        let pass = self.current_pass.ok_or(Error::NoActivePass)?;
        self.edges.add_read(pass, resource.handle());
        Ok(())
    }

    /// The pass currently being set up, if any.
    pub fn current_pass(&self) -> Option<PassId> {
        self.current_pass
    }

    /// Declared resource usage of all passes.
    pub fn edges(&self) -> &PassEdges {
        &self.edges
    }

    /// Look up a resource created in this graph.
    pub fn resource(&self, handle: ResourceHandle) -> Option<&AnyResource> {
        self.position(handle).map(|index| &self.table[index])
    }

    /// All resources created in this graph, in creation order.
    pub fn resources(&self) -> impl Iterator<Item = &AnyResource> {
        self.table.iter()
    }

    /// Amount of resources created in this graph.
    pub fn resource_count(&self) -> usize {
        self.table.len()
    }

    /// Get the backing store of this graph.
    pub fn resources_mut(&mut self) -> &mut PipelineResources<B> {
        &mut *self.resources
    }

    /// Get shared access to the backing store of this graph.
    pub fn backing_store(&self) -> &PipelineResources<B> {
        &*self.resources
    }
}
