//! Exposes the settings used to configure a [`RenderPipeline`](crate::RenderPipeline).

/// Decides in which order passes are executed.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScheduleMode {
    /// Execute passes in the order they were added. Declared reads and writes are only recorded.
    #[default]
    Registration,
    /// Order passes so that every writer of a resource runs before its readers.
    /// Passes without conflicting usages keep their registration order.
    Dependency,
}

/// Settings for a single render pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Pipeline name. Only used for diagnostics.
    pub name: String,
    /// Name given to the render target imported on construction.
    pub backbuffer_name: String,
    /// Execution order of the passes. See [`ScheduleMode`].
    pub schedule: ScheduleMode,
    /// Whether backing objects that were not used this tick are evicted after execution.
    pub collect_garbage: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            name: String::from("pipeline"),
            backbuffer_name: String::from("backbuffer"),
            schedule: ScheduleMode::default(),
            collect_garbage: true,
        }
    }
}

impl PipelineSettings {
    /// Start building settings from the defaults.
    pub fn builder() -> PipelineSettingsBuilder {
        PipelineSettingsBuilder::new()
    }
}

/// Convenience struct to easily create [`PipelineSettings`].
///
/// # Example
/// ```
/// use deimos::prelude::*;
///
/// let settings = PipelineSettings::builder()
///     .name("main")
///     .schedule(ScheduleMode::Dependency)
///     .collect_garbage(false)
///     .build();
/// assert_eq!(settings.backbuffer_name, "backbuffer");
/// ```
#[derive(Debug, Default)]
pub struct PipelineSettingsBuilder {
    inner: PipelineSettings,
}

impl PipelineSettingsBuilder {
    /// Create a new settings builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Sets the name of the imported backbuffer resource.
    pub fn backbuffer_name(mut self, name: impl Into<String>) -> Self {
        self.inner.backbuffer_name = name.into();
        self
    }

    /// Sets the pass schedule.
    pub fn schedule(mut self, schedule: ScheduleMode) -> Self {
        self.inner.schedule = schedule;
        self
    }

    /// Enable or disable garbage collection after each execution.
    pub fn collect_garbage(mut self, enabled: bool) -> Self {
        self.inner.collect_garbage = enabled;
        self
    }

    /// Build the resulting settings.
    pub fn build(self) -> PipelineSettings {
        self.inner
    }
}
