//! Built program cache.

use std::collections::HashMap;
use std::sync::Arc;

use opaline_core::events::{EventChannel, SubscriptionId};
use parking_lot::Mutex;

use crate::error::ProgramError;
use crate::program::Program;
use crate::render_target::RenderTargetEvent;

/// Identity of a built program.
///
/// A program depends on the generator, the render target it draws into,
/// the geometry feeding it and the material shading it. `variant` carries
/// generator-specific options such as the render pass type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    pub generator: String,
    pub render_target: String,
    pub geometry: String,
    pub material: String,
    pub variant: u64,
}

impl ProgramKey {
    pub fn new(generator: impl Into<String>, render_target: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            render_target: render_target.into(),
            geometry: String::new(),
            material: String::new(),
            variant: 0,
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<String>) -> Self {
        self.geometry = geometry.into();
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    pub fn with_variant(mut self, variant: u64) -> Self {
        self.variant = variant;
        self
    }
}

/// Get-or-build cache of programs.
///
/// Programs bake the render target's extent into their viewport state, so
/// they are dropped when their render target is resized or destroyed.
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: Mutex<HashMap<ProgramKey, Arc<Program>>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ProgramKey) -> Option<Arc<Program>> {
        self.programs.lock().get(key).cloned()
    }

    /// Fetch a program, building it on a miss.
    ///
    /// The build runs without holding the cache lock. Failed builds are not
    /// cached; if another build published the same key first, that program
    /// wins.
    pub fn get_or_build<F>(&self, key: ProgramKey, build: F) -> Result<Arc<Program>, ProgramError>
    where
        F: FnOnce() -> Result<Arc<Program>, ProgramError>,
    {
        if let Some(program) = self.get(&key) {
            return Ok(program);
        }

        let program = build()?;
        let mut programs = self.programs.lock();
        let cached = Arc::clone(programs.entry(key).or_insert(program));
        opaline_core::profile_plot!("cached_programs", programs.len());
        Ok(cached)
    }

    pub fn insert(&self, key: ProgramKey, program: Arc<Program>) {
        if self.programs.lock().insert(key, program).is_some() {
            log::warn!("A cached program has been replaced");
        }
    }

    /// Drop every program built for a render target. Returns how many were
    /// dropped.
    pub fn invalidate_render_target(&self, identifier: &str) -> usize {
        let mut programs = self.programs.lock();
        let before = programs.len();
        programs.retain(|key, _| key.render_target != identifier);
        let removed = before - programs.len();
        if removed > 0 {
            log::debug!("{removed} program(s) of render target '{identifier}' invalidated");
        }
        removed
    }

    pub fn handle_render_target_event(&self, event: &RenderTargetEvent) -> usize {
        self.invalidate_render_target(event.identifier())
    }

    /// Invalidate programs on every event published to `channel`.
    pub fn subscribe_to(
        self: &Arc<Self>,
        channel: &EventChannel<RenderTargetEvent>,
    ) -> SubscriptionId {
        let cache = Arc::downgrade(self);
        channel.subscribe(move |event| {
            if let Some(cache) = cache.upgrade() {
                cache.handle_render_target_event(event);
            }
        })
    }

    pub fn len(&self) -> usize {
        self.programs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.lock().is_empty()
    }

    pub fn clear(&self) {
        self.programs.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_target::Extent2D;

    fn program(name: &str) -> Result<Arc<Program>, ProgramError> {
        Ok(Arc::new(Program::new(name)))
    }

    #[test]
    fn test_get_or_build_caches() {
        let cache = ProgramCache::new();
        let key = ProgramKey::new("Scene", "Main").with_geometry("Cube");

        let a = cache.get_or_build(key.clone(), || program("A")).unwrap();
        let b = cache
            .get_or_build(key, || panic!("cached program must be reused"))
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_failed_build_not_cached() {
        let cache = ProgramCache::new();
        let key = ProgramKey::new("Scene", "Main");

        let result = cache.get_or_build(key.clone(), || Err(ProgramError::MissingVertexStage));
        assert_eq!(result.err(), Some(ProgramError::MissingVertexStage));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_resize_invalidates_target() {
        let cache = Arc::new(ProgramCache::new());
        cache.insert(ProgramKey::new("Scene", "Main"), Arc::new(Program::new("A")));
        cache.insert(
            ProgramKey::new("Scene", "Main").with_material("Red"),
            Arc::new(Program::new("B")),
        );
        cache.insert(ProgramKey::new("Scene", "Shadow"), Arc::new(Program::new("C")));

        let channel = EventChannel::new();
        cache.subscribe_to(&channel);
        channel.publish(&RenderTargetEvent::Resized {
            identifier: "Main".to_string(),
            extent: Extent2D::new(1280, 720),
        });

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&ProgramKey::new("Scene", "Shadow")).is_some());
    }

    #[test]
    fn test_destroyed_event() {
        let cache = ProgramCache::new();
        cache.insert(ProgramKey::new("Scene", "Main"), Arc::new(Program::new("A")));

        let removed = cache.handle_render_target_event(&RenderTargetEvent::Destroyed {
            identifier: "Main".to_string(),
        });
        assert_eq!(removed, 1);
        assert!(cache.is_empty());
    }
}
