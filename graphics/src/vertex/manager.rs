//! Shared vertex buffer format cache.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use opaline_core::geometry::{GeometryFlags, Topology};
use parking_lot::Mutex;

use crate::error::ProgramError;
use crate::shader::VertexAttributeType;

use super::VertexBufferFormat;

/// Cache key of a vertex buffer format.
pub fn vertex_format_key(topology: Topology, flags: GeometryFlags, instancing: bool) -> u64 {
    let mut hasher = DefaultHasher::new();
    topology.hash(&mut hasher);
    flags.hash(&mut hasher);
    instancing.hash(&mut hasher);
    hasher.finish()
}

/// Get-or-create cache of vertex buffer formats.
#[derive(Debug, Default)]
pub struct VertexBufferFormatManager {
    formats: Mutex<HashMap<u64, Arc<VertexBufferFormat>>>,
}

impl VertexBufferFormatManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the format feeding `required` attributes from a geometry.
    ///
    /// Per-instance attributes add the instance buffer. Any other attribute
    /// must be provided by the geometry.
    pub fn get_vertex_buffer_format(
        &self,
        topology: Topology,
        flags: GeometryFlags,
        required: &[VertexAttributeType],
    ) -> Result<Arc<VertexBufferFormat>, ProgramError> {
        if let Some(missing) = required
            .iter()
            .find(|attribute| !attribute.is_per_instance() && !attribute.is_provided_by(flags))
        {
            let err = ProgramError::IncompatibleVertexFormat(format!(
                "geometry {flags:?} does not provide '{missing}'"
            ));
            log::error!("{err}");
            return Err(err);
        }

        let instancing = required.iter().any(|attribute| attribute.is_per_instance());
        let key = vertex_format_key(topology, flags, instancing);

        let mut formats = self.formats.lock();
        let format = formats
            .entry(key)
            .or_insert_with(|| Arc::new(VertexBufferFormat::new(topology, flags, instancing)));

        Ok(Arc::clone(format))
    }

    pub fn len(&self) -> usize {
        self.formats.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.lock().is_empty()
    }
}
