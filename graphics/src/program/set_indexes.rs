//! Logical uniform categories mapped to descriptor set numbers.

use std::fmt;

/// Uniform category bound as one descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetType {
    /// Camera data, one set per render target view.
    PerView,
    /// Light data, enabled for light passes.
    PerLight,
    /// Model matrices when they come from a uniform block.
    PerModel,
    /// Material data of one model layer.
    PerModelLayer,
}

impl SetType {
    /// Every category in binding order.
    pub const ALL: [SetType; 4] = [
        Self::PerView,
        Self::PerLight,
        Self::PerModel,
        Self::PerModelLayer,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Enabled categories of a program.
///
/// Enabled sets get consecutive numbers in [`SetType::ALL`] order, so a
/// program without a light set binds its model layer right after the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SetIndexes {
    enabled: [bool; 4],
}

impl SetIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_set(&mut self, set_type: SetType) {
        self.enabled[set_type.index()] = true;
    }

    pub fn is_enabled(&self, set_type: SetType) -> bool {
        self.enabled[set_type.index()]
    }

    /// Descriptor set number of a category.
    ///
    /// For a disabled category this is the number it would get if enabled.
    pub fn set(&self, set_type: SetType) -> u32 {
        self.enabled[..set_type.index()]
            .iter()
            .filter(|enabled| **enabled)
            .count() as u32
    }

    /// Number of enabled sets.
    pub fn set_count(&self) -> u32 {
        self.enabled.iter().filter(|enabled| **enabled).count() as u32
    }

    pub fn enabled_sets(&self) -> impl Iterator<Item = SetType> + '_ {
        SetType::ALL
            .into_iter()
            .filter(|set_type| self.is_enabled(*set_type))
    }
}
