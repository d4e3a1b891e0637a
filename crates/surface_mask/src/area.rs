//! Planting areas and their instance descriptors.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterConfig;
use crate::shape::Shape;

/// Opaque asset reference carried by a descriptor and passed through unchanged.
pub type AssetRef = String;

/// Stable handle of a descriptor within its planting area.
///
/// Handles are never reused by an area, so they stay valid across reordering and
/// removal of other descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorId(pub u32);

/// One candidate instance type within a planting area.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Descriptor {
    id: DescriptorId,
    /// Asset planted for accepted points.
    pub asset: AssetRef,
    /// Whether the per-item surface mask override is active.
    pub override_enabled: bool,
    /// Per-item surface mask filter; dormant unless enabled and allowed by the area.
    pub override_filter: Option<FilterConfig>,
}

impl Descriptor {
    /// Create a new descriptor without an override. Its id is assigned when it is added
    /// to an area.
    pub fn new(asset: impl Into<AssetRef>) -> Self {
        Self {
            id: DescriptorId(0),
            asset: asset.into(),
            override_enabled: false,
            override_filter: None,
        }
    }

    /// Set and enable a per-item override filter.
    pub fn with_override(mut self, filter: FilterConfig) -> Self {
        self.override_enabled = true;
        self.override_filter = Some(filter);
        self
    }

    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn set_asset(&mut self, asset: impl Into<AssetRef>) {
        self.asset = asset.into();
    }

    pub fn set_override_enabled(&mut self, enabled: bool) {
        self.override_enabled = enabled;
    }

    pub fn set_override_filter(&mut self, filter: Option<FilterConfig>) {
        self.override_filter = filter;
    }

    /// Mutable access to the override filter, creating a pass-all one if none is set.
    pub fn override_filter_mut(&mut self) -> &mut FilterConfig {
        self.override_filter.get_or_insert_with(FilterConfig::default)
    }
}

/// A region planted with an ordered list of descriptors.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlantingArea {
    /// Bounded region sampled for candidate points.
    pub shape: Shape,
    descriptors: Vec<Descriptor>,
    /// Filter applied to every descriptor without an active override.
    pub global_filter: FilterConfig,
    /// Whether descriptor overrides are honoured at all.
    pub allow_per_item_overrides: bool,
    next_descriptor_id: u32,
}

impl PlantingArea {
    /// Create a new area with no descriptors and a pass-all global filter.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            descriptors: Vec::new(),
            global_filter: FilterConfig::default(),
            allow_per_item_overrides: false,
            next_descriptor_id: 0,
        }
    }

    /// Add a single descriptor to the area.
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.push_descriptor(descriptor);
        self
    }

    /// Add multiple descriptors to the area.
    pub fn with_descriptors(mut self, descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
        for d in descriptors {
            self.push_descriptor(d);
        }
        self
    }

    /// Set the area-global filter.
    pub fn with_global_filter(mut self, filter: FilterConfig) -> Self {
        self.global_filter = filter;
        self
    }

    /// Set whether per-item overrides are honoured.
    pub fn with_per_item_overrides(mut self, allow: bool) -> Self {
        self.allow_per_item_overrides = allow;
        self
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn set_global_filter(&mut self, filter: FilterConfig) {
        self.global_filter = filter;
    }

    pub fn global_filter_mut(&mut self) -> &mut FilterConfig {
        &mut self.global_filter
    }

    pub fn set_allow_per_item_overrides(&mut self, allow: bool) {
        self.allow_per_item_overrides = allow;
    }

    /// Appends a descriptor and returns its newly assigned id.
    pub fn push_descriptor(&mut self, mut descriptor: Descriptor) -> DescriptorId {
        let id = DescriptorId(self.next_descriptor_id);
        self.next_descriptor_id += 1;
        descriptor.id = id;
        self.descriptors.push(descriptor);
        id
    }

    /// Replaces the whole descriptor list, returning the new ids in order.
    pub fn set_descriptors(
        &mut self,
        descriptors: impl IntoIterator<Item = Descriptor>,
    ) -> Vec<DescriptorId> {
        self.descriptors.clear();
        descriptors
            .into_iter()
            .map(|d| self.push_descriptor(d))
            .collect()
    }

    pub fn remove_descriptor(&mut self, id: DescriptorId) -> Result<Descriptor> {
        let index = self
            .index_of(id)
            .ok_or(Error::UnknownDescriptor { id })?;
        Ok(self.descriptors.remove(index))
    }

    /// Moves a descriptor to `index` in the evaluation order.
    pub fn move_descriptor(&mut self, id: DescriptorId, index: usize) -> Result<()> {
        let from = self
            .index_of(id)
            .ok_or(Error::UnknownDescriptor { id })?;
        let descriptor = self.descriptors.remove(from);
        let to = index.min(self.descriptors.len());
        self.descriptors.insert(to, descriptor);
        Ok(())
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, id: DescriptorId) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn descriptor_mut(&mut self, id: DescriptorId) -> Result<&mut Descriptor> {
        self.descriptors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Error::UnknownDescriptor { id })
    }

    /// Positional access, for tooling that addresses descriptors by list index.
    pub fn descriptor_at(&self, index: usize) -> Option<&Descriptor> {
        self.descriptors.get(index)
    }

    pub fn descriptor_at_mut(&mut self, index: usize) -> Option<&mut Descriptor> {
        self.descriptors.get_mut(index)
    }

    fn index_of(&self, id: DescriptorId) -> Option<usize> {
        self.descriptors.iter().position(|d| d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::filter::FilterMode;
    use crate::surface::SurfaceTag;

    fn area() -> PlantingArea {
        PlantingArea::new(Shape::cuboid(Vec3::ZERO, 16.0, 16.0, 16.0))
    }

    #[test]
    fn builder_sets_optional_fields() {
        let area = area()
            .with_descriptors(vec![Descriptor::new("flower"), Descriptor::new("grass")])
            .with_global_filter(FilterConfig::inclusion([SurfaceTag::new("a")]))
            .with_per_item_overrides(true);

        assert_eq!(area.descriptors().len(), 2);
        assert_eq!(area.global_filter.mode, FilterMode::Inclusion);
        assert!(area.allow_per_item_overrides);
        assert_eq!(area.descriptor_at(1).map(|d| d.asset.as_str()), Some("grass"));
    }

    #[test]
    fn descriptor_ids_survive_removal_and_reordering() {
        let mut area = area();
        let a = area.push_descriptor(Descriptor::new("a"));
        let b = area.push_descriptor(Descriptor::new("b"));
        let c = area.push_descriptor(Descriptor::new("c"));

        area.remove_descriptor(a).expect("a exists");
        area.move_descriptor(c, 0).expect("c exists");
        let d = area.push_descriptor(Descriptor::new("d"));

        let order: Vec<_> = area.descriptors().iter().map(|d| d.id()).collect();
        assert_eq!(order, vec![c, b, d]);
        assert_ne!(d, a);
        assert_eq!(area.descriptor(b).map(|d| d.asset.as_str()), Some("b"));
        assert!(matches!(
            area.remove_descriptor(a),
            Err(Error::UnknownDescriptor { .. })
        ));
    }

    #[test]
    fn override_filter_mut_creates_pass_all() {
        let mut d = Descriptor::new("a");
        assert!(d.override_filter.is_none());
        d.override_filter_mut().set_mode(FilterMode::Inclusion);
        assert_eq!(d.override_filter.as_ref().map(|f| f.mode), Some(FilterMode::Inclusion));
        assert!(!d.override_enabled);
    }

    #[test]
    fn set_descriptors_replaces_list() {
        let mut area = area().with_descriptor(Descriptor::new("old"));
        let ids = area.set_descriptors(vec![Descriptor::new("x"); 3]);
        assert_eq!(ids.len(), 3);
        assert_eq!(area.descriptors().len(), 3);
        assert!(area.descriptors().iter().all(|d| d.asset == "x"));
    }
}
