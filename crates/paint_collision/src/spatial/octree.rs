//! Octree spatial partitioning structure
//!
//! Divides the world bounds into hierarchical regions for fast broadphase
//! queries. Each node subdivides into 8 octants when object density exceeds a
//! threshold. Objects are filed by the centre of their bounding box; queries
//! expand node bounds by the largest half-extent seen so far to catch objects
//! that spill over into neighbouring octants.

use serde::{Deserialize, Serialize};

use crate::foundation::collections::ObjectId;
use crate::foundation::math::Vec3;
use crate::physics::collision::{Aabb, Ray};

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Maximum objects per node before subdivision
    pub max_entities_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_entities_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Object stored in the octree with its world bounds
#[derive(Debug, Clone, Copy)]
pub struct OctreeEntry {
    /// Owning world object
    pub id: ObjectId,
    /// World-space bounds at insertion time
    pub bounds: Aabb,
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: Aabb,

    /// Objects filed directly in this node
    pub entries: Vec<OctreeEntry>,

    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl OctreeNode {
    /// Create a new leaf node
    pub const fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    // Octant layout: bit 0 = +X, bit 1 = +Y, bit 2 = +Z
    fn octant_index(center: &Vec3, position: &Vec3) -> usize {
        usize::from(position.x >= center.x)
            | usize::from(position.y >= center.y) << 1
            | usize::from(position.z >= center.z) << 2
    }

    /// Subdivide this node into 8 children and push existing entries down
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let center = self.bounds.center();
        let quarter_extents = self.bounds.extents() * 0.5;
        let depth = self.depth + 1;

        let children: [Self; 8] = std::array::from_fn(|octant| {
            let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
            let child_center = center
                + Vec3::new(
                    quarter_extents.x * sign(1),
                    quarter_extents.y * sign(2),
                    quarter_extents.z * sign(4),
                );
            Self::new(Aabb::from_center_extents(child_center, quarter_extents), depth)
        });
        let mut children = Box::new(children);

        for entry in std::mem::take(&mut self.entries) {
            children[Self::octant_index(&center, &entry.bounds.center())]
                .entries
                .push(entry);
        }

        self.children = Some(children);
    }

    /// Insert an entry into this node; `false` if its centre lies outside
    pub fn insert(&mut self, entry: OctreeEntry, config: &OctreeConfig) -> bool {
        let position = entry.bounds.center();
        if !self.bounds.contains_point(position) {
            return false;
        }

        if self.is_leaf() {
            let should_subdivide = self.entries.len() >= config.max_entities_per_node
                && self.depth < config.max_depth
                && self.bounds.extents().x > config.min_node_size;

            if !should_subdivide {
                self.entries.push(entry);
                return true;
            }
            self.subdivide();
        }

        let center = self.bounds.center();
        match self.children {
            Some(ref mut children) => children[Self::octant_index(&center, &position)].insert(entry, config),
            None => false,
        }
    }

    /// Remove an entry from this node or its children
    pub fn remove(&mut self, id: ObjectId) -> bool {
        if let Some(index) = self.entries.iter().position(|e| e.id == id) {
            self.entries.swap_remove(index);
            return true;
        }

        self.children
            .as_mut()
            .is_some_and(|children| children.iter_mut().any(|child| child.remove(id)))
    }

    /// Collect entries whose bounds overlap `query`
    pub fn query_aabb(&self, query: &Aabb, expansion: &Vec3, results: &mut Vec<ObjectId>) {
        if !self.bounds.expanded(*expansion).intersects(query) {
            return;
        }

        results.extend(
            self.entries
                .iter()
                .filter(|e| e.bounds.intersects(query))
                .map(|e| e.id),
        );

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_aabb(query, expansion, results);
            }
        }
    }

    /// Collect entries whose bounds the ray passes through
    pub fn query_ray(&self, ray: &Ray, expansion: &Vec3, results: &mut Vec<ObjectId>) {
        // Expanded so entries straddling this node from a neighbour are still reached
        if self.bounds.expanded(*expansion).intersect_ray(ray).is_none() {
            return;
        }

        results.extend(
            self.entries
                .iter()
                .filter(|e| e.bounds.intersect_ray(ray).is_some())
                .map(|e| e.id),
        );

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query_ray(ray, expansion, results);
            }
        }
    }

    /// Count total entries in this node and all children
    pub fn count_entries(&self) -> usize {
        self.entries.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(Self::count_entries).sum())
    }
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree {
    /// Root node containing the entire world space
    pub root: OctreeNode,

    config: OctreeConfig,

    /// Largest half-extent of any entry ever inserted (never shrinks)
    max_half_extents: Vec3,
}

impl Octree {
    /// Create a new octree with given world bounds
    pub fn new(world_bounds: Aabb, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::new(world_bounds, 0),
            config,
            max_half_extents: Vec3::zeros(),
        }
    }

    /// World bounds covered by the tree
    pub const fn bounds(&self) -> &Aabb {
        &self.root.bounds
    }

    /// Insert an object; `false` when its centre lies outside the world bounds
    pub fn insert(&mut self, id: ObjectId, bounds: Aabb) -> bool {
        let inserted = self.root.insert(OctreeEntry { id, bounds }, &self.config);
        if inserted {
            self.max_half_extents = self.max_half_extents.sup(&bounds.extents());
        }
        inserted
    }

    /// Remove an object from the octree
    pub fn remove(&mut self, id: ObjectId) -> bool {
        self.root.remove(id)
    }

    /// All objects whose bounds overlap `query`
    pub fn query_aabb(&self, query: &Aabb) -> Vec<ObjectId> {
        let mut results = Vec::new();
        self.root.query_aabb(query, &self.max_half_extents, &mut results);
        results
    }

    /// All objects whose bounds the ray passes through
    ///
    /// Candidates only; narrowphase testing is up to the caller.
    pub fn query_ray(&self, ray: &Ray) -> Vec<ObjectId> {
        let mut results = Vec::new();
        self.root.query_ray(ray, &self.max_half_extents, &mut results);
        results
    }

    /// Get total entry count
    pub fn entity_count(&self) -> usize {
        self.root.count_entries()
    }

    /// Clear the octree
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.bounds, 0);
        self.max_half_extents = Vec3::zeros();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::SlotMap;

    fn world_bounds() -> Aabb {
        Aabb::new(Vec3::new(-100.0, -100.0, -100.0), Vec3::new(100.0, 100.0, 100.0))
    }

    fn cube_at(center: Vec3, half: f32) -> Aabb {
        Aabb::from_center_extents(center, Vec3::repeat(half))
    }

    #[test]
    fn test_octree_basic_insertion() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let mut octree = Octree::new(world_bounds(), OctreeConfig::default());

        assert!(octree.insert(ids.insert(()), cube_at(Vec3::zeros(), 1.0)));
        assert!(!octree.insert(ids.insert(()), cube_at(Vec3::new(500.0, 0.0, 0.0), 1.0)));
        assert_eq!(octree.entity_count(), 1);
    }

    #[test]
    fn test_octree_subdivision() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let config = OctreeConfig {
            max_entities_per_node: 4,
            max_depth: 3,
            min_node_size: 1.0,
        };
        let mut octree = Octree::new(world_bounds(), config);

        for _ in 0..10 {
            octree.insert(ids.insert(()), cube_at(Vec3::zeros(), 1.0));
        }

        assert_eq!(octree.entity_count(), 10);
        assert!(octree.root.children.is_some());
    }

    #[test]
    fn test_straddling_entry_found_from_neighbour_octant() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let config = OctreeConfig {
            max_entities_per_node: 1,
            ..OctreeConfig::default()
        };
        let mut octree = Octree::new(world_bounds(), config);

        // Large box filed in the +X octant but reaching well into -X
        let wide = ids.insert(());
        octree.insert(wide, cube_at(Vec3::new(5.0, 5.0, 5.0), 20.0));
        octree.insert(ids.insert(()), cube_at(Vec3::new(-50.0, -50.0, -50.0), 1.0));

        let hits = octree.query_aabb(&cube_at(Vec3::new(-10.0, 0.0, 0.0), 0.5));
        assert_eq!(hits, vec![wide]);
    }

    #[test]
    fn test_remove_and_ray_query() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let mut octree = Octree::new(world_bounds(), OctreeConfig::default());

        let near = ids.insert(());
        let off_axis = ids.insert(());
        octree.insert(near, cube_at(Vec3::new(0.0, 0.0, -10.0), 1.0));
        octree.insert(off_axis, cube_at(Vec3::new(30.0, 0.0, -10.0), 1.0));

        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(octree.query_ray(&ray), vec![near]);

        assert!(octree.remove(near));
        assert!(!octree.remove(near));
        assert!(octree.query_ray(&ray).is_empty());
    }
}
