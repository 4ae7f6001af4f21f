//! End-to-end behavior of the paint collision proxies

mod frames;

use std::sync::Arc;

use crate::assets::StaticMesh;
use crate::config::PaintConfig;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Transform, Vec3};
use crate::paint::ProxySynchronizer;
use crate::scene::{NodeDestroyListener, PaintScene, SceneTree};

/// Scene with a shared cube mesh and a synchronizer built from `config`
struct Fixture {
    tree: SceneTree,
    cube: Arc<StaticMesh>,
    sync: ProxySynchronizer,
}

impl Fixture {
    fn new(config: &PaintConfig) -> Self {
        Self {
            tree: SceneTree::new(),
            cube: Arc::new(StaticMesh::cube("cube")),
            sync: ProxySynchronizer::new(config),
        }
    }

    fn with_defaults() -> Self {
        Self::new(&PaintConfig::default())
    }

    fn add_cube(&mut self, position: Vec3) -> NodeId {
        let root = self.tree.root();
        self.tree
            .add_mesh_node(root, "cube", Transform::from_position(position), Arc::clone(&self.cube))
            .expect("root exists")
    }

    fn update(&mut self) {
        self.sync.update(Some(&self.tree));
    }

    fn tracked(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.sync.registry().nodes().collect();
        nodes.sort();
        nodes
    }

    fn visible(&self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.tree.visit_visible_meshes(&mut |instance| nodes.push(instance.node));
        nodes.sort();
        nodes
    }
}

/// Routes scene destroy notifications straight to a synchronizer
struct ForwardDestroy<'a>(&'a mut ProxySynchronizer);

impl NodeDestroyListener for ForwardDestroy<'_> {
    fn on_node_destroyed(&mut self, node: NodeId) {
        self.0.handle_node_destroy(node);
    }
}
