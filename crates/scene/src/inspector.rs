use serde::Serialize;

use crate::graph::NodeId;
use crate::scene::Scene;

/// Read-only queries over a scene for editor panels and debugging.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let graph = &scene.graph;
        let mesh_parts = graph
            .ids()
            .filter_map(|id| graph.get(id))
            .map(|n| n.kind.parts().len())
            .sum();
        SceneSummary {
            nodes: graph.len(),
            mesh_parts,
            lights: scene.lights.len(),
            water_tiles: scene.water.len(),
            terrain_tiles: scene.terrain.as_ref().map_or(0, |t| t.tiles().len()),
            has_skybox: scene.skybox.is_some(),
        }
    }

    /// Every node in depth-first order with its depth below the root.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeInfo> {
        let graph = &scene.graph;
        let mut out = Vec::with_capacity(graph.len());
        let mut stack = vec![(graph.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = graph.get(id) else {
                continue;
            };
            out.push(NodeInfo {
                id,
                depth,
                name: node.name.clone(),
                kind: node.kind.label(),
                parts: node.kind.parts().len(),
                position: node.absolute().w_axis.truncate().to_array(),
            });
            stack.extend(node.children().iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }

    /// Indented tree listing, one node per line.
    pub fn render_tree(scene: &Scene) -> String {
        Self::list_nodes(scene)
            .iter()
            .map(|n| format!("{}{}\n", "  ".repeat(n.depth), n))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub nodes: usize,
    pub mesh_parts: usize,
    pub lights: usize,
    pub water_tiles: usize,
    pub terrain_tiles: usize,
    pub has_skybox: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} parts={} lights={} water={} terrain_tiles={} skybox={}",
            self.nodes,
            self.mesh_parts,
            self.lights,
            self.water_tiles,
            self.terrain_tiles,
            self.has_skybox
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub depth: usize,
    pub name: String,
    pub kind: &'static str,
    pub parts: usize,
    /// Absolute translation as of the last transform update.
    pub position: [f32; 3],
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [{}] parts={} pos=({:.2}, {:.2}, {:.2})",
            self.id,
            self.name,
            self.kind,
            self.parts,
            self.position[0],
            self.position[1],
            self.position[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::graph::Node;
    use crate::model::{Material, MeshPart};
    use glam::{Mat4, Vec3};
    use vista_device::{HeadlessDevice, MeshData};

    fn scene() -> Scene {
        let mut device = HeadlessDevice::new(4, 4);
        let mut scene = Scene::new(Camera::default());
        let root = scene.graph.root();
        let group = scene
            .graph
            .add_child(
                root,
                Node::empty("group").with_local(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))),
            )
            .unwrap();
        let part = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default());
        scene
            .graph
            .add_child(group, Node::mesh("crate", vec![part]))
            .unwrap();
        scene.graph.update_absolute_transforms(Mat4::IDENTITY);
        scene
    }

    #[test]
    fn summary_counts_parts() {
        let summary = SceneInspector::summary(&scene());
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.mesh_parts, 1);
        assert!(summary.to_string().contains("parts=1"));
    }

    #[test]
    fn nodes_listed_depth_first() {
        let nodes = SceneInspector::list_nodes(&scene());
        let names: Vec<_> = nodes.iter().map(|n| (n.name.as_str(), n.depth)).collect();
        assert_eq!(names, vec![("root", 0), ("group", 1), ("crate", 2)]);
        assert_eq!(nodes[2].position, [1.0, 2.0, 3.0]);
        assert_eq!(nodes[2].kind, "mesh");
    }

    #[test]
    fn tree_is_indented() {
        let tree = SceneInspector::render_tree(&scene());
        assert!(tree.lines().nth(2).unwrap().starts_with("    #2 crate"));
    }
}
