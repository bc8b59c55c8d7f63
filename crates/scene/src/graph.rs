use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use vista_common::Transform;

use crate::model::{Billboard, MeshPart};

/// Index of a node in its [`SceneGraph`]. Ids of removed nodes are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("moving {node} under {new_parent} would make it its own ancestor")]
    WouldCreateCycle { node: NodeId, new_parent: NodeId },
    #[error("the root node cannot be reparented or removed")]
    RootCannotBeReparented,
}

/// What a node contributes to a frame.
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    /// Grouping or bone node; only its transform matters.
    #[default]
    Empty,
    Mesh(Vec<MeshPart>),
    Billboard(Billboard),
}

impl NodeKind {
    /// Whether the renderer has anything to draw for this node.
    pub fn is_renderable(&self) -> bool {
        match self {
            NodeKind::Empty => false,
            NodeKind::Mesh(parts) => !parts.is_empty(),
            NodeKind::Billboard(_) => true,
        }
    }

    pub fn parts(&self) -> &[MeshPart] {
        match self {
            NodeKind::Empty => &[],
            NodeKind::Mesh(parts) => parts,
            NodeKind::Billboard(b) => std::slice::from_ref(&b.part),
        }
    }

    pub fn parts_mut(&mut self) -> &mut [MeshPart] {
        match self {
            NodeKind::Empty => &mut [],
            NodeKind::Mesh(parts) => parts,
            NodeKind::Billboard(b) => std::slice::from_mut(&mut b.part),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Empty => "empty",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Billboard(_) => "billboard",
        }
    }
}

/// One entry of the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Transform relative to the parent.
    pub local: Mat4,
    pub kind: NodeKind,
    absolute: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            local: Mat4::IDENTITY,
            kind,
            absolute: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Empty)
    }

    pub fn mesh(name: impl Into<String>, parts: Vec<MeshPart>) -> Self {
        Self::new(name, NodeKind::Mesh(parts))
    }

    pub fn with_local(mut self, local: Mat4) -> Self {
        self.local = local;
        self
    }

    pub fn with_transform(self, transform: Transform) -> Self {
        self.with_local(transform.to_matrix())
    }

    /// World transform as of the last [`SceneGraph::update_absolute_transforms`].
    pub fn absolute(&self) -> Mat4 {
        self.absolute
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed node tree.
///
/// # Invariants
/// - Every node except the root has exactly one parent, and appears exactly
///   once in that parent's child list.
/// - The parent relation is acyclic: [`SceneGraph::reparent`] rejects moves
///   that would make a node its own ancestor.
/// - Absolute transforms are only valid after
///   [`SceneGraph::update_absolute_transforms`]; editing `local` does not
///   refresh them.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
    live: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::empty("root"))],
            live: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.get(id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Live node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Attach `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(Some(node));
        self.live += 1;
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(Node::parent);
        }
        false
    }

    /// Move `node` (and its subtree) under `new_parent`.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if node == NodeId::ROOT {
            return Err(SceneError::RootCannotBeReparented);
        }
        let old_parent = self.node(node)?.parent;
        self.node(new_parent)?;
        if self.is_ancestor(node, new_parent) {
            return Err(SceneError::WouldCreateCycle { node, new_parent });
        }
        if let Some(old) = old_parent.and_then(|p| self.get_mut(p)) {
            old.children.retain(|&c| c != node);
        }
        self.node_mut(new_parent)?.children.push(node);
        self.node_mut(node)?.parent = Some(new_parent);
        tracing::debug!(%node, %new_parent, "node reparented");
        Ok(())
    }

    /// Subtree of `id` in depth-first pre-order, `id` first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Remove `id` and its subtree. Bones pointing into the removed subtree
    /// resolve to nothing from then on.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == NodeId::ROOT {
            return Err(SceneError::RootCannotBeReparented);
        }
        let parent = self.node(id)?.parent;
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|&c| c != id);
        }
        let removed = self.descendants(id);
        for n in &removed {
            self.nodes[n.index()] = None;
        }
        self.live -= removed.len();
        tracing::debug!(node = %id, removed = removed.len(), "subtree removed");
        Ok(removed.len())
    }

    /// Copy the subtree at `source` under `new_parent`. Bones inside the copy
    /// that pointed into the source subtree point at the copied nodes.
    pub fn instantiate(&mut self, source: NodeId, new_parent: NodeId) -> Result<NodeId, SceneError> {
        self.node(new_parent)?;
        let originals = self.descendants(source);
        if originals.is_empty() {
            return Err(SceneError::UnknownNode(source));
        }

        let mut remap = HashMap::with_capacity(originals.len());
        for &original in &originals {
            let node = self.node(original)?;
            let parent = if original == source {
                new_parent
            } else {
                let p = node.parent.ok_or(SceneError::UnknownNode(original))?;
                *remap.get(&p).ok_or(SceneError::UnknownNode(p))?
            };
            let copy = Node::new(node.name.clone(), node.kind.clone()).with_local(node.local);
            let id = self.add_child(parent, copy)?;
            remap.insert(original, id);
        }

        for &copy in remap.values() {
            let node = self.node_mut(copy)?;
            for part in node.kind.parts_mut() {
                for bone in part.bones_mut() {
                    if let Some(&mapped) = remap.get(&bone.node) {
                        bone.node = mapped;
                    }
                }
            }
        }

        let root = *remap.get(&source).ok_or(SceneError::UnknownNode(source))?;
        tracing::debug!(%source, copy = %root, nodes = originals.len(), "subtree instantiated");
        Ok(root)
    }

    /// Recompute every absolute transform top-down from the root, with
    /// `parent` standing in for the root's parent.
    pub fn update_absolute_transforms(&mut self, parent: Mat4) {
        let mut stack = vec![(NodeId::ROOT, parent)];
        while let Some((id, parent_absolute)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            node.absolute = parent_absolute * node.local;
            let absolute = node.absolute;
            stack.extend(node.children.iter().map(|&c| (c, absolute)));
        }
    }

    /// Absolute transform of `id`, if it is still alive.
    pub fn absolute(&self, id: NodeId) -> Option<Mat4> {
        self.get(id).map(Node::absolute)
    }

    /// Depth of `id` below the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(Node::parent);
        while let Some(p) = current {
            depth += 1;
            current = self.get(p).and_then(Node::parent);
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bone, Material};
    use glam::{Quat, Vec3};
    use vista_device::{HeadlessDevice, MeshData};

    fn chain() -> (SceneGraph, NodeId, NodeId, Mat4, Mat4, Mat4) {
        let mut graph = SceneGraph::new();
        let t_root = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.3),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let t_a = Mat4::from_rotation_translation(
            Quat::from_rotation_x(-0.7),
            Vec3::new(0.0, 5.0, 0.0),
        );
        let t_b = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_z(1.1),
            Vec3::new(-4.0, 0.0, 1.0),
        );
        graph.node_mut(NodeId::ROOT).unwrap().local = t_root;
        let a = graph
            .add_child(NodeId::ROOT, Node::empty("a").with_local(t_a))
            .unwrap();
        let b = graph.add_child(a, Node::empty("b").with_local(t_b)).unwrap();
        (graph, a, b, t_root, t_a, t_b)
    }

    #[test]
    fn three_level_chain_composes_parent_first() {
        let (mut graph, a, b, t_root, t_a, t_b) = chain();
        graph.update_absolute_transforms(Mat4::IDENTITY);
        assert_eq!(graph.node(a).unwrap().absolute(), t_root * t_a);
        assert_eq!(graph.node(b).unwrap().absolute(), t_root * t_a * t_b);
    }

    #[test]
    fn absolute_is_stale_until_update() {
        let (mut graph, a, _, _, _, _) = chain();
        graph.update_absolute_transforms(Mat4::IDENTITY);
        let before = graph.node(a).unwrap().absolute();
        graph.node_mut(a).unwrap().local = Mat4::from_translation(Vec3::X * 100.0);
        assert_eq!(graph.node(a).unwrap().absolute(), before);
        graph.update_absolute_transforms(Mat4::IDENTITY);
        assert_ne!(graph.node(a).unwrap().absolute(), before);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let (mut graph, a, b, ..) = chain();
        assert_eq!(
            graph.reparent(a, b),
            Err(SceneError::WouldCreateCycle {
                node: a,
                new_parent: b
            })
        );
        assert_eq!(
            graph.reparent(a, a),
            Err(SceneError::WouldCreateCycle {
                node: a,
                new_parent: a
            })
        );
        assert_eq!(
            graph.reparent(NodeId::ROOT, a),
            Err(SceneError::RootCannotBeReparented)
        );
    }

    #[test]
    fn reparent_moves_subtree() {
        let (mut graph, a, b, ..) = chain();
        graph.reparent(b, NodeId::ROOT).unwrap();
        assert!(graph.node(a).unwrap().children().is_empty());
        assert_eq!(graph.node(b).unwrap().parent(), Some(NodeId::ROOT));
        assert_eq!(graph.depth(b), 1);
    }

    #[test]
    fn unknown_nodes_are_reported() {
        let mut graph = SceneGraph::new();
        assert_eq!(
            graph.add_child(NodeId(42), Node::empty("x")),
            Err(SceneError::UnknownNode(NodeId(42)))
        );
    }

    #[test]
    fn remove_drops_subtree() {
        let (mut graph, a, b, ..) = chain();
        assert_eq!(graph.remove(a).unwrap(), 2);
        assert!(!graph.contains(b));
        assert!(graph.is_empty());
        assert!(graph.node(NodeId::ROOT).unwrap().children().is_empty());
    }

    #[test]
    fn instantiate_copies_and_remaps_bones() {
        let mut device = HeadlessDevice::new(4, 4);
        let mut graph = SceneGraph::new();
        let model = graph.add_child(NodeId::ROOT, Node::empty("model")).unwrap();
        let bone_node = graph.add_child(model, Node::empty("hip")).unwrap();
        let part = MeshPart::from_data(&mut device, &MeshData::cube(1.0), Material::default())
            .with_bones(vec![Bone::new(bone_node, Mat4::IDENTITY)]);
        graph.add_child(model, Node::mesh("skin", vec![part])).unwrap();

        let copy = graph.instantiate(model, NodeId::ROOT).unwrap();
        assert_eq!(graph.len(), 7);
        let copied = graph.descendants(copy);
        assert_eq!(copied.len(), 3);
        let (copied_hip, copied_skin) = (copied[1], copied[2]);
        assert_eq!(graph.node(copied_hip).unwrap().name, "hip");
        let bone = graph.node(copied_skin).unwrap().kind.parts()[0].bones()[0];
        assert_eq!(bone.node, copied_hip);

        // the source keeps its own binding
        let original_skin = graph.node(model).unwrap().children()[1];
        let bone = graph.node(original_skin).unwrap().kind.parts()[0].bones()[0];
        assert_eq!(bone.node, bone_node);
    }

    #[test]
    fn kinds_report_renderable() {
        assert!(!NodeKind::Empty.is_renderable());
        assert!(!NodeKind::Mesh(Vec::new()).is_renderable());
        assert_eq!(NodeKind::Empty.parts().len(), 0);
    }
}
