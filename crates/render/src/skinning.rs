use glam::Mat4;
use vista_scene::{Bone, SceneGraph};

/// Bone palette for one draw: entry `i` is `node.absolute * bones[i].offset`.
///
/// Reads absolute transforms, so the graph must have been updated for this
/// frame. Bones whose node no longer exists contribute their offset alone.
pub fn compute_bone_transforms(graph: &SceneGraph, bones: &[Bone]) -> Vec<Mat4> {
    let mut out = Vec::with_capacity(bones.len());
    compute_bone_transforms_into(graph, bones, &mut out);
    out
}

/// Same as [`compute_bone_transforms`], reusing `out`'s allocation.
pub fn compute_bone_transforms_into(graph: &SceneGraph, bones: &[Bone], out: &mut Vec<Mat4>) {
    out.clear();
    out.extend(bones.iter().map(|bone| match graph.absolute(bone.node) {
        Some(absolute) => absolute * bone.offset,
        None => {
            tracing::warn!(node = %bone.node, "bone bound to missing node");
            bone.offset
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use vista_scene::{Node, NodeId};

    #[test]
    fn palette_follows_animated_nodes() {
        let mut graph = SceneGraph::new();
        let hip = graph
            .add_child(
                NodeId::ROOT,
                Node::empty("hip").with_local(Mat4::from_translation(Vec3::Y)),
            )
            .unwrap();
        let knee = graph
            .add_child(
                hip,
                Node::empty("knee").with_local(Mat4::from_quat(Quat::from_rotation_z(0.5))),
            )
            .unwrap();
        graph.update_absolute_transforms(Mat4::IDENTITY);

        let offset = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let bones = [Bone::new(hip, Mat4::IDENTITY), Bone::new(knee, offset)];
        let palette = compute_bone_transforms(&graph, &bones);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0], Mat4::from_translation(Vec3::Y));
        assert_eq!(
            palette[1],
            graph.node(knee).unwrap().absolute() * offset
        );
    }

    #[test]
    fn palette_is_recomputed_each_call() {
        let mut graph = SceneGraph::new();
        let hip = graph.add_child(NodeId::ROOT, Node::empty("hip")).unwrap();
        graph.update_absolute_transforms(Mat4::IDENTITY);
        let bones = [Bone::new(hip, Mat4::IDENTITY)];
        let first = compute_bone_transforms(&graph, &bones);

        graph.node_mut(hip).unwrap().local = Mat4::from_translation(Vec3::X);
        graph.update_absolute_transforms(Mat4::IDENTITY);
        let second = compute_bone_transforms(&graph, &bones);
        assert_ne!(first, second);
    }

    #[test]
    fn missing_node_falls_back_to_offset() {
        let graph = SceneGraph::new();
        let offset = Mat4::from_scale(Vec3::splat(2.0));
        let palette = compute_bone_transforms(&graph, &[Bone::new(NodeId(99), offset)]);
        assert_eq!(palette, vec![offset]);
    }
}
