use graphfront_common::Model;

use crate::handle::PluginHandle;

/// Copies a module-produced model into host-owned storage.
///
/// Node lists, variables and the friendly name are rebuilt from the source,
/// rt_info is copied entry for entry, and `handle` (if any) is attached so the
/// producing module stays loaded for as long as the copy lives. The copy is
/// not revalidated here.
pub fn transplant(source: &Model, handle: Option<&PluginHandle>) -> Model {
    let mut copy = Model::from_parts(
        source.friendly_name(),
        source.nodes().to_vec(),
        source.parameters().to_vec(),
        source.results().to_vec(),
        source.sinks().to_vec(),
        source.variables().to_vec(),
    );
    *copy.rt_info_mut() = source.rt_info().clone();
    if let Some(handle) = handle {
        copy.set_shared_object(handle.keep_alive());
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphfront_common::{Node, NodeId, Variable};
    use serde_json::json;

    fn source() -> Model {
        let mut model = Model::new("src");
        let x = model.add_parameter("x", "f32", vec![1, 4]);
        let add = model.add_node(Node::new("add", "Add").with_inputs([x, x]));
        model.add_result("out", add);
        model.add_variable(Variable::new("state"));
        model.add_sink("assign", add, "state");
        model.rt_info_mut().insert("version".into(), json!(11));
        model.rt_info_mut().insert("conversion".into(), json!({"input_shape": [1, 4]}));
        model
    }

    #[test]
    fn copy_is_structurally_equal() {
        let src = source();
        let copy = transplant(&src, None);

        assert!(copy.structurally_equal(&src));
        assert_eq!(copy.rt_info(), src.rt_info());
        assert_eq!(copy.sinks(), src.sinks());
        assert_eq!(copy.variables(), src.variables());
        assert!(!copy.has_shared_object());
    }

    #[test]
    fn repeated_transplants_are_independent() {
        let src = source();
        let mut first = transplant(&src, None);
        let second = transplant(&src, None);

        assert!(first.structurally_equal(&second));

        first.node_mut(NodeId(1)).unwrap().op_type = "Multiply".into();
        first.rt_info_mut().insert("version".into(), json!(12));

        assert_eq!(second.node(NodeId(1)).unwrap().op_type, "Add");
        assert_eq!(second.rt_info()["version"], json!(11));
        assert_eq!(src.node(NodeId(1)).unwrap().op_type, "Add");
    }

    #[test]
    fn source_shared_object_is_not_carried_over() {
        let mut src = source();
        src.set_shared_object(std::sync::Arc::new("plugin-internal"));
        let copy = transplant(&src, None);
        assert!(!copy.has_shared_object());
    }
}
