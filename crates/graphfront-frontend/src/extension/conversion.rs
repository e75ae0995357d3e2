use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use graphfront_common::{Error, Node, Result};

use super::{Extension, ExtensionKind};

/// Translation of one framework operation type.
pub trait ConversionExtensionBase: Send + Sync {
    /// Framework operation type this extension handles.
    fn op_type(&self) -> &str;

    fn convert(&self, node: &Node) -> Result<Node>;
}

pub type ConverterFn = Arc<dyn Fn(&Node) -> Result<Node> + Send + Sync>;

/// Converts an operation type with a caller-supplied function.
pub struct ConversionExtension {
    op_type: String,
    converter: ConverterFn,
}

impl ConversionExtension {
    pub fn new(
        op_type: impl Into<String>,
        converter: impl Fn(&Node) -> Result<Node> + Send + Sync + 'static,
    ) -> Self {
        Self {
            op_type: op_type.into(),
            converter: Arc::new(converter),
        }
    }
}

impl ConversionExtensionBase for ConversionExtension {
    fn op_type(&self) -> &str {
        &self.op_type
    }

    fn convert(&self, node: &Node) -> Result<Node> {
        check_op_type(node, &self.op_type)?;
        (self.converter)(node)
    }
}

impl Extension for ConversionExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Conversion
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_conversion(&self) -> Option<&dyn ConversionExtensionBase> {
        Some(self)
    }
}

/// One-to-one mapping of a framework operation onto a target operation.
///
/// `attribute_names` maps target attribute names to the framework attribute
/// they are read from; a missing framework attribute fails the conversion of
/// that node. `attribute_values` are fixed target attributes.
#[derive(Debug, Clone)]
pub struct OpExtension {
    framework_type: String,
    target_type: String,
    attribute_names: BTreeMap<String, String>,
    attribute_values: BTreeMap<String, serde_json::Value>,
}

impl OpExtension {
    pub fn new(framework_type: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            framework_type: framework_type.into(),
            target_type: target_type.into(),
            attribute_names: BTreeMap::new(),
            attribute_values: BTreeMap::new(),
        }
    }

    pub fn map_attribute(mut self, target: impl Into<String>, framework: impl Into<String>) -> Self {
        self.attribute_names.insert(target.into(), framework.into());
        self
    }

    pub fn set_attribute(mut self, target: impl Into<String>, value: serde_json::Value) -> Self {
        self.attribute_values.insert(target.into(), value);
        self
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }
}

impl ConversionExtensionBase for OpExtension {
    fn op_type(&self) -> &str {
        &self.framework_type
    }

    fn convert(&self, node: &Node) -> Result<Node> {
        check_op_type(node, &self.framework_type)?;

        let mut converted = Node::new(node.name.clone(), self.target_type.clone())
            .with_inputs(node.inputs.iter().copied());
        converted.element_type = node.element_type.clone();
        converted.shape = node.shape.clone();

        for (target, framework) in &self.attribute_names {
            let value = node.attributes.get(framework).ok_or_else(|| {
                Error::op_conversion(
                    &node.name,
                    format!("missing attribute '{framework}' required by {}", self.target_type),
                )
            })?;
            converted.attributes.insert(target.clone(), value.clone());
        }
        for (target, value) in &self.attribute_values {
            converted.attributes.insert(target.clone(), value.clone());
        }
        Ok(converted)
    }
}

impl Extension for OpExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Conversion
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_conversion(&self) -> Option<&dyn ConversionExtensionBase> {
        Some(self)
    }
}

fn check_op_type(node: &Node, expected: &str) -> Result<()> {
    if node.op_type == expected {
        Ok(())
    } else {
        Err(Error::op_conversion(
            &node.name,
            format!("expected op type {expected}, got {}", node.op_type),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphfront_common::{ErrorKind, NodeId};
    use serde_json::json;

    #[test]
    fn op_extension_renames_and_maps_attributes() {
        let ext = OpExtension::new("LeakyRelu", "PRelu")
            .map_attribute("slope", "alpha")
            .set_attribute("version", json!("opset1"));
        let node = Node::placeholder("act", "LeakyRelu")
            .with_inputs([NodeId(0)])
            .with_attribute("alpha", json!(0.1))
            .with_output("f32", vec![1, 8]);

        let converted = ext.convert(&node).unwrap();
        assert_eq!(converted.op_type, "PRelu");
        assert_eq!(converted.name, "act");
        assert!(!converted.is_placeholder());
        assert_eq!(converted.inputs, vec![NodeId(0)]);
        assert_eq!(converted.attributes["slope"], json!(0.1));
        assert_eq!(converted.attributes["version"], json!("opset1"));
        assert_eq!(converted.shape, Some(vec![1, 8]));
    }

    #[test]
    fn op_extension_reports_missing_attribute_on_node() {
        let ext = OpExtension::new("LeakyRelu", "PRelu").map_attribute("slope", "alpha");
        let err = ext.convert(&Node::new("act", "LeakyRelu")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpConversionFailure);
        assert_eq!(err.node(), Some("act"));
    }

    #[test]
    fn conversion_extension_rejects_other_op_types() {
        let ext = ConversionExtension::new("Custom", |node| Ok(Node::new(node.name.clone(), "Abs")));
        assert_eq!(ext.convert(&Node::new("c", "Custom")).unwrap().op_type, "Abs");
        assert_eq!(
            ext.convert(&Node::new("d", "Other")).unwrap_err().node(),
            Some("d")
        );
    }

    #[test]
    fn both_expose_conversion_view() {
        let a: Arc<dyn Extension> = Arc::new(OpExtension::new("A", "B"));
        let b: Arc<dyn Extension> = Arc::new(ConversionExtension::new("C", |n| Ok(n.clone())));
        assert_eq!(a.as_conversion().map(|c| c.op_type()), Some("A"));
        assert_eq!(b.as_conversion().map(|c| c.op_type()), Some("C"));
        assert_eq!(a.kind(), ExtensionKind::Conversion);
    }
}
