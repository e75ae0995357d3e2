use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::NodeId;

/// Arbitrary runtime metadata attached to a model.
pub type RtInfo = BTreeMap<String, serde_json::Value>;

/// Opaque keep-alive reference held by a model for the module that produced it.
pub type SharedObject = Arc<dyn Any + Send + Sync>;

/// Attribute key a sink node uses to name the variable it writes.
pub const VARIABLE_ID_ATTR: &str = "variable_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Parameter,
    Result,
    Sink,
    Constant,
    Operation,
    /// Framework operation left untranslated by a partial conversion.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub op_type: String,
    pub role: NodeRole,
    #[serde(default)]
    pub inputs: Vec<NodeId>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub element_type: Option<String>,
    /// Output shape; `-1` marks a dynamic dimension.
    #[serde(default)]
    pub shape: Option<Vec<i64>>,
}

impl Node {
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            role: NodeRole::Operation,
            inputs: Vec::new(),
            attributes: BTreeMap::new(),
            element_type: None,
            shape: None,
        }
    }

    /// A node kept in its framework form, to be translated later.
    pub fn placeholder(name: impl Into<String>, framework_op: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Placeholder,
            ..Self::new(name, framework_op)
        }
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = NodeId>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_output(mut self, element_type: impl Into<String>, shape: Vec<i64>) -> Self {
        self.element_type = Some(element_type.into());
        self.shape = Some(shape);
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.role == NodeRole::Placeholder
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    #[serde(default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub shape: Option<Vec<i64>>,
}

impl Variable {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type: None,
            shape: None,
        }
    }
}

/// Converted graph.
///
/// Nodes live in an arena owned by the model; parameters, results and sinks are
/// ordered lists of indices into it. Cloning a model therefore never shares node
/// storage with the original.
#[derive(Clone, Serialize)]
pub struct Model {
    friendly_name: String,
    nodes: Vec<Node>,
    parameters: Vec<NodeId>,
    results: Vec<NodeId>,
    sinks: Vec<NodeId>,
    variables: Vec<Variable>,
    rt_info: RtInfo,
    #[serde(skip)]
    shared_object: Option<SharedObject>,
}

impl Model {
    pub fn new(friendly_name: impl Into<String>) -> Self {
        Self {
            friendly_name: friendly_name.into(),
            nodes: Vec::new(),
            parameters: Vec::new(),
            results: Vec::new(),
            sinks: Vec::new(),
            variables: Vec::new(),
            rt_info: RtInfo::new(),
            shared_object: None,
        }
    }

    /// Builds a model from already laid out parts. No consistency checks are made.
    pub fn from_parts(
        friendly_name: impl Into<String>,
        nodes: Vec<Node>,
        parameters: Vec<NodeId>,
        results: Vec<NodeId>,
        sinks: Vec<NodeId>,
        variables: Vec<Variable>,
    ) -> Self {
        Self {
            friendly_name: friendly_name.into(),
            nodes,
            parameters,
            results,
            sinks,
            variables,
            rt_info: RtInfo::new(),
            shared_object: None,
        }
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn set_friendly_name(&mut self, name: impl Into<String>) {
        self.friendly_name = name.into();
    }

    /// Appends a node, registering it as a parameter, result or sink according to its role.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        match node.role {
            NodeRole::Parameter => self.parameters.push(id),
            NodeRole::Result => self.results.push(id),
            NodeRole::Sink => self.sinks.push(id),
            _ => {}
        }
        self.nodes.push(node);
        id
    }

    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        element_type: impl Into<String>,
        shape: Vec<i64>,
    ) -> NodeId {
        self.add_node(
            Node::new(name, "Parameter")
                .with_role(NodeRole::Parameter)
                .with_output(element_type, shape),
        )
    }

    pub fn add_result(&mut self, name: impl Into<String>, input: NodeId) -> NodeId {
        self.add_node(
            Node::new(name, "Result")
                .with_role(NodeRole::Result)
                .with_inputs([input]),
        )
    }

    /// Adds a sink writing `input` into the declared variable `variable_id`.
    pub fn add_sink(
        &mut self,
        name: impl Into<String>,
        input: NodeId,
        variable_id: impl Into<String>,
    ) -> NodeId {
        self.add_node(
            Node::new(name, "Assign")
                .with_role(NodeRole::Sink)
                .with_inputs([input])
                .with_attribute(VARIABLE_ID_ATTR, serde_json::Value::String(variable_id.into())),
        )
    }

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn node_by_name(&self, name: &str) -> Option<(NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| n.name == name)
            .map(|(i, n)| (NodeId(i), n))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn parameters(&self) -> &[NodeId] {
        &self.parameters
    }

    pub fn results(&self) -> &[NodeId] {
        &self.results
    }

    pub fn sinks(&self) -> &[NodeId] {
        &self.sinks
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn rt_info(&self) -> &RtInfo {
        &self.rt_info
    }

    pub fn rt_info_mut(&mut self) -> &mut RtInfo {
        &mut self.rt_info
    }

    /// Nodes still in framework form.
    pub fn placeholders(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_placeholder())
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn is_fully_converted(&self) -> bool {
        !self.nodes.iter().any(Node::is_placeholder)
    }

    /// Swaps the node at `id` in place, keeping its role bookkeeping.
    pub fn replace_node(&mut self, id: NodeId, mut node: Node) -> Result<Node> {
        let slot = self
            .nodes
            .get_mut(id.0)
            .ok_or_else(|| Error::general(format!("no node {id} in model")))?;
        // Role lists are indexed by position; a replacement may not move a node between them.
        if matches!(
            slot.role,
            NodeRole::Parameter | NodeRole::Result | NodeRole::Sink
        ) {
            node.role = slot.role;
        } else if matches!(
            node.role,
            NodeRole::Parameter | NodeRole::Result | NodeRole::Sink
        ) {
            node.role = NodeRole::Operation;
        }
        Ok(std::mem::replace(slot, node))
    }

    pub fn set_shared_object(&mut self, shared_object: SharedObject) {
        self.shared_object = Some(shared_object);
    }

    pub fn shared_object(&self) -> Option<&SharedObject> {
        self.shared_object.as_ref()
    }

    pub fn has_shared_object(&self) -> bool {
        self.shared_object.is_some()
    }

    /// Equality of everything except the keep-alive reference.
    pub fn structurally_equal(&self, other: &Model) -> bool {
        self.friendly_name == other.friendly_name
            && self.nodes == other.nodes
            && self.parameters == other.parameters
            && self.results == other.results
            && self.sinks == other.sinks
            && self.variables == other.variables
            && self.rt_info == other.rt_info
    }

    /// Checks node references, role lists and variable references.
    pub fn validate(&self) -> Result<()> {
        for node in &self.nodes {
            for input in &node.inputs {
                if input.0 >= self.nodes.len() {
                    return Err(Error::op_validation(
                        &node.name,
                        format!("input {input} does not exist"),
                    ));
                }
            }
            if let Some(shape) = &node.shape {
                if shape.iter().any(|d| *d < -1) {
                    return Err(Error::op_validation(
                        &node.name,
                        format!("invalid shape {shape:?}"),
                    ));
                }
            }
        }

        self.validate_role_list(&self.parameters, NodeRole::Parameter)?;
        self.validate_role_list(&self.results, NodeRole::Result)?;
        self.validate_role_list(&self.sinks, NodeRole::Sink)?;

        for id in &self.parameters {
            let node = &self.nodes[id.0];
            if !node.inputs.is_empty() {
                return Err(Error::op_validation(&node.name, "parameter has inputs"));
            }
        }
        for id in &self.results {
            let node = &self.nodes[id.0];
            if node.inputs.len() != 1 {
                return Err(Error::op_validation(
                    &node.name,
                    format!("result expects 1 input, got {}", node.inputs.len()),
                ));
            }
        }
        for id in &self.sinks {
            let node = &self.nodes[id.0];
            if let Some(variable) = node.attributes.get(VARIABLE_ID_ATTR) {
                let declared = variable
                    .as_str()
                    .is_some_and(|v| self.variables.iter().any(|decl| decl.id == v));
                if !declared {
                    return Err(Error::op_validation(
                        &node.name,
                        format!("sink writes undeclared variable {variable}"),
                    ));
                }
            }
        }

        Ok(())
    }

    fn validate_role_list(&self, ids: &[NodeId], role: NodeRole) -> Result<()> {
        for id in ids {
            let node = self.nodes.get(id.0).ok_or_else(|| {
                Error::op_validation(id.to_string(), format!("{role:?} list references missing node"))
            })?;
            if node.role != role {
                return Err(Error::op_validation(
                    &node.name,
                    format!("listed as {role:?} but has role {:?}", node.role),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("friendly_name", &self.friendly_name)
            .field("nodes", &self.nodes.len())
            .field("parameters", &self.parameters)
            .field("results", &self.results)
            .field("sinks", &self.sinks)
            .field("variables", &self.variables)
            .field("rt_info", &self.rt_info)
            .field("has_shared_object", &self.shared_object.is_some())
            .finish()
    }
}
