use std::collections::BTreeMap;
use std::path::Path;

use graphfront_common::{Model, RtInfo, Variant};
use serde::Serialize;

/// What `graphfront convert` prints for a converted model.
#[derive(Debug, Serialize)]
pub struct ModelSummary<'a> {
    pub name: &'a str,
    pub frontend: String,
    pub nodes: usize,
    pub parameters: Vec<&'a str>,
    pub results: Vec<&'a str>,
    pub sinks: usize,
    pub variables: usize,
    pub fully_converted: bool,
    pub placeholders: Vec<&'a str>,
    pub op_types: BTreeMap<&'a str, usize>,
    pub rt_info: &'a RtInfo,
}

impl<'a> ModelSummary<'a> {
    pub fn new(model: &'a Model, frontend: String) -> Self {
        let name_of = |ids: &[graphfront_common::NodeId]| -> Vec<&'a str> {
            ids.iter()
                .filter_map(|id| model.node(*id))
                .map(|n| n.name.as_str())
                .collect()
        };

        let mut op_types = BTreeMap::new();
        for node in model.nodes() {
            *op_types.entry(node.op_type.as_str()).or_insert(0) += 1;
        }

        Self {
            name: model.friendly_name(),
            frontend,
            nodes: model.nodes().len(),
            parameters: name_of(model.parameters()),
            results: name_of(model.results()),
            sinks: model.sinks().len(),
            variables: model.variables().len(),
            fully_converted: model.is_fully_converted(),
            placeholders: name_of(&model.placeholders()),
            op_types,
            rt_info: model.rt_info(),
        }
    }
}

/// Existing files are passed as paths, anything else as text.
pub fn input_variants(inputs: &[String]) -> Vec<Variant> {
    inputs
        .iter()
        .map(|input| {
            let path = Path::new(input);
            if path.exists() {
                Variant::from(path)
            } else {
                Variant::from(input.as_str())
            }
        })
        .collect()
}
