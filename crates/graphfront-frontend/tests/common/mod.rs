#![allow(dead_code)]

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use graphfront_common::{Error, Model, Node, NodeId, Result, RtInfo, Variant};
use graphfront_frontend::abi::ABI_VERSION;
use graphfront_frontend::extension::{DecoderTransformationExtension, TelemetryExtension};
use graphfront_frontend::{
    Extension, ExtensionKind, FrontendImpl, InputModelImpl, Module, ModuleLoader, downcast_input,
};
use serde_json::json;

pub type FrontendFactory = Arc<dyn Fn() -> Box<dyn FrontendImpl> + Send + Sync>;
pub type ExtensionsFactory = Arc<dyn Fn() -> Vec<Arc<dyn Extension>> + Send + Sync>;

/// Load/unload counts for one in-memory module.
#[derive(Debug, Default)]
pub struct ModuleStats {
    loads: AtomicUsize,
    unloads: AtomicUsize,
}

impl ModuleStats {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn unloads(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.loads() > self.unloads()
    }
}

#[derive(Clone)]
pub struct FakeModule {
    abi_version: u32,
    frontend: Option<FrontendFactory>,
    extensions: Option<ExtensionsFactory>,
    load_delay: Duration,
}

impl FakeModule {
    pub fn frontend(factory: impl Fn() -> Box<dyn FrontendImpl> + Send + Sync + 'static) -> Self {
        Self {
            abi_version: ABI_VERSION,
            frontend: Some(Arc::new(factory)),
            extensions: None,
            load_delay: Duration::ZERO,
        }
    }

    pub fn extensions(
        factory: impl Fn() -> Vec<Arc<dyn Extension>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            abi_version: ABI_VERSION,
            frontend: None,
            extensions: Some(Arc::new(factory)),
            load_delay: Duration::ZERO,
        }
    }

    pub fn abi_version(mut self, version: u32) -> Self {
        self.abi_version = version;
        self
    }

    pub fn load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }
}

/// Serves registered in-memory modules in place of shared libraries.
#[derive(Default)]
pub struct StaticLoader {
    modules: HashMap<PathBuf, (FakeModule, Arc<ModuleStats>)>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<PathBuf>, module: FakeModule) -> Arc<ModuleStats> {
        let stats = Arc::new(ModuleStats::default());
        self.modules.insert(path.into(), (module, Arc::clone(&stats)));
        stats
    }
}

impl ModuleLoader for StaticLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Module>> {
        let (module, stats) = self
            .modules
            .get(path)
            .ok_or_else(|| Error::initialization(format!("no module at {}", path.display())))?;
        std::thread::sleep(module.load_delay);
        stats.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticModule {
            module: module.clone(),
            stats: Arc::clone(stats),
        }))
    }
}

struct StaticModule {
    module: FakeModule,
    stats: Arc<ModuleStats>,
}

impl Drop for StaticModule {
    fn drop(&mut self) {
        self.stats.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

impl Module for StaticModule {
    fn abi_version(&self) -> u32 {
        self.module.abi_version
    }

    fn create_frontend(&self) -> Result<Box<dyn FrontendImpl>> {
        let factory = self
            .module
            .frontend
            .as_ref()
            .ok_or_else(|| Error::initialization("module does not export a frontend"))?;
        Ok(factory())
    }

    fn create_extensions(&self) -> Result<Vec<Arc<dyn Extension>>> {
        let factory = self
            .module
            .extensions
            .as_ref()
            .ok_or_else(|| Error::initialization("module does not export extensions"))?;
        Ok(factory())
    }
}

/// Input model of the fake format: a chain of op types.
#[derive(Debug)]
pub struct FakeInput {
    pub name: String,
    pub ops: Vec<String>,
}

impl InputModelImpl for FakeInput {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Op types the fake frontend translates natively.
pub const KNOWN_OPS: &[&str] = &["Relu", "Sigmoid", "Add", "Conv"];

/// A format whose inputs are text like `fake:net:Relu,Sigmoid`.
///
/// Supports probe, load, convert, convert_partially, convert_in_place and
/// normalize; decode only when built with [`FakeFrontend::decoding`]. Telemetry extensions receive one
/// `op_converted` event per converted op node, decoder transformations run on
/// every converted model and conversion extensions translate unknown ops.
pub struct FakeFrontend {
    name: String,
    metadata: RtInfo,
    extensions: Vec<Arc<dyn Extension>>,
    decodes: bool,
}

impl FakeFrontend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Self::metadata(),
            extensions: Vec::new(),
            decodes: false,
        }
    }

    /// A variant that also decodes, keeping every op in framework form.
    pub fn decoding(name: &str) -> Box<dyn FrontendImpl> {
        Box::new(Self {
            decodes: true,
            ..Self::new(name)
        })
    }

    pub fn boxed(name: &str) -> Box<dyn FrontendImpl> {
        Box::new(Self::new(name))
    }

    /// rt_info every converted model carries.
    pub fn metadata() -> RtInfo {
        let mut rt_info = RtInfo::new();
        rt_info.insert("framework".into(), json!("fake"));
        rt_info.insert("producer".into(), json!({"name": "fake-frontend", "version": 3}));
        rt_info.insert("legacy_names".into(), json!(["in", "out"]));
        rt_info
    }

    fn telemetry(&self) -> impl Iterator<Item = &TelemetryExtension> {
        self.extensions
            .iter()
            .filter_map(|e| e.downcast_ref::<TelemetryExtension>())
    }

    fn translate(&self, node: &Node, partial: bool) -> Result<Node> {
        if KNOWN_OPS.contains(&node.op_type.as_str()) {
            return Ok(node.clone());
        }
        for ext in &self.extensions {
            if let Some(conversion) = ext.as_conversion() {
                if conversion.op_type() == node.op_type {
                    return conversion.convert(node);
                }
            }
        }
        if partial {
            Ok(Node::placeholder(node.name.clone(), node.op_type.clone())
                .with_inputs(node.inputs.iter().copied()))
        } else {
            Err(Error::op_conversion(
                &node.name,
                format!("no converter for {}", node.op_type),
            ))
        }
    }

    fn build(&self, input: &FakeInput, partial: bool) -> Result<Model> {
        let mut model = Model::new(input.name.clone());
        let mut last = model.add_parameter("input", "f32", vec![1, 3, 224, 224]);
        for (i, op) in input.ops.iter().enumerate() {
            let framework_node = Node::new(format!("{}_{i}", op.to_lowercase()), op.clone())
                .with_inputs([last])
                .with_attribute("alpha", json!(0.1));
            let node = self.translate(&framework_node, partial)?;
            if !node.is_placeholder() {
                for telemetry in self.telemetry() {
                    telemetry.send_event("op_converted", &node.op_type, 1);
                }
            }
            last = model.add_node(node);
        }
        model.add_result("output", last);
        *model.rt_info_mut() = self.metadata.clone();

        for ext in &self.extensions {
            if let Some(pass) = ext.downcast_ref::<DecoderTransformationExtension>() {
                pass.apply(&mut model)?;
            }
        }
        Ok(model)
    }
}

impl FrontendImpl for FakeFrontend {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn probe(&self, inputs: &[Variant]) -> bool {
        inputs
            .first()
            .and_then(Variant::as_str)
            .is_some_and(|s| s.starts_with("fake:"))
    }

    fn load(&self, inputs: &[Variant]) -> Result<Box<dyn InputModelImpl>> {
        let text = inputs
            .first()
            .and_then(Variant::as_str)
            .and_then(|s| s.strip_prefix("fake:"))
            .ok_or_else(|| Error::general("expected fake:<name>:<ops> input"))?;
        let (name, ops) = text.split_once(':').unwrap_or((text, ""));
        Ok(Box::new(FakeInput {
            name: name.to_string(),
            ops: ops
                .split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }))
    }

    fn convert(&self, model: &dyn InputModelImpl) -> Result<Model> {
        self.build(downcast_input::<FakeInput>(model)?, false)
    }

    fn convert_partially(&self, model: &dyn InputModelImpl) -> Result<Model> {
        self.build(downcast_input::<FakeInput>(model)?, true)
    }

    fn decode(&self, model: &dyn InputModelImpl) -> Result<Model> {
        if !self.decodes {
            return Err(Error::not_implemented("decode"));
        }
        let input = downcast_input::<FakeInput>(model)?;
        let mut model = Model::new(input.name.clone());
        let mut last = model.add_parameter("input", "f32", vec![1, 3, 224, 224]);
        for (i, op) in input.ops.iter().enumerate() {
            last = model.add_node(
                Node::placeholder(format!("{}_{i}", op.to_lowercase()), op.clone())
                    .with_inputs([last]),
            );
        }
        model.add_result("output", last);
        *model.rt_info_mut() = self.metadata.clone();
        Ok(model)
    }

    fn convert_in_place(&self, model: &mut Model) -> Result<()> {
        for id in model.placeholders() {
            let node = model
                .node(id)
                .cloned()
                .ok_or_else(|| Error::general(format!("missing node {id}")))?;
            let converted = self.translate(&node, false)?;
            model.replace_node(id, converted)?;
        }
        Ok(())
    }

    fn normalize(&self, model: &mut Model) -> Result<()> {
        model.rt_info_mut().insert("normalized".into(), json!(true));
        Ok(())
    }

    fn add_extension(&mut self, extension: Arc<dyn Extension>) -> Result<()> {
        match extension.kind() {
            ExtensionKind::Telemetry
            | ExtensionKind::Conversion
            | ExtensionKind::DecoderTransformation => self.extensions.push(extension),
            _ => {}
        }
        Ok(())
    }
}

/// Telemetry extension collecting `action:label` strings.
pub fn recording_telemetry() -> (Arc<dyn Extension>, Arc<Mutex<Vec<String>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let ext = TelemetryExtension::new("fake").on_event(move |_, action, label, _| {
        sink.lock().unwrap().push(format!("{action}:{label}"));
    });
    (Arc::new(ext), events)
}

pub fn fake_input(text: &str) -> Vec<Variant> {
    vec![Variant::from(format!("fake:{text}"))]
}

pub fn op_types(model: &Model) -> Vec<String> {
    model.nodes().iter().map(|n| n.op_type.clone()).collect()
}

pub fn first_op(model: &Model) -> &Node {
    model.node(NodeId(1)).expect("model has an op node")
}
