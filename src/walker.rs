//! Enumeration of every location in a model that can carry an element type.
//!
//! The walker visits, for each graph (including subgraphs held in node
//! attributes, training graphs and model-local functions):
//! - constants (`initializer`, and the values of `sparse_initializer`),
//! - interface declarations (`input`, `output`),
//! - intermediate declarations (`value_info`),
//! - node attributes holding tensors or type protos,
//! - the `to` attribute of `Cast` nodes.

use crate::onnx;
use crate::tensor_view::TensorView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SiteKind {
    Constant,
    SparseConstant,
    Input,
    Output,
    Intermediate,
    AttributeTensor,
    AttributeType,
    CastTarget,
}

/// One visited location: what it is and where it lives in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub kind: SiteKind,
    pub location: String,
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.location, self.kind)
    }
}

pub trait SiteVisitor {
    fn visit_tensor(&mut self, site: &Site, tensor: TensorView<'_>);
    fn visit_elem_type(&mut self, site: &Site, elem_type: &mut i32);
    fn visit_cast_target(&mut self, site: &Site, to: &mut i64);
}

fn is_cast(node: &onnx::NodeProto) -> bool {
    node.op_type == "Cast" && (node.domain.is_empty() || node.domain == "ai.onnx")
}

pub struct GraphWalker<'v, V: SiteVisitor> {
    visitor: &'v mut V,
    scope: Vec<String>,
}

impl<'v, V: SiteVisitor> GraphWalker<'v, V> {
    pub fn new(visitor: &'v mut V) -> Self {
        Self {
            visitor,
            scope: vec![],
        }
    }

    pub fn walk_model(visitor: &'v mut V, model: &mut onnx::ModelProto) {
        let mut walker = Self::new(visitor);
        if let Some(graph) = model.graph.as_mut() {
            walker.walk_graph(graph);
        }
        for (i, info) in model.training_info.iter_mut().enumerate() {
            walker.scope.push(format!("training_info[{i}]"));
            if let Some(graph) = info.initialization.as_mut() {
                walker.scoped("initialization".to_string(), |w| w.walk_graph(graph));
            }
            if let Some(graph) = info.algorithm.as_mut() {
                walker.scoped("algorithm".to_string(), |w| w.walk_graph(graph));
            }
            walker.scope.pop();
        }
        for function in model.functions.iter_mut() {
            walker.walk_function(function);
        }
    }

    fn scoped(&mut self, segment: String, f: impl FnOnce(&mut Self)) {
        self.scope.push(segment);
        f(self);
        self.scope.pop();
    }

    fn site(&self, kind: SiteKind, leaf: &str) -> Site {
        let mut location = self.scope.join("/");
        if !location.is_empty() {
            location.push('/');
        }
        location.push_str(leaf);
        Site { kind, location }
    }

    pub fn walk_graph(&mut self, graph: &mut onnx::GraphProto) {
        self.scope.push(format!("graph '{}'", graph.name));
        for tensor in graph.initializer.iter_mut() {
            let site = self.site(SiteKind::Constant, &format!("initializer '{}'", tensor.name));
            self.visitor.visit_tensor(&site, TensorView::new(tensor));
        }
        for (i, sparse) in graph.sparse_initializer.iter_mut().enumerate() {
            if let Some(values) = sparse.values.as_mut() {
                let site = self.site(
                    SiteKind::SparseConstant,
                    &format!("sparse_initializer[{i}] '{}'", values.name),
                );
                self.visitor.visit_tensor(&site, TensorView::new(values));
            }
        }
        for value in graph.input.iter_mut() {
            self.walk_value_info(SiteKind::Input, "input", value);
        }
        for value in graph.output.iter_mut() {
            self.walk_value_info(SiteKind::Output, "output", value);
        }
        for value in graph.value_info.iter_mut() {
            self.walk_value_info(SiteKind::Intermediate, "value_info", value);
        }
        for (i, node) in graph.node.iter_mut().enumerate() {
            self.walk_node(i, node);
        }
        self.scope.pop();
    }

    fn walk_function(&mut self, function: &mut onnx::FunctionProto) {
        self.scope.push(format!("function '{}'", function.name));
        for value in function.value_info.iter_mut() {
            self.walk_value_info(SiteKind::Intermediate, "value_info", value);
        }
        for (i, node) in function.node.iter_mut().enumerate() {
            self.walk_node(i, node);
        }
        self.scope.pop();
    }

    fn walk_value_info(&mut self, kind: SiteKind, field: &str, value: &mut onnx::ValueInfoProto) {
        if let Some(ty) = value.r#type.as_mut() {
            let leaf = format!("{field} '{}'", value.name);
            self.walk_type(kind, &leaf, ty);
        }
    }

    fn walk_type(&mut self, kind: SiteKind, leaf: &str, ty: &mut onnx::TypeProto) {
        use onnx::type_proto::Value;
        match ty.value.as_mut() {
            Some(Value::TensorType(tensor)) => {
                let site = self.site(kind, leaf);
                self.visitor.visit_elem_type(&site, &mut tensor.elem_type);
            }
            Some(Value::SparseTensorType(tensor)) => {
                let site = self.site(kind, leaf);
                self.visitor.visit_elem_type(&site, &mut tensor.elem_type);
            }
            Some(Value::SequenceType(sequence)) => {
                if let Some(inner) = sequence.elem_type.as_mut() {
                    self.walk_type(kind, &format!("{leaf}/sequence"), inner);
                }
            }
            Some(Value::OptionalType(optional)) => {
                if let Some(inner) = optional.elem_type.as_mut() {
                    self.walk_type(kind, &format!("{leaf}/optional"), inner);
                }
            }
            // Map keys are integral or string, only the value side can be a float type.
            Some(Value::MapType(map)) => {
                if let Some(inner) = map.value_type.as_mut() {
                    self.walk_type(kind, &format!("{leaf}/map_value"), inner);
                }
            }
            None => {}
        }
    }

    fn walk_node(&mut self, index: usize, node: &mut onnx::NodeProto) {
        let cast = is_cast(node);
        self.scope
            .push(format!("node[{index}] '{}' ({})", node.name, node.op_type));
        for attr in node.attribute.iter_mut() {
            if cast && attr.name == "to" {
                let site = self.site(SiteKind::CastTarget, "attribute 'to'");
                self.visitor.visit_cast_target(&site, &mut attr.i);
            }
            self.walk_attribute(attr);
        }
        self.scope.pop();
    }

    fn walk_attribute(&mut self, attr: &mut onnx::AttributeProto) {
        let leaf = format!("attribute '{}'", attr.name);
        if let Some(tensor) = attr.t.as_mut() {
            let site = self.site(SiteKind::AttributeTensor, &leaf);
            self.visitor.visit_tensor(&site, TensorView::new(tensor));
        }
        for (i, tensor) in attr.tensors.iter_mut().enumerate() {
            let site = self.site(SiteKind::AttributeTensor, &format!("{leaf}[{i}]"));
            self.visitor.visit_tensor(&site, TensorView::new(tensor));
        }
        if let Some(values) = attr.sparse_tensor.as_mut().and_then(|s| s.values.as_mut()) {
            let site = self.site(SiteKind::AttributeTensor, &leaf);
            self.visitor.visit_tensor(&site, TensorView::new(values));
        }
        for (i, sparse) in attr.sparse_tensors.iter_mut().enumerate() {
            if let Some(values) = sparse.values.as_mut() {
                let site = self.site(SiteKind::AttributeTensor, &format!("{leaf}[{i}]"));
                self.visitor.visit_tensor(&site, TensorView::new(values));
            }
        }
        if let Some(ty) = attr.tp.as_mut() {
            self.walk_type(SiteKind::AttributeType, &leaf, ty);
        }
        for (i, ty) in attr.type_protos.iter_mut().enumerate() {
            self.walk_type(SiteKind::AttributeType, &format!("{leaf}[{i}]"), ty);
        }
        if let Some(graph) = attr.g.as_mut() {
            self.scoped(leaf.clone(), |w| w.walk_graph(graph));
        }
        for (i, graph) in attr.graphs.iter_mut().enumerate() {
            self.scoped(format!("{leaf}[{i}]"), |w| w.walk_graph(graph));
        }
    }
}
