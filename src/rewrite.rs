use crate::dtype::DType;
use crate::onnx;
use crate::tensor_view::{PayloadProblem, TensorView};
use crate::walker::{GraphWalker, Site, SiteKind, SiteVisitor};

/// A half-precision tensor that could not be widened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadIssue {
    pub site: Site,
    pub problem: PayloadProblem,
}

impl std::fmt::Display for PayloadIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.site, self.problem)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WidenError {
    #[error("{} float16 tensor(s) could not be widened: {}", .0.len(), join_issues(.0))]
    UnsupportedPayloads(Vec<PayloadIssue>),
}

fn join_issues(issues: &[PayloadIssue]) -> String {
    issues
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Counts of what a widening pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidenReport {
    pub constants_converted: usize,
    pub attribute_tensors_converted: usize,
    pub declarations_retagged: usize,
    pub casts_rewritten: usize,
    pub bytes_added: usize,
}

impl WidenReport {
    pub fn is_unchanged(&self) -> bool {
        *self == WidenReport::default()
    }
}

impl std::fmt::Display for WidenReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} constant(s), {} attribute tensor(s), {} declaration(s), {} cast(s); +{} bytes",
            self.constants_converted,
            self.attribute_tensors_converted,
            self.declarations_retagged,
            self.casts_rewritten,
            self.bytes_added
        )
    }
}

#[derive(Default)]
struct PrecisionRewriter {
    report: WidenReport,
    issues: Vec<PayloadIssue>,
}

impl SiteVisitor for PrecisionRewriter {
    fn visit_tensor(&mut self, site: &Site, mut tensor: TensorView<'_>) {
        if !tensor.is_half() {
            return;
        }
        match tensor.widen_half() {
            Ok(added) => {
                log::debug!("Widened {site}");
                match site.kind {
                    SiteKind::AttributeTensor => self.report.attribute_tensors_converted += 1,
                    _ => self.report.constants_converted += 1,
                }
                self.report.bytes_added += added;
            }
            Err(problem) => {
                log::warn!("Cannot widen {site}: {problem}");
                self.issues.push(PayloadIssue {
                    site: site.clone(),
                    problem,
                });
            }
        }
    }

    fn visit_elem_type(&mut self, site: &Site, elem_type: &mut i32) {
        if *elem_type == DType::F16.onnx_code() {
            log::debug!("Retagged {site}");
            *elem_type = DType::F32.onnx_code();
            self.report.declarations_retagged += 1;
        }
    }

    fn visit_cast_target(&mut self, site: &Site, to: &mut i64) {
        if *to == i64::from(DType::F16.onnx_code()) {
            log::debug!("Rewrote {site}");
            *to = i64::from(DType::F32.onnx_code());
            self.report.casts_rewritten += 1;
        }
    }
}

impl PrecisionRewriter {
    fn finish(self) -> Result<WidenReport, WidenError> {
        if self.issues.is_empty() {
            Ok(self.report)
        } else {
            Err(WidenError::UnsupportedPayloads(self.issues))
        }
    }
}

/// Rewrites every float16 tensor, type declaration and `Cast` target in the
/// model to float32. All unsupported payloads are collected before failing;
/// on failure the model is partially rewritten and must not be saved.
pub fn widen_model(model: &mut onnx::ModelProto) -> Result<WidenReport, WidenError> {
    let mut rewriter = PrecisionRewriter::default();
    GraphWalker::walk_model(&mut rewriter, model);
    rewriter.finish()
}

pub fn widen_graph(graph: &mut onnx::GraphProto) -> Result<WidenReport, WidenError> {
    let mut rewriter = PrecisionRewriter::default();
    GraphWalker::new(&mut rewriter).walk_graph(graph);
    rewriter.finish()
}
