//! Switches that handle unexpected values with `default`.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, ResolutionContext};
use crate::detect::{required_field, DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct SwitchDefaultDetector {
    detectable: Arc<Detectable>,
}

impl SwitchDefaultDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// `default:`, `default ->` or `case null, default ->`.
fn is_default_label(label: Node, file: &ParsedFile) -> bool {
    let text = file.node_text(label);
    let text = text.strip_prefix("case").unwrap_or(text);
    text.split(',').any(|part| part.trim() == "default")
}

/// Whether one of the switch's own arms (not a nested switch) is `default`.
fn has_default(block: Node, file: &ParsedFile) -> bool {
    query::named_children(block)
        .into_iter()
        .filter(|arm| matches!(arm.kind(), "switch_block_statement_group" | "switch_rule"))
        .flat_map(query::named_children)
        .filter(|n| n.kind() == "switch_label")
        .any(|label| is_default_label(label, file))
}

impl Detector for SwitchDefaultDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        _ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for switch in query::switches(file.root()) {
            let block = required_field(switch, "body")?;
            if has_default(block, file) {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::enclosing_type_name(switch, file),
                    &[switch],
                ));
            }
        }
        Ok(found)
    }
}
