//! `equals` and `hashCode` overridden together.

use std::sync::Arc;

use tree_sitter::Node;

use crate::analysis::{query, ParsedFile, Resolution, ResolutionContext};
use crate::detect::{required_field, DetectedInstance, Detector, DetectorError};
use crate::registry::Detectable;

pub struct EqualsHashCodeDetector {
    detectable: Arc<Detectable>,
}

impl EqualsHashCodeDetector {
    pub fn new(detectable: Arc<Detectable>) -> Self {
        Self { detectable }
    }
}

/// Public, non-static, with body, returning `return_type`.
fn is_public_instance_method(
    method: Node,
    file: &ParsedFile,
    return_type: &str,
) -> Result<bool, DetectorError> {
    let mods = query::modifiers(method, file);
    let returns = required_field(method, "type")?;
    Ok(mods.is_public()
        && !mods.is_static()
        && query::has_body(method)
        && file.node_text(returns) == return_type)
}

fn is_object_type(type_node: Node, file: &ParsedFile, ctx: Option<&dyn ResolutionContext>) -> bool {
    let written = query::written_type_name(type_node, file);
    if written == "Object" || written == "java.lang.Object" {
        return true;
    }
    ctx.map(|ctx| {
        ctx.resolve_type_node(type_node, file) == Resolution::Resolved("java.lang.Object".into())
    })
    .unwrap_or(false)
}

fn is_equals(
    method: Node,
    file: &ParsedFile,
    ctx: Option<&dyn ResolutionContext>,
) -> Result<bool, DetectorError> {
    if query::declaration_name(method, file) != "equals"
        || !is_public_instance_method(method, file, "boolean")?
    {
        return Ok(false);
    }
    let params = query::parameters(method);
    Ok(params.len() == 1
        && params[0].kind() == "formal_parameter"
        && query::parameter_type(params[0])
            .map(|t| is_object_type(t, file, ctx))
            .unwrap_or(false))
}

fn is_hash_code(method: Node, file: &ParsedFile) -> Result<bool, DetectorError> {
    Ok(query::declaration_name(method, file) == "hashCode"
        && query::parameters(method).is_empty()
        && is_public_instance_method(method, file, "int")?)
}

impl Detector for EqualsHashCodeDetector {
    fn detectable(&self) -> &Arc<Detectable> {
        &self.detectable
    }

    fn detect(
        &self,
        file: &ParsedFile,
        ctx: Option<&dyn ResolutionContext>,
    ) -> Result<Vec<DetectedInstance>, DetectorError> {
        let mut found = Vec::new();
        for type_decl in query::type_declarations(file.root()) {
            if type_decl.kind() == "interface_declaration" {
                continue;
            }
            let mut equals = None;
            let mut hash_code = None;
            for method in query::methods_of(type_decl) {
                if equals.is_none() && is_equals(method, file, ctx)? {
                    equals = Some(method);
                } else if hash_code.is_none() && is_hash_code(method, file)? {
                    hash_code = Some(method);
                }
            }
            if let (Some(equals), Some(hash_code)) = (equals, hash_code) {
                found.push(DetectedInstance::from_nodes(
                    &self.detectable,
                    file,
                    query::type_path(type_decl, file),
                    &[equals, hash_code],
                ));
            }
        }
        Ok(found)
    }
}
