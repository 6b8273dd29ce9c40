//! Rust Code Emitter
//!
//! Generates Rust bindings from a BindingPlan.
//!
//! Key constraints:
//! - This module ONLY receives BindingPlan + RenderProfile - no command tree
//! - Identifiers come from the plan (already resolved and validated)
//! - Every generated type is generic over the `Handle` transport

use super::{quote, AccessorPlan, BindingPlan, RenderProfile, TypePlan};

// =============================================================================
// Public API
// =============================================================================

/// Emit Rust source for a whole binding
pub fn emit(plan: &BindingPlan, profile: &RenderProfile) -> String {
    let mut output = String::new();

    emit_header(&mut output, plan, profile);
    if profile.emit_handle {
        emit_handle_trait(&mut output);
    }

    for type_plan in &plan.types {
        output.push('\n');
        emit_type(&mut output, type_plan);
    }

    output
}

// =============================================================================
// Preamble
// =============================================================================

fn emit_header(output: &mut String, plan: &BindingPlan, profile: &RenderProfile) {
    output.push_str("// Generated by cmdtree - DO NOT EDIT\n");
    output.push_str("//\n");
    output.push_str(&format!("// Root type: `{}`\n", plan.root_type));
    output.push_str(&format!("// Tree fingerprint: {}\n", plan.fingerprint));
    if !profile.emit_handle {
        output.push_str("//\n");
        output.push_str("// Expects a `Handle` trait in scope.\n");
    }
}

fn emit_handle_trait(output: &mut String) {
    output.push('\n');
    output.push_str("/// Transport capability used by every generated accessor.\n");
    output.push_str("///\n");
    output.push_str("/// Each namespace keeps its own clone of the handle, so clones should\n");
    output.push_str("/// share one underlying connection.\n");
    output.push_str("pub trait Handle: Clone {\n");
    output.push_str("    type Error;\n");
    output.push('\n');
    output.push_str("    /// Read the current value of `topic`\n");
    output.push_str("    fn get(&self, topic: &str) -> Result<String, Self::Error>;\n");
    output.push('\n');
    output.push_str("    /// Write `value` to `topic`\n");
    output.push_str("    fn set(&self, topic: &str, value: &str) -> Result<(), Self::Error>;\n");
    output.push_str("}\n");
}

// =============================================================================
// Type Emission
// =============================================================================

fn emit_type(output: &mut String, type_plan: &TypePlan) {
    if type_plan.is_root() {
        output.push_str("/// Root of the command tree\n");
    } else {
        output.push_str(&format!("/// `{}`\n", type_plan.topic()));
    }
    output.push_str("#[derive(Debug, Clone)]\n");
    output.push_str(&format!("pub struct {}<H: Handle> {{\n", type_plan.type_name));

    if type_plan.stores_handle() {
        if type_plan.accessors.is_empty() {
            output.push_str("    #[allow(dead_code)]\n");
        }
        output.push_str("    handle: H,\n");
    }
    for field in &type_plan.fields {
        output.push_str(&format!("    pub {}: {}<H>,\n", field.name, field.type_name));
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl<H: Handle> {}<H> {{\n", type_plan.type_name));
    emit_constructor(output, type_plan);
    for accessor in &type_plan.accessors {
        output.push('\n');
        emit_accessor(output, accessor);
    }
    output.push_str("}\n");
}

fn emit_constructor(output: &mut String, type_plan: &TypePlan) {
    output.push_str("    pub fn new(handle: H) -> Self {\n");
    output.push_str("        Self {\n");

    let stores_handle = type_plan.stores_handle();
    let last = type_plan.fields.len().saturating_sub(1);
    for (i, field) in type_plan.fields.iter().enumerate() {
        // The last consumer takes the handle by value
        let arg = if !stores_handle && i == last { "handle" } else { "handle.clone()" };
        output.push_str(&format!(
            "            {}: {}::new({}),\n",
            field.name, field.type_name, arg
        ));
    }
    if stores_handle {
        output.push_str("            handle,\n");
    }

    output.push_str("        }\n");
    output.push_str("    }\n");
}

// =============================================================================
// Accessor Emission
// =============================================================================

fn emit_accessor(output: &mut String, accessor: &AccessorPlan) {
    let topic = quote(&accessor.topic);

    emit_accessor_doc(output, accessor);
    output.push_str(&format!(
        "    pub fn {}(&self) -> Result<String, H::Error> {{\n",
        accessor.getter
    ));
    output.push_str(&format!("        self.handle.get({})\n", topic));
    output.push_str("    }\n\n");

    emit_accessor_doc(output, accessor);
    if accessor.required {
        output.push_str(&format!(
            "    pub fn {}(&self, value: &str) -> Result<(), H::Error> {{\n",
            accessor.setter
        ));
        output.push_str(&format!("        self.handle.set({}, value)\n", topic));
    } else {
        output.push_str(&format!(
            "    pub fn {}(&self, value: Option<&str>) -> Result<(), H::Error> {{\n",
            accessor.setter
        ));
        output.push_str(&format!(
            "        self.handle.set({}, value.unwrap_or(\"\"))\n",
            topic
        ));
    }
    output.push_str("    }\n");
}

fn emit_accessor_doc(output: &mut String, accessor: &AccessorPlan) {
    output.push_str(&format!("    /// `{}`\n", accessor.topic));
    if let Some(doc) = &accessor.doc {
        output.push_str("    ///\n");
        output.push_str(&format!("    /// {}\n", doc));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandTree;

    fn emit_sample(profile: &RenderProfile) -> String {
        let tree = CommandTree::parse("volt:dc\nvolt:ac?  AC voltage\nfreq\n").unwrap();
        let plan = BindingPlan::build(&tree, "Meter", profile).unwrap();
        emit(&plan, profile)
    }

    #[test]
    fn test_emits_types_children_first() {
        let code = emit_sample(&RenderProfile::rust());
        let volt = code.find("pub struct MeterVolt<H: Handle>").unwrap();
        let root = code.find("pub struct Meter<H: Handle>").unwrap();
        assert!(volt < root);
        assert!(code.contains("pub trait Handle: Clone {"));
    }

    #[test]
    fn test_root_embeds_namespace_and_accessors() {
        let code = emit_sample(&RenderProfile::rust());
        assert!(code.contains("    pub volt: MeterVolt<H>,\n"));
        assert!(code.contains("            volt: MeterVolt::new(handle.clone()),\n"));
        assert!(code.contains("    pub fn freq_get(&self) -> Result<String, H::Error> {\n        self.handle.get(\"freq\")\n"));
        assert!(code.contains("    pub fn freq_set(&self, value: &str) -> Result<(), H::Error> {\n        self.handle.set(\"freq\", value)\n"));
    }

    #[test]
    fn test_namespace_accessors_use_full_topic() {
        let code = emit_sample(&RenderProfile::rust());
        assert!(code.contains("pub fn volt_dc_get(&self)"));
        assert!(code.contains("self.handle.get(\"volt:ac\")"));
        assert!(code.contains("    /// `volt:ac`\n    ///\n    /// AC voltage\n"));
    }

    #[test]
    fn test_optional_setter() {
        let tree = CommandTree::parse_with("abort\n", crate::RequiredPolicy::Marked).unwrap();
        let profile = RenderProfile::rust();
        let plan = BindingPlan::build(&tree, "Meter", &profile).unwrap();
        let code = emit(&plan, &profile);
        assert!(code.contains("pub fn abort_set(&self, value: Option<&str>)"));
        assert!(code.contains("value.unwrap_or(\"\")"));
    }

    #[test]
    fn test_namespace_only_type_moves_handle_into_last_field() {
        let tree = CommandTree::parse("sense:freq:gate\nsense:volt:range\n").unwrap();
        let profile = RenderProfile::rust();
        let plan = BindingPlan::build(&tree, "Meter", &profile).unwrap();
        let code = emit(&plan, &profile);
        assert!(code.contains("            freq: MeterSenseFreq::new(handle.clone()),\n            volt: MeterSenseVolt::new(handle),\n"));
    }

    #[test]
    fn test_without_handle_trait() {
        let profile = RenderProfile::rust().with_emit_handle(false);
        let code = emit_sample(&profile);
        assert!(!code.contains("pub trait Handle"));
        assert!(code.contains("// Expects a `Handle` trait in scope."));
    }
}
