//! Python Code Emitter
//!
//! Generates plain classes with snake_case accessor methods. The transport
//! is described by a `Handle` Protocol so type checkers can verify callers.

use super::{quote, AccessorPlan, BindingPlan, RenderProfile, TypePlan};

/// Emit Python source for a whole binding
pub fn emit(plan: &BindingPlan, profile: &RenderProfile) -> String {
    let mut output = String::new();

    output.push_str("# Generated by cmdtree - DO NOT EDIT\n");
    output.push_str("#\n");
    output.push_str(&format!("# Root type: `{}`\n", plan.root_type));
    output.push_str(&format!("# Tree fingerprint: {}\n", plan.fingerprint));
    output.push('\n');
    output.push_str("from typing import Optional, Protocol\n");

    if profile.emit_handle {
        output.push_str("\n\n");
        output.push_str("class Handle(Protocol):\n");
        output.push_str("    \"\"\"Transport capability used by every generated accessor.\"\"\"\n");
        output.push('\n');
        output.push_str("    def get(self, topic: str) -> str: ...\n");
        output.push('\n');
        output.push_str("    def set(self, topic: str, value: str) -> None: ...\n");
    } else {
        output.push('\n');
        output.push_str("from .handle import Handle\n");
    }

    for type_plan in &plan.types {
        output.push_str("\n\n");
        emit_class(&mut output, type_plan);
    }

    output
}

fn emit_class(output: &mut String, type_plan: &TypePlan) {
    output.push_str(&format!("class {}:\n", type_plan.type_name));
    if type_plan.is_root() {
        output.push_str("    \"\"\"Root of the command tree\"\"\"\n");
    } else {
        output.push_str(&format!("    \"\"\"`{}`\"\"\"\n", sanitize(&type_plan.topic())));
    }
    output.push('\n');

    output.push_str("    def __init__(self, handle: Handle) -> None:\n");
    if type_plan.stores_handle() {
        output.push_str("        self._handle = handle\n");
    }
    for field in &type_plan.fields {
        output.push_str(&format!(
            "        self.{} = {}(handle)\n",
            field.name, field.type_name
        ));
    }

    for accessor in &type_plan.accessors {
        output.push('\n');
        emit_accessor(output, accessor);
    }
}

fn emit_accessor(output: &mut String, accessor: &AccessorPlan) {
    let topic = quote(&accessor.topic);
    let doc = match &accessor.doc {
        Some(doc) => format!(
            "        \"\"\"`{}`: {}\"\"\"\n",
            sanitize(&accessor.topic),
            sanitize(doc)
        ),
        None => format!("        \"\"\"`{}`\"\"\"\n", sanitize(&accessor.topic)),
    };

    output.push_str(&format!("    def {}(self) -> str:\n", accessor.getter));
    output.push_str(&doc);
    output.push_str(&format!("        return self._handle.get({})\n", topic));
    output.push('\n');

    if accessor.required {
        output.push_str(&format!("    def {}(self, value: str) -> None:\n", accessor.setter));
        output.push_str(&doc);
        output.push_str(&format!("        self._handle.set({}, value)\n", topic));
    } else {
        output.push_str(&format!(
            "    def {}(self, value: Optional[str] = None) -> None:\n",
            accessor.setter
        ));
        output.push_str(&doc);
        output.push_str(&format!(
            "        self._handle.set({}, \"\" if value is None else value)\n",
            topic
        ));
    }
}

/// Keep free text from closing a docstring
fn sanitize(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
