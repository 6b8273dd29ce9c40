//! TypeScript Code Emitter
//!
//! Generates one class per namespace. Accessors are camelCase methods that
//! forward to a `Handle` interface supplied by the caller.

use super::{quote, AccessorPlan, BindingPlan, RenderProfile, TypePlan};

/// Emit TypeScript source for a whole binding
pub fn emit(plan: &BindingPlan, profile: &RenderProfile) -> String {
    let mut output = String::new();

    output.push_str("// Generated by cmdtree - DO NOT EDIT\n");
    output.push_str("//\n");
    output.push_str(&format!("// Root type: `{}`\n", plan.root_type));
    output.push_str(&format!("// Tree fingerprint: {}\n", plan.fingerprint));

    if profile.emit_handle {
        output.push('\n');
        output.push_str("/** Transport capability used by every generated accessor. */\n");
        output.push_str("export interface Handle {\n");
        output.push_str("  get(topic: string): string;\n");
        output.push_str("  set(topic: string, value: string): void;\n");
        output.push_str("}\n");
    } else {
        output.push('\n');
        output.push_str("import type { Handle } from \"./handle\";\n");
    }

    for type_plan in &plan.types {
        output.push('\n');
        emit_class(&mut output, type_plan);
    }

    output
}

fn emit_class(output: &mut String, type_plan: &TypePlan) {
    if type_plan.is_root() {
        output.push_str("/** Root of the command tree */\n");
    } else {
        output.push_str(&format!("/** `{}` */\n", sanitize(&type_plan.topic())));
    }
    output.push_str(&format!("export class {} {{\n", type_plan.type_name));

    if type_plan.stores_handle() {
        output.push_str("  private readonly handle: Handle;\n");
    }
    for field in &type_plan.fields {
        output.push_str(&format!("  readonly {}: {};\n", field.name, field.type_name));
    }

    output.push('\n');
    output.push_str("  constructor(handle: Handle) {\n");
    if type_plan.stores_handle() {
        output.push_str("    this.handle = handle;\n");
    }
    for field in &type_plan.fields {
        output.push_str(&format!(
            "    this.{} = new {}(handle);\n",
            field.name, field.type_name
        ));
    }
    output.push_str("  }\n");

    for accessor in &type_plan.accessors {
        output.push('\n');
        emit_accessor(output, accessor);
    }
    output.push_str("}\n");
}

fn emit_accessor(output: &mut String, accessor: &AccessorPlan) {
    let topic = quote(&accessor.topic);
    let doc = match &accessor.doc {
        Some(doc) => format!("  /** `{}`: {} */\n", sanitize(&accessor.topic), sanitize(doc)),
        None => format!("  /** `{}` */\n", sanitize(&accessor.topic)),
    };

    output.push_str(&doc);
    output.push_str(&format!("  {}(): string {{\n", accessor.getter));
    output.push_str(&format!("    return this.handle.get({});\n", topic));
    output.push_str("  }\n\n");

    output.push_str(&doc);
    if accessor.required {
        output.push_str(&format!("  {}(value: string): void {{\n", accessor.setter));
        output.push_str(&format!("    this.handle.set({}, value);\n", topic));
    } else {
        output.push_str(&format!("  {}(value?: string): void {{\n", accessor.setter));
        output.push_str(&format!("    this.handle.set({}, value ?? \"\");\n", topic));
    }
    output.push_str("  }\n");
}

/// Keep free text from closing a block comment
fn sanitize(text: &str) -> String {
    text.replace("*/", "* /")
}
