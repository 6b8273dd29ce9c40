//! Code Generation
//!
//! Generates typed client bindings from a command tree.
//!
//! Architecture:
//! - BindingPlan: Immutable after build() - one TypePlan per namespace node,
//!   ordered bottom-up so every type is declared before the type embedding it
//! - NameResolver: Derives and validates every identifier while planning
//! - Emitters: Language-specific code generators that consume the plan
//!
//! The key constraint: Emitters NEVER walk the command tree - only the plan.

pub mod config;
pub mod names;
pub mod python;
pub mod rust;
pub mod typescript;

use std::collections::HashMap;

use tracing::debug;

use crate::checksum::Checksum;
use crate::error::{CompileError, Result};
use crate::schema::{join_topic, CommandNode, CommandTree};

pub use config::{Casing, Language, NamingConfig, RenderProfile};
use names::NameResolver;

/// Member names the emitters use for their own plumbing
const RESERVED_MEMBERS: &[&str] = &["handle", "_handle"];

// =============================================================================
// Plan
// =============================================================================

/// A generated type for one node that has children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePlan {
    pub type_name: String,

    /// Path of the node; empty for the root
    pub path: Vec<String>,

    /// Child namespaces embedded as owned fields
    pub fields: Vec<FieldPlan>,

    /// Accessor pairs for child commands
    pub accessors: Vec<AccessorPlan>,
}

impl TypePlan {
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn topic(&self) -> String {
        join_topic(&self.path)
    }

    /// Whether the type keeps its own copy of the handle.
    ///
    /// Types with only namespace children reach the handle through their
    /// fields; an empty type still stores it so the handle parameter is used.
    pub fn stores_handle(&self) -> bool {
        !self.accessors.is_empty() || self.fields.is_empty()
    }
}

/// An owned child-namespace field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub name: String,
    pub type_name: String,
    pub topic: String,
}

/// A get/set pair forwarding to the handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorPlan {
    pub getter: String,
    pub setter: String,
    pub topic: String,
    pub required: bool,
    pub doc: Option<String>,
}

/// Every type of a binding, in declaration order (children first)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    pub root_type: String,
    pub types: Vec<TypePlan>,
    /// Fingerprint of the tree's canonical JSON form
    pub fingerprint: Checksum,
}

impl BindingPlan {
    /// Plan the binding for `tree`.
    ///
    /// Fails with `UnrenderableName` if any identifier is invalid in the
    /// profile's language or two members of one type collide.
    pub fn build(tree: &CommandTree, root_type: &str, profile: &RenderProfile) -> Result<Self> {
        let mut planner = Planner {
            resolver: NameResolver::new(profile, root_type),
            types: Vec::new(),
        };
        let mut path = Vec::new();
        let root_type = planner.plan_node(tree.root(), &mut path)?;

        Ok(Self {
            root_type,
            types: planner.types,
            fingerprint: Checksum::from_json(&crate::json::to_value(tree)),
        })
    }

    pub fn root(&self) -> Option<&TypePlan> {
        self.types.last()
    }

    pub fn accessor_count(&self) -> usize {
        self.types.iter().map(|t| t.accessors.len()).sum()
    }
}

struct Planner<'a> {
    resolver: NameResolver<'a>,
    types: Vec<TypePlan>,
}

impl Planner<'_> {
    /// Post-order visit: plan child namespaces, then the node itself
    fn plan_node(&mut self, node: &CommandNode, path: &mut Vec<String>) -> Result<String> {
        let mut fields = Vec::new();
        let mut accessors = Vec::new();
        let mut members: HashMap<String, String> = HashMap::new();

        for (name, child) in node.children() {
            path.push(name.clone());
            let topic = join_topic(path);

            if child.has_children() {
                let type_name = self.plan_node(child, path)?;
                let field = self.resolver.field_name(path)?;
                if RESERVED_MEMBERS.contains(&field.as_str()) {
                    return Err(CompileError::unrenderable(&topic, &field, "is reserved for the handle"));
                }
                claim_member(&mut members, &field, &topic)?;
                fields.push(FieldPlan {
                    name: field,
                    type_name,
                    topic: topic.clone(),
                });
            }

            if child.is_command() {
                let names = self.resolver.accessor_names(path)?;
                claim_member(&mut members, &names.getter, &topic)?;
                claim_member(&mut members, &names.setter, &topic)?;
                accessors.push(AccessorPlan {
                    getter: names.getter,
                    setter: names.setter,
                    topic,
                    required: child.is_required(),
                    doc: child.doc().map(str::to_string),
                });
            }

            path.pop();
        }

        let type_name = self.resolver.type_name(path)?;
        debug!(
            type_name = %type_name,
            fields = fields.len(),
            accessors = accessors.len(),
            "planned type"
        );
        self.types.push(TypePlan {
            type_name: type_name.clone(),
            path: path.clone(),
            fields,
            accessors,
        });
        Ok(type_name)
    }
}

fn claim_member(members: &mut HashMap<String, String>, name: &str, topic: &str) -> Result<()> {
    if let Some(owner) = members.get(name) {
        return Err(CompileError::unrenderable(
            topic,
            name,
            format!("collides with the member for `{}`", owner),
        ));
    }
    members.insert(name.to_string(), topic.to_string());
    Ok(())
}

// =============================================================================
// Generated Output
// =============================================================================

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated code as a string
    pub code: String,
    /// Number of types generated
    pub type_count: usize,
    /// Number of accessor pairs generated
    pub accessor_count: usize,
    pub language: Language,
    /// Fingerprint of the tree the code was generated from
    pub fingerprint: Checksum,
}

// =============================================================================
// Public API
// =============================================================================

/// Generate binding source for `tree` in the profile's language
pub fn generate(tree: &CommandTree, root_type: &str, profile: &RenderProfile) -> Result<GeneratedOutput> {
    let plan = BindingPlan::build(tree, root_type, profile)?;
    let code = match profile.language {
        Language::Rust => rust::emit(&plan, profile),
        Language::TypeScript => typescript::emit(&plan, profile),
        Language::Python => python::emit(&plan, profile),
    };

    Ok(GeneratedOutput {
        code,
        type_count: plan.types.len(),
        accessor_count: plan.accessor_count(),
        language: profile.language,
        fingerprint: plan.fingerprint,
    })
}

/// Render binding source for `tree`; the output is a pure function of its inputs
pub fn render_binding(tree: &CommandTree, root_type: &str, profile: &RenderProfile) -> Result<String> {
    generate(tree, root_type, profile).map(|output| output.code)
}

/// Quote a topic as a string literal.
///
/// JSON string syntax is valid in Rust, TypeScript and Python source.
pub(crate) fn quote(topic: &str) -> String {
    serde_json::Value::String(topic.to_string()).to_string()
}
