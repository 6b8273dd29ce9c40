//! JSON rendering of command trees
//!
//! Every node renders as an object with a `tree` map of its children.
//! Commands add `"cmd": true`, required commands add `"req": true`:
//!
//! ```json
//! {
//!   "tree": {
//!     "freq": {
//!       "cmd": true,
//!       "req": true,
//!       "tree": {}
//!     }
//!   }
//! }
//! ```
//!
//! `serde_json::Map` is ordered by key, so output is sorted and stable.

use serde_json::{Map, Value};

use crate::config::OutputFormat;
use crate::error::{CompileError, Result};
use crate::schema::{CommandNode, CommandTree};

const TREE_KEY: &str = "tree";
const CMD_KEY: &str = "cmd";
const REQ_KEY: &str = "req";

/// Convert a tree into its JSON value
pub fn to_value(tree: &CommandTree) -> Value {
    node_to_value(tree.root())
}

fn node_to_value(node: &CommandNode) -> Value {
    let mut children = Map::new();
    for (name, child) in node.children() {
        children.insert(name.clone(), node_to_value(child));
    }

    let mut object = Map::new();
    object.insert(TREE_KEY.to_string(), Value::Object(children));
    if node.is_command() {
        object.insert(CMD_KEY.to_string(), Value::Bool(true));
        if node.is_required() {
            object.insert(REQ_KEY.to_string(), Value::Bool(true));
        }
    }
    Value::Object(object)
}

/// Render a tree as a JSON document
pub fn render_json(tree: &CommandTree, format: OutputFormat) -> Result<String> {
    let value = to_value(tree);
    let text = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&value)?,
        OutputFormat::Compact => serde_json::to_string(&value)?,
    };
    Ok(text)
}

impl CommandTree {
    /// Rebuild a tree from a JSON document produced by [`render_json`]
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let mut root = CommandNode::default();
        read_node(value, &mut root, "")?;
        if root.is_command {
            return Err(CompileError::InvalidTree("root cannot be a command".to_string()));
        }
        Ok(Self::from_root(root))
    }
}

fn read_node(value: &Value, node: &mut CommandNode, path: &str) -> Result<()> {
    let location = if path.is_empty() { "<root>" } else { path };
    let object = value
        .as_object()
        .ok_or_else(|| CompileError::InvalidTree(format!("{}: expected an object", location)))?;

    for key in object.keys() {
        if !matches!(key.as_str(), TREE_KEY | CMD_KEY | REQ_KEY) {
            return Err(CompileError::InvalidTree(format!("{}: unknown key `{}`", location, key)));
        }
    }

    node.is_command = read_flag(object, CMD_KEY, location)?;
    node.required = read_flag(object, REQ_KEY, location)?;
    if node.required && !node.is_command {
        return Err(CompileError::InvalidTree(format!(
            "{}: `req` set on a node that is not a command",
            location
        )));
    }

    let children = object
        .get(TREE_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| CompileError::InvalidTree(format!("{}: missing `tree` object", location)))?;

    for (name, child_value) in children {
        if name.is_empty() || name.contains(crate::schema::PATH_SEPARATOR) {
            return Err(CompileError::InvalidTree(format!(
                "{}: invalid segment name `{}`",
                location, name
            )));
        }
        let child_path = if path.is_empty() {
            name.clone()
        } else {
            format!("{}{}{}", path, crate::schema::PATH_SEPARATOR, name)
        };
        let mut child = CommandNode::named(name);
        read_node(child_value, &mut child, &child_path)?;
        node.children.insert(name.clone(), child);
    }
    Ok(())
}

fn read_flag(object: &Map<String, Value>, key: &str, location: &str) -> Result<bool> {
    match object.get(key) {
        None => Ok(false),
        Some(Value::Bool(true)) => Ok(true),
        Some(other) => Err(CompileError::InvalidTree(format!(
            "{}: `{}` must be true when present, found {}",
            location, key, other
        ))),
    }
}
