//! Command tree types and the schema parser
//!
//! A schema is line oriented. Each non-blank line names one command as a
//! colon-separated path, optionally suffixed with `?`:
//!
//! ```text
//! volt:dc
//! volt:ac?      AC voltage
//! freq
//! ```
//!
//! Tokens after the first one on a line are kept as the command's doc text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CompileError, Result};

/// Separator between path segments in a command spec and in topics
pub const PATH_SEPARATOR: char = ':';

/// Suffix marking a command as required
pub const REQUIRED_MARKER: char = '?';

/// How the `required` flag of a command is derived from its schema line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RequiredPolicy {
    /// Every command is required, marked or not.
    ///
    /// Matches the behavior of existing generated trees, which flag every
    /// command with `req`.
    #[default]
    Always,
    /// Only commands carrying the `?` suffix are required
    Marked,
}

impl RequiredPolicy {
    fn resolve(self, marked: bool) -> bool {
        match self {
            RequiredPolicy::Always => true,
            RequiredPolicy::Marked => marked,
        }
    }
}

/// One segment of a command path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandNode {
    pub(crate) name: Option<String>,
    pub(crate) children: BTreeMap<String, CommandNode>,
    pub(crate) is_command: bool,
    pub(crate) required: bool,
    pub(crate) doc: Option<String>,
}

impl CommandNode {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Segment name; `None` only for the synthetic root
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Children keyed by segment name, in lexicographic order
    pub fn children(&self) -> &BTreeMap<String, CommandNode> {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.get(name)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether this node was the full path of some schema line
    pub fn is_command(&self) -> bool {
        self.is_command
    }

    /// Whether the command mandates a value. Always false for non-commands.
    pub fn is_required(&self) -> bool {
        self.is_command && self.required
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Walk `segments` from this node, creating intermediate nodes as needed
    fn insert(&mut self, segments: &[&str], required: bool, doc: Option<String>) {
        let mut node = self;
        for segment in segments {
            node = node
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| CommandNode::named(segment));
        }
        node.is_command = true;
        node.required = required;
        if doc.is_some() {
            node.doc = doc;
        }
    }
}

/// A command in the tree together with its full path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub path: Vec<String>,
    pub required: bool,
}

impl CommandEntry {
    /// Colon-joined path, used as the transport topic
    pub fn topic(&self) -> String {
        join_topic(&self.path)
    }
}

/// Join path segments into a topic string
pub fn join_topic<S: AsRef<str>>(path: &[S]) -> String {
    let separator = PATH_SEPARATOR.to_string();
    path.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

/// Immutable command tree rooted at a synthetic, unnamed node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandTree {
    root: CommandNode,
}

impl CommandTree {
    /// Parse schema text using the default [`RequiredPolicy`]
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, RequiredPolicy::default())
    }

    /// Parse schema text, deriving `required` flags with `policy`
    pub fn parse_with(text: &str, policy: RequiredPolicy) -> Result<Self> {
        let mut root = CommandNode::default();
        let mut count = 0usize;

        for (index, raw) in text.lines().enumerate() {
            let Some(line) = SchemaLine::parse(index + 1, raw)? else {
                continue;
            };
            debug!(line = line.number, path = ?line.segments, marked = line.marked, "parsed command");
            root.insert(&line.segments, policy.resolve(line.marked), line.doc);
            count += 1;
        }

        debug!(commands = count, ?policy, "schema parsed");
        Ok(Self { root })
    }

    pub(crate) fn from_root(root: CommandNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// True when the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        !self.root.has_children()
    }

    /// Look up a node by its path segments
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandNode> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.child(segment.as_ref()))
    }

    /// Look up a node by its colon-joined topic
    pub fn get_topic(&self, topic: &str) -> Option<&CommandNode> {
        let segments: Vec<&str> = topic.split(PATH_SEPARATOR).collect();
        self.get(&segments)
    }

    /// All commands in depth-first, lexicographic order
    pub fn commands(&self) -> Vec<CommandEntry> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_commands(&self.root, &mut path, &mut out);
        out
    }

    pub fn command_count(&self) -> usize {
        self.commands().len()
    }
}

fn collect_commands(node: &CommandNode, path: &mut Vec<String>, out: &mut Vec<CommandEntry>) {
    for (name, child) in &node.children {
        path.push(name.clone());
        if child.is_command {
            out.push(CommandEntry {
                path: path.clone(),
                required: child.is_required(),
            });
        }
        collect_commands(child, path, out);
        path.pop();
    }
}

/// A single non-blank schema line, split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
struct SchemaLine<'a> {
    number: usize,
    segments: Vec<&'a str>,
    marked: bool,
    doc: Option<String>,
}

impl<'a> SchemaLine<'a> {
    /// Returns `Ok(None)` for blank lines
    fn parse(number: usize, raw: &'a str) -> Result<Option<Self>> {
        let mut tokens = raw.split_whitespace();
        let Some(spec) = tokens.next() else {
            return Ok(None);
        };

        let rest: Vec<&str> = tokens.collect();
        let doc = if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        };

        let (spec, marked) = match spec.strip_suffix(REQUIRED_MARKER) {
            Some(stripped) => (stripped, true),
            None => (spec, false),
        };
        if spec.is_empty() {
            return Err(CompileError::syntax(number, raw, "empty command spec"));
        }

        let segments: Vec<&str> = spec.split(PATH_SEPARATOR).collect();
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(CompileError::syntax(
                number,
                raw,
                format!("empty path segment at position {}", pos + 1),
            ));
        }

        Ok(Some(Self {
            number,
            segments,
            marked,
            doc,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "volt:dc\nvolt:ac?\nfreq\n";

    #[test]
    fn test_sample_tree_shape() {
        let tree = CommandTree::parse(SAMPLE).unwrap();
        let root = tree.root();
        assert_eq!(root.name(), None);
        assert!(!root.is_command());
        assert_eq!(root.children().keys().collect::<Vec<_>>(), vec!["freq", "volt"]);

        let volt = tree.get(&["volt"]).unwrap();
        assert!(!volt.is_command());
        assert_eq!(volt.children().keys().collect::<Vec<_>>(), vec!["ac", "dc"]);

        for path in [vec!["volt", "dc"], vec!["volt", "ac"], vec!["freq"]] {
            let node = tree.get(&path).unwrap();
            assert!(node.is_command(), "{:?} should be a command", path);
            assert!(node.is_required(), "{:?} should be required", path);
        }
        assert!(!tree.get(&["freq"]).unwrap().has_children());
    }

    #[test]
    fn test_empty_input_is_root_only() {
        let tree = CommandTree::parse("").unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.command_count(), 0);

        let tree = CommandTree::parse("\n   \n\t\n").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_duplicate_path_is_one_node() {
        let tree = CommandTree::parse("a:b\na:b\na:b?\n").unwrap();
        assert_eq!(tree.command_count(), 1);
        assert_eq!(tree.get(&["a"]).unwrap().children().len(), 1);
    }

    #[test]
    fn test_node_can_be_command_and_namespace() {
        let tree = CommandTree::parse("trig\ntrig:count\n").unwrap();
        let trig = tree.get(&["trig"]).unwrap();
        assert!(trig.is_command());
        assert!(trig.has_children());
        assert!(tree.get_topic("trig:count").unwrap().is_command());
    }

    #[test]
    fn test_empty_segments_rejected() {
        for (text, line) in [("a::b", 1), (":a", 1), ("a:", 1), ("ok\n\nb::", 3), ("?", 1), (":?", 1)] {
            match CommandTree::parse(text) {
                Err(CompileError::SchemaSyntax { line: got, .. }) => {
                    assert_eq!(got, line, "wrong line for {:?}", text)
                }
                other => panic!("Expected SchemaSyntax for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_syntax_error_carries_raw_text() {
        let err = CommandTree::parse("good\n  bad::cmd  trailing\n").unwrap_err();
        match err {
            CompileError::SchemaSyntax { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "  bad::cmd  trailing");
            }
            other => panic!("Expected SchemaSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_tokens_become_doc() {
        let tree = CommandTree::parse("trig:count?   Number of   triggers\ntrig:delay\n").unwrap();
        assert_eq!(tree.get_topic("trig:count").unwrap().doc(), Some("Number of triggers"));
        assert_eq!(tree.get_topic("trig:delay").unwrap().doc(), None);
    }

    #[test]
    fn test_marked_policy() {
        let tree = CommandTree::parse_with(SAMPLE, RequiredPolicy::Marked).unwrap();
        assert!(tree.get_topic("volt:ac").unwrap().is_required());
        assert!(!tree.get_topic("volt:dc").unwrap().is_required());
        assert!(!tree.get_topic("freq").unwrap().is_required());
    }

    #[test]
    fn test_commands_listing() {
        let tree = CommandTree::parse(SAMPLE).unwrap();
        let topics: Vec<String> = tree.commands().iter().map(|c| c.topic()).collect();
        assert_eq!(topics, vec!["freq", "volt:ac", "volt:dc"]);
    }
}
