//! Directive tree for Apache configuration files
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other through
//! [`NodeId`]. A parent owns its children through its ordered child list; the
//! `parent` link is a plain index and never keeps anything alive.
//!
//! Every node keeps the exact tokens it was built from:
//!
//! ```text
//! <VirtualHost *:80>          -> pre_tokens   [<VirtualHost][ ][*:80][>]
//!     ServerName example.com  -> children     (each with its own tokens)
//! </VirtualHost>              -> post_tokens  [\n][</VirtualHost][>]
//! ```
//!
//! Replaying `pre_tokens`, then the children, then `post_tokens` gives back
//! the source text.

use crate::parser::lexer::Token;
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// Handle to a node inside a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node represents, decided once from its type token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Untyped node: trailing whitespace, stray text or a stray closing tag
    Node,
    Comment,
    Directive(DirectiveKind),
    /// Scoped directive, `<Name ...>` ... `</Name>`
    Section(SectionKind),
    /// Root of a parsed file
    ConfigFile(PathBuf),
}

/// Simple directives with dedicated behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Other,
    ServerName,
    ServerAlias,
    Include,
    IncludeOptional,
}

/// Recognised section containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Other,
    VirtualHost,
    Directory,
    DirectoryMatch,
    Files,
    FilesMatch,
    Location,
    LocationMatch,
    Proxy,
    ProxyMatch,
}

impl NodeKind {
    pub fn is_directive(&self) -> bool {
        matches!(self, NodeKind::Directive(_))
    }

    pub fn is_section(&self) -> bool {
        matches!(self, NodeKind::Section(_))
    }

    /// `Include` or `IncludeOptional`
    pub fn is_include(&self) -> bool {
        matches!(
            self,
            NodeKind::Directive(DirectiveKind::Include | DirectiveKind::IncludeOptional)
        )
    }

    pub fn is_config_file(&self) -> bool {
        matches!(self, NodeKind::ConfigFile(_))
    }

    /// Short human readable label, e.g. `VirtualHost` or `Directive`
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Node => "Node",
            NodeKind::Comment => "Comment",
            NodeKind::ConfigFile(_) => "ConfigFile",
            NodeKind::Directive(kind) => match kind {
                DirectiveKind::Other => "Directive",
                DirectiveKind::ServerName => "ServerName",
                DirectiveKind::ServerAlias => "ServerAlias",
                DirectiveKind::Include => "Include",
                DirectiveKind::IncludeOptional => "IncludeOptional",
            },
            NodeKind::Section(kind) => match kind {
                SectionKind::Other => "Section",
                SectionKind::VirtualHost => "VirtualHost",
                SectionKind::Directory => "Directory",
                SectionKind::DirectoryMatch => "DirectoryMatch",
                SectionKind::Files => "Files",
                SectionKind::FilesMatch => "FilesMatch",
                SectionKind::Location => "Location",
                SectionKind::LocationMatch => "LocationMatch",
                SectionKind::Proxy => "Proxy",
                SectionKind::ProxyMatch => "ProxyMatch",
            },
        }
    }
}

/// A node of the directive tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) pre_tokens: Vec<Token>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) post_tokens: Vec<Token>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Leading whitespace, the type token and (for directives) the arguments
    pub fn pre_tokens(&self) -> &[Token] {
        &self.pre_tokens
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Closing tag of a section, including the whitespace before it
    pub fn post_tokens(&self) -> &[Token] {
        &self.post_tokens
    }

    /// Position of the first non-whitespace token in `pre_tokens`
    pub fn type_index(&self) -> Option<usize> {
        self.pre_tokens.iter().position(|t| !t.is_whitespace())
    }

    pub fn type_token(&self) -> Option<&Token> {
        self.type_index().map(|i| &self.pre_tokens[i])
    }

    /// Path of a `ConfigFile` node
    pub fn path(&self) -> Option<&Path> {
        match &self.kind {
            NodeKind::ConfigFile(path) => Some(path),
            _ => None,
        }
    }
}

/// Arena holding every node of one or more parsed sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes, in source order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    /// Number of parent links between `id` and its root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut node = self[id].parent;
        while let Some(parent) = node {
            depth += 1;
            node = self[parent].parent;
        }
        depth
    }

    /// Add a node and attach it as the last child of `parent`, or as the last
    /// root when there is no parent.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        pre_tokens: Vec<Token>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            pre_tokens,
            children: Vec::new(),
            post_tokens: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Move `child` to the end of `parent`'s children, detaching it from
    /// wherever it was attached before.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            parent != child && !self.ancestors(parent).any(|a| a == child),
            "cannot append a node to its own subtree"
        );
        match self.nodes[child.0].parent {
            Some(old) => self.nodes[old.0].children.retain(|&c| c != child),
            None => self.roots.retain(|&r| r != child),
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn set_post_tokens(&mut self, id: NodeId, tokens: Vec<Token>) {
        self.nodes[id.0].post_tokens = tokens;
    }

    /// Parents of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self[id].parent, |&p| self[p].parent)
    }

    /// Flattened token replay of `id`. Files pulled in by an include are not
    /// part of the including node's tokens.
    pub fn tokens(&self, id: NodeId) -> Vec<&Token> {
        let mut tokens = Vec::new();
        self.collect_tokens(id, &mut tokens);
        tokens
    }

    fn collect_tokens<'t>(&'t self, id: NodeId, out: &mut Vec<&'t Token>) {
        let node = &self[id];
        out.extend(node.pre_tokens.iter());
        if !node.kind.is_include() {
            for &child in &node.children {
                self.collect_tokens(child, out);
            }
        }
        out.extend(node.post_tokens.iter());
    }

    /// Source text of `id`
    pub fn text(&self, id: NodeId) -> String {
        self.tokens(id).into_iter().map(|t| t.text.as_str()).collect()
    }

    /// Source text of every root, concatenated
    pub fn to_text(&self) -> String {
        self.roots.iter().map(|&id| self.text(id)).collect()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &root in &self.roots {
            for token in self.tokens(root) {
                f.write_str(&token.text)?;
            }
        }
        Ok(())
    }
}
