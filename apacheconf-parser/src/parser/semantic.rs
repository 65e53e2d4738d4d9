//! Directive semantics
//!
//! Names and arguments of directives, and the advisory checks for
//! `ServerName` / `ServerAlias`. Invalid values never fail a parse; they are
//! reported by [`validate`].

use crate::parser::ast::{DirectiveKind, Node, NodeId, NodeKind, SectionKind, Tree};
use crate::visit::enumerate_lines;
use regex::Regex;
use std::sync::LazyLock;

static SERVER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z]+://)?[a-zA-Z_0-9.]+(?::[0-9]+)?\s*$").expect("valid regex")
});

static SERVER_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_0-9.]+\s*$").expect("valid regex"));

impl Node {
    /// Directive name; for sections the tag name without `<`
    pub fn name(&self) -> Option<&str> {
        let token = self.type_token()?;
        match self.kind {
            NodeKind::Directive(_) => Some(token.text.as_str()),
            NodeKind::Section(_) => {
                let text = token.text.as_str();
                Some(text.strip_prefix('<').unwrap_or(text))
            }
            _ => None,
        }
    }

    /// Trimmed arguments following the directive name, e.g. `Deny from all`
    /// gives `["from", "all"]` and `<VirtualHost *:80>` gives `["*:80"]`.
    pub fn arguments(&self) -> Vec<&str> {
        if !self.kind.is_directive() && !self.kind.is_section() {
            return Vec::new();
        }
        let Some(index) = self.type_index() else {
            return Vec::new();
        };
        self.pre_tokens[index + 1..]
            .iter()
            .take_while(|t| !t.is_tag_end())
            .filter(|t| !t.text.trim().is_empty() && !t.is_continuation())
            .map(|t| t.text.trim())
            .collect()
    }

    /// ServerName takes one `[scheme://]domain[:port]`; ServerAlias takes
    /// one or more bare domains. Every other node is valid.
    pub fn is_valid(&self) -> bool {
        match self.kind {
            NodeKind::Directive(DirectiveKind::ServerName) => {
                let args = self.arguments();
                args.len() == 1 && SERVER_NAME.is_match(args[0])
            }
            NodeKind::Directive(DirectiveKind::ServerAlias) => {
                let args = self.arguments();
                !args.is_empty() && args.iter().all(|a| SERVER_ALIAS.is_match(a))
            }
            _ => true,
        }
    }
}

impl Tree {
    /// First `ServerName` directly inside a virtual host
    pub fn server_name(&self, vhost: NodeId) -> Option<NodeId> {
        self.find_child(vhost, DirectiveKind::ServerName)
    }

    /// First `ServerAlias` directly inside a virtual host
    pub fn server_alias(&self, vhost: NodeId) -> Option<NodeId> {
        self.find_child(vhost, DirectiveKind::ServerAlias)
    }

    fn find_child(&self, vhost: NodeId, kind: DirectiveKind) -> Option<NodeId> {
        if self[vhost].kind() != &NodeKind::Section(SectionKind::VirtualHost) {
            return None;
        }
        self.children(vhost)
            .iter()
            .copied()
            .find(|&c| self[c].kind() == &NodeKind::Directive(kind))
    }
}

/// An invalid directive found by [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub node: NodeId,
    /// Line within the file the node belongs to
    pub line: usize,
    pub message: String,
}

/// Report every invalid ServerName / ServerAlias reachable from `nodes`.
/// Files loaded by includes are checked separately by passing their
/// `ConfigFile` nodes.
pub fn validate(tree: &Tree, nodes: &[NodeId]) -> Vec<Diagnostic> {
    enumerate_lines(tree, nodes)
        .into_iter()
        .filter(|&(id, _)| !tree[id].is_valid())
        .map(|(id, line)| {
            let node = &tree[id];
            Diagnostic {
                node: id,
                line,
                message: format!(
                    "invalid {}: {}",
                    node.name().unwrap_or_default(),
                    node.arguments().join(" ")
                ),
            }
        })
        .collect()
}
