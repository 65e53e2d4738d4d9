//! Tree traversal and line mapping

use crate::parser::ast::{Node, NodeId, Tree};
use crate::parser::lexer::Token;

/// Visiting order for [`Tree::walk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Each node, then its subtree
    #[default]
    DepthFirst,
    /// Every node of a list, then the children of each of them in turn
    BreadthFirst,
}

impl Tree {
    /// Visit `nodes` and everything below them in the given order
    pub fn walk<F>(&self, nodes: &[NodeId], order: Order, mut visitor: F)
    where
        F: FnMut(NodeId, &Node),
    {
        match order {
            Order::DepthFirst => self.walk_depth_first(nodes, &mut visitor),
            Order::BreadthFirst => self.walk_breadth_first(nodes, &mut visitor),
        }
    }

    fn walk_depth_first(&self, nodes: &[NodeId], visitor: &mut dyn FnMut(NodeId, &Node)) {
        for &id in nodes {
            visitor(id, &self[id]);
            self.walk_depth_first(self.children(id), visitor);
        }
    }

    fn walk_breadth_first(&self, nodes: &[NodeId], visitor: &mut dyn FnMut(NodeId, &Node)) {
        for &id in nodes {
            visitor(id, &self[id]);
        }
        for &id in nodes {
            self.walk_breadth_first(self.children(id), visitor);
        }
    }
}

/// Node ids in depth-first order
pub fn depth_first(tree: &Tree, nodes: &[NodeId]) -> Vec<NodeId> {
    let mut order = Vec::new();
    tree.walk(nodes, Order::DepthFirst, |id, _| order.push(id));
    order
}

/// Node ids in breadth-first order
pub fn breadth_first(tree: &Tree, nodes: &[NodeId]) -> Vec<NodeId> {
    let mut order = Vec::new();
    tree.walk(nodes, Order::BreadthFirst, |id, _| order.push(id));
    order
}

/// Depth-first walk keeping a running line counter. Each file is numbered
/// from 1; files pulled in by an include are not entered.
struct LineEnumerator<'t> {
    tree: &'t Tree,
    line: usize,
    lines: Vec<(NodeId, usize)>,
}

impl LineEnumerator<'_> {
    fn visit(&mut self, nodes: &[NodeId]) {
        let tree = self.tree;
        for &id in nodes {
            let node = &tree[id];
            if node.kind().is_config_file() {
                let outer = std::mem::replace(&mut self.line, 1);
                self.visit(node.children());
                self.line = outer;
                continue;
            }

            match node.type_index() {
                Some(index) => {
                    let (before, rest) = node.pre_tokens().split_at(index);
                    self.line += newlines(before);
                    self.lines.push((id, self.line));
                    self.line += newlines(rest);
                }
                None => self.line += newlines(node.pre_tokens()),
            }

            if !node.kind().is_include() {
                self.visit(node.children());
            }
            self.line += newlines(node.post_tokens());
        }
    }
}

fn newlines(tokens: &[Token]) -> usize {
    tokens.iter().map(Token::newlines).sum()
}

/// `(node, line)` for every typed node reachable from `nodes`, depth-first
pub fn enumerate_lines(tree: &Tree, nodes: &[NodeId]) -> Vec<(NodeId, usize)> {
    let mut enumerator = LineEnumerator {
        tree,
        line: 1,
        lines: Vec::new(),
    };
    enumerator.visit(nodes);
    enumerator.lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{DirectiveKind, NodeKind};
    use crate::parser::lexer::{Lexer, TokenKind};
    use crate::parser::parser::parse_tokens;

    const TWO_HOSTS: &str = "<VirtualHost *:80>\n  ServerName a.example\n</VirtualHost>\n<VirtualHost *:81>\n  ServerName b.example\n</VirtualHost>\n";

    fn parse(source: &str) -> Tree {
        parse_tokens(Lexer::new(source)).unwrap()
    }

    fn labels(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter(|&&id| tree[id].type_token().is_some())
            .map(|&id| {
                let node = &tree[id];
                format!("{}:{}", node.kind().label(), node.arguments().join(" "))
            })
            .collect()
    }

    #[test]
    fn test_depth_first_order() {
        let tree = parse(TWO_HOSTS);
        let order = depth_first(&tree, tree.roots());
        assert_eq!(
            labels(&tree, &order),
            vec![
                "VirtualHost:*:80",
                "ServerName:a.example",
                "VirtualHost:*:81",
                "ServerName:b.example"
            ]
        );
    }

    #[test]
    fn test_breadth_first_order() {
        let tree = parse(TWO_HOSTS);
        let order = breadth_first(&tree, tree.roots());
        assert_eq!(
            labels(&tree, &order),
            vec![
                "VirtualHost:*:80",
                "VirtualHost:*:81",
                "ServerName:a.example",
                "ServerName:b.example"
            ]
        );
    }

    #[test]
    fn test_walk_visits_every_node_once() {
        let tree = parse(TWO_HOSTS);
        for order in [Order::DepthFirst, Order::BreadthFirst] {
            let mut seen = Vec::new();
            tree.walk(tree.roots(), order, |id, _| seen.push(id.index()));
            seen.sort();
            assert_eq!(seen, (0..tree.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_line_numbers() {
        let source = "# header\n\nListen 80\n<Directory /srv>\n  Options Indexes \\\n    FollowSymLinks\n  Require all granted\n</Directory>\nKeepAlive On\n";
        let tree = parse(source);
        let lines: Vec<(String, usize)> = enumerate_lines(&tree, tree.roots())
            .into_iter()
            .map(|(id, line)| (tree[id].kind().label().to_string(), line))
            .collect();
        let expected = [
            ("Comment", 1),
            ("Directive", 3),
            ("Directory", 4),
            ("Directive", 5),
            ("Directive", 7),
            ("Directive", 9),
        ];
        let expected: Vec<(String, usize)> = expected
            .iter()
            .map(|&(label, line)| (label.to_string(), line))
            .collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_lines_restart_in_each_file() {
        let listen = vec![
            Token::new(TokenKind::Text, "\n"),
            Token::new(TokenKind::Name, "Listen"),
            Token::new(TokenKind::Text, " "),
            Token::new(TokenKind::Number, "80"),
            Token::new(TokenKind::Text, ""),
        ];
        let mut tree = Tree::new();
        tree.add_node(NodeKind::Node, vec![Token::new(TokenKind::Text, "\n\n")], None);
        let file = tree.add_node(NodeKind::ConfigFile("inner.conf".into()), Vec::new(), None);
        let directive = NodeKind::Directive(DirectiveKind::Other);
        let inner = tree.add_node(directive.clone(), listen.clone(), Some(file));
        let outer = tree.add_node(directive, listen, None);

        assert_eq!(
            enumerate_lines(&tree, tree.roots()),
            vec![(inner, 2), (outer, 4)]
        );
    }
}
