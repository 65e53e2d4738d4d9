//! Apache config parser
//!
//! Recursive descent over a flat token stream. Each call to
//! [`Parser::parse_one`] consumes exactly the tokens of one node: its
//! leading whitespace, its type token and everything up to the end of the
//! line. An opening section tag recurses until the matching closing tag,
//! whose tokens become the section's `post_tokens`.

use crate::error::{Error, Result};
use crate::include::Loader;
use crate::parser::ast::{NodeId, NodeKind, Tree};
use crate::parser::lexer::{Token, TokenKind};
use std::path::{Path, PathBuf};

/// Outcome of one recursive step
enum Step {
    Node(NodeId),
    /// Tokens of a closing tag, handed back to the enclosing section
    Close(Vec<Token>),
}

/// Parser state
pub struct Parser<'a, I> {
    tokens: I,
    loader: Option<&'a Loader<'a>>,
    include_depth: usize,
    file: Option<PathBuf>,
    offset: usize,
    line: usize,
}

impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = Token>,
{
    /// Create a parser over a token stream. Include directives are left
    /// unresolved unless a loader is attached.
    pub fn new<T>(tokens: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            tokens: tokens.into_iter(),
            loader: None,
            include_depth: 0,
            file: None,
            offset: 0,
            line: 1,
        }
    }

    /// Resolve includes through `loader`; `depth` is the include nesting
    /// level of the source being parsed.
    pub(crate) fn with_loader(mut self, loader: &'a Loader<'a>, depth: usize) -> Self {
        self.loader = Some(loader);
        self.include_depth = depth;
        self
    }

    /// Name the file being parsed in lex errors
    pub(crate) fn in_file(mut self, path: &Path) -> Self {
        self.file = Some(path.to_path_buf());
        self
    }

    /// Parse all remaining nodes, attaching them under `parent` (or as roots)
    pub fn parse_all(&mut self, tree: &mut Tree, parent: Option<NodeId>) -> Result<Vec<NodeId>> {
        let mut nodes = Vec::new();
        while let Some(id) = self.parse_one(tree, parent)? {
            nodes.push(id);
        }
        Ok(nodes)
    }

    /// Parse the next node. Returns `None` once the stream is exhausted.
    pub fn parse_one(&mut self, tree: &mut Tree, parent: Option<NodeId>) -> Result<Option<NodeId>> {
        match self.step(tree, parent)? {
            Some(Step::Node(id)) => Ok(Some(id)),
            Some(Step::Close(tokens)) => {
                tracing::warn!(
                    "Closing tag without an open section before line {}, keeping it as text",
                    self.line
                );
                Ok(Some(tree.add_node(NodeKind::Node, tokens, parent)))
            }
            None => Ok(None),
        }
    }

    fn step(&mut self, tree: &mut Tree, parent: Option<NodeId>) -> Result<Option<Step>> {
        let mut pre_tokens = Vec::new();
        let mut typed = false;
        let mut closing = false;

        while let Some(token) = self.next_token()? {
            // Leading whitespace belongs to the node that follows it.
            if !typed && token.is_whitespace() {
                pre_tokens.push(token);
                continue;
            }
            typed = true;

            let ends_line = token.ends_line();
            let tag_close = token.is_tag_close();
            let tag_end = token.is_tag_end();
            pre_tokens.push(token);

            if ends_line {
                return self.finish(tree, pre_tokens, parent).map(|id| Some(Step::Node(id)));
            }
            if tag_close {
                closing = true;
            } else if tag_end {
                if closing {
                    return Ok(Some(Step::Close(pre_tokens)));
                }
                return self.section(tree, pre_tokens, parent).map(|id| Some(Step::Node(id)));
            }
        }

        // End of stream: whatever was gathered becomes a final node.
        if pre_tokens.is_empty() {
            Ok(None)
        } else if closing {
            Ok(Some(Step::Close(pre_tokens)))
        } else {
            self.finish(tree, pre_tokens, parent).map(|id| Some(Step::Node(id)))
        }
    }

    /// Complete a node that has no children
    fn finish(
        &mut self,
        tree: &mut Tree,
        pre_tokens: Vec<Token>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let kind = NodeKind::classify(type_token(&pre_tokens));
        let id = tree.add_node(kind, pre_tokens, parent);
        if tree[id].kind().is_include() {
            if let Some(loader) = self.loader {
                loader.resolve_include(tree, id, self.include_depth)?;
            }
        }
        Ok(id)
    }

    /// Parse the body of a section whose opening tag is `pre_tokens`
    fn section(
        &mut self,
        tree: &mut Tree,
        pre_tokens: Vec<Token>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let kind = NodeKind::classify(type_token(&pre_tokens));
        let id = tree.add_node(kind, pre_tokens, parent);
        loop {
            match self.step(tree, Some(id))? {
                Some(Step::Node(_)) => {}
                Some(Step::Close(tokens)) => {
                    tree.set_post_tokens(id, tokens);
                    break;
                }
                None => {
                    tracing::debug!("Section left open at end of input (line {})", self.line);
                    break;
                }
            }
        }
        Ok(id)
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(token) = self.tokens.next() else {
            return Ok(None);
        };
        if token.kind == TokenKind::Error {
            return Err(Error::Lex {
                file: self.file.clone(),
                line: self.line,
                offset: self.offset,
                text: token.text.to_string(),
            });
        }
        self.offset += token.text.len();
        self.line += token.newlines();
        Ok(Some(token))
    }
}

fn type_token(tokens: &[Token]) -> Option<&Token> {
    tokens.iter().find(|t| !t.is_whitespace())
}

/// Parse a token stream into a tree without resolving includes
pub fn parse_tokens<T>(tokens: T) -> Result<Tree>
where
    T: IntoIterator<Item = Token>,
{
    let mut tree = Tree::new();
    Parser::new(tokens).parse_all(&mut tree, None)?;
    Ok(tree)
}
