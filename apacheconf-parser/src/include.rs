//! Include resolution
//!
//! `Include` and `IncludeOptional` name a glob pattern. Every matching file
//! is parsed into its own `ConfigFile` node and attached, in sorted order,
//! as a child of the include directive. The included text is never inlined
//! into the including file: writing a tree back puts each file at its own
//! path.

use crate::error::{Error, Result};
use crate::file::ConfigFile;
use crate::options::ParseOptions;
use crate::parser::ast::{DirectiveKind, NodeId, NodeKind, Tree};
use crate::parser::lexer::Lexer;
use crate::parser::parser::Parser;
use std::path::{Path, PathBuf};

/// File system access needed to load and save configuration files
pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Paths matching `pattern`, in a stable order
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    fn write(&self, path: &Path, contents: &str) -> std::io::Result<()>;
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let entries = glob::glob(pattern).map_err(|source| Error::IncludePattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(Error::io(path, e.into_error()));
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn write(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// Parses sources and the files their includes pull in
pub struct Loader<'fs> {
    fs: &'fs dyn FileSystem,
    options: ParseOptions,
}

impl<'fs> Loader<'fs> {
    pub fn new(fs: &'fs dyn FileSystem, options: ParseOptions) -> Self {
        Self { fs, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn file_system(&self) -> &'fs dyn FileSystem {
        self.fs
    }

    /// Parse configuration text. Top-level nodes become the tree's roots.
    pub fn parse_str(&self, source: &str) -> Result<Tree> {
        let mut tree = Tree::new();
        Parser::new(Lexer::new(source))
            .with_loader(self, 0)
            .parse_all(&mut tree, None)?;
        Ok(tree)
    }

    /// Open a configuration file together with everything it includes
    pub fn open(&self, path: impl AsRef<Path>) -> Result<ConfigFile> {
        let mut tree = Tree::new();
        let root = self.load_file(&mut tree, path.as_ref(), None, 0)?;
        Ok(ConfigFile::from_parts(tree, root))
    }

    /// Read and parse `path` into a new `ConfigFile` node under `parent`
    pub(crate) fn load_file(
        &self,
        tree: &mut Tree,
        path: &Path,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId> {
        tracing::debug!("Loading config file: {}", path.display());
        let source = self
            .fs
            .read_to_string(path)
            .map_err(|e| Error::io(path, e))?;

        let file = tree.add_node(NodeKind::ConfigFile(path.to_path_buf()), Vec::new(), parent);
        let nodes = Parser::new(Lexer::new(&source))
            .in_file(path)
            .with_loader(self, depth)
            .parse_all(tree, Some(file))?;
        tracing::trace!("Parsed {} top-level nodes from {}", nodes.len(), path.display());
        Ok(file)
    }

    /// Load the files named by the include directive `include`. `depth` is
    /// the nesting level of the source containing the directive.
    pub(crate) fn resolve_include(&self, tree: &mut Tree, include: NodeId, depth: usize) -> Result<()> {
        if !self.options.resolve_includes {
            return Ok(());
        }

        let node = &tree[include];
        let optional = matches!(
            node.kind(),
            NodeKind::Directive(DirectiveKind::IncludeOptional)
        );
        let directive = node.name().unwrap_or("Include").to_string();
        let Some(argument) = node.arguments().first().copied() else {
            return Err(Error::IncludeMissingPath { directive });
        };
        let pattern = self.pattern(argument);

        if depth >= self.options.max_include_depth {
            return Err(Error::IncludeDepthExceeded {
                limit: self.options.max_include_depth,
                path: PathBuf::from(pattern),
            });
        }

        let paths = self.fs.glob(&pattern)?;
        tracing::debug!("Resolving {} '{}' ({} matches)", directive, pattern, paths.len());
        if paths.is_empty() {
            if optional {
                tracing::warn!("{} '{}' matched nothing, skipping", directive, pattern);
                return Ok(());
            }
            return Err(Error::IncludeNoMatch { directive, pattern });
        }

        for path in paths {
            self.load_file(tree, &path, Some(include), depth + 1)?;
        }
        Ok(())
    }

    /// Glob pattern for an include argument: quotes stripped and relative
    /// patterns anchored at the server root.
    fn pattern(&self, argument: &str) -> String {
        let argument = argument
            .strip_prefix('"')
            .and_then(|a| a.strip_suffix('"'))
            .unwrap_or(argument);
        match &self.options.server_root {
            Some(root) if Path::new(argument).is_relative() => {
                root.join(argument).to_string_lossy().into_owned()
            }
            _ => argument.to_string(),
        }
    }
}
