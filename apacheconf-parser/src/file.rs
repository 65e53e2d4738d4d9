//! Configuration files on disk

use crate::error::{Error, Result};
use crate::include::{FileSystem, Loader, OsFileSystem};
use crate::options::ParseOptions;
use crate::parser::ast::{NodeId, Tree};
use crate::visit::depth_first;
use std::fmt;
use std::path::Path;

/// A parsed file bound to its path, together with every file it includes
#[derive(Debug, Clone)]
pub struct ConfigFile {
    tree: Tree,
    root: NodeId,
}

impl ConfigFile {
    pub(crate) fn from_parts(tree: Tree, root: NodeId) -> Self {
        Self { tree, root }
    }

    /// Open `path` from the real file system with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Loader::new(&OsFileSystem, ParseOptions::default()).open(path)
    }

    pub fn open_with(loader: &Loader<'_>, path: impl AsRef<Path>) -> Result<Self> {
        loader.open(path)
    }

    pub fn path(&self) -> &Path {
        self.tree[self.root]
            .path()
            .unwrap_or_else(|| Path::new(""))
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The `ConfigFile` node of this file
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Top-level nodes of this file
    pub fn children(&self) -> &[NodeId] {
        self.tree.children(self.root)
    }

    /// This file followed by every included file, depth-first
    pub fn files(&self) -> Vec<NodeId> {
        depth_first(&self.tree, &[self.root])
            .into_iter()
            .filter(|&id| self.tree[id].kind().is_config_file())
            .collect()
    }

    /// Write this file back to its path. Included files are left alone.
    pub fn write(&self) -> Result<()> {
        self.write_with(&OsFileSystem)
    }

    pub fn write_with(&self, fs: &dyn FileSystem) -> Result<()> {
        self.write_file(fs, self.root)
    }

    /// Write this file and every included file, each to its own path
    pub fn write_all(&self) -> Result<()> {
        for file in self.files() {
            self.write_file(&OsFileSystem, file)?;
        }
        Ok(())
    }

    fn write_file(&self, fs: &dyn FileSystem, file: NodeId) -> Result<()> {
        let Some(path) = self.tree[file].path() else {
            return Ok(());
        };
        tracing::debug!("Writing config file: {}", path.display());
        fs.write(path, &self.tree.text(file))
            .map_err(|e| Error::io(path, e))
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tree.tokens(self.root) {
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_and_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("httpd.conf");
        let source = "ServerRoot \"/etc/httpd\"\n<VirtualHost *:80>\n  ServerName example.com\n</VirtualHost>\n";
        fs::write(&path, source).unwrap();

        let config = ConfigFile::open(&path).unwrap();
        assert_eq!(config.path(), path.as_path());
        assert_eq!(config.children().len(), 3);
        assert_eq!(config.to_string(), source);

        fs::write(&path, "").unwrap();
        config.write().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn test_write_all_keeps_files_apart() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("httpd.conf");
        let site = dir.path().join("site.conf");
        fs::write(&main, "Listen 80\nInclude site.conf\n").unwrap();
        fs::write(&site, "ServerName example.com\n").unwrap();

        let options = ParseOptions::default().with_server_root(dir.path());
        let loader = Loader::new(&OsFileSystem, options);
        let config = ConfigFile::open_with(&loader, &main).unwrap();
        let files = config.files();
        assert_eq!(files.len(), 2);
        assert_eq!(config.tree()[files[1]].path(), Some(site.as_path()));

        fs::remove_file(&main).unwrap();
        fs::remove_file(&site).unwrap();
        config.write_all().unwrap();
        assert_eq!(fs::read_to_string(&main).unwrap(), "Listen 80\nInclude site.conf\n");
        assert_eq!(fs::read_to_string(&site).unwrap(), "ServerName example.com\n");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigFile::open(dir.path().join("missing.conf")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_write_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("httpd.conf");
        fs::write(&path, "Listen 80\n").unwrap();
        let config = ConfigFile::open(&path).unwrap();
        drop(dir);
        assert!(matches!(config.write(), Err(Error::Io { .. })));
    }
}
