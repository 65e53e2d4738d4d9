//! Apache httpd Configuration Parser
//!
//! This crate parses Apache configuration into a lossless directive tree:
//! every token, whitespace and comment included, is kept, so a parsed file
//! can be inspected, edited and written back byte for byte.
//!
//! # Example
//!
//! ```rust
//! use apacheconf_parser::{parse, NodeKind, SectionKind};
//!
//! let source = "<VirtualHost *:80>\n    ServerName example.com\n</VirtualHost>\n";
//! let tree = parse(source).unwrap();
//!
//! let vhost = tree.roots()[0];
//! assert_eq!(tree[vhost].kind(), &NodeKind::Section(SectionKind::VirtualHost));
//!
//! let name = tree.server_name(vhost).unwrap();
//! assert_eq!(tree[name].arguments(), vec!["example.com"]);
//! assert!(tree[name].is_valid());
//!
//! assert_eq!(tree.to_text(), source);
//! ```

pub mod error;
pub mod file;
pub mod include;
pub mod options;
pub mod parser;
pub mod visit;

pub use error::{Error, Result};
pub use file::ConfigFile;
pub use include::{FileSystem, Loader, OsFileSystem};
pub use options::{ParseOptions, DEFAULT_MAX_INCLUDE_DEPTH};
pub use parser::{
    parse_tokens, tokenize, validate, Diagnostic, DirectiveKind, Lexer, Node, NodeId, NodeKind,
    Parser, SectionKind, Token, TokenKind, Tree,
};
pub use visit::{breadth_first, depth_first, enumerate_lines, Order};

use std::path::Path;

/// Parse configuration text, resolving includes relative to the current
/// directory
pub fn parse(source: &str) -> Result<Tree> {
    parse_with(source, &ParseOptions::default())
}

pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Tree> {
    Loader::new(&OsFileSystem, options.clone()).parse_str(source)
}

/// Open a file and every file it includes
pub fn open_config_file(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::open(path)
}

/// Lossless text of a whole tree
pub fn to_text(tree: &Tree) -> String {
    tree.to_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_validate() {
        let source = r#"
ServerRoot "/etc/httpd"
Listen 80

<VirtualHost *:80>
    ServerName www.example.com
    ServerAlias example.com static.example.com
    DocumentRoot /var/www/html
    <Directory /var/www/html>
        Options Indexes FollowSymLinks
        AllowOverride None
    </Directory>
</VirtualHost>
"#;

        let tree = parse(source).unwrap();
        assert_eq!(to_text(&tree), source);

        let vhost = tree
            .roots()
            .iter()
            .copied()
            .find(|&id| tree[id].kind() == &NodeKind::Section(SectionKind::VirtualHost))
            .unwrap();
        let alias = tree.server_alias(vhost).unwrap();
        assert_eq!(tree[alias].arguments(), vec!["example.com", "static.example.com"]);
        assert!(validate(&tree, tree.roots()).is_empty());
    }

    #[test]
    fn test_parse_with_includes_disabled() {
        let options = ParseOptions::default().without_includes();
        let tree = parse_with("Include /nonexistent/*.conf\n", &options).unwrap();
        let include = tree.roots()[0];
        assert!(tree[include].kind().is_include());
        assert!(tree.children(include).is_empty());
    }

    #[test]
    fn test_parse_reports_lex_errors() {
        let err = parse("Listen 80\nListen 443\nDocumentRoot \"/srv\n").unwrap_err();
        assert!(matches!(err, Error::Lex { line: 3, .. }));
    }
}
