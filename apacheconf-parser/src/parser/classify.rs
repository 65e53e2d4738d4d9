//! Node classification
//!
//! Maps a node's type token to the most specific [`NodeKind`]. The parser
//! calls this once, as soon as the type token is known, so every node is
//! created as its final kind and children always point at it.

use crate::parser::ast::{DirectiveKind, NodeKind, SectionKind};
use crate::parser::lexer::{Token, TokenKind};

impl NodeKind {
    /// Classify a node from its type token. Total: anything unrecognised
    /// falls back to the generic kind of its family.
    pub fn classify(type_token: Option<&Token>) -> NodeKind {
        let Some(token) = type_token else {
            return NodeKind::Node;
        };
        match token.kind {
            TokenKind::Tag if token.is_tag_open() => {
                NodeKind::Section(SectionKind::from_name(&token.text.as_str()[1..]))
            }
            TokenKind::Name => NodeKind::Directive(DirectiveKind::from_name(&token.text)),
            TokenKind::Comment => NodeKind::Comment,
            _ => NodeKind::Node,
        }
    }
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> DirectiveKind {
        match name.to_ascii_lowercase().as_str() {
            "servername" => DirectiveKind::ServerName,
            "serveralias" => DirectiveKind::ServerAlias,
            "include" => DirectiveKind::Include,
            "includeoptional" => DirectiveKind::IncludeOptional,
            _ => DirectiveKind::Other,
        }
    }
}

impl SectionKind {
    pub fn from_name(name: &str) -> SectionKind {
        match name.to_ascii_lowercase().as_str() {
            "virtualhost" => SectionKind::VirtualHost,
            "directory" => SectionKind::Directory,
            "directorymatch" => SectionKind::DirectoryMatch,
            "files" => SectionKind::Files,
            "filesmatch" => SectionKind::FilesMatch,
            "location" => SectionKind::Location,
            "locationmatch" => SectionKind::LocationMatch,
            "proxy" => SectionKind::Proxy,
            "proxymatch" => SectionKind::ProxyMatch,
            _ => SectionKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(kind: TokenKind, text: &str) -> NodeKind {
        NodeKind::classify(Some(&Token::new(kind, text)))
    }

    #[test]
    fn test_sections() {
        assert_eq!(
            classify(TokenKind::Tag, "<VirtualHost"),
            NodeKind::Section(SectionKind::VirtualHost)
        );
        assert_eq!(
            classify(TokenKind::Tag, "<directorymatch"),
            NodeKind::Section(SectionKind::DirectoryMatch)
        );
        assert_eq!(
            classify(TokenKind::Tag, "<IfModule"),
            NodeKind::Section(SectionKind::Other)
        );
    }

    #[test]
    fn test_directives_are_case_insensitive() {
        assert_eq!(
            classify(TokenKind::Name, "SERVERNAME"),
            NodeKind::Directive(DirectiveKind::ServerName)
        );
        assert_eq!(
            classify(TokenKind::Name, "IncludeOptional"),
            NodeKind::Directive(DirectiveKind::IncludeOptional)
        );
        assert_eq!(
            classify(TokenKind::Name, "DocumentRoot"),
            NodeKind::Directive(DirectiveKind::Other)
        );
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(classify(TokenKind::Comment, "# hi"), NodeKind::Comment);
        assert_eq!(classify(TokenKind::Text, "..."), NodeKind::Node);
        assert_eq!(classify(TokenKind::Tag, "</VirtualHost"), NodeKind::Node);
        assert_eq!(NodeKind::classify(None), NodeKind::Node);
    }

    #[test]
    fn test_tag_name_is_not_a_directive_name() {
        // A directive-name token spelled like a section stays a directive.
        assert_eq!(
            classify(TokenKind::Name, "VirtualHost"),
            NodeKind::Directive(DirectiveKind::Other)
        );
    }
}
