use apacheconf_parser::{
    depth_first, parse_tokens, tokenize, DirectiveKind, NodeKind, ParseOptions, SectionKind,
    Tree,
};

fn fixture(name: &str) -> String {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/files/");
    std::fs::read_to_string(format!("{path}{name}")).unwrap()
}

fn parse(source: &str) -> Tree {
    apacheconf_parser::parse_with(source, &ParseOptions::default().without_includes()).unwrap()
}

#[test]
fn test_fixtures_round_trip() {
    for name in ["small_vhost.conf", "factory.conf", "httpd.conf"] {
        let source = fixture(name);
        let tree = parse(&source);
        assert_eq!(tree.to_text(), source, "{name}");
        assert_eq!(tree.to_string(), source, "{name}");
    }
}

#[test]
fn test_round_trip_odd_input() {
    let sources = [
        "",
        "   ",
        "#",
        "# only a comment",
        "Listen 80\r\nListen 443\r\n",
        "<IfModule !mod_ssl.c>\n</IfModule>",
        "Header set X-Test \"a \\\"quoted\\\" value\"\n",
        "AddType application/x-httpd-php .php\n...\n",
        "\t<Directory \"/srv/my site\">\n\t\tRequire all granted\n\t</Directory>\n\n\n",
    ];
    for source in sources {
        assert_eq!(parse(source).to_text(), source, "{source:?}");
    }
}

#[test]
fn test_parent_consistency() {
    let tree = parse(&fixture("factory.conf"));
    for id in depth_first(&tree, tree.roots()) {
        match tree.parent(id) {
            Some(parent) => {
                let count = tree.children(parent).iter().filter(|&&c| c == id).count();
                assert_eq!(count, 1);
            }
            None => assert!(tree.roots().contains(&id)),
        }
    }
}

#[test]
fn test_classification_is_idempotent() {
    let tree = parse(&fixture("httpd.conf"));
    for id in depth_first(&tree, tree.roots()) {
        let node = &tree[id];
        assert_eq!(&NodeKind::classify(node.type_token()), node.kind());
    }
}

#[test]
fn test_small_vhost_structure() {
    let tree = parse(&fixture("small_vhost.conf"));
    let vhost = tree.roots()[0];
    assert_eq!(tree[vhost].kind(), &NodeKind::Section(SectionKind::VirtualHost));
    assert_eq!(tree[vhost].arguments(), vec!["*:80"]);

    let kinds: Vec<&NodeKind> = tree.children(vhost).iter().map(|&c| tree[c].kind()).collect();
    assert_eq!(
        kinds,
        vec![
            &NodeKind::Directive(DirectiveKind::ServerName),
            &NodeKind::Directive(DirectiveKind::ServerAlias),
            &NodeKind::Directive(DirectiveKind::Other),
        ]
    );
    let name = tree.server_name(vhost).unwrap();
    assert!(tree[name].is_valid());
}

#[test]
fn test_parse_from_token_vector() {
    let source = fixture("factory.conf");
    let tree = parse_tokens(tokenize(&source)).unwrap();
    assert_eq!(tree.to_text(), source);
}
