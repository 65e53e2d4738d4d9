use apacheconf_parser::{parse_with, tokenize, ParseOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FACTORY: &str = include_str!("../tests/files/factory.conf");

fn large_config() -> String {
    let mut source = String::from(FACTORY);
    for i in 0..200 {
        source.push_str(&format!(
            "<VirtualHost *:80>\n    ServerName site{i}.example.com\n    ServerAlias www.site{i}.example.com\n    DocumentRoot /var/www/site{i}\n    <Directory /var/www/site{i}>\n        Require all granted\n    </Directory>\n</VirtualHost>\n\n"
        ));
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let options = ParseOptions::default().without_includes();
    let source = large_config();

    c.bench_function("tokenize", |b| b.iter(|| tokenize(black_box(&source))));
    c.bench_function("parse", |b| {
        b.iter(|| parse_with(black_box(&source), &options))
    });
    c.bench_function("parse_and_print", |b| {
        b.iter(|| parse_with(black_box(&source), &options).map(|tree| tree.to_text()))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
