//! SQL front-end benchmarks for VaultDB.
//!
//! Benchmarks for:
//! - Tokenizing
//! - Parsing each statement kind

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vault_common::config::QueryConfig;
use vault_sql::lexer::Lexer;
use vault_sql::Parser;

/// Statements of every kind the parser accepts.
fn statements() -> Vec<(&'static str, &'static str)> {
    vec![
        ("select_star", "SELECT * FROM ObjectTable"),
        ("select_columns", "SELECT name, owner_pid, size FROM ObjectTable"),
        ("select_where_eq", "SELECT * FROM T WHERE id = 1"),
        (
            "select_where_and",
            "SELECT * FROM T WHERE id > 1 AND id <= 500 AND name != 'root'",
        ),
        (
            "insert",
            "INSERT INTO ObjectTable (name, type, data) VALUES ('notes', 'file', 'hello world')",
        ),
        ("update", "UPDATE T SET name = 'bob' WHERE id = 1"),
        ("delete", "DELETE FROM T WHERE name = 'alice'"),
        ("show_tables", "SHOW TABLES"),
        ("describe", "DESCRIBE AuditTable"),
        ("grant", "GRANT READ, WRITE ON 3 TO 7"),
        ("revoke", "REVOKE 12;"),
    ]
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql/tokenize");
    for (name, sql) in statements() {
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| black_box(Lexer::tokenize(sql)));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql/parse");
    let config = QueryConfig::default();
    for (name, sql) in statements() {
        group.bench_with_input(BenchmarkId::from_parameter(name), sql, |b, sql| {
            b.iter(|| black_box(Parser::parse(sql, &config)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
