use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sqlscan::{highlight_spans, is_complete, scan_str, split_statements, Dialect, StatementBuffer};

fn sample_script(statements: usize) -> String {
    let mut sql = String::new();
    for i in 0..statements {
        sql.push_str(&format!(
            "-- statement {i}\nselect a.id, b.name, 'it''s {i}' as label, \"Quoted Col\"\n  from table_a a\n  join table_b b on a.id = b.a_id /* join */\n where a.x > {i} and b.y in (1, 2, 3);\n"
        ));
    }
    sql
}

fn bench_scan_small(c: &mut Criterion) {
    let sql = "SELECT a, b, c FROM my_table WHERE x = 1 AND y > 2 ORDER BY a;\n";
    let dialect = Dialect::ansi();
    c.bench_function("scan_small", |b| {
        b.iter(|| is_complete(&scan_str(black_box(sql), black_box(&dialect))))
    });
}

fn bench_scan_large(c: &mut Criterion) {
    let sql = sample_script(500);
    let dialect = Dialect::ansi();
    c.bench_function("scan_large", |b| {
        b.iter(|| scan_str(black_box(&sql), black_box(&dialect)))
    });
}

fn bench_highlight_large(c: &mut Criterion) {
    let sql = sample_script(500);
    let dialect = Dialect::ansi();
    c.bench_function("highlight_large", |b| {
        b.iter(|| highlight_spans(&scan_str(black_box(&sql), black_box(&dialect))))
    });
}

fn bench_split_large(c: &mut Criterion) {
    let sql = sample_script(500);
    let dialect = Dialect::postgresql();
    c.bench_function("split_large", |b| {
        b.iter(|| split_statements(black_box(&sql), black_box(&dialect)))
    });
}

fn bench_line_by_line(c: &mut Criterion) {
    let sql = sample_script(50);
    let dialect = Dialect::ansi();
    c.bench_function("line_by_line", |b| {
        b.iter(|| {
            let mut buffer = StatementBuffer::new(dialect.clone());
            for line in sql.split_inclusive('\n') {
                if buffer.push(black_box(line)).is_complete() {
                    buffer.take();
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_scan_small,
    bench_scan_large,
    bench_highlight_large,
    bench_split_large,
    bench_line_by_line
);
criterion_main!(benches);
