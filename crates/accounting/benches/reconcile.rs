use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pondops_accounting::{reconcile, reconcile_for_link, ExpenseCategory, LedgerEntry};
use pondops_core::LedgerLinkId;

const CATEGORIES: [&str; 6] = ["feed", "labor", "electricity", "postlarvae", "lab tests", ""];

/// A season of entries spread across 24 months and a handful of categories,
/// with every 50th entry carrying an unparsable date.
fn synthetic_ledger(size: usize, links: usize) -> Vec<LedgerEntry> {
    (0..size)
        .map(|i| {
            let link = LedgerLinkId::new(format!("pond-{}", i % links)).unwrap();
            let date = if i % 50 == 0 {
                "n/a".to_string()
            } else {
                format!("{}-{:02}-{:02}", 2023 + (i / 12) % 2, 1 + i % 12, 1 + i % 28)
            };
            if i % 4 == 0 {
                LedgerEntry::income(link, 10_000 + (i as u64 * 37) % 5_000, date)
            } else {
                let category = Some(ExpenseCategory::parse(CATEGORIES[i % CATEGORIES.len()]));
                LedgerEntry::expense(link, 1_000 + (i as u64 * 13) % 2_000, category, date)
            }
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [100usize, 1_000, 10_000] {
        let entries = synthetic_ledger(size, 1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| reconcile(black_box(entries)))
        });
    }

    group.finish();
}

fn bench_reconcile_for_link(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_for_link");
    let link = LedgerLinkId::new("pond-3").unwrap();

    for links in [1usize, 10, 100] {
        let entries = synthetic_ledger(10_000, links);
        group.bench_with_input(BenchmarkId::new("shared_ledger", links), &entries, |b, entries| {
            b.iter(|| reconcile_for_link(black_box(&link), black_box(entries)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_reconcile_for_link);
criterion_main!(benches);
