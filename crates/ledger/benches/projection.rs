use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use cashbook_core::{EntryId, UserId};
use cashbook_ledger::{Entry, EntryDraft, EntryType, LedgerProjection};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

/// Snapshot with many same-day entries so the tie-breakers do real work.
fn snapshot(n: usize) -> Vec<Entry> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let author = UserId::new();

    (0..n)
        .map(|i| {
            let kind = if i % 3 == 0 { EntryType::Out } else { EntryType::In };
            let draft = EntryDraft::new(
                kind,
                Decimal::new((i as i64 % 997) * 100 + 25, 2),
                start + Duration::days((i % 90) as i64),
                if i % 2 == 0 { "Sale" } else { "Rent" },
            );
            Entry::from_draft(EntryId::new(), draft, created + Duration::seconds(i as i64), author)
        })
        // Reverse so the sort never sees pre-ordered input.
        .rev()
        .collect()
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_projection");

    for size in [100usize, 1_000, 10_000] {
        let entries = snapshot(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("project", size), &entries, |b, entries| {
            b.iter(|| LedgerProjection::project(black_box(entries.clone())));
        });

        let projection = LedgerProjection::project(entries.clone());
        group.bench_with_input(BenchmarkId::new("filtered_view", size), &projection, |b, p| {
            b.iter(|| black_box(p.view("sale")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
