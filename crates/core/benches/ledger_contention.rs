use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use donation_core::{Ledger, LedgerStore};
use std::sync::Arc;
use std::thread;

fn seeded_ledger(accounts: usize) -> Ledger {
    let ledger = Ledger::new();
    for i in 0..accounts {
        let name = format!("user-{i:04}");
        ledger.register(&name).unwrap();
        ledger.credit(&name, 1_000_000).unwrap();
    }
    ledger
}

fn bench_single_thread_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread_ops");
    group.throughput(Throughput::Elements(1));

    for accounts in [10usize, 100, 1000] {
        let ledger = seeded_ledger(accounts);
        group.bench_with_input(BenchmarkId::new("transfer", accounts), &accounts, |b, _| {
            b.iter(|| {
                let _ = black_box(ledger.transfer("user-0000", "user-0001", 1));
                let _ = black_box(ledger.transfer("user-0001", "user-0000", 1));
            });
        });
        group.bench_with_input(BenchmarkId::new("snapshot", accounts), &accounts, |b, _| {
            b.iter(|| black_box(ledger.snapshot()));
        });
    }

    group.finish();
}

fn bench_contended_credits(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_credits");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 1000) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let ledger = Arc::new(seeded_ledger(16));
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let ledger = ledger.clone();
                        thread::spawn(move || {
                            let name = format!("user-{:04}", t % 16);
                            for _ in 0..1000 {
                                let _ = ledger.credit(&name, 1);
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_thread_ops, bench_contended_credits);
criterion_main!(benches);
