//! # HQSL Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Card text parse | < 10µs |
//! | Signable text | < 5µs |
//! | Full verification, key in memory | < 5ms |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hqsl_card::Card;
use hqsl_openpgp::{certification_ranges, verify, StaticKeyLookup};
use hqsl_tests::fixtures::{contact, TestKeys};
use std::time::Duration;

fn bench_card_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("hqsl-card");

    let keys = TestKeys::certified().expect("fixture keys");
    let text = keys.sign(contact()).to_text().expect("card text");
    let url = format!("https://hqsl.net/h#{text}");

    group.bench_function("parse_signed_card", |b| {
        b.iter(|| black_box(Card::parse(black_box(&text)).is_ok()))
    });
    group.bench_function("parse_card_url", |b| {
        b.iter(|| black_box(Card::parse(black_box(&url)).is_ok()))
    });

    let card = contact();
    group.bench_function("signable_text", |b| {
        b.iter(|| black_box(card.signable_text().is_ok()))
    });
    group.bench_function("to_adif", |b| b.iter(|| black_box(card.to_adif().is_ok())));

    group.finish();
}

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("hqsl-openpgp");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let keys = TestKeys::certified().expect("fixture keys");
    let card = keys.sign(contact());
    let lookup = StaticKeyLookup::serving([keys.signer_public()]);
    let trusted = vec![keys.root_public()];

    group.bench_function("verify_valid_card", |b| {
        b.iter(|| {
            let verification = runtime.block_on(verify(black_box(&card), &lookup, &trusted));
            black_box(verification.verdict)
        })
    });

    let signer = keys.signer_public();
    group.bench_function("certification_ranges", |b| {
        b.iter(|| black_box(certification_ranges(black_box(&signer), &trusted).len()))
    });

    group.finish();
}

criterion_group!(benches, bench_card_codec, bench_verification);
criterion_main!(benches);
