use criterion::{black_box, criterion_group, criterion_main, Criterion};
use typochk::rules::loader;
use typochk::{fix_all, scan, DictionaryIndex};

fn bench_scan(c: &mut Criterion) {
    let rules = loader::default_rules();
    let index = DictionaryIndex::rebuild(rules.iter());

    let paragraph = "我们今天要按装新的软件，请登录你的帐号。这部份内容因为因为篇幅原因省略，他的的想法很好。\n";
    let text = paragraph.repeat(2_000);

    c.bench_function("scan_default_rules", |b| {
        b.iter(|| scan(black_box(&text), &index))
    });

    let occurrences = scan(&text, &index);
    c.bench_function("fix_all_default_rules", |b| {
        b.iter(|| fix_all(black_box(&text), &occurrences))
    });

    c.bench_function("rebuild_index", |b| {
        b.iter(|| DictionaryIndex::rebuild(black_box(&rules).iter()))
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
