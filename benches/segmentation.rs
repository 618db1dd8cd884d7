use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use transcript_sync::playback::tracker::active_index;
use transcript_sync::{ActiveChunkResolver, Chunk, GroupingMode, RawSegment, SegmentGrouper};

/// Roughly one caption line every four seconds for two hours
fn long_transcript() -> Vec<RawSegment> {
    (0..1800)
        .map(|i| RawSegment::new(i as f64 * 4.0 + 0.37, format!("caption line number {}", i)))
        .collect()
}

fn bench_grouping(c: &mut Criterion) {
    let segments = long_transcript();

    c.bench_function("group_rolling_2h", |b| {
        let grouper = SegmentGrouper::default();
        b.iter(|| black_box(grouper.group(black_box(&segments))))
    });

    c.bench_function("group_aligned_2h", |b| {
        let grouper = SegmentGrouper::default().with_mode(GroupingMode::Aligned);
        b.iter(|| black_box(grouper.group(black_box(&segments))))
    });
}

fn bench_active_chunk(c: &mut Criterion) {
    let chunks: Arc<[Chunk]> = SegmentGrouper::default().group(&long_transcript()).into();

    c.bench_function("active_index_lookup", |b| {
        b.iter(|| {
            black_box(active_index(&chunks, Some(black_box(3600.5))));
            black_box(active_index(&chunks, Some(black_box(7190.0))));
            black_box(active_index(&chunks, None));
        })
    });

    c.bench_function("resolver_steady_playback", |b| {
        b.iter(|| {
            let mut resolver = ActiveChunkResolver::new(chunks.clone());
            let mut changes = 0;
            for tenth in 0..600 {
                if resolver.observe(Some(f64::from(tenth) / 10.0)).is_some() {
                    changes += 1;
                }
            }
            black_box(changes)
        })
    });
}

criterion_group!(benches, bench_grouping, bench_active_chunk);
criterion_main!(benches);
