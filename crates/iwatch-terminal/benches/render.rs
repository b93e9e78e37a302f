//! Criterion benchmarks for iwatch-terminal
//!
//! Run with: cargo bench -p iwatch-terminal

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use iwatch_core::{layout_line, DisplayState, Frame, HighlightMode};
use iwatch_terminal::direct::{CellBuffer, DiffRenderer};
use iwatch_terminal::highlight::paint_frame;

fn frame(seed: usize) -> Frame {
    let mut frame = Frame::new();
    for row in 0..60 {
        let text = format!(
            "{row:>4}  pid {:>6}  cpu {:>5.1}%\tstate {}",
            row * 37 + seed,
            ((row + seed) % 1000) as f64 / 10.0,
            if (row + seed) % 3 == 0 { "running" } else { "sleeping" }
        );
        frame.push(layout_line(&text));
    }
    frame
}

fn bench_paint(c: &mut Criterion) {
    let mut group = c.benchmark_group("paint_frame");
    group.throughput(Throughput::Elements(1));
    let previous = frame(0);
    let current = frame(1);

    for mode in [
        HighlightMode::None,
        HighlightMode::Char,
        HighlightMode::Word,
        HighlightMode::Line,
    ] {
        let state = DisplayState::new().with_highlight_mode(mode);
        let mut buffer = CellBuffer::new(120, 40);
        group.bench_function(mode.name(), |b| {
            b.iter(|| {
                buffer.clear();
                paint_frame(
                    black_box(&mut buffer),
                    black_box(&current),
                    Some(&previous),
                    &state,
                );
            });
        });
    }
    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_flush");
    let frames = [frame(0), frame(1)];
    let state = DisplayState::new().with_highlight_mode(HighlightMode::Char);

    group.bench_function("alternating_120x40", |b| {
        let mut buffer = CellBuffer::new(120, 40);
        let mut renderer = DiffRenderer::new();
        let mut out = Vec::with_capacity(64 * 1024);
        let mut i = 0;
        b.iter(|| {
            let (current, previous) = (&frames[i % 2], &frames[(i + 1) % 2]);
            buffer.clear();
            paint_frame(&mut buffer, current, Some(previous), &state);
            out.clear();
            let written = renderer.flush(&mut buffer, &mut out);
            i += 1;
            black_box(written)
        });
    });

    group.bench_function("full_120x40", |b| {
        let mut buffer = CellBuffer::new(120, 40);
        let mut renderer = DiffRenderer::new();
        let mut out = Vec::with_capacity(64 * 1024);
        paint_frame(&mut buffer, &frames[0], None, &state);
        b.iter(|| {
            out.clear();
            black_box(renderer.render_full(&mut buffer, &mut out))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_paint, bench_flush);
criterion_main!(benches);
