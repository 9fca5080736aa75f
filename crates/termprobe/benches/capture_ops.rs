//! Capture Operations Benchmarks
//!
//! Benchmarks for painting the cell grid and extracting snapshots from it.
//!
//! Run with: `cargo bench --bench capture_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use termprobe::snapshot::styled_runs;
use termprobe::{Buffer, Frame, Modifier, NamedColor, RichSnapshot, Style, TextSnapshot};

const SIZES: [(u16, u16, &str); 3] = [(80, 24, "80x24"), (120, 40, "120x40"), (240, 80, "240x80")];

/// A screen with alternating styles, a header and some wide glyphs.
fn painted(width: u16, height: u16) -> Buffer {
    let mut buffer = Buffer::new(width, height);
    buffer.set_string(0, 0, "日本語 header", Style::new().add_modifier(Modifier::BOLD));
    for y in 1..height {
        let style = match y % 3 {
            0 => Style::new().fg(NamedColor::Red),
            1 => Style::new().fg(NamedColor::Green).bg(NamedColor::Black),
            _ => Style::new().add_modifier(Modifier::UNDERLINED),
        };
        buffer.set_string(0, y, &format!("row {y:04} "), Style::new());
        buffer.set_string(9, y, &"status ok ".repeat(usize::from(width) / 10), style);
    }
    buffer
}

fn bench_set_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_set_string");

    for (width, height, name) in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(width, height), |bench, &(w, h)| {
            bench.iter(|| black_box(painted(black_box(w), black_box(h))));
        });
    }

    group.finish();
}

fn bench_styled_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("styled_runs");

    for (width, height, name) in SIZES {
        let buffer = painted(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(name), &buffer, |bench, buffer| {
            bench.iter(|| {
                for y in 0..buffer.height() {
                    black_box(styled_runs(buffer, y));
                }
            });
        });
    }

    group.finish();
}

fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_capture");

    for (width, height, name) in SIZES {
        let buffer = painted(width, height);
        group.bench_with_input(BenchmarkId::new("text", name), &buffer, |bench, buffer| {
            bench.iter(|| black_box(TextSnapshot::from_buffer("bench", buffer)));
        });
        group.bench_with_input(BenchmarkId::new("rich", name), &buffer, |bench, buffer| {
            bench.iter(|| black_box(RichSnapshot::from_buffer("bench", buffer)));
        });
    }

    group.finish();
}

fn bench_frame_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_diff");

    for (width, height, name) in SIZES {
        let before = Frame::from_buffer(&painted(width, height), 0, 0);
        let mut changed = painted(width, height);
        changed.set_string(0, height / 2, "changed", Style::new());
        let after = Frame::from_buffer(&changed, 1, 16);
        group.bench_with_input(BenchmarkId::from_parameter(name), &(before, after), |bench, (a, b)| {
            bench.iter(|| black_box(a.diff(b)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_set_string,
    bench_styled_runs,
    bench_snapshots,
    bench_frame_diff
);
criterion_main!(benches);
