use criterion::{criterion_group, criterion_main, Criterion};
use pixel_pencil::{ColorComponents, Document, PixelPoint, PixelSize, Tool};

fn bench_pencil_stroke(c: &mut Criterion) {
    let mut document = Document::new(256, 256).unwrap();
    document.set_tool(Tool::Pencil(PixelSize::square(4)));
    document.modes_mut().vertical_symmetry = true;
    let points: Vec<PixelPoint> = (0..200).map(|i| PixelPoint::new(i, i / 2)).collect();

    c.bench_function("pencil_stroke_256px", |b| {
        b.iter(|| {
            document.begin_stroke(points[0]);
            document.continue_points(&points[1..]);
            document.end_stroke(points[points.len() - 1]);
            document.undo();
        });
    });
}

fn bench_flood_fill(c: &mut Criterion) {
    let mut document = Document::new(64, 64).unwrap();
    document.set_tool_color(ColorComponents::rgba(255, 0, 0, 255));

    // Fill is capped, so a 64x64 canvas exercises the full 2048 pixel budget.
    c.bench_function("flood_fill_capped", |b| {
        b.iter(|| {
            document.request_fill(PixelPoint::new(32, 32));
            document.undo();
        });
    });
}

criterion_group!(benches, bench_pencil_stroke, bench_flood_fill);
criterion_main!(benches);
