use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::DVec2;

use gridray::raycast::RayCaster;
use gridray::viewpoint::Viewpoint;
use gridray::world::WorldMap;

fn bordered_map(width: usize, height: usize) -> WorldMap {
    let mut text = String::new();
    for y in 0..height {
        for x in 0..width {
            let edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            text.push(if edge { '1' } else { '0' });
        }
        text.push('\n');
    }
    WorldMap::from_reader(text.as_bytes()).expect("bench map should parse")
}

fn bench_cast_all(c: &mut Criterion) {
    let map = bordered_map(32, 16);
    let viewpoint = Viewpoint::new(
        DVec2::new(80.0, 80.0),
        DVec2::new(-16.0, 0.0),
        DVec2::new(0.0, 16.0),
    );

    let caster = RayCaster::new(640);
    c.bench_function("cast_all_640", |b| {
        b.iter(|| black_box(caster.cast_all(black_box(&viewpoint), black_box(&map))))
    });

    let single = RayCaster::new(640);
    c.bench_function("cast_column", |b| {
        b.iter(|| black_box(single.cast_column(black_box(&viewpoint), black_box(&map), 320)))
    });
}

criterion_group!(benches, bench_cast_all);
criterion_main!(benches);
