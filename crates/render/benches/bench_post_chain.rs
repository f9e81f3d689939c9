use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use glam::{Vec3, Vec4};
use murex_common::{Geometry, PhongMaterial, Transform, Viewport};
use murex_render::post::{DotScreenSettings, stylization_chain};
use murex_render::{ColorBuffer, PerspectiveCamera, Renderer, SoftwareRenderer};
use murex_scene::{MeshNode, NodeKind, Scene};

fn gradient(viewport: Viewport) -> ColorBuffer {
    let mut buffer = ColorBuffer::new(viewport);
    let (w, h) = (viewport.width(), viewport.height());
    for y in 0..h {
        for x in 0..w {
            let g = (x + y) as f32 / (w + h) as f32;
            buffer.set(x, y, Vec4::new(g, g, g, 1.0));
        }
    }
    buffer
}

fn grid_scene(side: usize) -> Scene {
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for j in 0..=side {
        for i in 0..=side {
            positions.push(Vec3::new(i as f32 * 4.0 - 80.0, j as f32 * 4.0 - 80.0, 0.0));
        }
    }
    let row = side as u32 + 1;
    for j in 0..side as u32 {
        for i in 0..side as u32 {
            let a = j * row + i;
            indices.extend_from_slice(&[a, a + 1, a + row + 1, a, a + row + 1, a + row]);
        }
    }
    let mut scene = Scene::new();
    let geometry = Geometry::new(positions, None, Some(indices)).expect("grid geometry");
    scene
        .add(
            None,
            "grid",
            Transform::default(),
            NodeKind::Mesh(MeshNode {
                geometry: Arc::new(geometry),
                material: Arc::new(PhongMaterial::default()),
            }),
        )
        .expect("add grid");
    scene
}

fn bench_chain(width: u32, height: u32, iterations: usize) {
    let viewport = Viewport::new(width, height).expect("viewport");
    let mut composer =
        stylization_chain(viewport, DotScreenSettings::default()).expect("chain");
    let scene_buffer = gradient(viewport);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(composer.process(black_box(&scene_buffer)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  post chain ({width}x{height}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_raster(side: usize, iterations: usize) {
    let viewport = Viewport::new(320, 240).expect("viewport");
    let scene = grid_scene(side);
    let mut camera = PerspectiveCamera::new(75.0, viewport.aspect(), 0.1, 1000.0);
    camera.position = Vec3::new(0.0, 0.0, 160.0);
    let mut target = ColorBuffer::new(viewport);
    let renderer = SoftwareRenderer::default();

    let start = Instant::now();
    for _ in 0..iterations {
        renderer.render(black_box(&scene), &camera, &mut target);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  raster ({} tris, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        side * side * 2
    );
}

fn main() {
    println!("=== Murex Render Benchmarks ===\n");

    println!("[Post chain]");
    bench_chain(320, 240, 50);
    bench_chain(1280, 720, 10);

    println!("\n[Software raster]");
    bench_raster(10, 50);
    bench_raster(40, 20);
}
