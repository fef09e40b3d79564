use std::time::Instant;

use glowgrid::interactive::{demo_scene, InteractiveViewer, ViewerConfig};
use glowgrid::{
    light_time, save_ppm_with_walls, Color, Grid, Lighting, LightingConfig, LightingError, Position, Radiance,
};

fn main() {
    env_logger::init();

    // Check for command line arguments
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--interactive") => run_interactive(),
        Some("--benchmark") => run_benchmark(),
        Some("--snapshot") => {
            let path = args.get(2).map(String::as_str).unwrap_or("lighting.ppm");
            if let Err(e) = run_snapshot(path) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        _ => {
            println!("glowgrid lighting");
            println!("Run with --interactive for minifb viewer");
            println!("Run with --benchmark to test performance");
            println!("Run with --snapshot [file.ppm] to save a lit frame");
        }
    }
}

fn run_benchmark() {
    println!("=== Lighting Update Benchmark ===\n");

    let sizes = [(50, 50), (100, 100), (200, 200)];
    let iterations = 20;

    for (width, height) in sizes {
        println!("Grid size: {}x{}", width, height);
        println!("-----------------------");

        let scene = demo_scene(width, height);
        let mut lighting = match Lighting::new(scene.resistance, LightingConfig::default()) {
            Ok(lighting) => lighting,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };
        if let Err(e) = place_benchmark_lights(&mut lighting, scene.lights) {
            eprintln!("Error: {}", e);
            return;
        }
        let viewer = Position::new(width / 4 + 1, height / 2);

        let start = Instant::now();
        for i in 0..iterations {
            if let Err(e) = lighting.calculate_fov(viewer, light_time(i * 16)) {
                eprintln!("Error: {}", e);
                return;
            }
        }
        let fov_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        let start = Instant::now();
        for i in 0..iterations {
            lighting.update(light_time(i * 16));
        }
        let update_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;

        println!("  Lights: {} ({} noticeable cells)", lighting.lights().len(), lighting.noticeable().count());
        println!("  Viewer move:  {:.3} ms/iter", fov_ms);
        println!("  Frame update: {:.3} ms/iter", update_ms);
        println!("  Estimated max FPS (lighting only): {:.1}", 1000.0 / update_ms);
        println!();
    }
}

/// The scene's own lights plus a torch every 8 cells on open floor.
fn place_benchmark_lights(lighting: &mut Lighting, lights: Vec<(Position, Radiance)>) -> Result<(), LightingError> {
    for (pos, light) in lights {
        lighting.add_light(pos, light)?;
    }
    for y in (4..lighting.height() - 1).step_by(8) {
        for x in (4..lighting.width() - 1).step_by(8) {
            let pos = Position::new(x, y);
            if lighting.resistance()[pos] < 1.0 && lighting.get(pos).is_none() {
                lighting.add_light(pos, Radiance::new(5.0).with_color(Color::TORCH).with_flicker(1.0))?;
            }
        }
    }
    Ok(())
}

fn run_snapshot(path: &str) -> Result<(), String> {
    let scene = demo_scene(60, 40);
    let resistance = scene.resistance.clone();
    let mut lighting = Lighting::new(scene.resistance, LightingConfig::default()).map_err(|e| e.to_string())?;
    for (pos, light) in scene.lights {
        lighting.add_light(pos, light).map_err(|e| e.to_string())?;
    }
    lighting.update_all(0.0);

    let mut cells = Grid::new(60, 40, Color::TRANSPARENT);
    lighting.draw(&mut cells).map_err(|e| e.to_string())?;
    save_ppm_with_walls(&cells, Some(&resistance), path, 8).map_err(|e| e.to_string())?;
    println!("Saved {}", path);
    Ok(())
}

fn run_interactive() {
    let config = ViewerConfig::default();

    match InteractiveViewer::new(config) {
        Ok(mut viewer) => {
            if let Err(e) = viewer.run() {
                eprintln!("Error: {}", e);
            }
        }
        Err(e) => {
            eprintln!("Failed to create viewer: {}", e);
        }
    }
}
