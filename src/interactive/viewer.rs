//! Interactive lighting viewer - the mouse moves the viewer, lights animate in real time

use std::time::Instant;

use log::info;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use super::scene::demo_scene;
use crate::color::Color;
use crate::grid::{Grid, Position};
use crate::lighting::{Lighting, LightingConfig};
use crate::radiance::{light_time, Radiance};

/// Configuration for the interactive viewer
#[derive(Clone)]
pub struct ViewerConfig {
    /// Grid size (width x height in cells)
    pub grid_size: (usize, usize),
    /// Pixel scale factor (each cell = scale x scale pixels)
    pub scale: usize,
    /// Engine settings; `viewer_range` is adjustable at runtime
    pub lighting: LightingConfig,
    /// Background of open floor
    pub floor_color: Color,
    /// Background of walls
    pub wall_color: Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            grid_size: (60, 40),
            scale: 16,
            lighting: LightingConfig {
                viewer_range: 3.0,
                ..LightingConfig::default()
            },
            floor_color: Color::rgb(40, 40, 48),
            wall_color: Color::rgb(96, 90, 84),
        }
    }
}

/// Interactive viewer for the lighting engine
pub struct InteractiveViewer {
    config: ViewerConfig,
    lighting: Lighting,
    window: Window,
    cells: Grid<Color>,
    buffer: Vec<u32>,
}

impl InteractiveViewer {
    /// Create a new interactive viewer with the given configuration
    pub fn new(config: ViewerConfig) -> Result<Self, String> {
        let (grid_w, grid_h) = config.grid_size;
        let scene = demo_scene(grid_w, grid_h);
        let (grid_w, grid_h) = scene.resistance.dimensions();
        let window_w = grid_w * config.scale;
        let window_h = grid_h * config.scale;

        let window = Window::new(
            "Lighting - Interactive Viewer (ESC to exit)",
            window_w,
            window_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        let mut lighting = Lighting::new(scene.resistance, config.lighting.clone()).map_err(|e| e.to_string())?;
        for (pos, light) in scene.lights {
            lighting.add_light(pos, light).map_err(|e| e.to_string())?;
        }

        Ok(Self {
            config: ViewerConfig {
                grid_size: (grid_w, grid_h),
                ..config
            },
            lighting,
            window,
            cells: Grid::new(grid_w, grid_h, Color::TRANSPARENT),
            buffer: vec![0u32; window_w * window_h],
        })
    }

    /// Run the interactive viewer loop
    pub fn run(&mut self) -> Result<(), String> {
        let (grid_w, grid_h) = self.config.grid_size;
        let scale = self.config.scale;
        self.window.set_target_fps(60);

        println!("=== Interactive Lighting Viewer ===");
        println!("Controls:");
        println!("  Mouse      - Move viewer");
        println!("  Left Click - Toggle wall");
        println!("  Right Hold - Spell light at cursor (not registered)");
        println!("  F          - Toggle flare on all lights");
        println!("  +/-        - Adjust viewer range");
        println!("  ESC        - Exit");
        println!();

        let start = Instant::now();
        let mut viewer = Position::new(grid_w / 4 + 1, grid_h / 2);
        let mut needs_fov = true;
        let mut flared = false;
        let mut last_wall_pos = None;
        let spell = Radiance::new(4.0).with_color(Color::GREEN).with_strobe(4.0);

        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            let now = light_time(start.elapsed().as_millis() as u64);

            if self.window.is_key_pressed(Key::F, KeyRepeat::No) {
                flared = !flared;
                for (_, light) in self.lighting.lights_mut().iter_mut() {
                    light.flare = if flared { 1.0 } else { 0.0 };
                }
                info!("flare {}", if flared { "on" } else { "off" });
            }
            if self.window.is_key_pressed(Key::Equal, KeyRepeat::Yes)
                || self.window.is_key_pressed(Key::NumPadPlus, KeyRepeat::Yes)
            {
                let range = self.lighting.config().viewer_range + 1.0;
                self.lighting.set_viewer_range(range.min(30.0));
                needs_fov = true;
                info!("viewer range {}", self.lighting.config().viewer_range);
            }
            if self.window.is_key_pressed(Key::Minus, KeyRepeat::Yes)
                || self.window.is_key_pressed(Key::NumPadMinus, KeyRepeat::Yes)
            {
                let range = self.lighting.config().viewer_range - 1.0;
                self.lighting.set_viewer_range(range.max(0.0));
                needs_fov = true;
                info!("viewer range {}", self.lighting.config().viewer_range);
            }

            let mut cursor = None;
            if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
                let cell = Position::new(
                    (mx as usize / scale).min(grid_w - 1),
                    (my as usize / scale).min(grid_h - 1),
                );
                cursor = Some(cell);

                if self.window.get_mouse_down(MouseButton::Left) {
                    // Only toggle once per cell while held
                    if last_wall_pos != Some(cell) {
                        self.toggle_wall(cell)?;
                        last_wall_pos = Some(cell);
                        needs_fov = true;
                    }
                } else {
                    last_wall_pos = None;
                    if cell != viewer && self.lighting.resistance()[cell] < 1.0 {
                        viewer = cell;
                        needs_fov = true;
                    }
                }
            }

            if needs_fov {
                self.lighting.calculate_fov(viewer, now).map_err(|e| e.to_string())?;
                needs_fov = false;
            } else {
                self.lighting.update(now);
            }
            if let Some(cell) = cursor.filter(|_| self.window.get_mouse_down(MouseButton::Right)) {
                self.lighting.update_ui(cell, &spell, now).map_err(|e| e.to_string())?;
            }

            self.render_cells(viewer)?;
            self.render_grid_to_buffer();
            self.window
                .update_with_buffer(&self.buffer, grid_w * scale, grid_h * scale)
                .map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Toggle wall at grid position
    fn toggle_wall(&mut self, pos: Position) -> Result<(), String> {
        let value = if self.lighting.resistance()[pos] >= 1.0 { 0.0 } else { 1.0 };
        self.lighting.set_resistance(pos, value).map_err(|e| e.to_string())
    }

    /// Fill cell backgrounds, apply lighting, and black out what the viewer can't see
    fn render_cells(&mut self, viewer: Position) -> Result<(), String> {
        let resistance = self.lighting.resistance();
        for y in 0..self.cells.height() {
            for x in 0..self.cells.width() {
                self.cells[(x, y)] = if resistance[(x, y)] >= 1.0 {
                    self.config.wall_color
                } else {
                    self.config.floor_color
                };
            }
        }
        self.lighting.draw(&mut self.cells).map_err(|e| e.to_string())?;

        let fov = self.lighting.fov();
        for y in 0..self.cells.height() {
            for x in 0..self.cells.width() {
                let seen = fov[(x, y)] as f32;
                if seen <= 0.0 {
                    self.cells[(x, y)] = Color::BLACK;
                } else {
                    self.cells[(x, y)] = Color::BLACK.lerp_channels(self.cells[(x, y)], 0.35 + 0.65 * seen);
                }
            }
        }
        self.cells[viewer] = Color::WHITE;
        Ok(())
    }

    /// Render the cell grid to the pixel buffer
    fn render_grid_to_buffer(&mut self) {
        let (grid_w, grid_h) = self.config.grid_size;
        let scale = self.config.scale;

        for gy in 0..grid_h {
            for gx in 0..grid_w {
                let color_u32 = self.cells[(gx, gy)].to_xrgb();
                for sy in 0..scale {
                    let row = (gy * scale + sy) * (grid_w * scale);
                    let start = row + gx * scale;
                    self.buffer[start..start + scale].fill(color_u32);
                }
            }
        }
    }
}
