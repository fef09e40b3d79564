//! Layer 3: Per-frame light aggregation
//!
//! [`Lighting`] owns the light registry and every per-cell buffer. A frame loop drives it
//! in this order:
//!
//! 1. [`Lighting::calculate_fov`] whenever the viewer changes cell,
//! 2. [`Lighting::update`] every frame, to animate flicker and strobe,
//! 3. any number of [`Lighting::update_ui`] calls for transient effects,
//! 4. [`Lighting::draw`] onto the background color buffer.
//!
//! The culling mask and line of sight only change in step 1. Calling `update` after the
//! viewer moved, without step 1, lights the scene as seen from the old position.

mod layer;

pub use layer::LightLayer;

use log::{debug, trace, warn};

use crate::color::Color;
use crate::error::LightingError;
use crate::grid::{Grid, Position};
use crate::radiance::Radiance;
use crate::region::Region;
use crate::registry::LightRegistry;
use crate::visibility::{blocks_light, Radius, Shadowcast, VisibilityService};

/// Tunables for a [`Lighting`] instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingConfig {
    /// FOV shape for the viewer and for every light.
    pub radius: Radius,
    /// How far the viewer sees unaided.
    pub viewer_range: f64,
    /// Drawn under lit cells whose output color is still transparent.
    pub background: Color,
    /// LOS values above this count as seen when building the culling mask.
    pub notice_threshold: f64,
    /// Scale from light strength to blend weight in [`Lighting::draw`]. Below 1 so light
    /// never fully replaces the background.
    pub draw_strength: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            radius: Radius::Circle,
            viewer_range: 4.0,
            background: Color::BLACK,
            notice_threshold: 0.0001,
            draw_strength: 0.4,
        }
    }
}

/// Colored lighting for one map and one viewer.
pub struct Lighting<V: VisibilityService = Shadowcast> {
    config: LightingConfig,
    visibility: V,
    resistance: Grid<f64>,
    /// Viewer FOV as returned by the visibility service.
    viewer_fov: Grid<f64>,
    /// Viewer FOV plus accumulated light, clamped.
    fov: Grid<f64>,
    los: Grid<f64>,
    scratch: Grid<f64>,
    layer: LightLayer,
    lights: LightRegistry,
    noticeable: Region,
}

impl Lighting<Shadowcast> {
    /// Lighting over `resistance` (0.0 clear, 1.0 opaque) with shadowcast visibility.
    pub fn new(resistance: Grid<f64>, config: LightingConfig) -> Result<Self, LightingError> {
        Lighting::with_visibility(resistance, config, Shadowcast)
    }
}

impl<V: VisibilityService> Lighting<V> {
    pub fn with_visibility(
        resistance: Grid<f64>,
        config: LightingConfig,
        visibility: V,
    ) -> Result<Self, LightingError> {
        let (width, height) = resistance.dimensions();
        if width == 0 || height == 0 {
            return Err(LightingError::EmptyGrid);
        }
        let mut config = config;
        config.viewer_range = sanitize_range(config.viewer_range);
        Ok(Lighting {
            config,
            visibility,
            resistance,
            viewer_fov: Grid::new(width, height, 0.0),
            fov: Grid::new(width, height, 0.0),
            los: Grid::new(width, height, 0.0),
            scratch: Grid::new(width, height, 0.0),
            layer: LightLayer::new(width, height),
            lights: LightRegistry::new(),
            noticeable: Region::new(width, height),
        })
    }

    pub fn width(&self) -> usize {
        self.resistance.width()
    }

    pub fn height(&self) -> usize {
        self.resistance.height()
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn set_viewer_range(&mut self, range: f64) {
        self.config.viewer_range = sanitize_range(range);
    }

    pub fn resistance(&self) -> &Grid<f64> {
        &self.resistance
    }

    /// Change one cell's resistance. Takes effect at the next [`Lighting::calculate_fov`]
    /// (LOS) and the next update (light shapes).
    pub fn set_resistance(&mut self, pos: Position, value: f64) -> Result<(), LightingError> {
        self.check_position(pos)?;
        self.resistance[pos] = value;
        Ok(())
    }

    /// Swap in a whole new resistance grid of the same size.
    pub fn replace_resistance(&mut self, resistance: Grid<f64>) -> Result<(), LightingError> {
        self.check_dimensions(resistance.dimensions())?;
        self.resistance = resistance;
        Ok(())
    }

    // ========================================================================
    // Light bookkeeping
    // ========================================================================

    /// Place `light` at `pos`, returning any light it replaced.
    pub fn add_light(&mut self, pos: Position, light: Radiance) -> Result<Option<Radiance>, LightingError> {
        self.check_position(pos)?;
        Ok(self.lights.add(pos, light))
    }

    pub fn remove_light(&mut self, pos: Position) -> Option<Radiance> {
        self.lights.remove(pos)
    }

    /// Move the light at `from` to `to`, replacing anything at `to`. The descriptor itself
    /// moves, so its flicker continues uninterrupted. `Ok(false)` if `from` was empty.
    pub fn move_light(&mut self, from: Position, to: Position) -> Result<bool, LightingError> {
        self.check_position(to)?;
        Ok(self.lights.relocate(from, to))
    }

    pub fn get(&self, pos: Position) -> Option<&Radiance> {
        self.lights.get(pos)
    }

    /// Mutable access to a light, e.g. to set its flare.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Radiance> {
        self.lights.get_mut(pos)
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightRegistry {
        &mut self.lights
    }

    // ========================================================================
    // Per-viewer and per-frame updates
    // ========================================================================

    /// Recompute the viewer's FOV and LOS from `viewer`, rebuild the culling mask, and
    /// light the scene at light time `now`. Returns the combined visibility-and-light
    /// strength per cell, the same grid [`Lighting::fov`] returns.
    pub fn calculate_fov(&mut self, viewer: Position, now: f32) -> Result<&Grid<f64>, LightingError> {
        self.check_position(viewer)?;
        self.visibility.fov(
            &self.resistance,
            &mut self.viewer_fov,
            viewer,
            self.config.viewer_range,
            self.config.radius,
        );
        self.visibility.los(&self.resistance, &mut self.los, viewer);

        let max_range = self.lights.max_range();
        self.noticeable
            .refill(&self.los, self.config.notice_threshold)
            .expand_8way(max_range.ceil() as usize);
        debug!(
            "viewer at {viewer}: {} cells noticeable, max light range {max_range}",
            self.noticeable.count()
        );

        self.layer.clear();
        self.light_noticeable(now);
        self.combine();
        Ok(&self.fov)
    }

    /// Re-light the scene at light time `now` against the current culling mask and LOS.
    pub fn update(&mut self, now: f32) {
        self.layer.clear();
        self.light_noticeable(now);
        self.combine();
    }

    /// Light the whole map with every registered light, ignoring the viewer. A cell counts
    /// as seen when it or any of its eight neighbors is not opaque. The culling mask still
    /// belongs to the last [`Lighting::calculate_fov`].
    pub fn update_all(&mut self, now: f32) {
        let (w, h) = self.resistance.dimensions();
        for y in 0..h {
            for x in 0..w {
                let seen = (y.saturating_sub(1)..(y + 2).min(h))
                    .any(|yy| (x.saturating_sub(1)..(x + 2).min(w)).any(|xx| !blocks_light(self.resistance[(xx, yy)])));
                let v = if seen { 1.0 } else { 0.0 };
                self.los[(x, y)] = v;
                self.viewer_fov[(x, y)] = v;
            }
        }
        self.layer.clear();
        for (pos, light) in self.lights.iter() {
            self.visibility.fov(
                &self.resistance,
                &mut self.scratch,
                pos,
                light.current_range(now) as f64,
                self.config.radius,
            );
            layer::mix_light(&mut self.layer, &self.scratch, light.color(), light.flare, &self.los, &self.resistance);
        }
        self.combine();
    }

    /// Blend one extra light that isn't registered, such as a spell effect drawn for a
    /// single frame. Viewer FOV, LOS and the culling mask are untouched.
    pub fn update_ui(&mut self, pos: Position, light: &Radiance, now: f32) -> Result<(), LightingError> {
        self.check_position(pos)?;
        self.visibility.fov(
            &self.resistance,
            &mut self.scratch,
            pos,
            light.current_range(now) as f64,
            self.config.radius,
        );
        layer::mix_light(&mut self.layer, &self.scratch, light.color(), light.flare, &self.los, &self.resistance);
        Ok(())
    }

    /// Blend an arbitrary visibility field, tinted `tint` and boosted by `flare`, into the
    /// accumulated light. Cells outside the current LOS are skipped.
    pub fn blend(&mut self, strength: &Grid<f64>, tint: Option<Color>, flare: f32) -> Result<(), LightingError> {
        self.check_dimensions(strength.dimensions())?;
        layer::mix_light(&mut self.layer, strength, tint, flare, &self.los, &self.resistance);
        Ok(())
    }

    /// Blend a pre-colored layer into the accumulated light.
    pub fn blend_layer(&mut self, other: &LightLayer, flare: f32) -> Result<(), LightingError> {
        self.check_dimensions(other.dimensions())?;
        layer::mix_layer(&mut self.layer, other, flare, &self.los, &self.resistance);
        Ok(())
    }

    /// Tint `output` with the accumulated light wherever a cell is both in LOS and lit.
    /// Transparent output cells start from the configured background.
    pub fn draw(&self, output: &mut Grid<Color>) -> Result<(), LightingError> {
        self.check_dimensions(output.dimensions())?;
        let (w, h) = output.dimensions();
        for y in 0..h {
            for x in 0..w {
                if self.los[(x, y)] <= 0.0 || self.fov[(x, y)] <= 0.0 {
                    continue;
                }
                let mut current = output[(x, y)];
                if current == Color::TRANSPARENT {
                    current = self.config.background;
                }
                let tint = self.layer.color[(x, y)].unwrap_or(Color::WHITE);
                let weight = self.layer.strength[(x, y)] * self.config.draw_strength;
                output[(x, y)] = current.lerp_blended(tint, weight);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Combined visibility and light strength per cell, `0.0..=1.0`.
    pub fn fov(&self) -> &Grid<f64> {
        &self.fov
    }

    /// The viewer's own FOV, before any light is added.
    pub fn viewer_fov(&self) -> &Grid<f64> {
        &self.viewer_fov
    }

    pub fn los(&self) -> &Grid<f64> {
        &self.los
    }

    pub fn layer(&self) -> &LightLayer {
        &self.layer
    }

    /// Cells a light must sit in to be considered at all.
    pub fn noticeable(&self) -> &Region {
        &self.noticeable
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn light_noticeable(&mut self, now: f32) {
        let mut culled = 0usize;
        for (pos, light) in self.lights.iter() {
            if !self.noticeable.contains(pos) {
                culled += 1;
                continue;
            }
            let range = light.current_range(now) as f64;
            trace!("blending light at {pos}, range {range:.2}");
            self.visibility
                .fov(&self.resistance, &mut self.scratch, pos, range, self.config.radius);
            layer::mix_light(&mut self.layer, &self.scratch, light.color(), light.flare, &self.los, &self.resistance);
        }
        if culled > 0 {
            trace!("{culled} of {} lights culled", self.lights.len());
        }
    }

    /// `fov = clamp(viewer_fov + light)` wherever the viewer has line of sight.
    fn combine(&mut self) {
        let cells = self
            .fov
            .as_mut_slice()
            .iter_mut()
            .zip(self.viewer_fov.iter())
            .zip(self.los.iter())
            .zip(self.layer.strength.iter());
        for (((out, &seen), &los), &light) in cells {
            *out = if los > 0.0 {
                (seen + light as f64).clamp(0.0, 1.0)
            } else {
                seen
            };
        }
    }

    fn check_position(&self, pos: Position) -> Result<(), LightingError> {
        if self.resistance.in_bounds(pos.x, pos.y) {
            Ok(())
        } else {
            Err(LightingError::OutOfBounds {
                position: pos,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    fn check_dimensions(&self, found: (usize, usize)) -> Result<(), LightingError> {
        let expected = self.resistance.dimensions();
        if found == expected {
            Ok(())
        } else {
            Err(LightingError::DimensionMismatch { expected, found })
        }
    }
}

fn sanitize_range(range: f64) -> f64 {
    if range < 0.0 || range.is_nan() {
        warn!("viewer range {range} is not usable, using 0");
        0.0
    } else {
        range
    }
}
