use crate::cell::Position;
use serde::{Deserialize, Serialize};

/// A chemical source: peak magnitude at its center and the per-ring falloff.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub value: f64,
    pub decay: f64,
}

impl Emission {
    pub const fn new(value: f64, decay: f64) -> Self {
        Self { value, decay }
    }

    /// The same source with the opposite sign, used to withdraw a contribution.
    pub fn negated(self) -> Self {
        Self::new(-self.value, self.decay)
    }
}

/// Dense scalar field over the grid, row-major like the cell matrix.
/// Values are unbounded and only ever change by additive contributions.
#[derive(Clone, Debug)]
pub struct ChemicalField {
    pub width: usize,
    pub height: usize,
    data: Vec<f64>,
}

impl ChemicalField {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Caller guarantees `x < width` and `y < height`.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Adds a square pyramid centered at `center`.
    ///
    /// Rings run from radius `|value| / decay - 1` down to 0 in steps of one.
    /// Each ring adds `decay` (carrying the sign of `value`) to every in-bounds
    /// cell within Chebyshev distance `floor(radius)` of the center, so the
    /// center collects one addition per ring and the total falls off linearly.
    /// Rings wide enough to cover the whole grid are applied in one pass.
    pub fn add_emission(&mut self, center: Position, emission: Emission) {
        let Emission { value, decay } = emission;
        if decay.is_nan() || decay <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let outer = value.abs() / decay - 1.0;
        if outer.is_nan() || outer < 0.0 {
            return;
        }
        let amount = if value < 0.0 { -decay } else { decay };
        let top = outer.floor().min(i64::MAX as f64) as i64;
        let cover = self.covering_radius(center);
        if top >= cover {
            let full_rings = (top - cover) as f64 + 1.0;
            self.add_square(center, cover, full_rings * amount);
        }
        for radius in (0..=top.min(cover - 1)).rev() {
            self.add_square(center, radius, amount);
        }
    }

    /// Smallest ring radius whose square spans every cell of the grid.
    fn covering_radius(&self, center: Position) -> i64 {
        let cx = i64::from(center.x);
        let cy = i64::from(center.y);
        let right = self.width as i64 - 1;
        let bottom = self.height as i64 - 1;
        cx.abs()
            .max((right - cx).abs())
            .max(cy.abs())
            .max((bottom - cy).abs())
    }

    fn add_square(&mut self, center: Position, radius: i64, amount: f64) {
        let cx = i64::from(center.x);
        let cy = i64::from(center.y);
        let min_x = (cx - radius).max(0);
        let max_x = (cx + radius).min(self.width as i64 - 1);
        let min_y = (cy - radius).max(0);
        let max_y = (cy + radius).min(self.height as i64 - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }
        for y in min_y as usize..=max_y as usize {
            let row = y * self.width;
            for v in &mut self.data[row + min_x as usize..=row + max_x as usize] {
                *v += amount;
            }
        }
    }
}
