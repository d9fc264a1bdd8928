//! Selection glow.
//!
//! Selecting a part charges its glow energy to `1.0`; every frame the energy
//! decays towards zero and is turned into a short emissive pulse. The glow is
//! a visual side channel only and never touches material state.

use std::collections::HashMap;

use instant::Duration;

use crate::data_structures::part::PartId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowSettings {
    /// Fraction of the remaining energy removed per second.
    pub decay_rate: f32,
    /// Peak emissive intensity.
    pub amplitude: f32,
    /// Energy below this is snapped to zero.
    pub epsilon: f32,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            decay_rate: 2.0,
            amplitude: 0.1,
            epsilon: 1e-3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlowPhase {
    Idle,
    Active(f32),
}

#[derive(Debug, Default)]
pub struct GlowAnimator {
    settings: GlowSettings,
    energy: HashMap<PartId, f32>,
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

impl GlowAnimator {
    pub fn new(settings: GlowSettings) -> Self {
        Self {
            settings,
            energy: HashMap::new(),
        }
    }

    pub fn start(&mut self, part: PartId) {
        self.energy.insert(part, 1.0);
    }

    pub fn phase(&self, part: PartId) -> GlowPhase {
        match self.energy.get(&part) {
            Some(&energy) if energy > 0.0 => GlowPhase::Active(energy),
            _ => GlowPhase::Idle,
        }
    }

    pub fn energy(&self, part: PartId) -> f32 {
        self.energy.get(&part).copied().unwrap_or(0.0)
    }

    /// Advance every active glow by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        // A long frame must not overshoot past zero.
        let t = (self.settings.decay_rate * dt.as_secs_f32()).clamp(0.0, 1.0);
        let epsilon = self.settings.epsilon;
        self.energy.retain(|_, energy| {
            *energy = lerp(*energy, 0.0, t);
            if *energy < epsilon {
                *energy = 0.0;
            }
            *energy > 0.0
        });
    }

    /// Emissive intensity to render for `part` this frame.
    pub fn intensity(&self, part: PartId) -> f32 {
        let energy = self.energy(part);
        if energy < self.settings.epsilon {
            return 0.0;
        }
        (energy * std::f32::consts::PI).sin().max(0.0) * self.settings.amplitude
    }

    /// Parts that are still glowing.
    pub fn active(&self) -> impl Iterator<Item = PartId> + '_ {
        self.energy.keys().copied()
    }

    pub fn clear(&mut self) {
        self.energy.clear();
    }
}
