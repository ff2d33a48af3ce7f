//! CPU-side frame description
//!
//! Flattens the hero state into the POD structs the SDF shader reads.
//! Layouts must match `sdf_shader.wgsl`. The sim works in CSS pixels;
//! positions and sizes are scaled to device pixels here.

use bytemuck::{Pod, Zeroable};

use crate::story::Scrollytelling;

/// Maximum particles uploaded per frame
pub const MAX_PARTICLES: usize = 256;

/// Orb flag bits
pub const ORB_VISIBLE: u32 = 1;
pub const ORB_DIMMED: u32 = 1 << 1;
pub const ORB_SHAKING: u32 = 1 << 2;

/// Fixed palette, shared by every frame
pub mod palette {
    pub const ORB: [f32; 4] = [0.96, 0.78, 0.36, 1.0];
    pub const PARTICLE: [f32; 4] = [1.0, 0.86, 0.55, 1.0];
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2], // offset 0
    pub time: f32,            // offset 8
    pub particle_count: u32,  // offset 12
    pub orb_pos: [f32; 2],    // offset 16
    pub orb_scale: f32,       // offset 24
    pub orb_flags: u32,       // offset 28
    pub slide_progress: f32,  // offset 32
    pub reveal: f32,          // offset 36 - 1 once the reveal copy is up
    pub converged: f32,       // offset 40
    pub pixel_ratio: f32,     // offset 44
    pub orb_color: [f32; 4],  // offset 48
    pub particle_color: [f32; 4], // offset 64, total 80 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleData {
    pub pos: [f32; 2],
    pub size: f32,
    pub alpha: f32,
}

/// Everything the GPU needs for one frame
#[derive(Debug, Clone)]
pub struct FrameData {
    pub globals: Globals,
    pub particles: Vec<ParticleData>,
}

impl FrameData {
    /// Build a frame. `max_particles` is further capped at `MAX_PARTICLES`.
    /// `resolution` is in device pixels, `pixel_ratio` is device px per CSS px.
    pub fn build(
        story: &Scrollytelling,
        resolution: [f32; 2],
        time: f32,
        max_particles: usize,
        pixel_ratio: f32,
    ) -> Self {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let sequencer = story.sequencer();
        let orb = sequencer.orb();

        let mut orb_flags = 0;
        if orb.visible {
            orb_flags |= ORB_VISIBLE;
        }
        if orb.dimmed {
            orb_flags |= ORB_DIMMED;
        }
        if orb.shaking {
            orb_flags |= ORB_SHAKING;
        }

        let cap = max_particles.min(MAX_PARTICLES);
        let particles: Vec<ParticleData> = sequencer
            .particle_samples()
            .into_iter()
            .filter(|s| s.alpha > 0.0)
            .take(cap)
            .map(|s| ParticleData {
                pos: (s.position * ratio).to_array(),
                size: s.size * ratio,
                alpha: s.alpha,
            })
            .collect();

        let globals = Globals {
            resolution,
            time,
            particle_count: particles.len() as u32,
            orb_pos: (orb.position * ratio).to_array(),
            orb_scale: orb.scale,
            orb_flags,
            slide_progress: story.scroll().slide_progress(),
            reveal: if sequencer.reveal_visible() { 1.0 } else { 0.0 },
            converged: if story.is_converged() { 1.0 } else { 0.0 },
            pixel_ratio: ratio,
            orb_color: palette::ORB,
            particle_color: palette::PARTICLE,
        };

        Self { globals, particles }
    }

    /// Particle buffer padded to the fixed GPU capacity
    pub fn padded_particles(&self) -> Vec<ParticleData> {
        let mut data = vec![ParticleData::zeroed(); MAX_PARTICLES];
        for (slot, p) in data.iter_mut().zip(&self.particles) {
            *slot = *p;
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{Script, StaticLayout};
    use glam::Vec2;

    #[test]
    fn test_gpu_layout_sizes() {
        assert_eq!(std::mem::size_of::<Globals>(), 80);
        assert_eq!(std::mem::size_of::<ParticleData>(), 16);
    }

    #[test]
    fn test_idle_frame_has_hidden_orb() {
        let story = Scrollytelling::new(&Settings::default(), 1);
        let frame = FrameData::build(&story, [1280.0, 800.0], 0.0, MAX_PARTICLES, 1.0);
        assert_eq!(frame.globals.orb_flags & ORB_VISIBLE, 0);
        assert_eq!(frame.globals.particle_count, 0);
        assert_eq!(frame.padded_particles().len(), MAX_PARTICLES);
    }

    #[test]
    fn test_reveal_frame_carries_particles() {
        let layout = StaticLayout::centered(&Script::default(), Vec2::new(1280.0, 800.0));
        let mut story = Scrollytelling::new(&Settings::default(), 1);
        story.on_scroll(crate::consts::SEQUENCE_SLIDE as f32 * 800.0);
        story.advance(500 + 3 * (600 + 3000 + 3000) + 100, &layout);

        let frame = FrameData::build(&story, [1280.0, 800.0], 1.0, 64, 1.0);
        assert_eq!(frame.globals.reveal, 1.0);
        assert_eq!(frame.globals.particle_count, 64);
        assert_eq!(frame.particles.len(), 64);
    }

    #[test]
    fn test_pixel_ratio_scales_positions_only() {
        let layout = StaticLayout::centered(&Script::default(), Vec2::new(1280.0, 800.0));
        let mut story = Scrollytelling::new(&Settings::default(), 1);
        story.on_scroll(crate::consts::SEQUENCE_SLIDE as f32 * 800.0);
        // Mid drift: orb parked at the collapse point in CSS pixels
        story.advance(500 + 600 + 3000 + 600 + 400, &layout);
        let orb = story.sequencer().orb().position;

        let css = FrameData::build(&story, [1280.0, 800.0], 0.0, MAX_PARTICLES, 1.0);
        let hidpi = FrameData::build(&story, [2560.0, 1600.0], 0.0, MAX_PARTICLES, 2.0);
        assert_eq!(css.globals.orb_pos, orb.to_array());
        assert_eq!(hidpi.globals.orb_pos, (orb * 2.0).to_array());
        assert_eq!(hidpi.globals.pixel_ratio, 2.0);
        assert_eq!(hidpi.globals.orb_scale, css.globals.orb_scale);

        // Word offsets stay in CSS pixels whatever the ratio
        let view = story.sequencer().statement_view().unwrap();
        let exit = story.sequencer().exit_frame().unwrap();
        assert!(view.left_offset < 0.0);
        assert_eq!(view.left_offset, exit.left_offset);

        let bad = FrameData::build(&story, [1280.0, 800.0], 0.0, MAX_PARTICLES, f32::NAN);
        assert_eq!(bad.globals.pixel_ratio, 1.0);
    }
}
