//! WebGPU rendering module
//!
//! The orb and particles are drawn with SDFs in the fragment shader over a
//! transparent canvas; the statement text itself is DOM.

pub mod frame;
pub mod sdf_pipeline;

pub use frame::{FrameData, Globals, MAX_PARTICLES, ParticleData};
pub use sdf_pipeline::{RenderError, SdfRenderState};
