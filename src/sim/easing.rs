//! Easing curves mapping progress [0, 1] to [0, 1]

/// Easing curve used by a sequence step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// f(t) = 1 - (1-t)³
    CubicOut,
    /// f(t) = t³
    CubicIn,
    /// Smooth start and end
    SineInOut,
    /// Exponential ease-in: almost no motion, then a sharp final snap
    MagneticSnap,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Easing::CubicIn => t * t * t,
            Easing::SineInOut => 0.5 - 0.5 * (std::f32::consts::PI * t).cos(),
            Easing::MagneticSnap => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::CubicOut,
        Easing::CubicIn,
        Easing::SineInOut,
        Easing::MagneticSnap,
    ];

    #[test]
    fn test_easing_boundaries() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 0.001, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v + 1e-6 >= prev, "{:?} not monotonic at step {}", easing, i);
                prev = v;
            }
        }
    }

    #[test]
    fn test_magnetic_snap_is_back_loaded() {
        // Most of the travel happens in the last tenth
        assert!(Easing::MagneticSnap.apply(0.8) < 0.3);
        assert!(Easing::MagneticSnap.apply(0.5) < 0.05);
    }
}
