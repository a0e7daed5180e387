/// Tower parameters and their valid domain
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::surface;

/// How the tower height is split between sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Partition {
    /// Every section gets `height / section_count`.
    Uniform,
    /// Section `i` gets weight `section_count - i`, so sections shorten toward the top.
    #[default]
    Weighted,
}

/// Whether the waist is derived from the surface or pinned by the user.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "lowercase"))]
pub enum WaistMode {
    #[default]
    Auto,
    /// A user-supplied waist: `position` is a fraction of the tower height.
    Manual { position: f64, radius: f64 },
}

impl WaistMode {
    pub fn is_auto(&self) -> bool {
        matches!(self, WaistMode::Auto)
    }
}

/// Structural parameters of a lattice tower.
///
/// A `TowerSpec` is a plain value: input surfaces build or modify their own
/// copy and hand it to [`crate::build_tower`]. Nothing in the geometry reads
/// shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct TowerSpec {
    pub height: f64,
    pub base_radius: f64,
    pub top_radius: f64,
    pub section_count: u32,
    pub strut_count: u32,
    pub ring_count: u32,
    /// Cosmetic strut thickness; only the mesher uses it.
    pub strut_radius: f64,
    pub show_rings: bool,
    /// Twist applied to every section, in degrees. Sign alternates per section.
    pub twist_degrees: f64,
    pub partition: Partition,
    pub waist: WaistMode,
}

impl Default for TowerSpec {
    fn default() -> Self {
        Self {
            height: 300.0,
            base_radius: 60.0,
            top_radius: 5.0,
            section_count: 6,
            strut_count: 24,
            ring_count: 8,
            strut_radius: 0.6,
            show_rings: true,
            twist_degrees: 50.0,
            partition: Partition::Weighted,
            waist: WaistMode::Auto,
        }
    }
}

/// Smallest height a sanitized spec may have.
pub const MIN_HEIGHT: f64 = 1e-6;
/// Smallest strut thickness a sanitized spec may have.
pub const MIN_STRUT_RADIUS: f64 = 1e-3;
/// Largest section, strut or ring count a sanitized spec may have.
pub const MAX_COUNT: u32 = 1_000;

impl TowerSpec {
    /// Twist per section in radians (unsigned).
    pub fn twist_radians(&self) -> f64 {
        self.twist_degrees.to_radians()
    }

    /// Clamp every field into the domain the geometry expects.
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };

        let waist = match self.waist {
            WaistMode::Auto => WaistMode::Auto,
            WaistMode::Manual { position, radius } => WaistMode::Manual {
                position: finite_or(position, 0.5).clamp(0.0, 1.0),
                radius: finite_or(radius, 0.0).max(0.0),
            },
        };

        Self {
            height: finite_or(self.height, defaults.height).max(MIN_HEIGHT),
            base_radius: finite_or(self.base_radius, defaults.base_radius).max(0.0),
            top_radius: finite_or(self.top_radius, defaults.top_radius).max(0.0),
            section_count: self.section_count.clamp(1, MAX_COUNT),
            strut_count: self.strut_count.clamp(1, MAX_COUNT),
            ring_count: self.ring_count.clamp(1, MAX_COUNT),
            strut_radius: finite_or(self.strut_radius, defaults.strut_radius).max(MIN_STRUT_RADIUS),
            show_rings: self.show_rings,
            twist_degrees: finite_or(self.twist_degrees, defaults.twist_degrees),
            partition: self.partition,
            waist,
        }
    }

    /// The waist as a manual `(position, radius)` pair.
    ///
    /// In auto mode the pair is pinned to the current taper at the derived
    /// waist position, so switching to manual leaves every section as it was.
    pub fn manual_waist(&self) -> (f64, f64) {
        match self.waist {
            WaistMode::Manual { position, radius } => (position, radius),
            WaistMode::Auto => {
                let position = surface::waist(self.base_radius, self.top_radius, self.twist_radians()).position;
                (position, self.taper_radius(position * self.height))
            }
        }
    }

    /// Radius of the tower's overall taper at an absolute height.
    ///
    /// Auto mode is a straight line from base to top; a manual waist adds a
    /// knot at `position * height`.
    pub fn taper_radius(&self, height: f64) -> f64 {
        let f = if self.height > 0.0 {
            (height / self.height).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.waist {
            WaistMode::Auto => lerp(self.base_radius, self.top_radius, f),
            WaistMode::Manual { position, radius } => {
                let knot = position.clamp(0.0, 1.0);
                if f <= knot {
                    if knot <= 0.0 {
                        radius
                    } else {
                        lerp(self.base_radius, radius, f / knot)
                    }
                } else if knot >= 1.0 {
                    radius
                } else {
                    lerp(radius, self.top_radius, (f - knot) / (1.0 - knot))
                }
            }
        }
    }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_spec() {
        let spec = TowerSpec::default();
        assert_eq!(spec.section_count, 6);
        assert_eq!(spec.partition, Partition::Weighted);
        assert!(spec.waist.is_auto());
        assert_relative_eq!(spec.twist_radians(), 50f64.to_radians());
    }

    #[test]
    fn test_sanitized_clamps_counts_and_radii() {
        let spec = TowerSpec {
            height: -4.0,
            base_radius: -1.0,
            section_count: 0,
            strut_count: 0,
            ring_count: 0,
            strut_radius: 0.0,
            twist_degrees: f64::NAN,
            waist: WaistMode::Manual {
                position: 3.0,
                radius: -2.0,
            },
            ..TowerSpec::default()
        }
        .sanitized();

        assert_eq!(spec.height, MIN_HEIGHT);
        assert_eq!(spec.base_radius, 0.0);
        assert_eq!(spec.section_count, 1);
        assert_eq!(spec.strut_count, 1);
        assert_eq!(spec.ring_count, 1);
        assert_eq!(spec.strut_radius, MIN_STRUT_RADIUS);
        assert_eq!(spec.twist_degrees, 50.0);
        assert_eq!(
            spec.waist,
            WaistMode::Manual {
                position: 1.0,
                radius: 0.0
            }
        );
    }

    #[test]
    fn test_sanitized_caps_counts() {
        let spec = TowerSpec {
            section_count: 4_000_000_000,
            strut_count: u32::MAX,
            ring_count: MAX_COUNT + 1,
            ..TowerSpec::default()
        }
        .sanitized();

        assert_eq!(spec.section_count, MAX_COUNT);
        assert_eq!(spec.strut_count, MAX_COUNT);
        assert_eq!(spec.ring_count, MAX_COUNT);
    }

    #[test]
    fn test_manual_waist_sits_on_taper() {
        let spec = TowerSpec::default();
        let (position, radius) = spec.manual_waist();
        assert_relative_eq!(position, surface::waist(60.0, 5.0, spec.twist_radians()).position);
        assert_relative_eq!(radius, 60.0 + (5.0 - 60.0) * position, epsilon = 1e-9);

        let pinned = TowerSpec {
            waist: WaistMode::Manual { position, radius },
            ..spec
        };
        for h in [0.0, 50.0, 150.0, 280.0, 300.0] {
            assert_relative_eq!(pinned.taper_radius(h), spec.taper_radius(h), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_manual_waist_keeps_existing_pair() {
        let spec = TowerSpec {
            waist: WaistMode::Manual {
                position: 0.3,
                radius: 14.0,
            },
            ..TowerSpec::default()
        };
        assert_eq!(spec.manual_waist(), (0.3, 14.0));
    }

    #[test]
    fn test_linear_taper() {
        let spec = TowerSpec::default();
        assert_relative_eq!(spec.taper_radius(0.0), 60.0);
        assert_relative_eq!(spec.taper_radius(150.0), 32.5);
        assert_relative_eq!(spec.taper_radius(300.0), 5.0);
    }

    #[test]
    fn test_manual_waist_taper() {
        let spec = TowerSpec {
            waist: WaistMode::Manual {
                position: 0.5,
                radius: 10.0,
            },
            ..TowerSpec::default()
        };
        assert_relative_eq!(spec.taper_radius(0.0), 60.0);
        assert_relative_eq!(spec.taper_radius(75.0), 35.0);
        assert_relative_eq!(spec.taper_radius(150.0), 10.0);
        assert_relative_eq!(spec.taper_radius(300.0), 5.0);
    }

    #[test]
    fn test_manual_waist_at_ends_is_finite() {
        for position in [0.0, 1.0] {
            let spec = TowerSpec {
                waist: WaistMode::Manual {
                    position,
                    radius: 12.0,
                },
                ..TowerSpec::default()
            };
            for h in [0.0, 100.0, 300.0] {
                assert!(spec.taper_radius(h).is_finite());
            }
        }
    }
}
