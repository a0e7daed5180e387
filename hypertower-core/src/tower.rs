/// Whole-tower geometry: struts, rings and waist for one parameter set
use crate::params::{TowerSpec, WaistMode};
use crate::section::{self, Section};
use crate::surface::{self, RingSpec, StrutSegment, WaistGeometry};

/// Everything derived from one [`TowerSpec`].
///
/// A rebuild produces a fresh value; consumers replace whatever they built
/// from the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerGeometry {
    pub sections: Vec<Section>,
    pub struts: Vec<StrutSegment>,
    pub rings: Vec<RingSpec>,
    pub waist: WaistGeometry,
}

impl TowerGeometry {
    /// Largest radius any strut endpoint or ring reaches.
    pub fn max_radius(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.bottom_radius.max(s.top_radius))
            .fold(0.0, f64::max)
    }

    pub fn height(&self) -> f64 {
        self.sections.last().map_or(0.0, |s| s.top_height)
    }
}

/// Derive every strut and ring of the tower.
///
/// Struts are ordered by section, then angular index, with the positive
/// family before the negative one. Rings are ordered bottom to top.
pub fn build_tower(spec: &TowerSpec) -> TowerGeometry {
    let sections = section::partition(spec);
    let strut_count = spec.strut_count.max(1);

    let mut struts = Vec::with_capacity(sections.len() * strut_count as usize * 2);
    let mut rings = Vec::new();

    for section in &sections {
        for k in 0..strut_count {
            struts.extend(surface::strut_pair(section, k, strut_count));
        }
        if spec.show_rings {
            rings.extend(surface::ring_samples(section, spec.ring_count, section.index == 0));
        }
    }

    let waist = calculate_waist_geometry(spec);
    tracing::debug!(
        sections = sections.len(),
        struts = struts.len(),
        rings = rings.len(),
        waist_position = waist.position,
        waist_radius = waist.radius,
        "rebuilt tower geometry"
    );

    TowerGeometry {
        sections,
        struts,
        rings,
        waist,
    }
}

/// Waist reported for the tower as a whole.
///
/// In auto mode this is the waist of a single section spanning the full
/// base-to-top taper; in manual mode it is the user's pair, clamped.
pub fn calculate_waist_geometry(spec: &TowerSpec) -> WaistGeometry {
    match spec.waist {
        WaistMode::Auto => surface::waist(spec.base_radius, spec.top_radius, spec.twist_radians()),
        WaistMode::Manual { position, radius } => WaistGeometry {
            position: if position.is_finite() {
                position.clamp(0.0, 1.0)
            } else {
                0.5
            },
            radius: if radius.is_finite() { radius.max(0.0) } else { 0.0 },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Partition;

    #[test]
    fn test_strut_count() {
        let spec = TowerSpec {
            section_count: 3,
            strut_count: 10,
            ..TowerSpec::default()
        };
        let tower = build_tower(&spec);
        assert_eq!(tower.struts.len(), 2 * 3 * 10);
        assert!(tower.struts[..20].iter().all(|s| s.section == 0));
        assert!(tower.struts[40..].iter().all(|s| s.section == 2));
    }

    #[test]
    fn test_rings_hidden() {
        let spec = TowerSpec {
            show_rings: false,
            ..TowerSpec::default()
        };
        assert!(build_tower(&spec).rings.is_empty());
    }

    #[test]
    fn test_ring_boundaries_not_repeated() {
        let spec = TowerSpec {
            section_count: 2,
            ring_count: 4,
            show_rings: true,
            ..TowerSpec::default()
        };
        let tower = build_tower(&spec);
        assert_eq!(tower.rings.len(), 9);
        for pair in tower.rings.windows(2) {
            assert!(pair[1].height > pair[0].height);
        }
    }

    #[test]
    fn test_manual_waist_reported() {
        let spec = TowerSpec {
            waist: WaistMode::Manual {
                position: 1.4,
                radius: 8.0,
            },
            ..TowerSpec::default()
        };
        let waist = calculate_waist_geometry(&spec);
        assert_eq!(waist.position, 1.0);
        assert_eq!(waist.radius, 8.0);
    }

    #[test]
    fn test_extent() {
        let tower = build_tower(&TowerSpec {
            partition: Partition::Uniform,
            ..TowerSpec::default()
        });
        assert_eq!(tower.height(), 300.0);
        assert_eq!(tower.max_radius(), 60.0);
    }
}
