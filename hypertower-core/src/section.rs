/// Splitting a tower into stacked hyperboloid sections
use crate::params::{Partition, TowerSpec};
use crate::surface::{self, WaistGeometry};

/// One stacked hyperboloid segment of the tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    pub index: usize,
    pub bottom_height: f64,
    pub top_height: f64,
    pub bottom_radius: f64,
    pub top_radius: f64,
    /// Signed twist: positive on even sections, negative on odd ones.
    pub twist_radians: f64,
}

impl Section {
    pub fn height(&self) -> f64 {
        self.top_height - self.bottom_height
    }

    /// Radius of this section's surface at normalized height `t`.
    pub fn radius_at(&self, t: f64) -> f64 {
        surface::radius_at(t, self.bottom_radius, self.top_radius, self.twist_radians.abs())
    }

    pub fn waist(&self) -> WaistGeometry {
        surface::waist(self.bottom_radius, self.top_radius, self.twist_radians.abs())
    }
}

/// Relative weight of each section, bottom to top.
fn weights(partition: Partition, count: usize) -> Vec<u64> {
    match partition {
        Partition::Uniform => vec![1; count],
        Partition::Weighted => (0..count).map(|i| (count - i) as u64).collect(),
    }
}

/// Partition `[0, spec.height]` into `spec.section_count` contiguous sections.
///
/// Boundaries come from the running integer sum of the weights, so the last
/// boundary is exactly `spec.height` and no gap or overlap can accumulate.
pub fn partition(spec: &TowerSpec) -> Vec<Section> {
    let count = spec.section_count.max(1) as usize;
    let weights = weights(spec.partition, count);
    let total: u64 = weights.iter().sum();
    let twist = spec.twist_radians();

    let mut sections = Vec::with_capacity(count);
    let mut cumulative = 0u64;
    let mut bottom_height = 0.0;

    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        let top_height = spec.height * (cumulative as f64 / total as f64);

        let section = Section {
            index,
            bottom_height,
            top_height,
            bottom_radius: spec.taper_radius(bottom_height),
            top_radius: spec.taper_radius(top_height),
            twist_radians: if index % 2 == 0 { twist } else { -twist },
        };
        tracing::trace!(
            index,
            bottom = section.bottom_height,
            top = section.top_height,
            twist = section.twist_radians,
            "section"
        );
        sections.push(section);

        bottom_height = top_height;
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WaistMode;
    use approx::assert_relative_eq;

    fn spec(partition: Partition, section_count: u32) -> TowerSpec {
        TowerSpec {
            height: 300.0,
            section_count,
            partition,
            ..TowerSpec::default()
        }
    }

    #[test]
    fn test_uniform_sections_cover_height() {
        let sections = partition(&spec(Partition::Uniform, 6));
        assert_eq!(sections.len(), 6);
        for section in &sections {
            assert_relative_eq!(section.height(), 50.0, epsilon = 1e-9);
        }
        assert_eq!(sections[0].bottom_height, 0.0);
        assert_eq!(sections[5].top_height, 300.0);
    }

    #[test]
    fn test_weighted_sections_sum_and_increase() {
        let sections = partition(&spec(Partition::Weighted, 6));
        let total: f64 = sections.iter().map(Section::height).sum();
        assert!((total - 300.0).abs() < 1e-9);
        assert_eq!(sections.last().map(|s| s.top_height), Some(300.0));

        for pair in sections.windows(2) {
            assert!(pair[1].bottom_height > pair[0].bottom_height);
            assert_eq!(pair[0].top_height, pair[1].bottom_height);
            assert!(pair[1].height() < pair[0].height());
        }

        // Weights 6..1 over a total of 21.
        assert_relative_eq!(sections[0].height(), 300.0 * 6.0 / 21.0, epsilon = 1e-9);
        assert_relative_eq!(sections[5].height(), 300.0 / 21.0, epsilon = 1e-9);
    }

    #[test]
    fn test_twist_alternates() {
        let sections = partition(&spec(Partition::Weighted, 6));
        let twist = 50f64.to_radians();
        for section in &sections {
            let expected = if section.index % 2 == 0 { twist } else { -twist };
            assert_eq!(section.twist_radians, expected);
        }
    }

    #[test]
    fn test_radii_are_continuous() {
        let tower = spec(Partition::Weighted, 6);
        let sections = partition(&tower);
        assert_eq!(sections[0].bottom_radius, 60.0);
        assert_relative_eq!(sections[5].top_radius, 5.0, epsilon = 1e-12);
        for pair in sections.windows(2) {
            assert_eq!(pair[0].top_radius, pair[1].bottom_radius);
        }
    }

    #[test]
    fn test_single_section_spans_tower() {
        let sections = partition(&spec(Partition::Weighted, 1));
        assert_eq!(sections.len(), 1);
        let only = sections[0];
        assert_eq!(only.bottom_height, 0.0);
        assert_eq!(only.top_height, 300.0);
        assert_eq!(only.bottom_radius, 60.0);
        assert_eq!(only.top_radius, 5.0);
        assert!(only.twist_radians > 0.0);
    }

    #[test]
    fn test_manual_waist_shapes_boundaries() {
        let tower = TowerSpec {
            partition: Partition::Uniform,
            section_count: 2,
            waist: WaistMode::Manual {
                position: 0.5,
                radius: 12.0,
            },
            ..TowerSpec::default()
        };
        let sections = partition(&tower);
        assert_relative_eq!(sections[0].top_radius, 12.0);
        assert_relative_eq!(sections[1].bottom_radius, 12.0);
    }

    #[test]
    fn test_section_radius_matches_endpoints() {
        for section in partition(&spec(Partition::Weighted, 4)) {
            assert_relative_eq!(section.radius_at(0.0), section.bottom_radius, epsilon = 1e-9);
            assert_relative_eq!(section.radius_at(1.0), section.top_radius, epsilon = 1e-9);
        }
    }
}
