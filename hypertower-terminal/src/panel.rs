/// Parameter adjustment panel for the interactive viewer
use hypertower_core::{Parameter, Partition, TowerSpec, WaistMode};

/// Which parameter the panel edits; owns nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterPanel {
    selected: usize,
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Parameter {
        Parameter::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Parameter::ALL.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + Parameter::ALL.len() - 1) % Parameter::ALL.len();
    }

    /// Step the selected parameter up (`direction > 0`) or down.
    ///
    /// Toggles flip regardless of direction. The result is sanitized, so the
    /// caller can build from it directly.
    pub fn adjust(&self, spec: &TowerSpec, direction: i32) -> TowerSpec {
        let sign = direction.signum() as f64;
        let mut next = *spec;

        match self.selected() {
            Parameter::Height => next.height += 10.0 * sign,
            Parameter::BaseRadius => next.base_radius += sign,
            Parameter::TopRadius => next.top_radius += sign,
            Parameter::Sections => next.section_count = step_count(spec.section_count, 1, direction),
            // Even counts keep the lattice symmetric.
            Parameter::Struts => next.strut_count = step_count(spec.strut_count, 2, direction),
            Parameter::Rings => next.ring_count = step_count(spec.ring_count, 1, direction),
            Parameter::StrutRadius => next.strut_radius += 0.1 * sign,
            Parameter::ShowRings => next.show_rings = !spec.show_rings,
            Parameter::Twist => next.twist_degrees += 5.0 * sign,
            Parameter::Partition => {
                next.partition = match spec.partition {
                    Partition::Uniform => Partition::Weighted,
                    Partition::Weighted => Partition::Uniform,
                }
            }
            Parameter::AutoWaist => {
                next.waist = match spec.waist {
                    WaistMode::Manual { .. } => WaistMode::Auto,
                    WaistMode::Auto => seeded_manual(spec),
                }
            }
            Parameter::WaistRadius => {
                if let WaistMode::Manual { position, radius } = seeded_manual(spec) {
                    next.waist = WaistMode::Manual {
                        position,
                        radius: radius + sign,
                    };
                }
            }
            Parameter::WaistPosition => {
                if let WaistMode::Manual { position, radius } = seeded_manual(spec) {
                    next.waist = WaistMode::Manual {
                        position: position + 0.05 * sign,
                        radius,
                    };
                }
            }
        }

        next.sanitized()
    }

    /// One display line per parameter, the selected one marked.
    pub fn lines(&self, spec: &TowerSpec) -> Vec<String> {
        Parameter::ALL
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                let marker = if i == self.selected { '>' } else { ' ' };
                format!("{marker} {:<14}{}", parameter.key(), value_label(spec, *parameter))
            })
            .collect()
    }
}

fn step_count(count: u32, step: u32, direction: i32) -> u32 {
    if direction >= 0 {
        count.saturating_add(step)
    } else {
        count.saturating_sub(step).max(1)
    }
}

/// The current waist as a manual pair that leaves the taper unchanged.
fn seeded_manual(spec: &TowerSpec) -> WaistMode {
    let (position, radius) = spec.manual_waist();
    WaistMode::Manual { position, radius }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Human-readable value of a parameter.
///
/// Waist values show the pair an edit would start from.
pub fn value_label(spec: &TowerSpec, parameter: Parameter) -> String {
    let (waist_position, waist_radius) = spec.manual_waist();
    match parameter {
        Parameter::Height => format!("{:.1}", spec.height),
        Parameter::BaseRadius => format!("{:.1}", spec.base_radius),
        Parameter::TopRadius => format!("{:.1}", spec.top_radius),
        Parameter::Sections => spec.section_count.to_string(),
        Parameter::Struts => spec.strut_count.to_string(),
        Parameter::Rings => spec.ring_count.to_string(),
        Parameter::StrutRadius => format!("{:.2}", spec.strut_radius),
        Parameter::ShowRings => on_off(spec.show_rings).to_string(),
        Parameter::Twist => format!("{:.1}°", spec.twist_degrees),
        Parameter::Partition => match spec.partition {
            Partition::Uniform => "uniform".to_string(),
            Partition::Weighted => "weighted".to_string(),
        },
        Parameter::AutoWaist => on_off(spec.waist.is_auto()).to_string(),
        Parameter::WaistRadius => format!("{:.2}", waist_radius),
        Parameter::WaistPosition => format!("{:.3}", waist_position),
    }
}
