/// Hypertower Web - WASM bindings exposing tower geometry to browser renderers
///
/// The browser side owns its GPU buffers and meshes; it reads the flat arrays
/// below after each `rebuild()` and replaces whatever it built before.
use hypertower_core::{apply_query, build_tower, Partition, TowerGeometry, TowerSpec, WaistMode};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct TowerModel {
    spec: TowerSpec,
    geometry: TowerGeometry,
}

impl TowerModel {
    fn from_spec(spec: TowerSpec) -> Self {
        let geometry = build_tower(&spec);
        Self { spec, geometry }
    }

    fn edit(&mut self, change: impl FnOnce(&mut TowerSpec)) {
        change(&mut self.spec);
        self.spec = self.spec.sanitized();
    }
}

#[cfg(target_arch = "wasm32")]
fn log_rebuild(geometry: &TowerGeometry) {
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "hypertower: {} struts, {} rings",
        geometry.struts.len(),
        geometry.rings.len()
    )));
}

// The console binding only exists inside a browser.
#[cfg(not(target_arch = "wasm32"))]
fn log_rebuild(_geometry: &TowerGeometry) {}

impl Default for TowerModel {
    fn default() -> Self {
        Self::from_spec(TowerSpec::default())
    }
}

#[wasm_bindgen]
impl TowerModel {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TowerModel {
        Self::default()
    }

    /// Build from a URL query such as `location.search`.
    #[wasm_bindgen(js_name = fromQuery)]
    pub fn from_query(query: &str) -> Result<TowerModel, JsValue> {
        let spec = apply_query(&TowerSpec::default(), query).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::from_spec(spec))
    }

    /// Recompute struts and rings from the current parameters.
    pub fn rebuild(&mut self) {
        self.geometry = build_tower(&self.spec);
        log_rebuild(&self.geometry);
    }

    #[wasm_bindgen(js_name = setHeight)]
    pub fn set_height(&mut self, height: f64) {
        self.edit(|s| s.height = height);
    }

    #[wasm_bindgen(js_name = setBaseRadius)]
    pub fn set_base_radius(&mut self, radius: f64) {
        self.edit(|s| s.base_radius = radius);
    }

    #[wasm_bindgen(js_name = setTopRadius)]
    pub fn set_top_radius(&mut self, radius: f64) {
        self.edit(|s| s.top_radius = radius);
    }

    #[wasm_bindgen(js_name = setSectionCount)]
    pub fn set_section_count(&mut self, count: u32) {
        self.edit(|s| s.section_count = count);
    }

    #[wasm_bindgen(js_name = setStrutCount)]
    pub fn set_strut_count(&mut self, count: u32) {
        self.edit(|s| s.strut_count = count);
    }

    #[wasm_bindgen(js_name = setRingCount)]
    pub fn set_ring_count(&mut self, count: u32) {
        self.edit(|s| s.ring_count = count);
    }

    #[wasm_bindgen(js_name = setStrutRadius)]
    pub fn set_strut_radius(&mut self, radius: f64) {
        self.edit(|s| s.strut_radius = radius);
    }

    #[wasm_bindgen(js_name = setShowRings)]
    pub fn set_show_rings(&mut self, show: bool) {
        self.edit(|s| s.show_rings = show);
    }

    #[wasm_bindgen(js_name = setTwist)]
    pub fn set_twist(&mut self, degrees: f64) {
        self.edit(|s| s.twist_degrees = degrees);
    }

    #[wasm_bindgen(js_name = setWeighted)]
    pub fn set_weighted(&mut self, weighted: bool) {
        self.edit(|s| {
            s.partition = if weighted {
                Partition::Weighted
            } else {
                Partition::Uniform
            }
        });
    }

    #[wasm_bindgen(js_name = setAutoWaist)]
    pub fn set_auto_waist(&mut self) {
        self.edit(|s| s.waist = WaistMode::Auto);
    }

    #[wasm_bindgen(js_name = setManualWaist)]
    pub fn set_manual_waist(&mut self, position: f64, radius: f64) {
        self.edit(|s| s.waist = WaistMode::Manual { position, radius });
    }

    #[wasm_bindgen(js_name = strutRadius)]
    pub fn strut_radius(&self) -> f64 {
        self.spec.strut_radius
    }

    /// Six floats per strut: start xyz, end xyz.
    #[wasm_bindgen(js_name = strutPositions)]
    pub fn strut_positions(&self) -> Vec<f32> {
        self.geometry
            .struts
            .iter()
            .flat_map(|s| [s.start.x, s.start.y, s.start.z, s.end.x, s.end.y, s.end.z])
            .map(|c| c as f32)
            .collect()
    }

    /// Two floats per ring: radius, height.
    #[wasm_bindgen(js_name = ringData)]
    pub fn ring_data(&self) -> Vec<f32> {
        self.geometry
            .rings
            .iter()
            .flat_map(|r| [r.radius as f32, r.height as f32])
            .collect()
    }

    #[wasm_bindgen(js_name = waistPosition)]
    pub fn waist_position(&self) -> f64 {
        self.geometry.waist.position
    }

    #[wasm_bindgen(js_name = waistRadius)]
    pub fn waist_radius(&self) -> f64 {
        self.geometry.waist.radius
    }
}
