//! Globe / flat map of countries colored by the current metric
//!
//! The globe is the always-visible view and the main source of user input:
//! clicks select countries, the metric selector writes
//! `current_visualization`, and the year slider and playback write
//! `current_year`. Each of those returns the [`Event`] the dashboard must
//! dispatch.
//!
//! Country polygons stay in lon/lat; [`Projection`] maps them to the plane
//! at paint time so auto-rotation only touches the rotation angles.

use serde_json::Value;
use tracing::{debug, trace};

use super::scale::{extent, interpolate};
use super::{ready, Animated, Data, Highlightable, ViewController, DATA_LAYER};
use crate::config::DashboardConfig;
use crate::core::{
    same_country, Event, GlobeView, Mark, Metric, Playback, SharedState, Shape, Step, Style, Surface, Ticker,
    ViewError, ViewId, Year,
};

/// Fill for countries without a value.
pub const NO_DATA_FILL: &str = "#cccccc";
const COUNTRY_STROKE: &str = "#ffffff";
const ROTATION_SENSITIVITY: f64 = 60.0;
const ROTATION_STEP: f64 = 0.15;
/// Smallest zoom factor accepted from the zoom gesture.
pub const MIN_ZOOM: f64 = 0.5;
/// Globe radius in points before zoom.
const BASE_RADIUS: f64 = 250.0;

// ============================================================================
// Projection
// ============================================================================

/// Orthographic (3D) or equirectangular (2D) projection to unit space.
///
/// Output is centered on the origin; the globe disc has radius `zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub view: GlobeView,
    /// (lambda, phi) rotation in degrees.
    pub rotation: [f64; 2],
    pub zoom: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            view: GlobeView::Globe3d,
            rotation: [0.0, 0.0],
            zoom: 1.0,
        }
    }
}

impl Projection {
    /// Project a lon/lat point. `None` when it is on the far side of the globe.
    pub fn project(&self, lon: f64, lat: f64) -> Option<[f64; 2]> {
        match self.view {
            GlobeView::Map2d => Some([lon / 180.0 * self.zoom * 1.6, lat / 180.0 * self.zoom * 1.6]),
            GlobeView::Globe3d => {
                let lambda = (lon + self.rotation[0]).to_radians();
                let phi = lat.to_radians();
                let tilt = self.rotation[1].to_radians();

                let x = phi.cos() * lambda.cos();
                let y = phi.cos() * lambda.sin();
                let z = phi.sin();

                let x_t = x * tilt.cos() + z * tilt.sin();
                let z_t = -x * tilt.sin() + z * tilt.cos();
                (x_t >= 0.0).then_some([y * self.zoom, z_t * self.zoom])
            }
        }
    }

    pub fn radius_px(&self) -> f64 {
        BASE_RADIUS * self.zoom
    }
}

/// Outer rings of a GeoJSON Polygon or MultiPolygon geometry.
pub fn outer_rings(geometry: &Value) -> Vec<Vec<[f64; 2]>> {
    fn ring(value: &Value) -> Option<Vec<[f64; 2]>> {
        value
            .as_array()?
            .iter()
            .map(|p| {
                let p = p.as_array()?;
                Some([p.first()?.as_f64()?, p.get(1)?.as_f64()?])
            })
            .collect()
    }

    let coords = &geometry["coordinates"];
    match geometry["type"].as_str() {
        Some("Polygon") => coords
            .get(0)
            .and_then(ring)
            .into_iter()
            .collect(),
        Some("MultiPolygon") => coords
            .as_array()
            .map(|polys| polys.iter().filter_map(|p| p.get(0).and_then(ring)).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Even-odd point-in-polygon test.
pub fn point_in_ring(ring: &[[f64; 2]], p: [f64; 2]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0] {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ============================================================================
// Color
// ============================================================================

/// Globe color scale for one metric and year.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    metric: Metric,
    domain: Option<(f64, f64)>,
}

impl ColorScale {
    pub fn build(metric: Metric, values: impl IntoIterator<Item = f64>) -> Self {
        let domain = if metric.is_diverging() {
            extent(values).map(|(lo, hi)| {
                let abs_max = lo.abs().max(hi.abs());
                (-abs_max, abs_max)
            })
        } else {
            let positive = extent(values.into_iter().filter(|v| *v > 0.0));
            if metric.uses_log_scale() {
                positive.map(|(lo, hi)| (lo.max(1.0), hi))
            } else {
                positive
            }
        };
        Self { metric, domain }
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    /// Fill for `value`; grey when absent, zero, or (except gender gap) negative.
    pub fn color(&self, value: Option<f64>) -> String {
        let (Some(value), Some((lo, hi))) = (value, self.domain) else {
            return NO_DATA_FILL.to_string();
        };
        let usable = if self.metric.is_diverging() {
            value != 0.0
        } else {
            value > 0.0
        };
        if !usable || !value.is_finite() {
            return NO_DATA_FILL.to_string();
        }
        let t = if self.metric.uses_log_scale() {
            let (l0, l1) = (lo.ln(), hi.ln());
            if l1 > l0 {
                (value.max(lo).ln() - l0) / (l1 - l0)
            } else {
                0.5
            }
        } else if hi > lo {
            (value - lo) / (hi - lo)
        } else {
            0.5
        };
        interpolate(self.metric.color_scheme(), t)
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct GlobeController {
    data: Data,
    surface: Option<Surface>,
    metric: Metric,
    year: Year,
    projection: Projection,
    playback: Playback,
    rotation: Ticker,
    rotating: bool,
    dragging: bool,
    highlighted: Option<String>,
}

impl GlobeController {
    pub fn new(data: Data, config: &DashboardConfig) -> Self {
        Self {
            data,
            surface: None,
            metric: Metric::default(),
            year: Year::LAST,
            projection: Projection::default(),
            playback: Playback::new(config.globe_interval_ms, Year::LAST),
            rotation: Ticker::from_millis(config.rotation_interval_ms),
            rotating: false,
            dragging: false,
            highlighted: None,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let records = self.data.globe_by_year(self.year);
        let scale = ColorScale::build(self.metric, records.iter().map(|r| r.metric_value(self.metric)));

        let mut marks = Vec::new();
        for feature in self.data.geo_features() {
            let value = records
                .iter()
                .find(|r| r.alpha3_code == feature.id)
                .map(|r| r.metric_value(self.metric));
            let mut style = Style::filled(&scale.color(value));
            style.stroke = COUNTRY_STROKE.to_string();
            style.stroke_width = 0.5;
            style.opacity = 1.0;
            let name = &feature.properties.name;
            if self
                .highlighted
                .as_deref()
                .is_some_and(|h| same_country(h, name))
            {
                style.stroke = Style::HIGHLIGHT_STROKE.to_string();
                style.stroke_width = 3.0;
            }
            let key = if feature.id.is_empty() { name } else { &feature.id };
            for (i, ring) in outer_rings(&feature.geometry).into_iter().enumerate() {
                marks.push(Mark::new(format!("{key}#{i}"), Shape::Polygon(ring), style.clone()).for_entity(name.clone()));
            }
        }

        let metric = self.metric;
        let year = self.year;
        let surface = ready(&mut self.surface, ViewId::Globe)?;
        let stats = surface.scene.join(DATA_LAYER, marks);
        surface.scene.title = format!("{metric} ({year})");
        surface.scene.legend = match scale.domain() {
            Some((lo, hi)) => vec![
                (format!("{lo:.1}"), scale.color(Some(lo))),
                (format!("{hi:.1}"), scale.color(Some(hi))),
            ],
            None => Vec::new(),
        };
        trace!(entered = stats.entered, updated = stats.updated, "Globe drawn");
        Ok(())
    }

    /// Feature `(code, name)` for a clicked name or ISO3 code.
    pub fn resolve_country(&self, name_or_code: &str) -> Option<(String, String)> {
        self.data
            .geo_features()
            .iter()
            .find(|f| f.id == name_or_code || same_country(&f.properties.name, name_or_code))
            .map(|f| (f.id.clone(), f.properties.name.clone()))
    }

    /// Click on a country: the selection to announce.
    pub fn click_country(&self, name_or_code: &str) -> Option<Event> {
        let (code, name) = self.resolve_country(name_or_code)?;
        debug!(%code, %name, "Globe country clicked");
        Some(Event::CountrySelected { code, name })
    }

    /// Metric selector.
    pub fn choose_metric(&mut self, state: &mut SharedState, metric: Metric) -> Result<Event, ViewError> {
        state.current_visualization = metric;
        self.metric = metric;
        self.draw()?;
        Ok(Event::ModeChanged(metric))
    }

    /// Year slider release.
    pub fn drag_year(&mut self, state: &mut SharedState, year: Year) -> Result<Event, ViewError> {
        state.set_current_year(year);
        self.year = year;
        self.draw()?;
        Ok(Event::YearChanged(year))
    }

    /// 3D/2D toggle. Rotation stops first and restarts only in 3D.
    pub fn toggle_view(&mut self, state: &mut SharedState) -> Result<(), ViewError> {
        self.stop_rotation();
        self.projection.view = self.projection.view.toggled();
        self.projection.zoom = 1.0;
        state.globe_view = self.projection.view;
        self.draw()?;
        if self.projection.view == GlobeView::Globe3d {
            self.start_rotation();
        }
        debug!(view = ?self.projection.view, "Globe view toggled");
        Ok(())
    }

    pub fn drag_start(&mut self) {
        self.stop_rotation();
        self.dragging = true;
    }

    /// Rotate by a pointer delta in points.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            self.drag_start();
        }
        let factor = ROTATION_SENSITIVITY / self.projection.radius_px();
        self.projection.rotation[0] += dx * factor;
        self.projection.rotation[1] = (self.projection.rotation[1] - dy * factor).clamp(-90.0, 90.0);
    }

    pub fn drag_end(&mut self) {
        self.dragging = false;
        if self.projection.view == GlobeView::Globe3d {
            self.start_rotation();
        }
    }

    /// Zoom gesture; factors at or below the minimum are clamped.
    pub fn zoom(&mut self, factor: f64) {
        self.projection.zoom = if factor > MIN_ZOOM { factor } else { MIN_ZOOM };
    }

    fn start_rotation(&mut self) {
        self.rotation.cancel();
        self.rotating = true;
    }

    fn stop_rotation(&mut self) {
        self.rotation.cancel();
        self.rotating = false;
    }

    /// Follow an external year change without announcing it.
    pub fn show_year(&mut self, year: Year) -> Result<(), ViewError> {
        if year != self.year {
            self.year = year;
            self.draw()?;
        }
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ViewError> {
        self.stop_rotation();
        ready(&mut self.surface, ViewId::Globe)?.resize(width, height);
        self.projection.zoom = 1.0;
        self.draw()?;
        if self.projection.view == GlobeView::Globe3d {
            self.start_rotation();
        }
        Ok(())
    }
}

impl ViewController for GlobeController {
    fn id(&self) -> ViewId {
        ViewId::Globe
    }

    fn init(&mut self, surface: Surface, state: &SharedState) -> Result<(), ViewError> {
        self.surface = Some(surface);
        self.metric = state.current_visualization;
        self.year = state.current_year();
        self.projection.view = state.globe_view;
        self.draw()?;
        self.playback.ready();
        if self.projection.view == GlobeView::Globe3d {
            self.start_rotation();
        }
        debug!(features = self.data.geo_features().len(), "Globe initialized");
        Ok(())
    }

    fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    fn as_highlightable(&mut self) -> Option<&mut dyn Highlightable> {
        Some(self)
    }

    fn as_animated(&mut self) -> Option<&mut dyn Animated> {
        Some(self)
    }
}

impl Highlightable for GlobeController {
    fn highlight_country(&mut self, name: &str) -> Result<(), ViewError> {
        let surface = ready(&mut self.surface, ViewId::Globe)?;
        let mut found = false;
        surface.scene.restyle(DATA_LAYER, |mark| {
            let hit = mark.entity.as_deref().is_some_and(|e| same_country(e, name));
            found |= hit;
            if hit {
                mark.style.stroke = Style::HIGHLIGHT_STROKE.to_string();
                mark.style.stroke_width = 3.0;
            } else {
                mark.style.stroke = COUNTRY_STROKE.to_string();
                mark.style.stroke_width = 0.5;
            }
        });
        surface
            .scene
            .set_notice((!found).then(|| format!("No data available for {name}")));
        self.highlighted = Some(name.to_string());
        Ok(())
    }

    fn unhighlight(&mut self) -> Result<(), ViewError> {
        let surface = ready(&mut self.surface, ViewId::Globe)?;
        surface.scene.restyle(DATA_LAYER, |mark| {
            mark.style.stroke = COUNTRY_STROKE.to_string();
            mark.style.stroke_width = 0.5;
        });
        surface.scene.set_notice(None);
        self.highlighted = None;
        Ok(())
    }

    fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }
}

impl Animated for GlobeController {
    fn playback(&self) -> &Playback {
        &self.playback
    }

    fn play(&mut self, now: f64) -> bool {
        self.playback.play(now)
    }

    fn pause(&mut self) {
        self.playback.pause();
    }

    fn reset(&mut self) -> Result<Year, ViewError> {
        let home = self.playback.reset();
        self.year = home;
        self.draw()?;
        Ok(home)
    }

    /// Advances the year on the playback interval and spins the globe.
    fn tick(&mut self, now: f64) -> Result<Option<Year>, ViewError> {
        if self.rotating && !self.dragging {
            if !self.rotation.is_armed() {
                self.rotation.arm(now);
            }
            let frames = self.rotation.poll(now);
            if frames > 0 {
                let step = ROTATION_STEP * ROTATION_SENSITIVITY / self.projection.radius_px();
                self.projection.rotation[0] = (self.projection.rotation[0] - step * frames as f64) % 360.0;
            }
        }

        match self.playback.poll(now, self.year) {
            Some(Step::Advanced(year)) => {
                self.year = year;
                self.draw()?;
                Ok(Some(year))
            }
            Some(Step::Finished) | None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DatasetFile, Datasets};
    use std::rc::Rc;

    fn fixture() -> Data {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::GeoJson,
            r#"{"features": [
                {"id": "FRA", "properties": {"name": "France"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,45],[5,45],[5,50],[0,50],[0,45]]]}},
                {"id": "USA", "properties": {"name": "United States of America"},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[-120,30],[-80,30],[-80,45],[-120,45],[-120,30]]],
                    [[[-160,60],[-140,60],[-140,70],[-160,70],[-160,60]]]
                 ]}}
            ]}"#,
        )
        .unwrap();
        data.insert(
            DatasetFile::Globe,
            r#"{"2023": [
                {"country": "France", "alpha3_code": "FRA", "population_number": 6.8e7},
                {"country": "United States of America", "alpha3_code": "USA", "population_number": 3.3e8}
            ], "2000": [
                {"country": "France", "alpha3_code": "FRA", "population_number": 6.0e7}
            ]}"#,
        )
        .unwrap();
        Rc::new(data)
    }

    fn globe() -> (GlobeController, SharedState) {
        let state = SharedState::new();
        let mut globe = GlobeController::new(fixture(), &DashboardConfig::default());
        globe.init(Surface::new(ViewId::Globe), &state).unwrap();
        (globe, state)
    }

    #[test]
    fn test_init_draws_one_mark_per_ring() {
        let (globe, _) = globe();
        let scene = &globe.surface().unwrap().scene;
        assert_eq!(scene.marks(DATA_LAYER).len(), 3);
        assert!(globe.is_rotating());
    }

    #[test]
    fn test_missing_country_is_grey() {
        let (mut globe, mut state) = globe();
        globe.drag_year(&mut state, Year::new(2000).unwrap()).unwrap();
        let usa = globe.surface().unwrap().scene.find_entity(DATA_LAYER, "United States of America").unwrap();
        assert_eq!(usa.style.fill.as_deref(), Some(NO_DATA_FILL));
        assert_eq!(state.current_year().get(), 2000);
    }

    #[test]
    fn test_gender_gap_domain_is_symmetric() {
        let scale = ColorScale::build(Metric::GenderGap, [-2.0, 5.0, 3.0]);
        assert_eq!(scale.domain(), Some((-5.0, 5.0)));
        assert_eq!(scale.color(Some(0.0)), NO_DATA_FILL);
        assert_ne!(scale.color(Some(-2.0)), NO_DATA_FILL);
    }

    #[test]
    fn test_population_domain_ignores_non_positive() {
        let scale = ColorScale::build(Metric::Population, [0.0, 0.5, 1000.0]);
        assert_eq!(scale.domain(), Some((1.0, 1000.0)));
        assert_eq!(scale.color(Some(-3.0)), NO_DATA_FILL);
        assert_eq!(scale.color(None), NO_DATA_FILL);
    }

    #[test]
    fn test_choose_metric_writes_state_and_announces() {
        let (mut globe, mut state) = globe();
        let event = globe.choose_metric(&mut state, Metric::Density).unwrap();
        assert_eq!(event, Event::ModeChanged(Metric::Density));
        assert_eq!(state.current_visualization, Metric::Density);
        assert_eq!(globe.metric(), Metric::Density);
    }

    #[test]
    fn test_click_resolves_aliases() {
        let (globe, _) = globe();
        assert_eq!(
            globe.click_country("United States"),
            Some(Event::country_selected("USA", "United States of America"))
        );
        assert_eq!(globe.click_country("Atlantis"), None);
    }

    #[test]
    fn test_highlight_then_unhighlight_restores_strokes() {
        let (mut globe, _) = globe();
        let before = globe.surface().unwrap().scene.clone();
        globe.highlight_country("France").unwrap();
        let france = globe.surface().unwrap().scene.find_entity(DATA_LAYER, "France").unwrap();
        assert!(france.style.is_highlighted());
        globe.unhighlight().unwrap();
        assert_eq!(globe.surface().unwrap().scene, before);
    }

    #[test]
    fn test_toggle_view_stops_rotation_in_2d() {
        let (mut globe, mut state) = globe();
        globe.toggle_view(&mut state).unwrap();
        assert_eq!(state.globe_view, GlobeView::Map2d);
        assert!(!globe.is_rotating());
        globe.toggle_view(&mut state).unwrap();
        assert!(globe.is_rotating());
    }

    #[test]
    fn test_drag_pauses_rotation_until_release() {
        let (mut globe, _) = globe();
        globe.tick(0.0).unwrap();
        globe.drag(10.0, 0.0);
        assert!(!globe.is_rotating());
        let angle = globe.projection().rotation[0];
        globe.tick(5.0).unwrap();
        assert_eq!(globe.projection().rotation[0], angle);
        globe.drag_end();
        assert!(globe.is_rotating());
    }

    #[test]
    fn test_zoom_has_floor() {
        let (mut globe, _) = globe();
        globe.zoom(0.2);
        assert_eq!(globe.projection().zoom, MIN_ZOOM);
        globe.zoom(2.0);
        assert_eq!(globe.projection().zoom, 2.0);
    }

    #[test]
    fn test_playback_advances_and_stops_at_last_year() {
        let (mut globe, mut state) = globe();
        globe.drag_year(&mut state, Year::new(2021).unwrap()).unwrap();
        assert!(globe.play(0.0));
        assert_eq!(globe.tick(0.5).unwrap(), Some(Year::new(2022).unwrap()));
        assert_eq!(globe.tick(1.0).unwrap(), Some(Year::LAST));
        assert_eq!(globe.tick(1.5).unwrap(), None);
        assert!(!globe.playback().has_live_timer());
    }

    #[test]
    fn test_projection_hides_far_side() {
        let p = Projection::default();
        assert!(p.project(0.0, 0.0).is_some());
        assert!(p.project(180.0, 0.0).is_none());
        let flat = Projection { view: GlobeView::Map2d, ..p };
        assert!(flat.project(180.0, 0.0).is_some());
    }

    #[test]
    fn test_point_in_ring() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!(point_in_ring(&square, [0.5, 0.5]));
        assert!(!point_in_ring(&square, [1.5, 0.5]));
    }
}
