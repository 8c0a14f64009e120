//! One birth/death-rate panel per region, plus panels for toggled countries.
//!
//! Each panel is its own scene layer named `region:<name>` or
//! `country:<name>`, so adding or removing a country leaves the other
//! panels untouched.

use tracing::warn;

use super::{ready, Data, ViewController};
use crate::core::{
    data::SeriesRecord, normalize_country, Mark, SeriesKey, SharedState, Shape, Style, Surface, ViewError, ViewId,
};

const BIRTH_COLOR: &str = "#4daf4a";
const DEATH_COLOR: &str = "#e41a1c";

fn panel_marks(rows: &[SeriesRecord], entity: &str) -> Vec<Mark> {
    [(SeriesKey::BirthRate, BIRTH_COLOR), (SeriesKey::DeathRate, DEATH_COLOR)]
        .into_iter()
        .map(|(key, color)| {
            let points = rows
                .iter()
                .filter_map(|r| r.value(key).map(|v| [r.year as f64, v]))
                .collect();
            Mark::new(key.field(), Shape::Polyline(points), Style::line(color, 2.0)).for_entity(entity)
        })
        .collect()
}

pub struct SmallMultiplesView {
    data: Data,
    surface: Option<Surface>,
    countries: Vec<String>,
    missing: Vec<String>,
}

impl SmallMultiplesView {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            surface: None,
            countries: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn selected_countries(&self) -> &[String] {
        &self.countries
    }

    /// Region panel layer names, in display order.
    pub fn panels(&self) -> Vec<String> {
        self.surface
            .as_ref()
            .map(|s| s.scene.layers().iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default()
    }

    /// `countrySelected.smallMultiples`: add or remove the country's panel.
    pub fn toggle_country(&mut self, name: &str) -> Result<(), ViewError> {
        let name = normalize_country(name).to_string();
        let layer = format!("country:{name}");

        if let Some(pos) = self.countries.iter().position(|c| *c == name) {
            self.countries.remove(pos);
            self.missing.retain(|m| *m != name);
            ready(&mut self.surface, ViewId::SmallMultiples)?.scene.remove_layer(&layer);
        } else {
            let rows = self.data.country_birth_death(&name);
            if rows.is_empty() {
                warn!(country = %name, "No birth/death series");
                self.missing.push(name.clone());
            } else {
                let marks = panel_marks(rows, &name);
                ready(&mut self.surface, ViewId::SmallMultiples)?.scene.join(&layer, marks);
            }
            self.countries.push(name);
        }

        let notice = (!self.missing.is_empty()).then(|| format!("No data available for {}", self.missing.join(", ")));
        ready(&mut self.surface, ViewId::SmallMultiples)?.scene.set_notice(notice);
        Ok(())
    }
}

impl ViewController for SmallMultiplesView {
    fn id(&self) -> ViewId {
        ViewId::SmallMultiples
    }

    fn init(&mut self, surface: Surface, _state: &SharedState) -> Result<(), ViewError> {
        let mut surface = surface;
        surface.scene.title = "Regional Birth & Death Rates".to_string();
        surface.scene.x_label = "Year".to_string();
        surface.scene.y_label = "Rate (per 1,000)".to_string();
        surface.scene.legend = vec![
            ("Birth rate".to_string(), BIRTH_COLOR.to_string()),
            ("Death rate".to_string(), DEATH_COLOR.to_string()),
        ];

        let mut regions: Vec<_> = self.data.birth_death_regions().iter().collect();
        regions.sort_by(|a, b| a.region.cmp(&b.region));
        for region in regions {
            surface
                .scene
                .join(&format!("region:{}", region.region), panel_marks(&region.values, &region.region));
        }
        self.surface = Some(surface);
        Ok(())
    }

    fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }
}
