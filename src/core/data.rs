//! Precomputed demographic datasets and their read-only accessors
//!
//! These structures are platform-agnostic (no WASM deps) and shared
//! between the CLI and the dashboard. Every accessor returns an empty
//! slice or map when the backing data is absent so that views can render
//! a "no data" state instead of failing.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use super::names::normalize_country;
use super::types::{Metric, Year};

// ============================================================================
// Record types
// ============================================================================

/// One country in one year, as colored on the globe.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobeRecord {
    pub country: String,
    pub alpha3_code: String,
    pub population_number: f64,
    pub population_density_number: f64,
    pub sex_ratio_number: f64,
    pub median_age_number: f64,
    pub birth_rate_number: f64,
    pub death_rate_number: f64,
    pub natural_change_number: f64,
    pub migration_rate_number: f64,
    pub life_expectancy_number: f64,
    pub life_expectancy_male_number: f64,
    pub life_expectancy_female_number: f64,
    pub fertility_rate_number: f64,
    pub infant_mortality_number: f64,
}

impl GlobeRecord {
    /// Value the globe colors by for `metric`.
    pub fn metric_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Population => self.population_number,
            Metric::Density => self.population_density_number,
            Metric::SexRatio => self.sex_ratio_number,
            Metric::MedianAge => self.median_age_number,
            Metric::DemographicTransition => self.birth_rate_number,
            Metric::GrowthDrivers => self.natural_change_number,
            Metric::LongevityGap => self.life_expectancy_number,
            Metric::FertilityHealth => self.fertility_rate_number,
            Metric::HealthcareQuality => self.infant_mortality_number,
            Metric::GenderGap => self.life_expectancy_female_number - self.life_expectancy_male_number,
        }
    }
}

/// Country detail series point (overview detail panel).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetailRecord {
    pub year: i64,
    pub population: f64,
    pub density: f64,
    pub sex_ratio: f64,
    pub median_age: f64,
}

/// Column of a regional or per-country yearly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    Population,
    Density,
    SexRatio,
    MedianAge,
    BirthRate,
    DeathRate,
    NaturalChange,
    MigrationRate,
    FertilityRate,
    MeanAgeChildbearing,
    InfantMortality,
    UnderFiveMortality,
    LifeExpectancyMale,
    LifeExpectancyFemale,
    LifeExpectancyBoth,
}

impl SeriesKey {
    pub const ALL: &'static [SeriesKey] = &[
        SeriesKey::Population,
        SeriesKey::Density,
        SeriesKey::SexRatio,
        SeriesKey::MedianAge,
        SeriesKey::BirthRate,
        SeriesKey::DeathRate,
        SeriesKey::NaturalChange,
        SeriesKey::MigrationRate,
        SeriesKey::FertilityRate,
        SeriesKey::MeanAgeChildbearing,
        SeriesKey::InfantMortality,
        SeriesKey::UnderFiveMortality,
        SeriesKey::LifeExpectancyMale,
        SeriesKey::LifeExpectancyFemale,
        SeriesKey::LifeExpectancyBoth,
    ];

    /// Field name in the JSON files.
    pub fn field(self) -> &'static str {
        match self {
            SeriesKey::Population => "population",
            SeriesKey::Density => "density",
            SeriesKey::SexRatio => "sexRatio",
            SeriesKey::MedianAge => "medianAge",
            SeriesKey::BirthRate => "birthRate",
            SeriesKey::DeathRate => "deathRate",
            SeriesKey::NaturalChange => "naturalChange",
            SeriesKey::MigrationRate => "migrationRate",
            SeriesKey::FertilityRate => "fertilityRate",
            SeriesKey::MeanAgeChildbearing => "meanAgeChildbearing",
            SeriesKey::InfantMortality => "infantMortality",
            SeriesKey::UnderFiveMortality => "underFiveMortality",
            SeriesKey::LifeExpectancyMale => "lifeExpectancyMale",
            SeriesKey::LifeExpectancyFemale => "lifeExpectancyFemale",
            SeriesKey::LifeExpectancyBoth => "lifeExpectancyBoth",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeriesKey::Population => "Total Population",
            SeriesKey::Density => "Population Density",
            SeriesKey::SexRatio => "Sex Ratio",
            SeriesKey::MedianAge => "Median Age",
            SeriesKey::BirthRate => "Birth Rate",
            SeriesKey::DeathRate => "Death Rate",
            SeriesKey::NaturalChange => "Natural Change",
            SeriesKey::MigrationRate => "Net Migration",
            SeriesKey::FertilityRate => "Fertility Rate",
            SeriesKey::MeanAgeChildbearing => "Mean Age at Childbearing",
            SeriesKey::InfantMortality => "Infant Mortality",
            SeriesKey::UnderFiveMortality => "Under-Five Mortality",
            SeriesKey::LifeExpectancyMale => "Male Life Expectancy",
            SeriesKey::LifeExpectancyFemale => "Female Life Expectancy",
            SeriesKey::LifeExpectancyBoth => "Life Expectancy",
        }
    }

    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.field() == field)
    }
}

/// One year of a regional or per-country series. Absent columns are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesRecord {
    pub year: i64,
    pub population: Option<f64>,
    pub density: Option<f64>,
    pub sex_ratio: Option<f64>,
    pub median_age: Option<f64>,
    pub birth_rate: Option<f64>,
    pub death_rate: Option<f64>,
    pub natural_change: Option<f64>,
    pub migration_rate: Option<f64>,
    pub fertility_rate: Option<f64>,
    pub mean_age_childbearing: Option<f64>,
    pub infant_mortality: Option<f64>,
    pub under_five_mortality: Option<f64>,
    pub life_expectancy_male: Option<f64>,
    pub life_expectancy_female: Option<f64>,
    pub life_expectancy_both: Option<f64>,
    pub iso3: Option<String>,
}

impl SeriesRecord {
    pub fn value(&self, key: SeriesKey) -> Option<f64> {
        match key {
            SeriesKey::Population => self.population,
            SeriesKey::Density => self.density,
            SeriesKey::SexRatio => self.sex_ratio,
            SeriesKey::MedianAge => self.median_age,
            SeriesKey::BirthRate => self.birth_rate,
            SeriesKey::DeathRate => self.death_rate,
            SeriesKey::NaturalChange => self.natural_change,
            SeriesKey::MigrationRate => self.migration_rate,
            SeriesKey::FertilityRate => self.fertility_rate,
            SeriesKey::MeanAgeChildbearing => self.mean_age_childbearing,
            SeriesKey::InfantMortality => self.infant_mortality,
            SeriesKey::UnderFiveMortality => self.under_five_mortality,
            SeriesKey::LifeExpectancyMale => self.life_expectancy_male,
            SeriesKey::LifeExpectancyFemale => self.life_expectancy_female,
            SeriesKey::LifeExpectancyBoth => self.life_expectancy_both,
        }
    }
}

/// A region with its yearly values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionSeries {
    pub region: String,
    #[serde(default)]
    pub values: Vec<SeriesRecord>,
}

/// `birth_death_rates.json`: either the current `{regions, countries}` shape
/// or the older bare array of regions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BirthDeathRates {
    Split {
        #[serde(default)]
        regions: Vec<RegionSeries>,
        #[serde(default)]
        countries: HashMap<String, Vec<SeriesRecord>>,
    },
    Regions(Vec<RegionSeries>),
}

impl Default for BirthDeathRates {
    fn default() -> Self {
        BirthDeathRates::Regions(Vec::new())
    }
}

/// Bubble chart row for the fertility × life expectancy animation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationRecord {
    pub country: String,
    pub year: i64,
    pub fertility: f64,
    pub life_expectancy: f64,
    pub population: f64,
    pub iso3: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionMeta {
    pub name: String,
    pub color: String,
}

/// GeoJSON feature; geometry stays opaque to the core.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoFeature {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub properties: GeoProperties,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoProperties {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoCollection {
    #[serde(default)]
    pub features: Vec<GeoFeature>,
}

fn id_as_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IndicatorValue {
    #[serde(default)]
    pub raw: f64,
    #[serde(default)]
    pub normalized: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadarCountry {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub values: BTreeMap<String, IndicatorValue>,
}

/// `radar_chart_data.json`: normalized indicator profiles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadarData {
    /// indicator key -> display label
    pub indicators: BTreeMap<String, String>,
    pub countries: HashMap<String, RadarCountry>,
    pub regional_averages: HashMap<String, BTreeMap<String, IndicatorValue>>,
    pub world_average: BTreeMap<String, IndicatorValue>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DistributionBin {
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub density: f64,
}

/// Median-age distribution across countries for one decade.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RidgelineDecade {
    pub decade: i64,
    pub label: String,
    pub countries: u32,
    pub mean: f64,
    pub median: f64,
    pub distribution: Vec<DistributionBin>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthRecord {
    pub country: String,
    pub year: i64,
    pub natural_change: f64,
    pub migration_rate: f64,
    pub population: f64,
    pub region: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct GapPoint {
    pub male: f64,
    pub female: f64,
    pub gap: f64,
}

/// Male/female life expectancy at the first and latest year.
///
/// The snapshot keys are named after their year (`year1950`, `year2023`),
/// so they are collected dynamically.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapComparison {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub gap_change: f64,
    #[serde(flatten)]
    pub snapshots: BTreeMap<String, GapPoint>,
}

impl GapComparison {
    /// First and last `yearNNNN` snapshots.
    pub fn endpoints(&self) -> Option<(&GapPoint, &GapPoint)> {
        let mut years = self
            .snapshots
            .iter()
            .filter(|(k, _)| k.starts_with("year"))
            .map(|(_, v)| v);
        let first = years.next()?;
        let last = years.last().unwrap_or(first);
        Some((first, last))
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct GapYear {
    pub year: i64,
    pub male: f64,
    pub female: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GapSeries {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub values: Vec<GapYear>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenderGapData {
    pub comparison: Vec<GapComparison>,
    pub timeseries: Vec<GapSeries>,
}

// ============================================================================
// Dataset files
// ============================================================================

/// The thirteen JSON resources the dashboard needs before it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetFile {
    Globe,
    CountryDetail,
    RegionalTimeSeries,
    BirthDeathRates,
    CountryTimeSeries,
    CountriesList,
    Animation,
    RegionMetadata,
    GeoJson,
    Radar,
    Ridgeline,
    GrowthDrivers,
    GenderGap,
}

impl DatasetFile {
    pub const ALL: [DatasetFile; 13] = [
        DatasetFile::Globe,
        DatasetFile::CountryDetail,
        DatasetFile::RegionalTimeSeries,
        DatasetFile::BirthDeathRates,
        DatasetFile::CountryTimeSeries,
        DatasetFile::CountriesList,
        DatasetFile::Animation,
        DatasetFile::RegionMetadata,
        DatasetFile::GeoJson,
        DatasetFile::Radar,
        DatasetFile::Ridgeline,
        DatasetFile::GrowthDrivers,
        DatasetFile::GenderGap,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            DatasetFile::Globe => "globe_data_all_years.json",
            DatasetFile::CountryDetail => "country_detail_data.json",
            DatasetFile::RegionalTimeSeries => "regional_population_nested.json",
            DatasetFile::BirthDeathRates => "birth_death_rates.json",
            DatasetFile::CountryTimeSeries => "country_population_timeseries.json",
            DatasetFile::CountriesList => "countries_list.json",
            DatasetFile::Animation => "country_animation_data.json",
            DatasetFile::RegionMetadata => "region_metadata.json",
            DatasetFile::GeoJson => "globeCoordinates.json",
            DatasetFile::Radar => "radar_chart_data.json",
            DatasetFile::Ridgeline => "ridgeline_data.json",
            DatasetFile::GrowthDrivers => "growth_drivers_data.json",
            DatasetFile::GenderGap => "gender_gap_data.json",
        }
    }
}

/// Record counts announced with `dataLoaded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub globe_years: usize,
    pub detail_countries: usize,
    pub regions: usize,
    pub animation_records: usize,
    pub geo_features: usize,
    pub radar_countries: usize,
    pub ridgeline_decades: usize,
    pub growth_records: usize,
    pub gender_gap_countries: usize,
}

// ============================================================================
// Dataset bundle
// ============================================================================

/// All datasets, populated once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    globe: HashMap<String, Vec<GlobeRecord>>,
    country_detail: HashMap<String, Vec<DetailRecord>>,
    regional_time_series: Vec<RegionSeries>,
    birth_death: BirthDeathRates,
    country_time_series: BTreeMap<String, Vec<SeriesRecord>>,
    countries_list: Vec<String>,
    animation: Vec<AnimationRecord>,
    region_metadata: Vec<RegionMeta>,
    geo: GeoCollection,
    radar: RadarData,
    ridgeline: Vec<RidgelineDecade>,
    growth_drivers: Vec<GrowthRecord>,
    gender_gap: GenderGapData,
}

impl Datasets {
    /// Parse one file's JSON text into its slot.
    pub fn insert(&mut self, file: DatasetFile, json: &str) -> Result<(), serde_json::Error> {
        trace!(file = file.file_name(), len = json.len(), "Parsing dataset");
        match file {
            DatasetFile::Globe => self.globe = serde_json::from_str(json)?,
            DatasetFile::CountryDetail => self.country_detail = serde_json::from_str(json)?,
            DatasetFile::RegionalTimeSeries => {
                self.regional_time_series = serde_json::from_str(json)?
            }
            DatasetFile::BirthDeathRates => self.birth_death = serde_json::from_str(json)?,
            DatasetFile::CountryTimeSeries => {
                self.country_time_series = serde_json::from_str(json)?
            }
            DatasetFile::CountriesList => self.countries_list = serde_json::from_str(json)?,
            DatasetFile::Animation => self.animation = serde_json::from_str(json)?,
            DatasetFile::RegionMetadata => self.region_metadata = serde_json::from_str(json)?,
            DatasetFile::GeoJson => self.geo = serde_json::from_str(json)?,
            DatasetFile::Radar => self.radar = serde_json::from_str(json)?,
            DatasetFile::Ridgeline => self.ridgeline = serde_json::from_str(json)?,
            DatasetFile::GrowthDrivers => self.growth_drivers = serde_json::from_str(json)?,
            DatasetFile::GenderGap => self.gender_gap = serde_json::from_str(json)?,
        }
        debug!(file = file.file_name(), "Dataset parsed");
        Ok(())
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            globe_years: self.globe.len(),
            detail_countries: self.country_detail.len(),
            regions: self.regional_time_series.len(),
            animation_records: self.animation.len(),
            geo_features: self.geo.features.len(),
            radar_countries: self.radar.countries.len(),
            ridgeline_decades: self.ridgeline.len(),
            growth_records: self.growth_drivers.len(),
            gender_gap_countries: self.gender_gap.comparison.len(),
        }
    }

    /// Globe records for one year.
    pub fn globe_by_year(&self, year: Year) -> &[GlobeRecord] {
        self.globe
            .get(&year.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn country_detail(&self, country: &str) -> &[DetailRecord] {
        self.country_detail
            .get(normalize_country(country))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn regional_time_series(&self) -> &[RegionSeries] {
        &self.regional_time_series
    }

    pub fn birth_death_regions(&self) -> &[RegionSeries] {
        match &self.birth_death {
            BirthDeathRates::Split { regions, .. } => regions,
            BirthDeathRates::Regions(regions) => regions,
        }
    }

    pub fn country_birth_death(&self, country: &str) -> &[SeriesRecord] {
        match &self.birth_death {
            BirthDeathRates::Split { countries, .. } => countries
                .get(normalize_country(country))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            BirthDeathRates::Regions(_) => &[],
        }
    }

    pub fn country_time_series(&self) -> &BTreeMap<String, Vec<SeriesRecord>> {
        &self.country_time_series
    }

    pub fn country_series(&self, country: &str) -> &[SeriesRecord] {
        self.country_time_series
            .get(normalize_country(country))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn countries_list(&self) -> &[String] {
        &self.countries_list
    }

    pub fn animation(&self) -> &[AnimationRecord] {
        &self.animation
    }

    pub fn region_metadata(&self) -> &[RegionMeta] {
        &self.region_metadata
    }

    /// Region color from metadata, `#999999` when unknown.
    pub fn region_color(&self, region: &str) -> &str {
        self.region_metadata
            .iter()
            .find(|m| m.name == region)
            .map(|m| m.color.as_str())
            .unwrap_or("#999999")
    }

    pub fn geo_features(&self) -> &[GeoFeature] {
        &self.geo.features
    }

    pub fn radar(&self) -> &RadarData {
        &self.radar
    }

    pub fn ridgeline(&self) -> &[RidgelineDecade] {
        &self.ridgeline
    }

    pub fn growth_drivers(&self) -> &[GrowthRecord] {
        &self.growth_drivers
    }

    pub fn gender_gap(&self) -> &GenderGapData {
        &self.gender_gap
    }
}

/// Human-readable population, matching the dashboard's detail header.
pub fn format_population(num: f64) -> String {
    if !num.is_finite() || num == 0.0 {
        return "N/A".to_string();
    }
    if num >= 1_000_000_000.0 {
        format!("{:.2} billion", num / 1_000_000_000.0)
    } else if num >= 1_000_000.0 {
        format!("{:.2} million", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.2} thousand", num / 1_000.0)
    } else {
        format!("{num}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_yields_empty_views() {
        let data = Datasets::default();
        assert!(data.globe_by_year(Year::LAST).is_empty());
        assert!(data.country_detail("France").is_empty());
        assert!(data.country_birth_death("France").is_empty());
        assert!(data.radar().countries.is_empty());
        assert_eq!(data.region_color("Atlantis"), "#999999");
    }

    #[test]
    fn test_globe_lookup_by_year() {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::Globe,
            r#"{"1990": [{"country": "France", "alpha3_code": "FRA", "population_number": 5.6e7}]}"#,
        )
        .unwrap();
        let year = Year::new(1990).unwrap();
        assert_eq!(data.globe_by_year(year).len(), 1);
        assert_eq!(data.globe_by_year(year)[0].alpha3_code, "FRA");
        assert!(data.globe_by_year(Year::LAST).is_empty());
    }

    #[test]
    fn test_birth_death_accepts_both_shapes() {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::BirthDeathRates,
            r#"[{"region": "Africa", "values": [{"year": 1950, "birthRate": 48.0, "deathRate": 27.0}]}]"#,
        )
        .unwrap();
        assert_eq!(data.birth_death_regions().len(), 1);
        assert!(data.country_birth_death("Kenya").is_empty());

        data.insert(
            DatasetFile::BirthDeathRates,
            r#"{"regions": [], "countries": {"Viet Nam": [{"year": 1950, "birthRate": 40.0, "deathRate": 20.0}]}}"#,
        )
        .unwrap();
        assert!(data.birth_death_regions().is_empty());
        assert_eq!(data.country_birth_death("Vietnam").len(), 1);
    }

    #[test]
    fn test_gender_gap_snapshots_are_collected() {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::GenderGap,
            r#"{"comparison": [{
                "country": "Japan", "region": "Asia", "gapChange": 1.5,
                "year1950": {"male": 58.0, "female": 61.0, "gap": 3.0},
                "year2023": {"male": 81.0, "female": 87.0, "gap": 6.0}
            }], "timeseries": []}"#,
        )
        .unwrap();
        let cmp = &data.gender_gap().comparison[0];
        let (first, last) = cmp.endpoints().unwrap();
        assert_eq!(first.gap, 3.0);
        assert_eq!(last.gap, 6.0);
        assert_eq!(cmp.gap_change, 1.5);
    }

    #[test]
    fn test_geo_feature_numeric_id() {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::GeoJson,
            r#"{"features": [{"id": 250, "properties": {"name": "France"}, "geometry": null}]}"#,
        )
        .unwrap();
        assert_eq!(data.geo_features()[0].id, "250");
    }

    #[test]
    fn test_gender_gap_metric_is_female_minus_male() {
        let record = GlobeRecord {
            life_expectancy_female_number: 80.0,
            life_expectancy_male_number: 75.5,
            ..Default::default()
        };
        assert_eq!(record.metric_value(Metric::GenderGap), 4.5);
    }

    #[test]
    fn test_format_population() {
        assert_eq!(format_population(0.0), "N/A");
        assert_eq!(format_population(1_420_000_000.0), "1.42 billion");
        assert_eq!(format_population(67_750_000.0), "67.75 million");
        assert_eq!(format_population(11_300.0), "11.30 thousand");
        assert_eq!(format_population(800.0), "800");
    }
}
