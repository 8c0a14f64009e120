//! Small numeric helpers shared by the views: extents, quantiles, and
//! sequential color ramps.

/// (min, max) of the finite values, or `None` when there are none.
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Linear-interpolated quantile of an ascending slice (`p` in `0..=1`).
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let i = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lo = i.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (i - lo as f64))
        }
    }
}

pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.into_iter().filter(|x| x.is_finite()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Bubble radius scale: area proportional to value.
pub fn sqrt_radius(value: f64, max_value: f64, max_radius: f64) -> f64 {
    if max_value <= 0.0 || value <= 0.0 {
        return 2.0;
    }
    (value / max_value).sqrt() * (max_radius - 2.0) + 2.0
}

// ============================================================================
// Color
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').filter(|h| h.is_ascii())?;
        let expand = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Rgb(expand(&hex[0..2])?, expand(&hex[2..4])?, expand(&hex[4..6])?)),
            3 => {
                let c = |i: usize| expand(&hex[i..i + 1].repeat(2));
                Some(Rgb(c(0)?, c(1)?, c(2)?))
            }
            _ => None,
        }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Color stops of a named scheme, low to high.
fn scheme_stops(scheme: &str) -> &'static [&'static str] {
    match scheme {
        "Reds" => &["#fff5f0", "#fb6a4a", "#67000d"],
        "Blues" => &["#f7fbff", "#6baed6", "#08306b"],
        "Greens" => &["#f7fcf5", "#74c476", "#00441b"],
        "Purples" => &["#fcfbfd", "#9e9ac8", "#3f007d"],
        "Oranges" => &["#fff5eb", "#fd8d3c", "#7f2704"],
        "YlOrRd" => &["#ffffcc", "#fd8d3c", "#800026"],
        "PiYG" => &["#8e0152", "#f7f7f7", "#276419"],
        "RdBu" => &["#67001f", "#f7f7f7", "#053061"],
        "Viridis" => &["#440154", "#3b528b", "#21918c", "#5ec962", "#fde725"],
        _ => &["#f0f0f0", "#636363"],
    }
}

/// Sample a scheme at `t` in `0..=1`.
pub fn interpolate(scheme: &str, t: f64) -> String {
    let stops: Vec<Rgb> = scheme_stops(scheme).iter().filter_map(|s| Rgb::parse(s)).collect();
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = stops.len().saturating_sub(1).max(1);
    let pos = t * segments as f64;
    let i = (pos.floor() as usize).min(segments - 1);
    match (stops.get(i), stops.get(i + 1)) {
        (Some(a), Some(b)) => a.lerp(*b, pos - i as f64).hex(),
        (Some(a), None) => a.hex(),
        _ => "#cccccc".to_string(),
    }
}

/// Ten-color categorical palette for country lines.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22",
    "#17becf",
];

/// Country line colors used when countries are added to a regional chart.
pub const COUNTRY_COLORS: [&str; 8] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#a65628", "#f781bf", "#999999",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_matches_linear_interpolation() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_extent_skips_non_finite() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(extent(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate("Reds", 0.0), "#fff5f0");
        assert_eq!(interpolate("Reds", 1.0), "#67000d");
        assert_eq!(interpolate("RdBu", 0.5), "#f7f7f7");
    }

    #[test]
    fn test_rgb_parse() {
        assert_eq!(Rgb::parse("#333"), Some(Rgb(0x33, 0x33, 0x33)));
        assert_eq!(Rgb::parse("#e41a1c"), Some(Rgb(0xe4, 0x1a, 0x1c)));
        assert_eq!(Rgb::parse("e41a1c"), None);
    }
}
