//! Country-name normalization
//!
//! The upstream datasets spell some countries differently (the GeoJSON says
//! "United States", the UN tables say "United States of America"). Every
//! country-keyed lookup goes through [`normalize_country`] first.

/// (alias, canonical) pairs. Canonical names map to themselves implicitly.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("United States", "United States of America"),
    ("Russia", "Russian Federation"),
    ("South Korea", "Republic of Korea"),
    ("North Korea", "Democratic People's Republic of Korea"),
    ("Iran", "Iran (Islamic Republic of)"),
    ("Venezuela", "Venezuela (Bolivarian Republic of)"),
    ("Bolivia", "Bolivia (Plurinational State of)"),
    ("Syria", "Syrian Arab Republic"),
    ("Vietnam", "Viet Nam"),
    ("Tanzania", "United Republic of Tanzania"),
    ("Moldova", "Republic of Moldova"),
    ("Laos", "Lao People's Democratic Republic"),
];

/// Resolve an alias to the canonical dataset name; unknown names pass through.
pub fn normalize_country(name: &str) -> &str {
    let trimmed = name.trim();
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(trimmed)
}

/// Whether two spellings refer to the same country.
pub fn same_country(a: &str, b: &str) -> bool {
    normalize_country(a) == normalize_country(b)
}
