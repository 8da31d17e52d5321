//! Yearly GDP per capita (current USD, rounded) for a set of countries.
//!
//! Figures are approximations of the World Bank `NY.GDP.PCAP.CD` series and
//! only serve to give synthetic countries a plausible relative scale.

/// First year covered by [`GDP_PER_CAPITA`].
pub const FIRST_YEAR: i32 = 2010;

/// Last year covered by [`GDP_PER_CAPITA`].
pub const LAST_YEAR: i32 = 2020;

const YEARS: usize = (LAST_YEAR - FIRST_YEAR + 1) as usize;

/// GDP per capita by country, one entry per year from [`FIRST_YEAR`].
pub const GDP_PER_CAPITA: &[(&str, [f64; YEARS])] = &[
    (
        "Netherlands",
        [
            50950.0, 54160.0, 50070.0, 52198.0, 52901.0, 45193.0, 46039.0, 48483.0, 53019.0,
            52331.0, 52163.0,
        ],
    ),
    (
        "Italy",
        [
            36000.0, 38650.0, 35054.0, 35550.0, 35518.0, 30230.0, 30940.0, 32406.0, 34622.0,
            33566.0, 31676.0,
        ],
    ),
    (
        "Romania",
        [
            8213.0, 9104.0, 8522.0, 9550.0, 10031.0, 8969.0, 9548.0, 10808.0, 12399.0, 12914.0,
            12896.0,
        ],
    ),
    (
        "Belgium",
        [
            44380.0, 47350.0, 44670.0, 46758.0, 47700.0, 41008.0, 42012.0, 44198.0, 47545.0,
            46421.0, 45189.0,
        ],
    ),
    (
        "Germany",
        [
            41532.0, 46645.0, 43858.0, 46286.0, 48024.0, 41103.0, 42136.0, 44652.0, 47939.0,
            46795.0, 46208.0,
        ],
    ),
    (
        "France",
        [
            40638.0, 43791.0, 40875.0, 42603.0, 43068.0, 36653.0, 37063.0, 38781.0, 41593.0,
            40494.0, 39037.0,
        ],
    ),
    (
        "Spain",
        [
            30532.0, 31678.0, 28324.0, 29077.0, 29513.0, 25732.0, 26506.0, 28186.0, 30380.0,
            29600.0, 27063.0,
        ],
    ),
];

/// GDP per capita of `country` in `year`, if covered.
///
/// Country names match case-insensitively.
pub fn gdp_per_capita(country: &str, year: i32) -> Option<f64> {
    if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
        return None;
    }
    GDP_PER_CAPITA
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .map(|(_, values)| values[(year - FIRST_YEAR) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gdp_lookup() {
        assert_eq!(gdp_per_capita("Netherlands", 2015), Some(45193.0));
        assert_eq!(gdp_per_capita("italy", 2020), Some(31676.0));
        assert_eq!(gdp_per_capita("Netherlands", 2009), None);
        assert_eq!(gdp_per_capita("Atlantis", 2015), None);
    }
}
