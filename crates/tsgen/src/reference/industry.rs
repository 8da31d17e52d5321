//! Monthly euro-area industrial production index (2015 = 100, not seasonally
//! adjusted), approximated from the ECB `STS.M.I8.Y.PROD.NS0020` series.

/// Index values by year, January first. The last year may be partial.
pub const EU_INDUSTRY_INDEX: &[(i32, &[f64])] = &[
    (
        2015,
        &[96.4, 98.2, 108.1, 101.0, 98.6, 105.5, 103.1, 82.6, 104.3, 105.8, 102.9, 93.5],
    ),
    (
        2016,
        &[96.9, 100.8, 106.7, 102.9, 100.4, 106.8, 98.4, 87.6, 106.2, 104.2, 106.1, 95.3],
    ),
    (
        2017,
        &[98.8, 100.2, 112.1, 100.9, 107.4, 109.6, 103.0, 90.2, 107.6, 109.9, 110.4, 97.0],
    ),
    (
        2018,
        &[105.9, 103.1, 111.8, 105.2, 108.4, 111.0, 106.9, 90.0, 105.8, 113.4, 110.9, 94.8],
    ),
    (
        2019,
        &[104.4, 103.6, 111.7, 105.5, 109.9, 104.6, 108.6, 87.9, 106.3, 112.4, 106.4, 95.7],
    ),
    (2020, &[101.0, 103.6, 98.2, 76.1, 84.2, 98.6, 101.4, 82.7, 105.6, 107.3]),
];

/// Index value for `year`/`month` (1-based), if covered.
pub fn industry_index(year: i32, month: u32) -> Option<f64> {
    let month = usize::try_from(month).ok()?.checked_sub(1)?;
    EU_INDUSTRY_INDEX
        .iter()
        .find(|(y, _)| *y == year)
        .and_then(|(_, values)| values.get(month).copied())
}
