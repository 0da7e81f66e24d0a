/// Month-name resolution shared by the progress estimator and the catalog
///
/// Names match on their first three letters, case-insensitive, so
/// "January", "jan" and "JAN" all resolve to 0.
const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Resolve a month name to its 0-based index
pub fn month0_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.trim().chars().take(3).flat_map(char::to_lowercase).collect();
    if prefix.chars().count() < 3 {
        return None;
    }

    MONTH_PREFIXES
        .iter()
        .position(|m| *m == prefix)
        .map(|index| index as u32)
}

/// Short English name for a 0-based month index
pub fn month_name(month0: u32) -> &'static str {
    match month0 {
        0 => "Jan",
        1 => "Feb",
        2 => "Mar",
        3 => "Apr",
        4 => "May",
        5 => "Jun",
        6 => "Jul",
        7 => "Aug",
        8 => "Sep",
        9 => "Oct",
        10 => "Nov",
        11 => "Dec",
        _ => "Unknown",
    }
}
