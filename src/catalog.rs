/// Static metric catalog advertised to the dashboard.
///
/// `/search` answers the dashboard's metric picker from this fixed list,
/// deliberately independent of what is actually in storage. The dashboard
/// side is configured against exactly these two names, so this stays a
/// hardcoded registry rather than a live distinct-query — `/json_api_data`
/// is the path that reports the real distinct sensors.

/// Metric names offered by `/search`, in the order the dashboard expects.
pub static METRIC_CATALOG: &[&str] = &["Temperature", "Humidity"];

/// Returns the advertised metric names as owned strings for JSON encoding.
pub fn advertised_metrics() -> Vec<String> {
    METRIC_CATALOG.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_exactly_temperature_and_humidity() {
        assert_eq!(advertised_metrics(), vec!["Temperature", "Humidity"]);
    }

    #[test]
    fn test_catalog_order_is_stable() {
        // The dashboard picker relies on this exact ordering.
        assert_eq!(METRIC_CATALOG[0], "Temperature");
        assert_eq!(METRIC_CATALOG[1], "Humidity");
    }
}
