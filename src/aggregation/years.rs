//! Year range resolution

/// Resolve which year labels one aggregation call walks
///
/// - aggregation disabled: exactly `selected`
/// - enabled with an explicit list: that list, as given
/// - enabled otherwise: `selected`, then up to `depth` earlier years from the
///   sorted `available` list, stopping at the earliest one
pub fn resolve_years<'a, I>(
    available: I,
    selected: &str,
    explicit: &[String],
    aggregation_enabled: bool,
    depth: usize,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if !aggregation_enabled {
        return vec![selected.to_string()];
    }
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    let mut sorted: Vec<&str> = available.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut years = vec![selected.to_string()];
    if let Some(index) = sorted.iter().position(|year| *year == selected) {
        years.extend(
            sorted[..index]
                .iter()
                .rev()
                .take(depth)
                .map(|year| year.to_string()),
        );
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    const AVAILABLE: [&str; 5] = ["2020", "2021", "2022", "2023", "2024"];

    #[test]
    fn test_disabled_uses_selected_only() {
        let years = resolve_years(AVAILABLE, "2023", &["2020".to_string()], false, 3);
        assert_eq!(years, vec!["2023"]);
    }

    #[test]
    fn test_explicit_list_wins() {
        let explicit = vec!["2021".to_string(), "2024".to_string()];
        assert_eq!(resolve_years(AVAILABLE, "2023", &explicit, true, 3), explicit);
    }

    #[test]
    fn test_depth_walks_backward_and_stops_at_earliest() {
        assert_eq!(
            resolve_years(AVAILABLE, "2023", &[], true, 2),
            vec!["2023", "2022", "2021"]
        );
        assert_eq!(
            resolve_years(AVAILABLE, "2021", &[], true, 4),
            vec!["2021", "2020"]
        );
    }

    #[test]
    fn test_unknown_year_has_no_history() {
        assert_eq!(resolve_years(AVAILABLE, "2030", &[], true, 2), vec!["2030"]);
    }
}
