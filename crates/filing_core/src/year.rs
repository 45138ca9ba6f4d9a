/// Returns true when a result row's year cell refers to `target_year`.
///
/// Matching is substring-based so cells such as `"2024 Plan Year"` or
/// `"2024-01-01"` still qualify.
pub fn year_matches(cell_text: &str, target_year: &str) -> bool {
    let target = target_year.trim();
    !target.is_empty() && cell_text.trim().contains(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_match_tolerates_formatting() {
        assert!(year_matches("2024 Plan Year", "2024"));
        assert!(year_matches("  2024 ", "2024"));
        assert!(!year_matches("2023", "2024"));
    }

    #[test]
    fn empty_target_never_matches() {
        assert!(!year_matches("2024", ""));
        assert!(!year_matches("2024", "   "));
    }
}
