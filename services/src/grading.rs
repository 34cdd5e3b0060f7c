//! Pure marking rules shared by the assessment and exam submission paths.

/// Parses a persisted comma-separated option-id list. Malformed fragments
/// are dropped rather than failing the whole answer.
pub fn parse_selected(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

pub fn serialize_selected(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// A question is correct only when the selected option ids match the
/// correct option ids exactly, order ignored. Subsets and supersets of the
/// correct set score nothing.
pub fn is_answer_correct(selected: &[i64], correct: &[i64]) -> bool {
    if selected.len() != correct.len() || correct.is_empty() {
        return false;
    }
    let mut selected = selected.to_vec();
    let mut correct = correct.to_vec();
    selected.sort_unstable();
    selected.dedup();
    correct.sort_unstable();
    correct.dedup();
    selected == correct
}

/// Marks awarded after penalties, never negative.
pub fn obtained_mark(total: i64, negative: i64) -> i64 {
    (total - negative).max(0)
}

pub fn percentage(obtained: i64, maximum: i64) -> f64 {
    if maximum <= 0 {
        return 0.0;
    }
    obtained as f64 * 100.0 / maximum as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_correct_regardless_of_order() {
        assert!(is_answer_correct(&[3, 1], &[1, 3]));
        assert!(is_answer_correct(&[7], &[7]));
    }

    #[test]
    fn subset_and_superset_score_nothing() {
        assert!(!is_answer_correct(&[1], &[1, 3]));
        assert!(!is_answer_correct(&[1, 3, 5], &[1, 3]));
        assert!(!is_answer_correct(&[2], &[1]));
    }

    #[test]
    fn empty_selection_is_never_correct() {
        assert!(!is_answer_correct(&[], &[1]));
        assert!(!is_answer_correct(&[], &[]));
    }

    #[test]
    fn obtained_is_floored_at_zero() {
        assert_eq!(obtained_mark(10, 4), 6);
        assert_eq!(obtained_mark(2, 5), 0);
        assert_eq!(obtained_mark(0, 0), 0);
    }

    #[test]
    fn selected_ids_round_trip_through_storage_format() {
        let ids = vec![4, 2, 9];
        assert_eq!(parse_selected(&serialize_selected(&ids)), ids);
        assert_eq!(parse_selected(""), Vec::<i64>::new());
        assert_eq!(parse_selected("3, x,5"), vec![3, 5]);
    }

    #[test]
    fn percentage_handles_zero_maximum() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(20, 50), 40.0);
    }
}
