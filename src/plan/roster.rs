//! Roster cell parsing.

use std::sync::LazyLock;

use regex::Regex;

static ROSTER_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;\n/]+").expect("valid roster separator regex"));

/// Split a roster cell ("Name1, Name2/Name3") into names.
///
/// Names are trimmed; fragments of one character or less are dropped.
pub fn split_roster(cell: &str) -> Vec<String> {
    ROSTER_SEPARATOR
        .split(cell)
        .map(str::trim)
        .filter(|name| name.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_roster() {
        assert_eq!(
            split_roster("Иванов И.П., Петров;Сидоров\nКозлов / Орлов"),
            vec!["Иванов И.П.", "Петров", "Сидоров", "Козлов", "Орлов"]
        );
    }

    #[test]
    fn test_split_roster_drops_fragments() {
        assert_eq!(split_roster(" , А,, ;"), Vec::<String>::new());
        assert!(split_roster("").is_empty());
    }
}
