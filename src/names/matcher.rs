//! Heuristic identity matching between raw names.
//!
//! The surname is authoritative; given name and patronymic are compared by
//! initial only, and a missing patronymic never blocks a match. This is
//! best-effort resolution: two different people sharing a surname and
//! initials will match, and heavily misspelled surnames will not.

use super::normalize::{name_parts, normalize};

/// Both keys must be longer than this for the substring fallback.
pub const FUZZY_MIN_LEN: usize = 8;

/// Decide whether two raw names denote the same person.
pub fn matches(a: &str, b: &str) -> bool {
    let key_a = normalize(a);
    let key_b = normalize(b);
    if !key_a.is_empty() && key_a == key_b {
        return true;
    }

    let parts_a = name_parts(a);
    let parts_b = name_parts(b);
    let (Some(surname_a), Some(surname_b)) = (parts_a.first(), parts_b.first()) else {
        return false;
    };
    if normalize(surname_a) != normalize(surname_b) {
        return false;
    }
    if parts_a.len() == 1 && parts_b.len() == 1 {
        return true;
    }

    let first_agree = initials_agree(parts_a.get(1), parts_b.get(1));
    let middle_agree = initials_agree(parts_a.get(2), parts_b.get(2));
    if first_agree && middle_agree {
        return true;
    }

    substring_fallback(&key_a, &key_b)
}

/// Initials disagree only when both parts are present and differ.
fn initials_agree(a: Option<&&str>, b: Option<&&str>) -> bool {
    match (a.and_then(|p| initial(p)), b.and_then(|p| initial(p))) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

fn initial(part: &str) -> Option<char> {
    normalize(part.trim_end_matches('.')).chars().next()
}

fn substring_fallback(key_a: &str, key_b: &str) -> bool {
    key_a.chars().count() > FUZZY_MIN_LEN
        && key_b.chars().count() > FUZZY_MIN_LEN
        && (key_a.contains(key_b) || key_b.contains(key_a))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &[&str] = &[
        "Иванов Иван Петрович",
        "Иванов И.П.",
        "Иванов И. С.",
        "Иванов Игорь",
        "Иванов",
        "Петров Иван",
        "ИвановИванПетрович",
        "Ёлкин Пётр",
        "елкин п",
        "Сидорова Анна Викторовна",
        "Сидорова А.",
    ];

    #[test]
    fn test_full_name_matches_initials() {
        assert!(matches("Иванов Иван Петрович", "Иванов И.П."));
        assert!(matches("Иванов Иван Петрович", "иванов иван"));
        assert!(matches("Ёлкин Пётр", "Елкин П."));
    }

    #[test]
    fn test_surname_gate() {
        assert!(!matches("Иванов Иван", "Петров Иван"));
        assert!(!matches("", "Иванов"));
        assert!(!matches("", ""));
    }

    #[test]
    fn test_initial_mismatch() {
        assert!(!matches("Иванов Иван Петрович", "Иванов С.П."));
        assert!(!matches("Иванов Иван Петрович", "Иванов И.С."));
    }

    #[test]
    fn test_missing_patronymic_does_not_block() {
        assert!(matches("Сидорова Анна Викторовна", "Сидорова А."));
        assert!(matches("Иванов", "Иванов Иван"));
    }

    #[test]
    fn test_substring_fallback() {
        // Patronymic glued to the given name shifts the parts
        assert!(matches("Иванов Иван Петрович", "Иванов ИванПетрович Сергеевич"));
        assert!(!matches("Иванов Иван Петрович", "Иванов Иван Сергеевич"));
        // Short keys never take the fallback
        assert!(!matches("Ли Ан", "Ли Бо"));
    }

    #[test]
    fn test_reflexive_and_symmetric() {
        for a in FIXTURES {
            assert!(matches(a, a), "not reflexive: {a}");
            for b in FIXTURES {
                assert_eq!(matches(a, b), matches(b, a), "not symmetric: {a} / {b}");
            }
        }
    }
}
