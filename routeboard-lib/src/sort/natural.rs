use std::{cmp::Ordering, iter::Peekable, str::Chars};

/// Compare two codes the way a person would: runs of digits compare by numeric value and
/// everything else compares case-insensitively. `"KL-2"` sorts before `"kl-10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ordering = compare_numbers(&take_digits(&mut left), &take_digits(&mut right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

/// Compare digit runs of any length without parsing them into a fixed width integer.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');

    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "7" before "007"
        .then_with(|| a.len().cmp(&b.len()))
}

/// Turn raw user input for a position into a custom order.
///
/// Blank or non-numeric input yields `None`, meaning the row is placed automatically. A leading
/// integer followed by other characters is accepted, so `"12th"` is 12.
pub fn parse_custom_order(input: &str) -> Option<i64> {
    let trimmed = input.trim();

    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(idx, _)| idx);

    rest.get(..end)
        .filter(|digits| !digits.is_empty())
        .and_then(|digits| digits.parse::<i64>().ok())
        .map(|value| sign * value)
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use super::{natural_cmp, parse_custom_order};

    #[test]
    fn test_numeric_runs() {
        assert_eq!(natural_cmp("KL-2", "KL-10"), Ordering::Less);
        assert_eq!(natural_cmp("113", "99"), Ordering::Greater);
        assert_eq!(natural_cmp("a100000000000000000000", "a99"), Ordering::Greater);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(natural_cmp("abc", "ABC"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "B"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("KL", "KL-1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(natural_cmp("007", "7"), Ordering::Greater);
        assert_eq!(natural_cmp("007", "8"), Ordering::Less);
    }

    #[test]
    fn test_sort_codes() {
        let mut codes = vec!["b10", "B2", "a", "b1"];
        codes.sort_by(|a, b| natural_cmp(a, b));

        assert_eq!(codes, vec!["a", "b1", "B2", "b10"]);
    }

    #[test]
    fn test_parse_custom_order() {
        assert_eq!(parse_custom_order("3"), Some(3));
        assert_eq!(parse_custom_order(" 42 "), Some(42));
        assert_eq!(parse_custom_order("12th"), Some(12));
        assert_eq!(parse_custom_order("-4"), Some(-4));
        assert_eq!(parse_custom_order(""), None);
        assert_eq!(parse_custom_order("abc"), None);
        assert_eq!(parse_custom_order("-"), None);
        assert_eq!(parse_custom_order("99999999999999999999999"), None);
    }
}
