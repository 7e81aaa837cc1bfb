//! Textual substitution of known values into a solved expression

/// Replace whole-word occurrences of each name with its value text
///
/// Matching is case-insensitive, longest name first, and happens in a
/// single pass so replacement text is never matched again.
pub fn substitute(text: &str, values: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = values.iter().filter(|(name, _)| !name.is_empty()).collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut previous: Option<char> = None;
    while i < text.len() {
        let at_boundary = !previous.is_some_and(is_name_char);
        let matched = at_boundary
            .then(|| ordered.iter().find(|(name, _)| matches_at(text, i, name)))
            .flatten();
        match matched {
            Some((name, value)) => {
                out.push_str(&operand_text(value));
                i += name.len();
                previous = name.chars().next_back();
            }
            None => {
                let Some(c) = text[i..].chars().next() else { break };
                out.push(c);
                i += c.len_utf8();
                previous = Some(c);
            }
        }
    }
    out
}

fn matches_at(text: &str, at: usize, name: &str) -> bool {
    let Some(candidate) = text.get(at..at + name.len()) else {
        return false;
    };
    if !candidate.eq_ignore_ascii_case(name) {
        return false;
    }
    !text[at + name.len()..].chars().next().is_some_and(is_name_char)
}

/// Value text safe to drop next to an operator
fn operand_text(value: &str) -> String {
    if value.starts_with('-') || value.contains(' ') || value.contains('/') {
        format!("({})", value)
    } else {
        value.to_string()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect()
    }

    #[test]
    fn longest_name_first_on_word_boundaries() {
        let known = values(&[("a", "2"), ("ab", "7")]);
        assert_eq!(substitute("ab + a * bab", &known), "7 + 2 * bab");
    }

    #[test]
    fn wraps_compound_values() {
        let known = values(&[("b", "-3"), ("d", "5 m")]);
        assert_eq!(substitute("(y - b) / d", &known), "(y - (-3)) / (5 m)");
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        let known = values(&[("w", "5 m"), ("m", "3")]);
        assert_eq!(substitute("w * m", &known), "(5 m) * 3");
    }

    #[test]
    fn phrases_and_case() {
        let known = values(&[("unit price", "$4")]);
        assert_eq!(substitute("Unit Price * qty", &known), "$4 * qty");
    }
}
