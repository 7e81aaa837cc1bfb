use super::definitions::{self, UnitRef};
use super::{CompositeUnit, UnitError, UnitFactor};

/// Parse a unit expression such as `km`, `m^2`, `m²`, `km/h`, `kg*m/s^2`,
/// `N·m`, `1/s` or `sq ft`.
///
/// `/` divides everything after it up to the next `/` or `*`, so `kg/m/s^2`
/// reads as kg per metre per second squared.
pub fn parse_unit(text: &str) -> Result<CompositeUnit, UnitError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UnitError::InvalidUnit(text.to_string()));
    }

    let mut factors = Vec::new();
    let mut chars = text.chars().peekable();
    let mut sign = 1;
    let mut pending_power = 1;
    let mut expect_term = true;

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '*' | '·' | '×' => {
                if expect_term {
                    return Err(UnitError::InvalidUnit(text.to_string()));
                }
                chars.next();
                sign = 1;
                expect_term = true;
            }
            '/' => {
                if expect_term && factors.is_empty() {
                    return Err(UnitError::InvalidUnit(text.to_string()));
                }
                chars.next();
                sign = -1;
                expect_term = true;
            }
            '1' if factors.is_empty() && expect_term => {
                // "1/s" numerator
                chars.next();
                match chars.peek() {
                    Some(' ') | Some('/') => {}
                    _ => return Err(UnitError::InvalidUnit(text.to_string())),
                }
                expect_term = false;
                factors.push(None);
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphabetic() || matches!(c, '_' | '°' | 'µ' | 'Ω' | '℃' | '℉') {
                        atom.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if atom.is_empty() {
                    return Err(UnitError::InvalidUnit(text.to_string()));
                }

                let lower = atom.to_lowercase();
                if matches!(lower.as_str(), "sq" | "square") {
                    pending_power = 2;
                    continue;
                }
                if matches!(lower.as_str(), "cu" | "cubic") {
                    pending_power = 3;
                    continue;
                }

                let unit = resolve(&atom)?;
                let exponent = read_exponent(&mut chars, text)? * pending_power;
                pending_power = 1;
                factors.push(Some(UnitFactor {
                    unit,
                    exponent: exponent * sign,
                }));
                expect_term = false;
            }
        }
    }

    if expect_term || pending_power != 1 {
        return Err(UnitError::InvalidUnit(text.to_string()));
    }
    let unit = CompositeUnit::from_factors(factors.into_iter().flatten());
    if unit.is_empty() {
        return Err(UnitError::InvalidUnit(text.to_string()));
    }
    Ok(unit)
}

fn resolve(atom: &str) -> Result<UnitRef, UnitError> {
    definitions::lookup(atom).ok_or_else(|| UnitError::UnknownUnit {
        unit: atom.to_string(),
        suggestion: definitions::suggest(atom).map(|s| format!("Did you mean '{}'?", s)),
    })
}

fn read_exponent(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    text: &str,
) -> Result<i32, UnitError> {
    match chars.peek() {
        Some('²') => {
            chars.next();
            Ok(2)
        }
        Some('³') => {
            chars.next();
            Ok(3)
        }
        Some('^') => {
            chars.next();
            let mut digits = String::new();
            if chars.peek() == Some(&'-') {
                digits.push('-');
                chars.next();
            }
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            digits
                .parse::<i32>()
                .ok()
                .filter(|e| *e != 0)
                .ok_or_else(|| UnitError::InvalidUnit(text.to_string()))
        }
        _ => Ok(1),
    }
}
