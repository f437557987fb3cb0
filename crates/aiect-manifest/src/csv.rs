//! Minimal CSV field splitting for manifest rows.

/// Split a manifest row into fields.
///
/// A double quote toggles quoted mode and is dropped from the field. Commas
/// inside quotes are kept. No escape sequences are recognized.
#[must_use]
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quote = false;

    for c in line.chars() {
        match c {
            '"' => in_quote = !in_quote,
            ',' if !in_quote => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Parse a comma-separated list of line numbers.
///
/// Empty tokens are ignored. Returns the parsed numbers and the tokens that
/// failed to parse, both in input order.
#[must_use]
pub fn parse_line_numbers(list: &str) -> (Vec<u32>, Vec<&str>) {
    let mut numbers = Vec::new();
    let mut rejected = Vec::new();

    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<u32>() {
            Ok(n) => numbers.push(n),
            Err(_) => rejected.push(token),
        }
    }
    (numbers, rejected)
}
