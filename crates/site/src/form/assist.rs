/// Reformats a telephone entry as the user types.
///
/// Non-digits are dropped. Once ten or more digits are present the number is
/// hyphenated: Tokyo/Osaka numbers (`03`/`06`) as `2-4-4`, everything else as
/// `3-4-4` when eleven digits are available. Digits past the pattern are kept
/// as a trailing run.
pub fn format_phone_input(raw: &str) -> String {
    let digits = raw
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    if digits.len() < 10 {
        return digits;
    }

    let area_len = if digits.starts_with("03") || digits.starts_with("06") {
        2
    } else {
        3
    };
    let pattern_len = area_len + 8;
    if digits.len() < pattern_len {
        return digits;
    }

    let (area, rest) = digits.split_at(area_len);
    let (exchange, rest) = rest.split_at(4);
    let (line, tail) = rest.split_at(4);
    format!("{area}-{exchange}-{line}{tail}")
}
