//! Human-friendly durations such as `30m`, `12h`, `1d`.

/// Parse an interval into seconds. Bare numbers are seconds.
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = match s.char_indices().last() {
        Some((at, 'd')) => (&s[..at], 86_400),
        Some((at, 'h')) => (&s[..at], 3_600),
        Some((at, 'm')) => (&s[..at], 60),
        Some((at, 's')) => (&s[..at], 1),
        Some(_) => (s.as_str(), 1),
        None => return Err("Empty interval".to_string()),
    };

    digits
        .trim()
        .parse::<u64>()
        .map(|n| n * unit)
        .map_err(|_| format!("Invalid interval: {}. Use a form like '30m', '12h', '1d'", s))
}

/// Largest whole unit that divides `secs` exactly.
pub fn format_interval(secs: u64) -> String {
    if secs >= 86_400 && secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 && secs % 3_600 == 0 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
