use chrono::NaiveDate;

/// Format a Pakistani contact number for display.
/// Local mobiles become `0300-1234567`, international ones `+92 300 1234567`.
pub fn format_contact(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        11 if digits.starts_with('0') => format!("{}-{}", &digits[0..4], &digits[4..11]),
        12 if digits.starts_with("92") => format!(
            "+92 {} {}",
            &digits[2..5],
            &digits[5..12]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Format a rupee amount with thousands separators, rounded to whole rupees.
pub fn format_pkr(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-Rs {}", grouped)
    } else {
        format!("Rs {}", grouped)
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional date, returning the fallback if None
pub fn format_date(date: Option<NaiveDate>, fallback: &str) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
