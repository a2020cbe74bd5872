/// Formats a number with comma thousands separators, e.g. `50247` -> `"50,247"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_stat(prefix: &str, value: u64, suffix: &str) -> String {
    format!("{}{}{}", prefix, group_thousands(value), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits_in_threes() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(50_247), "50,247");
        assert_eq!(group_thousands(3_200_000), "3,200,000");
    }

    #[test]
    fn wraps_value_with_prefix_and_suffix() {
        assert_eq!(format_stat("", 280, "+"), "280+");
        assert_eq!(format_stat("$", 1_200_000, ""), "$1,200,000");
    }
}
