/// Formats a percentage the way the chart prints values: shortest decimal
/// form, with an explicit `+` for positive values when `signed`.
pub fn format_percent(value: f64, signed: bool) -> String {
    let sign = if signed && value > 0.0 { "+" } else { "" };
    format!("{sign}{value}%")
}

/// Tick label for an axis value. Rounds to whole percent unless the tick
/// carries a fraction.
pub fn tick_label(value: f32) -> String {
    if value.fract().abs() < f32::EPSILON {
        format!("{value:.0}%")
    } else {
        format!("{value:.1}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_uses_shortest_form() {
        assert_eq!(format_percent(30.0, false), "30%");
        assert_eq!(format_percent(12.5, false), "12.5%");
        assert_eq!(format_percent(-4.0, false), "-4%");
    }

    #[test]
    fn signed_percent_marks_positive_values() {
        assert_eq!(format_percent(4.0, true), "+4%");
        assert_eq!(format_percent(-4.0, true), "-4%");
        assert_eq!(format_percent(0.0, true), "0%");
    }

    #[test]
    fn tick_labels() {
        assert_eq!(tick_label(-15.0), "-15%");
        assert_eq!(tick_label(0.0), "0%");
        assert_eq!(tick_label(2.5), "2.5%");
    }
}
