use serde_json::Value;

/// Property values as shown to the user: strings unquoted, whole numbers without a fraction.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() => format_weight(float),
            _ => number.to_string(),
        },
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

pub fn format_weight(weight: f64) -> String {
    if weight.fract().abs() < f64::EPSILON && weight.abs() < 1e15 {
        format!("{weight:.0}")
    } else {
        let text = format!("{weight:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut shortened = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn values_format_for_display() {
        assert_eq!(format_value(&json!("BRCA1")), "BRCA1");
        assert_eq!(format_value(&json!(3)), "3");
        assert_eq!(format_value(&json!(2.0)), "2");
        assert_eq!(format_value(&json!(0.125)), "0.125");
        assert_eq!(format_value(&json!(["a", 1])), "a, 1");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn weights_drop_trailing_zeros() {
        assert_eq!(format_weight(1.0), "1");
        assert_eq!(format_weight(0.5), "0.5");
        assert_eq!(format_weight(0.33333), "0.333");
    }

    #[test]
    fn labels_are_truncated_by_characters() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("tumour suppressor", 8), "tumour …");
        assert_eq!(truncate_label("ééééé", 3), "éé…");
    }
}
