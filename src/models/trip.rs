//! Trip request model
//!
//! A [`TripRequest`] holds the four caller-supplied fields exactly as they
//! arrived. [`TripParameters`] is what the prompt is built from, produced
//! either by lenient coercion (every input yields parameters, possibly with
//! `NaN` or `undefined` in them) or by strict validation (malformed input is
//! rejected field by field).

use serde_json::Value;
use std::fmt::Display;

/// Longest accepted trek or location name in strict mode
pub const MAX_TEXT_LEN: usize = 200;

/// Caller-supplied planning request. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripRequest {
    pub trek_id: Option<Value>,
    pub budget: Option<Value>,
    pub trip_days: Option<Value>,
    pub location: Option<Value>,
}

impl TripRequest {
    pub const TREK_ID: &'static str = "trekId";
    pub const BUDGET: &'static str = "budget";
    pub const TRIP_DAYS: &'static str = "tripDays";
    pub const LOCATION: &'static str = "location";

    /// Pick the trip fields out of a decoded JSON body. Non-object bodies yield
    /// a request with every field absent.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        Self {
            trek_id: body.get(Self::TREK_ID).cloned(),
            budget: body.get(Self::BUDGET).cloned(),
            trip_days: body.get(Self::TRIP_DAYS).cloned(),
            location: body.get(Self::LOCATION).cloned(),
        }
    }

    /// Build a request the way the planner form submits it: every field as text
    #[cfg(test)]
    #[must_use]
    pub fn from_form(trek: &str, budget: &str, trip_days: &str, location: &str) -> Self {
        Self {
            trek_id: Some(Value::String(trek.to_string())),
            budget: Some(Value::String(budget.to_string())),
            trip_days: Some(Value::String(trip_days.to_string())),
            location: Some(Value::String(location.to_string())),
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Values interpolated into the planning prompt
#[derive(Debug, Clone, PartialEq)]
pub struct TripParameters {
    pub trek: String,
    pub budget: f64,
    pub trip_days: f64,
    pub location: String,
}

impl TripParameters {
    /// Coerce every field without rejecting anything
    #[must_use]
    pub fn coerce(request: &TripRequest) -> Self {
        Self {
            trek: js_text(request.trek_id.as_ref()),
            budget: js_number(request.budget.as_ref()),
            trip_days: js_number(request.trip_days.as_ref()),
            location: js_text(request.location.as_ref()),
        }
    }

    /// Validate every field, collecting all issues before failing
    pub fn validate(request: &TripRequest, max_trip_days: u32) -> Result<Self, Vec<FieldIssue>> {
        let mut issues = Vec::new();

        let trek = strict_text(TripRequest::TREK_ID, request.trek_id.as_ref(), &mut issues);

        let budget = match strict_number(request.budget.as_ref()) {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
            Ok(_) => {
                issues.push(FieldIssue::new(
                    TripRequest::BUDGET,
                    "must be a finite amount of zero or more",
                ));
                None
            }
            Err(message) => {
                issues.push(FieldIssue::new(TripRequest::BUDGET, message));
                None
            }
        };

        let trip_days = match strict_number(request.trip_days.as_ref()) {
            Ok(days) if days.fract() == 0.0 && days >= 1.0 && days <= f64::from(max_trip_days) => {
                Some(days)
            }
            Ok(_) => {
                issues.push(FieldIssue::new(
                    TripRequest::TRIP_DAYS,
                    format!("must be a whole number between 1 and {max_trip_days}"),
                ));
                None
            }
            Err(message) => {
                issues.push(FieldIssue::new(TripRequest::TRIP_DAYS, message));
                None
            }
        };

        let location = strict_text(TripRequest::LOCATION, request.location.as_ref(), &mut issues);

        match (trek, budget, trip_days, location) {
            (Some(trek), Some(budget), Some(trip_days), Some(location)) if issues.is_empty() => {
                Ok(Self {
                    trek,
                    budget,
                    trip_days,
                    location,
                })
            }
            _ => Err(issues),
        }
    }
}

fn strict_text(
    field: &'static str,
    value: Option<&Value>,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    let message = match value {
        None | Some(Value::Null) => "is required",
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                "is required"
            } else if text.chars().count() > MAX_TEXT_LEN {
                "is too long"
            } else {
                return Some(text.to_string());
            }
        }
        Some(_) => "must be a string",
    };
    issues.push(FieldIssue::new(field, message));
    None
}

fn strict_number(value: Option<&Value>) -> Result<f64, &'static str> {
    match value {
        None | Some(Value::Null) => Err("is required"),
        Some(Value::Number(number)) => number.as_f64().ok_or("must be a number"),
        Some(Value::String(text)) if text.trim().is_empty() => Err("is required"),
        Some(Value::String(text)) => {
            let number = parse_numeric_text(text);
            if number.is_nan() {
                Err("must be a number")
            } else {
                Ok(number)
            }
        }
        Some(_) => Err("must be a number"),
    }
}

/// Numeric coercion with JavaScript `Number()` semantics
#[must_use]
pub fn js_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Null) => 0.0,
        Some(Value::Bool(flag)) => f64::from(u8::from(*flag)),
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => parse_numeric_text(text),
        Some(Value::Array(_) | Value::Object(_)) | None => f64::NAN,
    }
}

/// Text coercion with JavaScript template-literal semantics
#[must_use]
pub fn js_text(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => format_js_number(number.as_f64().unwrap_or(f64::NAN)),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_text(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// Render a number the way JavaScript prints it
#[must_use]
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        // Rust prints `1e21` and `1e-7`, JavaScript `1e+21` and `1e-7`
        let exponential = format!("{value:e}");
        match exponential.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => exponential,
        }
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn parse_numeric_text(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return parse_radix_digits(digits, radix);
        }
    }

    // f64::from_str also takes "inf" and "nan", which Number() does not
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// Digits of a prefixed integer literal; not bounded by any integer width
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("50000"), 50000.0)]
    #[case(json!(" 7 "), 7.0)]
    #[case(json!(""), 0.0)]
    #[case(json!(null), 0.0)]
    #[case(json!(true), 1.0)]
    #[case(json!(12.5), 12.5)]
    #[case(json!("1e3"), 1000.0)]
    #[case(json!("0x1A"), 26.0)]
    #[case(json!(".5"), 0.5)]
    #[case(json!("-Infinity"), f64::NEG_INFINITY)]
    #[case(json!("0xFFFFFFFFFFFFFFFFFF"), 4_722_366_482_869_645_213_695.0)]
    #[case(json!("0b101"), 5.0)]
    fn test_js_number_coercion(#[case] input: Value, #[case] expected: f64) {
        assert_eq!(js_number(Some(&input)), expected);
    }

    #[rstest]
    #[case(Some(json!("seven")))]
    #[case(Some(json!("12abc")))]
    #[case(Some(json!("inf")))]
    #[case(Some(json!("nan")))]
    #[case(Some(json!("0x")))]
    #[case(Some(json!("0x1G")))]
    #[case(Some(json!([7])))]
    #[case(Some(json!({"days": 7})))]
    #[case(None)]
    fn test_js_number_not_a_number(#[case] input: Option<Value>) {
        assert!(js_number(input.as_ref()).is_nan());
    }

    #[rstest]
    #[case(None, "undefined")]
    #[case(Some(json!(null)), "null")]
    #[case(Some(json!("Kedarkantha")), "Kedarkantha")]
    #[case(Some(json!(42)), "42")]
    #[case(Some(json!(false)), "false")]
    #[case(Some(json!(["Delhi", null, 3])), "Delhi,,3")]
    #[case(Some(json!({"city": "Delhi"})), "[object Object]")]
    fn test_js_text_coercion(#[case] input: Option<Value>, #[case] expected: &str) {
        assert_eq!(js_text(input.as_ref()), expected);
    }

    #[rstest]
    #[case(f64::NAN, "NaN")]
    #[case(7.0, "7")]
    #[case(-0.0, "0")]
    #[case(7.5, "7.5")]
    #[case(50000.0, "50000")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(1e20, "100000000000000000000")]
    #[case(1e21, "1e+21")]
    #[case(-2.5e22, "-2.5e+22")]
    #[case(1e-7, "1e-7")]
    #[case(0.000001, "0.000001")]
    fn test_format_js_number(#[case] input: f64, #[case] expected: &str) {
        assert_eq!(format_js_number(input), expected);
    }

    #[test]
    fn test_from_json_distinguishes_null_and_absent() {
        let request = TripRequest::from_json(&json!({ "trekId": null, "budget": 100 }));
        assert_eq!(request.trek_id, Some(Value::Null));
        assert_eq!(request.budget, Some(json!(100)));
        assert_eq!(request.trip_days, None);
        assert_eq!(request.location, None);
    }

    #[test]
    fn test_from_json_non_object_body() {
        let request = TripRequest::from_json(&json!(["Everest Base Camp"]));
        assert_eq!(request, TripRequest::default());
    }

    #[test]
    fn test_coerce_missing_trip_days() {
        let request = TripRequest::from_json(&json!({
            "trekId": "Everest Base Camp",
            "budget": "50000",
            "location": "Delhi"
        }));
        let params = TripParameters::coerce(&request);
        assert_eq!(params.trek, "Everest Base Camp");
        assert_eq!(params.budget, 50000.0);
        assert!(params.trip_days.is_nan());
        assert_eq!(params.location, "Delhi");
    }

    #[test]
    fn test_validate_accepts_form_input() {
        let request = TripRequest::from_form(" Everest Base Camp ", "50000", "7", "Delhi");
        let params = TripParameters::validate(&request, 60).unwrap();
        assert_eq!(params.trek, "Everest Base Camp");
        assert_eq!(params.budget, 50000.0);
        assert_eq!(params.trip_days, 7.0);
        assert_eq!(params.location, "Delhi");
    }

    #[test]
    fn test_validate_accepts_json_numbers() {
        let request = TripRequest::from_json(&json!({
            "trekId": "Hampta Pass",
            "budget": 18000.5,
            "tripDays": 5,
            "location": "Manali"
        }));
        assert!(TripParameters::validate(&request, 60).is_ok());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let request = TripRequest::from_json(&json!({
            "trekId": "  ",
            "budget": "lots",
            "location": 12
        }));
        let issues = TripParameters::validate(&request, 60).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|issue| issue.field).collect();
        assert_eq!(fields, vec!["trekId", "budget", "tripDays", "location"]);
        assert_eq!(issues[0].to_string(), "trekId is required");
        assert_eq!(issues[1].to_string(), "budget must be a number");
        assert_eq!(issues[2].to_string(), "tripDays is required");
        assert_eq!(issues[3].to_string(), "location must be a string");
    }

    #[rstest]
    #[case("0")]
    #[case("2.5")]
    #[case("61")]
    #[case("-3")]
    fn test_validate_rejects_out_of_range_days(#[case] days: &str) {
        let request = TripRequest::from_form("Roopkund", "30000", days, "Dehradun");
        let issues = TripParameters::validate(&request, 60).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "tripDays must be a whole number between 1 and 60"
        );
    }

    #[test]
    fn test_validate_rejects_negative_budget() {
        let request = TripRequest::from_form("Roopkund", "-1", "5", "Dehradun");
        let issues = TripParameters::validate(&request, 60).unwrap_err();
        assert_eq!(issues[0].field, "budget");
    }

    #[test]
    fn test_validate_rejects_overlong_names() {
        let long_name = "a".repeat(MAX_TEXT_LEN + 1);
        let request = TripRequest::from_form(&long_name, "1000", "3", "Delhi");
        let issues = TripParameters::validate(&request, 60).unwrap_err();
        assert_eq!(issues[0].to_string(), "trekId is too long");
    }
}
