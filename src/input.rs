//! Parse-or-default normalisation of raw request values.
//!
//! Numbers arrive from the host UI as JSON numbers, numeric strings, `null`,
//! or not at all. They are coerced here, once, before anything in
//! [`crate::calc`] sees them: unusable values become 0, marks clamp to
//! 0..=100, credits clamp to 0..=[`MAX_CREDITS`] and CGPA clamps to 0..=4.

use crate::calc::{
    CalcError, CourseRecord, CumulativeState, GradeBand, GradeScale, SemesterSummary,
    MAX_CREDITS, MAX_GRADE_POINT, MAX_MARKS,
};
use serde_json::Value;

pub const MAX_ROWS: usize = 64;

pub fn number_or_zero(raw: Option<&Value>) -> f64 {
    let n = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn marks_or_zero(raw: Option<&Value>) -> f64 {
    number_or_zero(raw).clamp(0.0, MAX_MARKS)
}

pub fn credits_or_zero(raw: Option<&Value>) -> f64 {
    number_or_zero(raw).clamp(0.0, MAX_CREDITS)
}

pub fn grade_point_or_zero(raw: Option<&Value>) -> f64 {
    number_or_zero(raw).clamp(0.0, MAX_GRADE_POINT)
}

fn first_present<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

/// Reads one course row. Missing names fall back to `"{label} {n}"`, with `n`
/// counting from 1, the way the form labels unnamed rows.
pub fn parse_course_row(raw: &Value, index: usize, label: &str) -> Result<CourseRecord, CalcError> {
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::new(
            "bad_params",
            format!("rows[{}] must be an object", index),
        ));
    };

    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", label, index + 1));

    Ok(CourseRecord {
        name,
        marks_percent: marks_or_zero(first_present(obj, &["marks", "marksPercent"])),
        credit_hours: credits_or_zero(first_present(obj, &["creditHours", "credits"])),
    })
}

pub fn parse_course_rows(raw: Option<&Value>, label: &str) -> Result<Vec<CourseRecord>, CalcError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.is_null() {
        return Ok(Vec::new());
    }
    let Some(items) = raw.as_array() else {
        return Err(CalcError::new("bad_params", "rows must be an array"));
    };
    if items.len() > MAX_ROWS {
        return Err(CalcError::new(
            "bad_params",
            format!("at most {} rows are allowed", MAX_ROWS),
        ));
    }
    items
        .iter()
        .enumerate()
        .map(|(i, v)| parse_course_row(v, i, label))
        .collect()
}

/// A missing or `null` history is the empty history.
pub fn parse_cumulative(raw: Option<&Value>, key: &str) -> Result<CumulativeState, CalcError> {
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return Ok(CumulativeState::default());
    };
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::new(
            "bad_params",
            format!("{} must be an object", key),
        ));
    };
    Ok(CumulativeState {
        cgpa: grade_point_or_zero(first_present(obj, &["cgpa"])),
        total_credits: credits_or_zero(first_present(obj, &["totalCredits"])),
    })
}

pub fn parse_optional_cumulative(
    raw: Option<&Value>,
    key: &str,
) -> Result<Option<CumulativeState>, CalcError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(_) => parse_cumulative(raw, key).map(Some),
    }
}

pub fn parse_semester_summary(raw: Option<&Value>, key: &str) -> Result<SemesterSummary, CalcError> {
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return Ok(SemesterSummary::default());
    };
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::new(
            "bad_params",
            format!("{} must be an object", key),
        ));
    };
    Ok(SemesterSummary {
        gpa: grade_point_or_zero(first_present(obj, &["gpa"])),
        total_credits: credits_or_zero(first_present(obj, &["totalCredits"])),
    })
}

/// Scale definitions are configuration, not user marks: malformed bands are
/// rejected rather than coerced.
pub fn parse_scale(raw: &Value, fallback_name: &str) -> Result<GradeScale, CalcError> {
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::new("bad_scale", "scale must be an object"));
    };
    let name = match obj.get("name") {
        None | Some(Value::Null) => fallback_name.to_string(),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(CalcError::new("bad_scale", "scale.name must be string"));
            };
            let t = s.trim();
            if t.is_empty() || t.len() > 64 {
                return Err(CalcError::new(
                    "bad_scale",
                    "scale.name must be 1..=64 characters",
                ));
            }
            t.to_string()
        }
    };
    let Some(raw_bands) = obj.get("bands").and_then(|v| v.as_array()) else {
        return Err(CalcError::new("bad_scale", "scale.bands must be an array"));
    };

    let mut bands = Vec::with_capacity(raw_bands.len());
    for (i, b) in raw_bands.iter().enumerate() {
        let min_marks = b.get("minMarks").and_then(|v| v.as_f64());
        let grade_point = b.get("gradePoint").and_then(|v| v.as_f64());
        let (Some(min_marks), Some(grade_point)) = (min_marks, grade_point) else {
            return Err(CalcError::new(
                "bad_scale",
                format!("bands[{}] needs numeric minMarks and gradePoint", i),
            ));
        };
        bands.push(GradeBand {
            min_marks,
            grade_point,
        });
    }
    GradeScale::new(name, bands)
}
