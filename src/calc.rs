use serde::Serialize;
use std::cmp::Ordering;

pub const MAX_GRADE_POINT: f64 = 4.0;
pub const MAX_MARKS: f64 = 100.0;
/// Ceiling for any single credit figure, per course or for a prior history.
pub const MAX_CREDITS: f64 = 1000.0;
const MAX_SCALE_BANDS: usize = 32;

/// Half-up rounding to two decimals for displayed figures:
/// `Int(100*x + 0.5) / 100`.
pub fn round_off_2_decimal(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CalcError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Letter {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Letter {
    pub fn as_str(self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::AMinus => "A-",
            Letter::BPlus => "B+",
            Letter::B => "B",
            Letter::BMinus => "B-",
            Letter::CPlus => "C+",
            Letter::C => "C",
            Letter::D => "D",
            Letter::F => "F",
        }
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBand {
    pub min_marks: f64,
    pub grade_point: f64,
}

impl GradeBand {
    const fn new(min_marks: f64, grade_point: f64) -> Self {
        Self {
            min_marks,
            grade_point,
        }
    }
}

const STANDARD_BANDS: [GradeBand; 9] = [
    GradeBand::new(85.0, 4.0),
    GradeBand::new(80.0, 3.7),
    GradeBand::new(75.0, 3.3),
    GradeBand::new(70.0, 3.0),
    GradeBand::new(65.0, 2.7),
    GradeBand::new(61.0, 2.3),
    GradeBand::new(58.0, 2.0),
    GradeBand::new(55.0, 1.7),
    GradeBand::new(50.0, 1.0),
];

const STRICT_BANDS: [GradeBand; 9] = [
    GradeBand::new(90.0, 4.0),
    GradeBand::new(85.0, 3.7),
    GradeBand::new(80.0, 3.3),
    GradeBand::new(75.0, 3.0),
    GradeBand::new(70.0, 2.7),
    GradeBand::new(65.0, 2.3),
    GradeBand::new(60.0, 2.0),
    GradeBand::new(55.0, 1.7),
    GradeBand::new(50.0, 1.0),
];

pub const BUILTIN_SCALES: [&str; 2] = ["standard", "strict"];

/// Marks→grade-point step table. Bands are held in descending `min_marks`
/// order; marks below the last band map to 0.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeScale {
    name: String,
    bands: Vec<GradeBand>,
}

impl GradeScale {
    pub fn new(name: impl Into<String>, mut bands: Vec<GradeBand>) -> Result<Self, CalcError> {
        let name = name.into();
        if bands.is_empty() {
            return Err(CalcError::new("bad_scale", "scale needs at least one band"));
        }
        if bands.len() > MAX_SCALE_BANDS {
            return Err(CalcError::new(
                "bad_scale",
                format!("scale may have at most {} bands", MAX_SCALE_BANDS),
            ));
        }
        for (i, b) in bands.iter().enumerate() {
            if !b.min_marks.is_finite() || !(0.0..=MAX_MARKS).contains(&b.min_marks) {
                return Err(CalcError::new(
                    "bad_scale",
                    format!("bands[{}].minMarks must be within 0..=100", i),
                ));
            }
            if !b.grade_point.is_finite() || !(0.0..=MAX_GRADE_POINT).contains(&b.grade_point) {
                return Err(CalcError::new(
                    "bad_scale",
                    format!("bands[{}].gradePoint must be within 0..=4", i),
                ));
            }
        }

        bands.sort_by(|a, b| {
            b.min_marks
                .partial_cmp(&a.min_marks)
                .unwrap_or(Ordering::Equal)
        });
        for pair in bands.windows(2) {
            let (hi, lo) = (pair[0], pair[1]);
            if hi.min_marks == lo.min_marks {
                return Err(CalcError::new(
                    "bad_scale",
                    format!("duplicate threshold {}", hi.min_marks),
                )
                .with_details(serde_json::json!({ "minMarks": hi.min_marks })));
            }
            if hi.grade_point < lo.grade_point {
                return Err(CalcError::new(
                    "bad_scale",
                    "grade points must not increase as thresholds decrease",
                )
                .with_details(serde_json::json!({
                    "higher": hi,
                    "lower": lo
                })));
            }
        }

        Ok(Self { name, bands })
    }

    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            bands: STANDARD_BANDS.to_vec(),
        }
    }

    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            bands: STRICT_BANDS.to_vec(),
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub name: String,
    pub marks_percent: f64,
    pub credit_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub grade_point: f64,
    pub letter: Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterSummary {
    pub gpa: f64,
    pub total_credits: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeState {
    pub cgpa: f64,
    pub total_credits: f64,
}

pub fn map_marks_to_grade_point(scale: &GradeScale, marks: f64) -> f64 {
    let marks = if marks.is_finite() { marks } else { 0.0 };
    scale
        .bands
        .iter()
        .find(|b| marks >= b.min_marks)
        .map(|b| b.grade_point)
        .unwrap_or(0.0)
        .clamp(0.0, MAX_GRADE_POINT)
}

pub fn map_grade_point_to_letter(gp: f64) -> Letter {
    if gp >= 3.7 {
        Letter::A
    } else if gp >= 3.3 {
        Letter::AMinus
    } else if gp >= 3.0 {
        Letter::BPlus
    } else if gp >= 2.7 {
        Letter::B
    } else if gp >= 2.3 {
        Letter::BMinus
    } else if gp >= 2.0 {
        Letter::CPlus
    } else if gp >= 1.7 {
        Letter::C
    } else if gp >= 1.0 {
        Letter::D
    } else {
        Letter::F
    }
}

pub fn grade(scale: &GradeScale, marks: f64) -> GradeResult {
    let grade_point = map_marks_to_grade_point(scale, marks);
    GradeResult {
        grade_point,
        letter: map_grade_point_to_letter(grade_point),
    }
}

fn usable_credits(credit_hours: f64) -> f64 {
    if credit_hours.is_finite() && credit_hours > 0.0 {
        credit_hours.min(MAX_CREDITS)
    } else {
        0.0
    }
}

fn usable_grade_point(gp: f64) -> f64 {
    if gp.is_finite() {
        gp.clamp(0.0, MAX_GRADE_POINT)
    } else {
        0.0
    }
}

fn weighted_gpa(quality_points: f64, credits: f64) -> f64 {
    if credits > 0.0 && credits.is_finite() {
        usable_grade_point(quality_points / credits)
    } else {
        0.0
    }
}

pub fn compute_semester_gpa(scale: &GradeScale, rows: &[CourseRecord]) -> SemesterSummary {
    let mut quality_points = 0.0_f64;
    let mut total_credits = 0.0_f64;
    for r in rows {
        let credits = usable_credits(r.credit_hours);
        quality_points += map_marks_to_grade_point(scale, r.marks_percent) * credits;
        total_credits += credits;
    }
    SemesterSummary {
        gpa: weighted_gpa(quality_points, total_credits),
        total_credits,
    }
}

pub fn combine(prior: CumulativeState, current: SemesterSummary) -> CumulativeState {
    let prior_credits = usable_credits(prior.total_credits);
    let current_credits = usable_credits(current.total_credits);
    let total_credits = prior_credits + current_credits;
    let current_gpa = usable_grade_point(current.gpa);
    let cgpa = if total_credits > 0.0 {
        weighted_gpa(
            usable_grade_point(prior.cgpa) * prior_credits + current_gpa * current_credits,
            total_credits,
        )
    } else {
        current_gpa
    };
    CumulativeState {
        cgpa,
        total_credits,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    pub subject: String,
    pub marks: f64,
    pub credit_hours: f64,
    pub grade_point: f64,
    pub letter: Letter,
    pub quality_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterTotals {
    pub credit_hours: f64,
    pub quality_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterReport {
    pub rows: Vec<CourseRow>,
    pub totals: SemesterTotals,
    pub summary: SemesterSummary,
    pub gpa_display: f64,
}

pub fn semester_report(scale: &GradeScale, rows: &[CourseRecord]) -> SemesterReport {
    let mut out_rows: Vec<CourseRow> = Vec::with_capacity(rows.len());
    let mut totals = SemesterTotals::default();
    let mut raw_quality_points = 0.0_f64;

    for r in rows {
        let credits = usable_credits(r.credit_hours);
        let g = grade(scale, r.marks_percent);
        let quality_points = g.grade_point * credits;
        totals.credit_hours += credits;
        raw_quality_points += quality_points;
        out_rows.push(CourseRow {
            subject: r.name.clone(),
            marks: r.marks_percent,
            credit_hours: credits,
            grade_point: round_off_2_decimal(g.grade_point),
            letter: g.letter,
            quality_points: round_off_2_decimal(quality_points),
        });
    }

    let summary = SemesterSummary {
        gpa: weighted_gpa(raw_quality_points, totals.credit_hours),
        total_credits: totals.credit_hours,
    };
    totals.quality_points = round_off_2_decimal(raw_quality_points);
    SemesterReport {
        rows: out_rows,
        totals,
        summary,
        gpa_display: round_off_2_decimal(summary.gpa),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeReport {
    pub state: CumulativeState,
    pub cgpa_display: f64,
}

impl From<CumulativeState> for CumulativeReport {
    fn from(state: CumulativeState) -> Self {
        Self {
            state,
            cgpa_display: round_off_2_decimal(state.cgpa),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub current: SemesterReport,
    pub updated: CumulativeReport,
    pub planned: Option<SemesterReport>,
    pub projected: Option<CumulativeReport>,
}

/// Folds the current semester into `prior`, then folds the planned semester
/// into that updated history.
pub fn project(
    scale: &GradeScale,
    prior: CumulativeState,
    current_rows: &[CourseRecord],
    planned_rows: &[CourseRecord],
) -> ProjectionReport {
    project_from(scale, prior, None, current_rows, planned_rows)
}

/// Same as [`project`], but the planned semester is folded into `baseline`
/// when one is given instead of the freshly updated history.
pub fn project_from(
    scale: &GradeScale,
    prior: CumulativeState,
    baseline: Option<CumulativeState>,
    current_rows: &[CourseRecord],
    planned_rows: &[CourseRecord],
) -> ProjectionReport {
    let current = semester_report(scale, current_rows);
    let updated = combine(prior, current.summary);

    let (planned, projected) = if planned_rows.is_empty() {
        (None, None)
    } else {
        let planned = semester_report(scale, planned_rows);
        let projected = combine(baseline.unwrap_or(updated), planned.summary);
        (Some(planned), Some(CumulativeReport::from(projected)))
    };

    ProjectionReport {
        current,
        updated: CumulativeReport::from(updated),
        planned,
        projected,
    }
}
