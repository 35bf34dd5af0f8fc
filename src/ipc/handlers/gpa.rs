use crate::calc;
use crate::input;
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn current_rows(req: &Request) -> Result<Vec<calc::CourseRecord>, serde_json::Value> {
    input::parse_course_rows(req.params.get("rows"), "Subject").map_err(|e| calc_err(req, e))
}

fn handle_grade_map(state: &mut AppState, req: &Request) -> serde_json::Value {
    let marks = input::marks_or_zero(req.params.get("marks"));
    let g = calc::grade(state.active_scale(), marks);
    ok(
        &req.id,
        json!({
            "marks": marks,
            "gradePoint": g.grade_point,
            "letter": g.letter
        }),
    )
}

fn handle_semester(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows = match current_rows(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let report = calc::semester_report(state.active_scale(), &rows);
    ok(&req.id, json!(report))
}

fn handle_cgpa(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows = match current_rows(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let prior = match input::parse_cumulative(req.params.get("prior"), "prior") {
        Ok(v) => v,
        Err(e) => return calc_err(req, e),
    };
    let semester = calc::semester_report(state.active_scale(), &rows);
    let updated = calc::CumulativeReport::from(calc::combine(prior, semester.summary));
    ok(
        &req.id,
        json!({
            "semester": semester,
            "updated": updated
        }),
    )
}

fn handle_projection(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows = match current_rows(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let planned = match input::parse_course_rows(req.params.get("planned"), "Planned") {
        Ok(v) => v,
        Err(e) => return calc_err(req, e),
    };
    let prior = match input::parse_cumulative(req.params.get("prior"), "prior") {
        Ok(v) => v,
        Err(e) => return calc_err(req, e),
    };
    let baseline = match input::parse_optional_cumulative(req.params.get("baseline"), "baseline")
    {
        Ok(v) => v,
        Err(e) => return calc_err(req, e),
    };

    let report = calc::project_from(state.active_scale(), prior, baseline, &rows, &planned);
    ok(&req.id, json!(report))
}

fn handle_combine(_state: &mut AppState, req: &Request) -> serde_json::Value {
    if req.params.get("current").map_or(true, |v| v.is_null()) {
        return err(&req.id, "bad_params", "missing current", None);
    }
    let prior = match input::parse_cumulative(req.params.get("prior"), "prior") {
        Ok(v) => v,
        Err(e) => return calc_err(req, e),
    };
    let current = match input::parse_semester_summary(req.params.get("current"), "current") {
        Ok(v) => v,
        Err(e) => return calc_err(req, e),
    };
    ok(
        &req.id,
        json!(calc::CumulativeReport::from(calc::combine(prior, current))),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grade.map" => Some(handle_grade_map(state, req)),
        "gpa.semester" => Some(handle_semester(state, req)),
        "gpa.cgpa" => Some(handle_cgpa(state, req)),
        "gpa.projection" => Some(handle_projection(state, req)),
        "gpa.combine" => Some(handle_combine(state, req)),
        _ => None,
    }
}
