use crate::ipc::error::{err, ok};
use crate::ipc::handlers::{required_f64, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::{Class, Grade, Student, TERMS};
use crate::stats;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

fn grade_from_params(req: &Request, id: String) -> Result<Grade, serde_json::Value> {
    let student_id = required_str(req, "studentId")?;
    let class_id = required_str(req, "classId")?;
    let subject = required_str(req, "subject")?;
    let date = required_str(req, "date")?;
    // Term comes from a fixed picker in the UI but free entry is accepted.
    let term = required_str(req, "term")?;

    let score = required_f64(req, "score")?;
    if score < 0.0 {
        return Err(err(&req.id, "bad_params", "score must be >= 0", None));
    }
    let max_score = required_f64(req, "maxScore")?;
    if max_score < 1.0 {
        return Err(err(&req.id, "bad_params", "maxScore must be >= 1", None));
    }

    if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        return Err(err(
            &req.id,
            "bad_params",
            "date must be YYYY-MM-DD",
            Some(json!({ "date": date })),
        ));
    }

    // studentId/classId existence is deliberately not checked; listings
    // resolve dangling references as "Unknown".
    Ok(Grade {
        id,
        student_id,
        class_id,
        subject,
        score,
        max_score,
        date,
        term,
    })
}

fn handle_grades_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let grades = match store.list::<Grade>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };
    let students = match store.list::<Student>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };
    let classes = match store.list::<Class>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };

    let rows = grades
        .iter()
        .map(|g| {
            let student_name = students
                .iter()
                .find(|s| s.id == g.student_id)
                .map(|s| format!("{} {}", s.first_name, s.last_name))
                .unwrap_or_else(|| "Unknown".to_string());
            let class_name = classes
                .iter()
                .find(|c| c.id == g.class_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            // Letter comes from the same rounded percent the row shows,
            // so an 89.5% record reads as 90% / A, not 90% / B.
            let percent = g.percent().round();
            json!({
                "id": g.id,
                "studentId": g.student_id,
                "studentName": student_name,
                "classId": g.class_id,
                "className": class_name,
                "subject": g.subject,
                "score": g.score,
                "maxScore": g.max_score,
                "percent": percent,
                "letter": stats::letter_for_percent(percent),
                "term": g.term,
                "date": g.date
            })
        })
        .collect::<Vec<_>>();

    ok(&req.id, json!({ "grades": rows }))
}

fn handle_grades_options(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "terms": TERMS }))
}

fn handle_grades_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let grade = match grade_from_params(req, Uuid::new_v4().to_string()) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.add(grade.clone()) {
        Ok(()) => ok(&req.id, json!({ "grade": grade })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

fn handle_grades_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let grade_id = match required_str(req, "gradeId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let grade = match grade_from_params(req, grade_id.clone()) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.update_by_id(&grade_id, grade) {
        Ok(()) => ok(&req.id, json!({ "gradeId": grade_id })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

fn handle_grades_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let grade_id = match required_str(req, "gradeId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.delete_by_id::<Grade>(&grade_id) {
        Ok(()) => ok(&req.id, json!({ "gradeId": grade_id })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.list" => Some(handle_grades_list(state, req)),
        "grades.options" => Some(handle_grades_options(state, req)),
        "grades.create" => Some(handle_grades_create(state, req)),
        "grades.update" => Some(handle_grades_update(state, req)),
        "grades.delete" => Some(handle_grades_delete(state, req)),
        _ => None,
    }
}
