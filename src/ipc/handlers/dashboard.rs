use crate::ipc::error::{err, ok};
use crate::ipc::handlers::store_ref;
use crate::ipc::types::{AppState, Request};
use crate::model::{Class, Grade, Student};
use crate::stats;
use serde_json::json;

/// Everything the dashboard page renders in one response: headline
/// stats, the three chart series, and the recent-record strips. All of
/// it is recomputed from the collections on every call.
fn handle_dashboard_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let students = match store.list::<Student>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };
    let classes = match store.list::<Class>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };
    let grades = match store.list::<Grade>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };

    let stats_block = stats::dashboard_stats(&students, &classes, &grades);
    let distribution = stats::letter_grade_distribution(&grades);
    let by_level = stats::students_by_grade_level(&students);
    let by_subject = stats::average_by_subject(&grades);

    let recent_students = students
        .iter()
        .take(5)
        .map(|s| {
            json!({
                "id": s.id,
                "name": format!("{} {}", s.first_name, s.last_name),
                "grade": s.grade,
                "enrollmentDate": s.enrollment_date
            })
        })
        .collect::<Vec<_>>();
    let recent_classes = classes
        .iter()
        .take(5)
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "teacherName": c.teacher_name,
                "grade": c.grade
            })
        })
        .collect::<Vec<_>>();

    ok(
        &req.id,
        json!({
            "stats": stats_block,
            "gradeDistribution": distribution,
            "studentsByGradeLevel": by_level,
            "subjectAverages": by_subject,
            "recentStudents": recent_students,
            "recentClasses": recent_classes
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.open" => Some(handle_dashboard_open(state, req)),
        _ => None,
    }
}
