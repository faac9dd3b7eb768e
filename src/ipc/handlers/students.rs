use crate::ipc::error::{err, ok};
use crate::ipc::handlers::{optional_str, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use serde_json::json;
use uuid::Uuid;

/// Builds the full record from params. Updates are whole-record
/// overwrites, so create and update share this.
fn student_from_params(req: &Request, id: String) -> Result<Student, serde_json::Value> {
    let first_name = required_str(req, "firstName")?;
    let last_name = required_str(req, "lastName")?;

    let enrollment_date = {
        let given = optional_str(req, "enrollmentDate");
        if given.is_empty() {
            chrono::Local::now().date_naive().to_string()
        } else {
            given
        }
    };

    Ok(Student {
        id,
        first_name,
        last_name,
        email: optional_str(req, "email"),
        phone: optional_str(req, "phone"),
        date_of_birth: optional_str(req, "dateOfBirth"),
        grade: optional_str(req, "grade"),
        class_id: optional_str(req, "classId"),
        enrollment_date,
        guardian_name: optional_str(req, "guardianName"),
        guardian_phone: optional_str(req, "guardianPhone"),
        address: optional_str(req, "address"),
    })
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut students = match store.list::<Student>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };

    if let Some(search) = req.params.get("search").and_then(|v| v.as_str()) {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            students.retain(|s| {
                s.first_name.to_lowercase().contains(&needle)
                    || s.last_name.to_lowercase().contains(&needle)
                    || s.email.to_lowercase().contains(&needle)
            });
        }
    }

    ok(&req.id, json!({ "students": students }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student = match student_from_params(req, Uuid::new_v4().to_string()) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.add(student.clone()) {
        Ok(()) => ok(&req.id, json!({ "student": student })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student = match student_from_params(req, student_id.clone()) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Unknown ids are absorbed: nothing changes, nothing is reported.
    match store.update_by_id(&student_id, student) {
        Ok(()) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    // No cascade: grade records referencing this student stay behind and
    // resolve as "Unknown" in listings.
    match store.delete_by_id::<Student>(&student_id) {
        Ok(()) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
