use crate::ipc::error::{err, ok};
use crate::ipc::handlers::{optional_str, required_str, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::{Class, Student};
use serde_json::json;
use uuid::Uuid;

const DEFAULT_CAPACITY: u32 = 30;

fn class_from_params(req: &Request, id: String) -> Result<Class, serde_json::Value> {
    let name = required_str(req, "name")?;
    let teacher_name = required_str(req, "teacherName")?;

    let capacity = match req.params.get("capacity") {
        None => DEFAULT_CAPACITY,
        Some(v) => match v.as_u64() {
            Some(n) if (1..=u32::MAX as u64).contains(&n) => n as u32,
            _ => {
                return Err(err(
                    &req.id,
                    "bad_params",
                    "capacity must be an integer in range 1..=4294967295",
                    None,
                ))
            }
        },
    };

    Ok(Class {
        id,
        name,
        teacher_name,
        grade: optional_str(req, "grade"),
        academic_year: optional_str(req, "academicYear"),
        capacity,
        schedule: optional_str(req, "schedule"),
    })
}

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let classes = match store.list::<Class>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };
    let students = match store.list::<Student>() {
        Ok(v) => v,
        Err(e) => return err(&req.id, "store_read_failed", e.to_string(), None),
    };

    // Enrollment counts come from the student collection; capacity is
    // display-only and never enforced against them.
    let rows = classes
        .iter()
        .map(|c| {
            let enrolled = students.iter().filter(|s| s.class_id == c.id).count();
            json!({
                "id": c.id,
                "name": c.name,
                "teacherName": c.teacher_name,
                "grade": c.grade,
                "academicYear": c.academic_year,
                "capacity": c.capacity,
                "schedule": c.schedule,
                "enrolledCount": enrolled
            })
        })
        .collect::<Vec<_>>();

    ok(&req.id, json!({ "classes": rows }))
}

fn handle_classes_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class = match class_from_params(req, Uuid::new_v4().to_string()) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.add(class.clone()) {
        Ok(()) => ok(&req.id, json!({ "class": class })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

fn handle_classes_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let class = match class_from_params(req, class_id.clone()) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.update_by_id(&class_id, class) {
        Ok(()) => ok(&req.id, json!({ "classId": class_id })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

fn handle_classes_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Students and grades referencing this class are left untouched.
    match store.delete_by_id::<Class>(&class_id) {
        Ok(()) => ok(&req.id, json!({ "classId": class_id })),
        Err(e) => err(&req.id, "store_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(handle_classes_create(state, req)),
        "classes.update" => Some(handle_classes_update(state, req)),
        "classes.delete" => Some(handle_classes_delete(state, req)),
        _ => None,
    }
}
