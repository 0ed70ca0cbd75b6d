use crate::modules::students::controller::{
    add_student, add_student_page, delete_student, delete_student_page, student_detail,
    student_form_page, student_form_submit, student_list, update_student, update_student_page,
};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/student_list/", get(student_list))
        .route("/student_detail/{id}/", get(student_detail))
        .route("/student_form/", get(student_form_page).post(student_form_submit))
        .route("/student_model_form/", get(add_student_page).post(add_student))
        .route(
            "/update_student/{id}/",
            get(update_student_page).post(update_student),
        )
        .route(
            "/delete_student/{id}",
            get(delete_student_page).post(delete_student),
        )
}
