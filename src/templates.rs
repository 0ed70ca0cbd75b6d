//! HTML pages rendered with Tera.
//!
//! Templates are compiled into the binary and parsed once at startup. Names
//! ending in `.html` are autoescaped.

use anyhow::anyhow;
use axum::response::Html;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tera::{Context, Tera};

use schoolportal_core::AppError;
use schoolportal_models::FormErrors;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("student_list.html", include_str!("../templates/student_list.html")),
    ("student_detail.html", include_str!("../templates/student_detail.html")),
    ("_student_fields.html", include_str!("../templates/_student_fields.html")),
    ("student_form.html", include_str!("../templates/student_form.html")),
    ("success.html", include_str!("../templates/success.html")),
    ("add_student.html", include_str!("../templates/add_student.html")),
    ("confirm_delete.html", include_str!("../templates/confirm_delete.html")),
];

#[derive(Clone, Debug)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, AppError> {
        self.tera
            .render(name, context)
            .map(Html)
            .map_err(|e| AppError::internal(anyhow!("Failed to render {}: {:?}", name, e)))
    }
}

/// Base context shared by every page. `current_user` drives the navigation.
pub fn page_context(current_user: Option<&str>) -> Context {
    let mut context = Context::new();
    context.insert("current_user", &current_user);
    context
}

/// Form errors keyed so templates can loop over any field without checking
/// whether it has errors. `non_field` holds errors not tied to a field.
pub fn errors_context(errors: &FormErrors, fields: &[&str]) -> Value {
    let mut map = Map::new();
    for field in fields {
        map.insert(field.to_string(), json!(errors.get(field)));
    }
    for (field, messages) in &errors.fields {
        map.insert(field.clone(), json!(messages));
    }
    map.insert("non_field".to_string(), json!(errors.non_field));
    Value::Object(map)
}
