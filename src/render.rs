use rocket::http::{Header, Method, Status};
use rocket::request::Request;
use rocket::response::{self, content::RawJson, Responder, Response};
use serde::Serialize;
use std::collections::{hash_map::DefaultHasher, BTreeMap};
use std::hash::Hasher;
use validator::{ValidationErrors, ValidationErrorsKind};

/// A JSON document, ready to be sent.
#[derive(Debug)]
pub struct Rendered(pub String);

impl<'r> Responder<'r, 'static> for Rendered {
    fn respond_to(self, r: &'r Request<'_>) -> response::Result<'static> {
        // only GET answers can be revalidated
        if r.method() != Method::Get {
            return RawJson(self.0).respond_to(r);
        }
        let mut hasher = DefaultHasher::new();
        hasher.write(self.0.as_bytes());
        let etag = format!("\"{:x}\"", hasher.finish());
        if r.headers().get("If-None-Match").any(|s| s == etag) {
            Response::build()
                .status(Status::NotModified)
                .header(Header::new("ETag", etag))
                .ok()
        } else {
            Response::build()
                .merge(RawJson(self.0).respond_to(r)?)
                .header(Header::new("ETag", etag))
                .ok()
        }
    }
}

impl From<serde_json::Value> for Rendered {
    fn from(value: serde_json::Value) -> Self {
        Rendered(value.to_string())
    }
}

#[macro_export]
macro_rules! render {
    ($($json:tt)+) => {
        $crate::render::Rendered::from(serde_json::json!($($json)+))
    };
}

/// Messages of each invalid field, keyed by field name
pub fn error_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut messages = BTreeMap::new();
    collect_messages(errors, "", &mut messages);
    messages
}

fn collect_messages(
    errors: &ValidationErrors,
    prefix: &str,
    messages: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                messages.entry(name).or_default().extend(errs.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                }))
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &name, messages),
            ValidationErrorsKind::List(items) => {
                for (i, inner) in items {
                    collect_messages(inner, &format!("{}.{}", name, i), messages)
                }
            }
        }
    }
}

/// A choice offered in a form
#[derive(Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Describes one input of a form
#[derive(Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

impl FormField {
    pub fn new(name: &'static str, kind: &'static str, required: bool) -> FormField {
        FormField {
            name,
            kind,
            required,
            choices: None,
        }
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> FormField {
        self.choices = Some(choices);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use validator::ValidationError;

    #[test]
    fn messages_by_field() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("This field is required."));
        errors.add("text", err);
        errors.add("group", ValidationError::new("invalid_choice"));

        let messages = error_messages(&errors);
        assert_eq!(messages["text"], vec!["This field is required.".to_owned()]);
        assert_eq!(messages["group"], vec!["invalid_choice".to_owned()]);
    }

    #[test]
    fn form_fields() {
        let field = FormField::new("group", "select", false).with_choices(vec![Choice {
            value: "1".to_owned(),
            label: "Cats".to_owned(),
        }]);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["choices"][0]["label"], "Cats");
        let value = serde_json::to_value(FormField::new("text", "textarea", true)).unwrap();
        assert!(value.get("choices").is_none());
    }
}
