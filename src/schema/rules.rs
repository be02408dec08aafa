//! Declarative structural checks over untyped JSON.
//!
//! A [`Shape`] describes what a value must look like. [`check`] walks a
//! value against it and collects every problem as `"path: message"`, so a
//! host can show all of them at once instead of the first serde error.

use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug)]
pub enum Shape {
    Str,
    Number,
    /// Non-negative integer.
    Count,
    Bool,
    /// RFC 3339 string.
    Timestamp,
    OneOf(&'static [&'static str]),
    List(&'static Shape),
    Object(&'static [Field]),
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
    pub nullable: bool,
}

pub const fn required(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: true,
        nullable: false,
    }
}

/// A field that may be absent; the typed model fills in its default.
pub const fn optional(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: false,
        nullable: false,
    }
}

/// A field that may be absent or `null`. Only for fields the typed model
/// holds as an `Option`.
pub const fn nullable(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: false,
        nullable: true,
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn at(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

fn report(errors: &mut Vec<String>, path: &str, message: &str) {
    errors.push(format!("{}: {message}", at(path)));
}

/// Validate `value` against `shape`, appending one entry per violation.
pub fn check(value: &Value, shape: &Shape, path: &str, errors: &mut Vec<String>) {
    match shape {
        Shape::Str => {
            if !value.is_string() {
                report(errors, path, "expected string");
            }
        }
        Shape::Number => {
            if !value.is_number() {
                report(errors, path, "expected number");
            }
        }
        Shape::Count => {
            if value.as_u64().is_none() {
                report(errors, path, "expected non-negative integer");
            }
        }
        Shape::Bool => {
            if !value.is_boolean() {
                report(errors, path, "expected boolean");
            }
        }
        Shape::Timestamp => match value.as_str() {
            Some(text) if chrono::DateTime::parse_from_rfc3339(text).is_ok() => {}
            _ => report(errors, path, "expected ISO-8601 timestamp"),
        },
        Shape::OneOf(options) => match value.as_str() {
            Some(text) if options.iter().any(|option| *option == text) => {}
            _ => report(errors, path, &format!("expected one of {}", options.join(", "))),
        },
        Shape::List(item) => match value.as_array() {
            Some(items) => {
                for (index, element) in items.iter().enumerate() {
                    check(element, item, &format!("{path}[{index}]"), errors);
                }
            }
            None => report(errors, path, "expected array"),
        },
        Shape::Object(fields) => match value.as_object() {
            Some(object) => {
                for field in fields.iter() {
                    let field_path = join(path, field.name);
                    match object.get(field.name) {
                        None | Some(Value::Null) if field.required => {
                            errors.push(format!("{field_path}: is required"));
                        }
                        None => {}
                        Some(Value::Null) if field.nullable => {}
                        Some(inner) => check(inner, &field.shape, &field_path, errors),
                    }
                }
            }
            None => report(errors, path, "expected object"),
        },
    }
}

/// Flag every element of the array at `path` whose `id` was already seen in
/// `seen`. Elements without a string id are left to [`check`].
pub fn unique_ids(
    items: Option<&Value>,
    path: &str,
    seen: &mut HashSet<String>,
    errors: &mut Vec<String>,
) {
    let Some(items) = items.and_then(Value::as_array) else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if let Some(id) = item.get("id").and_then(Value::as_str) {
            if !seen.insert(id.to_string()) {
                errors.push(format!("{path}[{index}].id: duplicate id {id}"));
            }
        }
    }
}
