//! Built-in hooks that configuration files refer to by name
//!
//! Field hooks:
//! - `trim`, `upper`, `lower`
//! - `null_if_empty` - empty string becomes null
//! - `int`, `float`, `bool` - parse the text, leaving it untouched on failure
//! - `date:<format>` - parse with a strftime format into a UTC datetime
//! - `default:<text>` - replace null or empty with `<text>`
//! - `replace:<regex>=><replacement>` - regex replace on text values
//!
//! Object hooks (schemaless entities only):
//! - `set:<field>=<text>`, `now:<field>`, `guid:<field>`, `remove:<field>`
//!
//! A name that does not resolve becomes a non-callable entry, which the
//! pipeline skips.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::migrate::{DynamicEntity, FieldHook, Hook, ObjectHook, Value};

/// Resolve a field hook name
pub fn field_hook(spec: &str) -> FieldHook {
    let spec = spec.trim();
    let (name, arg) = split_spec(spec);

    match (name, arg) {
        ("trim", None) => map_text(|s| s.trim().to_string()),
        ("upper", None) => map_text(|s| s.to_uppercase()),
        ("lower", None) => map_text(|s| s.to_lowercase()),
        ("null_if_empty", None) => FieldHook::new(|v| if v.is_blank() { Value::Null } else { v }),
        ("int", None) => parse_text("int", |s| s.trim().parse::<i64>().ok().map(Value::Int)),
        ("float", None) => parse_text("float", |s| s.trim().parse::<f64>().ok().map(Value::Float)),
        ("bool", None) => parse_text("bool", parse_bool),
        ("date", Some(format)) => {
            let format = format.to_string();
            parse_text("date", move |s| parse_date(s.trim(), &format))
        }
        ("default", Some(text)) => {
            let text = text.to_string();
            FieldHook::new(move |v| if v.is_blank() { Value::String(text.clone()) } else { v })
        }
        ("replace", Some(arg)) => replace_hook(spec, arg),
        _ => {
            log::warn!("Unknown field hook '{}'", spec);
            Hook::NotCallable(spec.to_string())
        }
    }
}

/// Resolve an object hook name for schemaless entities
pub fn object_hook(spec: &str) -> ObjectHook<DynamicEntity> {
    let spec = spec.trim();
    let (name, arg) = split_spec(spec);

    match (name, arg) {
        ("set", Some(arg)) => match arg.split_once('=') {
            Some((field, text)) if !field.trim().is_empty() => {
                let field = field.trim().to_string();
                let text = text.to_string();
                ObjectHook::object(move |e: &mut DynamicEntity| {
                    e.set(field.clone(), Value::String(text.clone()))
                })
            }
            _ => not_callable(spec),
        },
        ("now", Some(field)) if !field.is_empty() => {
            let field = field.to_string();
            ObjectHook::object(move |e: &mut DynamicEntity| e.set(field.clone(), Value::DateTime(Utc::now())))
        }
        ("guid", Some(field)) if !field.is_empty() => {
            let field = field.to_string();
            ObjectHook::object(move |e: &mut DynamicEntity| e.set(field.clone(), Value::Guid(Uuid::new_v4())))
        }
        ("remove", Some(field)) if !field.is_empty() => {
            let field = field.to_string();
            ObjectHook::object(move |e: &mut DynamicEntity| {
                e.remove(&field);
            })
        }
        _ => not_callable(spec),
    }
}

fn not_callable(spec: &str) -> ObjectHook<DynamicEntity> {
    log::warn!("Unknown object hook '{}'", spec);
    Hook::NotCallable(spec.to_string())
}

/// `name:arg` -> (`name`, Some(`arg`)); `name` -> (`name`, None)
///
/// Only `replace` keeps leading whitespace in its argument, since it may be
/// part of the pattern.
fn split_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once(':') {
        Some((name, arg)) if name.trim() == "replace" => ("replace", Some(arg)),
        Some((name, arg)) => (name.trim(), Some(arg.trim())),
        None => (spec, None),
    }
}

/// Apply `f` to text values; other values pass through
fn map_text(f: impl Fn(&str) -> String + Send + Sync + 'static) -> FieldHook {
    FieldHook::new(move |v| match v {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    })
}

/// Convert text values with `f`, keeping the original when it fails
fn parse_text(
    label: &'static str,
    f: impl Fn(&str) -> Option<Value> + Send + Sync + 'static,
) -> FieldHook {
    FieldHook::new(move |v| match v {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        Value::String(s) => match f(&s) {
            Some(parsed) => parsed,
            None => {
                log::warn!("Could not convert '{}' with {} hook, keeping text", s, label);
                Value::String(s)
            }
        },
        other => other,
    })
}

fn parse_bool(s: &str) -> Option<Value> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(Value::Bool(true)),
        "0" | "false" | "no" | "n" | "off" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn parse_date(s: &str, format: &str) -> Option<Value> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
        return Some(Value::DateTime(dt.and_utc()));
    }
    NaiveDate::parse_from_str(s, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Value::DateTime(dt.and_utc()))
}

fn replace_hook(spec: &str, arg: &str) -> FieldHook {
    let Some((pattern, replacement)) = arg.split_once("=>") else {
        log::warn!("Replace hook '{}' is missing '=>'", spec);
        return Hook::NotCallable(spec.to_string());
    };
    match Regex::new(pattern) {
        Ok(regex) => {
            let replacement = replacement.to_string();
            map_text(move |s| regex.replace_all(s, replacement.as_str()).into_owned())
        }
        Err(e) => {
            log::warn!("Replace hook '{}' has an invalid pattern: {}", spec, e);
            Hook::NotCallable(spec.to_string())
        }
    }
}
