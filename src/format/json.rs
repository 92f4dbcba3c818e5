//! Default JSON record formatter.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value as Json};

use crate::format::{FormatContext, FormatError, RecordFormatter};
use crate::record::{Attr, Caller, Level, Value};

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const SOURCE_KEY: &str = "source";
pub const MESSAGE_KEY: &str = "msg";

/// Formats records as a single JSON object.
///
/// Built-in keys come first (`time`, `level`, `source`, `msg`), followed by
/// the attributes in consolidated order. An attribute reusing a built-in key
/// overwrites it in place.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// Emit the `source` object when the record carries caller info.
    pub add_source: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { add_source: true }
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the JSON object without serializing it.
    pub fn to_object(
        &self,
        time: DateTime<Utc>,
        level: Level,
        caller: Option<&Caller>,
        message: &str,
        attrs: &[Attr],
    ) -> Map<String, Json> {
        let mut object = Map::new();
        object.insert(TIME_KEY.into(), Json::String(format_time(time)));
        object.insert(LEVEL_KEY.into(), Json::String(level.to_string()));
        if self.add_source {
            if let Some(caller) = caller {
                object.insert(SOURCE_KEY.into(), source_object(caller));
            }
        }
        object.insert(MESSAGE_KEY.into(), Json::String(message.to_string()));
        insert_attrs(&mut object, attrs);
        object
    }
}

impl RecordFormatter for JsonFormatter {
    fn format_record(
        &self,
        _ctx: &FormatContext<'_>,
        time: DateTime<Utc>,
        level: Level,
        caller: Option<&Caller>,
        message: &str,
        attrs: &[Attr],
    ) -> Result<Vec<u8>, FormatError> {
        let object = self.to_object(time, level, caller, message, attrs);
        Ok(serde_json::to_vec(&Json::Object(object))?)
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn source_object(caller: &Caller) -> Json {
    let mut source = Map::new();
    if let Some(function) = &caller.function {
        source.insert("function".into(), Json::String(function.clone()));
    }
    if let Some(file) = &caller.file {
        source.insert("file".into(), Json::String(file.clone()));
    }
    if let Some(line) = caller.line {
        source.insert("line".into(), Json::from(line));
    }
    Json::Object(source)
}

fn insert_attrs(object: &mut Map<String, Json>, attrs: &[Attr]) {
    for attr in attrs {
        match &attr.value {
            Value::Group(members) if attr.key.is_empty() => insert_attrs(object, members),
            Value::Group(members) if members.is_empty() => {}
            value => {
                object.insert(attr.key.clone(), to_json(value));
            }
        }
    }
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Int(i) => Json::from(*i),
        Value::Uint(u) => Json::from(*u),
        Value::Float(f) => Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(f.to_string())),
        Value::Bool(b) => Json::Bool(*b),
        Value::Duration(d) => Json::from(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)),
        Value::Time(t) => Json::String(format_time(*t)),
        Value::Group(members) => {
            let mut nested = Map::new();
            insert_attrs(&mut nested, members);
            Json::Object(nested)
        }
        Value::Any(json) => json.clone(),
    }
}
