use std::panic::Location;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::config::Level;

/// Pair positional tag values with their names.
///
/// The emitted field count is the minimum of the two list lengths; the
/// excess of the longer list is silently dropped. Keeping the lists aligned
/// is the caller's contract, not a runtime-checked invariant.
pub fn pair_tags(names: &[&str], values: &[Value]) -> Vec<(String, Value)> {
    names
        .iter()
        .zip(values.iter())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Render a caller location in short `file:line` form.
pub fn short_caller(location: &Location<'_>) -> String {
    let file = location.file();
    let short = file.rsplit(['/', '\\']).next().unwrap_or(file);
    format!("{}:{}", short, location.line())
}

/// Encode one record as a single JSON line, trailing newline included.
///
/// Field order is fixed: `level`, `time`, `msg`, `caller`, then the tags in
/// the order supplied.
pub fn encode(level: Level, msg: &str, caller: &Location<'_>, tags: &[(String, Value)]) -> String {
    let mut fields = Map::new();
    fields.insert("level".to_string(), Value::String(level.as_str().to_string()));
    fields.insert(
        "time".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    fields.insert("msg".to_string(), Value::String(msg.to_string()));
    fields.insert("caller".to_string(), Value::String(short_caller(caller)));
    for (name, value) in tags {
        fields.insert(name.clone(), value.clone());
    }
    let mut line = Value::Object(fields).to_string();
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_truncates_to_the_shorter_list() {
        let tags = pair_tags(&["a", "b"], &[json!(1), json!(2), json!(3)]);
        assert_eq!(
            tags,
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
        );

        let tags = pair_tags(&["a", "b", "c"], &[json!(1)]);
        assert_eq!(tags, vec![("a".to_string(), json!(1))]);
    }

    #[test]
    fn empty_name_list_drops_everything() {
        assert!(pair_tags(&[], &[json!("orphan")]).is_empty());
    }

    #[test]
    fn it_shortens_caller_paths() {
        let caller = Location::caller();
        let short = short_caller(caller);
        assert!(short.starts_with("record.rs:"), "got {short}");
    }

    #[test]
    fn encoded_records_carry_the_fixed_prefix_then_tags() {
        let line = encode(
            Level::Info,
            "hello",
            Location::caller(),
            &[("a".to_string(), json!(1))],
        );
        assert!(line.ends_with('\n'));
        let v: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["level"], "info");
        assert_eq!(v["msg"], "hello");
        assert_eq!(v["a"], 1);
        // time parses back as RFC 3339
        let time = v["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
        assert!(v["caller"].as_str().unwrap().contains("record.rs:"));
        // fixed fields lead the object
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "level");
        assert_eq!(keys[1], "time");
        assert_eq!(keys[2], "msg");
        assert_eq!(keys[3], "caller");
    }
}
