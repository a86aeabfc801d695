use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// One output row: dotted key paths mapped to the values found at them.
pub type FlatRecord = BTreeMap<String, Value>;

/// Collapse a nested JSON object into a single level.
///
/// Nested objects recurse with their key joined to the running prefix by a
/// `.`; arrays and scalars are carried over unchanged under their accumulated
/// path. When two paths collapse to the same key the later one wins.
pub fn flatten(obj: &Map<String, Value>) -> FlatRecord {
    let mut flat = FlatRecord::new();
    flatten_into(obj, "", &mut flat);
    flat
}

fn flatten_into(obj: &Map<String, Value>, prefix: &str, out: &mut FlatRecord) {
    for (key, value) in obj {
        match value {
            Value::Object(nested) => {
                flatten_into(nested, &format!("{}{}.", prefix, key), out);
            }
            other => {
                out.insert(format!("{}{}", prefix, key), other.clone());
            }
        }
    }
}
