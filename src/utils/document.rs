//! BSON 문서를 응답용 JSON으로 변환합니다.
//!
//! 목록 조회는 projection이 적용된 원시 문서를 돌려주므로 엔티티로
//! 역직렬화하지 않고 그대로 JSON으로 바꿉니다. ObjectId는 hex 문자열,
//! 날짜는 RFC3339 문자열로 표현합니다.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Int32(n) => Value::from(n),
        Bson::Int64(n) => Value::from(n),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect();
    Value::Object(map)
}
