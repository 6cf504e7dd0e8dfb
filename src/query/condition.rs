//! 쿼리 파라미터 하나를 타입이 있는 필터 조건으로 해석합니다.
//!
//! `age[gte]=18` 같은 키는 [`parse_key`]로 필드와 연산자로 분리되고,
//! 값은 필드의 저장 타입([`FieldType`])에 맞춰 [`FilterValue::parse_as`]로
//! 한 번만 해석되어 BSON으로 변환됩니다. 타입 표에 없는 필드만 값 모양으로 추정합니다.

use chrono::{DateTime, NaiveDate};
use mongodb::bson::{self, oid::ObjectId, Bson, Document};

/// 컬렉션 필드의 저장 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Date,
    Bool,
    ObjectId,
}

/// 컬렉션별 필드 타입 표
pub type FieldTypes = &'static [(&'static str, FieldType)];

/// 표에서 필드 타입을 찾습니다.
pub fn field_type(types: FieldTypes, field: &str) -> Option<FieldType> {
    types
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, field_type)| *field_type)
}

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// 브래킷 안의 연산자 이름을 해석합니다. 알 수 없으면 `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "eq" => Some(Operator::Eq),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            _ => None,
        }
    }

    /// MongoDB 연산자 키 (`$gte` 등)
    pub fn mongo_key(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
        }
    }
}

/// 필터 값
///
/// 정수/실수는 문자열 표현이 정규형일 때만 숫자로 해석합니다.
/// `"0612345678"` 같은 전화번호는 문자열로 남습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// RFC3339 또는 `YYYY-MM-DD` 형식의 날짜 (UTC 밀리초)
    Date(i64),
    ObjectId(ObjectId),
    Text(String),
}

impl FilterValue {
    /// 필드 타입에 맞춰 값을 변환합니다.
    ///
    /// 변환할 수 없는 값은 문자열로 남아 어떤 문서와도 일치하지 않습니다.
    /// 타입을 모르면 [`FilterValue::parse`]로 추정합니다.
    pub fn parse_as(raw: &str, field_type: Option<FieldType>) -> Self {
        let text = || FilterValue::Text(raw.to_string());

        match field_type {
            None => Self::parse(raw),
            Some(FieldType::String) => text(),
            Some(FieldType::ObjectId) => ObjectId::parse_str(raw)
                .map(FilterValue::ObjectId)
                .unwrap_or_else(|_| text()),
            Some(FieldType::Number) => parse_number(raw).unwrap_or_else(text),
            Some(FieldType::Date) => parse_date(raw).unwrap_or_else(text),
            Some(FieldType::Bool) => match raw {
                "true" => FilterValue::Bool(true),
                "false" => FilterValue::Bool(false),
                _ => text(),
            },
        }
    }

    /// 값 모양만으로 타입을 추정합니다.
    pub fn parse(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            if n.to_string() == raw {
                return FilterValue::Int(n);
            }
        }

        if raw.contains('.') && !raw.starts_with('.') && !raw.ends_with('.') && !has_leading_zero(raw) {
            if let Ok(f) = raw.parse::<f64>() {
                if f.is_finite() {
                    return FilterValue::Float(f);
                }
            }
        }

        match raw {
            "true" => return FilterValue::Bool(true),
            "false" => return FilterValue::Bool(false),
            _ => {}
        }

        parse_date(raw).unwrap_or_else(|| FilterValue::Text(raw.to_string()))
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            FilterValue::Int(n) => Bson::Int64(*n),
            FilterValue::Float(f) => Bson::Double(*f),
            FilterValue::Bool(b) => Bson::Boolean(*b),
            FilterValue::Date(ms) => Bson::DateTime(bson::DateTime::from_millis(*ms)),
            FilterValue::ObjectId(id) => Bson::ObjectId(*id),
            FilterValue::Text(s) => Bson::String(s.clone()),
        }
    }
}

fn parse_number(raw: &str) -> Option<FilterValue> {
    if let Ok(n) = raw.trim().parse::<i64>() {
        return Some(FilterValue::Int(n));
    }
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(FilterValue::Float)
}

fn parse_date(raw: &str) -> Option<FilterValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(FilterValue::Date(dt.timestamp_millis()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| FilterValue::Date(midnight.and_utc().timestamp_millis()))
}

fn has_leading_zero(raw: &str) -> bool {
    let digits = raw.trim_start_matches('-');
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

/// 필드 하나에 대한 조건
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field=value`
    Equals(FilterValue),
    /// `field[op]=value`
    Compare(Operator, FilterValue),
    /// 화이트리스트 키의 반복 지정 (`role=user&role=admin`)
    AnyOf(Vec<FilterValue>),
}

/// 필드 이름과 조건 묶음
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub conditions: Vec<Condition>,
}

impl FieldFilter {
    /// MongoDB 필터 값으로 변환합니다.
    ///
    /// 단일 등호 조건은 값 그대로, 그 외에는 연산자 문서로 합쳐집니다.
    /// 같은 연산자가 여러 번 나오면 마지막 값이 남습니다.
    pub fn to_bson(&self) -> Bson {
        if let [Condition::Equals(value)] = self.conditions.as_slice() {
            return value.to_bson();
        }

        let mut operators = Document::new();
        for condition in &self.conditions {
            match condition {
                Condition::Equals(value) => {
                    operators.insert("$eq", value.to_bson());
                }
                Condition::Compare(op, value) => {
                    operators.insert(op.mongo_key(), value.to_bson());
                }
                Condition::AnyOf(values) => {
                    let list: Vec<Bson> = values.iter().map(FilterValue::to_bson).collect();
                    operators.insert("$in", list);
                }
            }
        }
        Bson::Document(operators)
    }
}

/// `field[op]` 형태의 키를 필드와 연산자로 분리합니다.
///
/// 브래킷이 없거나 연산자를 알 수 없으면 키 전체를 필드 이름으로 취급합니다.
pub fn parse_key(key: &str) -> (String, Option<Operator>) {
    if let Some(open) = key.find('[') {
        if key.ends_with(']') && open > 0 {
            let op_name = &key[open + 1..key.len() - 1];
            if let Some(op) = Operator::parse(op_name) {
                return (key[..open].to_string(), Some(op));
            }
        }
    }
    (key.to_string(), None)
}
