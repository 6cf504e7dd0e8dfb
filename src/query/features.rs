//! # Query Feature Builder
//!
//! 목록 엔드포인트의 쿼리 파라미터를 MongoDB `find` 요청으로 바꾸는 빌더입니다.
//!
//! 네 가지 변환을 체이닝으로 적용하며, 각 단계는 빌더를 소비하고 다시 반환합니다.
//! 실제 조회는 호출자가 [`FindQuery`]를 실행할 때 일어나며, 빌더 자체는
//! I/O를 하지 않고 에러도 내지 않습니다.
//!
//! 필터 값은 컬렉션의 필드 타입 표([`FieldTypes`])에 따라 변환됩니다.
//!
//! ```rust,ignore
//! let params = QueryParams::parse("username=12345&sort=-createdAt");
//! let features = ApiFeatures::new(FindQuery::default(), params, User::FIELD_TYPES)
//!     .filter()
//!     .sort()
//!     .limit_fields()
//!     .paginate();
//!
//! let users = repo.find(features.into_query()).await?;
//! ```

use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;

use super::condition::{field_type, parse_key, Condition, FieldFilter, FieldTypes, FilterValue};

/// 필터에서 제외되는 제어용 파라미터
pub const CONTROL_PARAMS: &[&str] = &["page", "sort", "limit", "fields"];

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

/// 원본 쿼리 문자열의 키/값 쌍 (순서와 반복을 보존)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// URL 쿼리 문자열을 디코딩합니다.
    pub fn parse(query_string: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query_string.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// 키의 마지막 값
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// 실행 가능한 find 요청 (필터 + 옵션)
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Document,
    pub options: FindOptions,
}

/// 정렬 키
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// 필드 선택
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// 지정된 필드만 포함
    Include(Vec<String>),
    /// 기본값: 내부 버전 필드 `__v` 제외
    ExcludeVersion,
}

/// 요청 단위로 해석된 쿼리 명세
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filters: Vec<FieldFilter>,
    pub sort_keys: Vec<SortKey>,
    pub projection: Projection,
    pub page: u64,
    pub limit: u64,
}

impl QuerySpec {
    /// `(page - 1) * limit`, 음수가 되지 않음
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort_keys: Vec::new(),
            projection: Projection::ExcludeVersion,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// 쿼리 기능 빌더
#[derive(Debug, Clone)]
pub struct ApiFeatures {
    query: FindQuery,
    params: QueryParams,
    field_types: FieldTypes,
    spec: QuerySpec,
}

impl ApiFeatures {
    pub fn new(query: FindQuery, params: QueryParams, field_types: FieldTypes) -> Self {
        Self {
            query,
            params,
            field_types,
            spec: QuerySpec::default(),
        }
    }

    /// 제어 파라미터를 제외한 나머지 키를 필터 조건으로 바꿉니다.
    ///
    /// 같은 필드의 조건들은 하나의 연산자 문서로 합쳐집니다(AND).
    /// 연산자 없이 반복된 키는 `$in` 조건이 됩니다.
    pub fn filter(mut self) -> Self {
        let mut filters: Vec<FieldFilter> = Vec::new();
        let mut plain_values: Vec<(String, Vec<FilterValue>)> = Vec::new();

        for (key, raw) in self.params.pairs() {
            if CONTROL_PARAMS.contains(&key.as_str()) {
                continue;
            }

            let (field, operator) = parse_key(key);
            let value = FilterValue::parse_as(raw, field_type(self.field_types, &field));

            match operator {
                Some(op) => field_entry(&mut filters, &field)
                    .conditions
                    .push(Condition::Compare(op, value)),
                None => match plain_values.iter_mut().find(|(f, _)| *f == field) {
                    Some((_, values)) => values.push(value),
                    None => {
                        // 필드 순서를 첫 등장 기준으로 유지
                        field_entry(&mut filters, &field);
                        plain_values.push((field, vec![value]));
                    }
                },
            }
        }

        for (field, mut values) in plain_values {
            let condition = if values.len() == 1 {
                Condition::Equals(values.remove(0))
            } else {
                Condition::AnyOf(values)
            };
            field_entry(&mut filters, &field).conditions.insert(0, condition);
        }

        for filter in &filters {
            self.query.filter.insert(filter.field.clone(), filter.to_bson());
        }
        self.spec.filters = filters;
        self
    }

    /// `sort=-createdAt,name` 형태의 정렬을 적용합니다. 없으면 `createdAt` 내림차순.
    pub fn sort(mut self) -> Self {
        let keys: Vec<SortKey> = self
            .params
            .get("sort")
            .map(split_csv)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| {
                let (field, descending) = match raw.strip_prefix('-') {
                    Some(rest) => (rest, true),
                    None => (raw, false),
                };
                (!field.is_empty()).then(|| SortKey {
                    field: field.to_string(),
                    descending,
                })
            })
            .collect();

        let keys = if keys.is_empty() {
            vec![SortKey {
                field: "createdAt".to_string(),
                descending: true,
            }]
        } else {
            keys
        };

        let mut sort = Document::new();
        for key in &keys {
            sort.insert(key.field.clone(), if key.descending { -1 } else { 1 });
        }

        self.query.options.sort = Some(sort);
        self.spec.sort_keys = keys;
        self
    }

    /// `fields=a,b`로 조회 필드를 제한합니다. 없으면 `__v`만 제외.
    pub fn limit_fields(mut self) -> Self {
        let fields: Vec<String> = self
            .params
            .get("fields")
            .map(split_csv)
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect();

        let (projection, document) = if fields.is_empty() {
            (Projection::ExcludeVersion, doc! { "__v": 0 })
        } else {
            let mut document = Document::new();
            for field in &fields {
                document.insert(field.clone(), 1);
            }
            (Projection::Include(fields), document)
        };

        self.query.options.projection = Some(document);
        self.spec.projection = projection;
        self
    }

    /// `page`(기본 1)와 `limit`(기본 100, 최대 1000)으로 skip/limit을 계산합니다.
    ///
    /// 숫자가 아닌 값은 기본값으로, 1보다 작은 값은 1로 보정합니다.
    pub fn paginate(mut self) -> Self {
        let page = positive_param(self.params.get("page"), DEFAULT_PAGE);
        let limit = positive_param(self.params.get("limit"), DEFAULT_LIMIT).min(MAX_LIMIT);

        self.spec.page = page;
        self.spec.limit = limit;

        self.query.options.skip = Some(self.spec.skip());
        self.query.options.limit = Some(limit as i64);
        self
    }

    /// 빌드된 find 요청
    pub fn query(&self) -> &FindQuery {
        &self.query
    }

    pub fn into_query(self) -> FindQuery {
        self.query
    }

    /// 해석된 쿼리 명세
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }
}

fn field_entry<'a>(filters: &'a mut Vec<FieldFilter>, field: &str) -> &'a mut FieldFilter {
    let index = match filters.iter().position(|f| f.field == field) {
        Some(index) => index,
        None => {
            filters.push(FieldFilter {
                field: field.to_string(),
                conditions: Vec::new(),
            });
            filters.len() - 1
        }
    };
    &mut filters[index]
}

fn split_csv(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn positive_param(raw: Option<&str>, default: u64) -> u64 {
    match raw.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(n)) if n < 1 => 1,
        Some(Ok(n)) => n as u64,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, Bson};

    use crate::query::FieldType;

    const FIELDS: FieldTypes = &[
        ("username", FieldType::String),
        ("role", FieldType::String),
        ("status", FieldType::String),
        ("requestUser", FieldType::ObjectId),
        ("createdAt", FieldType::Date),
    ];

    fn build(query_string: &str) -> ApiFeatures {
        ApiFeatures::new(FindQuery::default(), QueryParams::parse(query_string), FIELDS)
            .filter()
            .sort()
            .limit_fields()
            .paginate()
    }

    #[test]
    fn test_scalar_params_become_equality_conditions() {
        let a = build("role=admin&status=active");
        let b = build("status=active&role=admin");

        assert_eq!(a.query().filter.get_str("role").unwrap(), "admin");
        assert_eq!(a.query().filter.get_str("status").unwrap(), "active");
        assert_eq!(a.query().filter.len(), 2);

        // 키 순서와 무관하게 같은 조건
        for key in ["role", "status"] {
            assert_eq!(a.query().filter.get(key), b.query().filter.get(key));
        }
    }

    #[test]
    fn test_control_params_are_not_filters() {
        let features = build("page=2&sort=name&limit=5&fields=name&role=user");

        assert_eq!(features.query().filter, doc! { "role": "user" });
    }

    #[test]
    fn test_comparison_operator_is_rewritten() {
        let features = build("age%5Bgte%5D=18");

        assert_eq!(
            features.query().filter,
            doc! { "age": { "$gte": 18_i64 } }
        );
    }

    #[test]
    fn test_multiple_operators_on_same_field() {
        let features = build("age[gte]=18&age[lt]=65");

        assert_eq!(
            features.query().filter,
            doc! { "age": { "$gte": 18_i64, "$lt": 65_i64 } }
        );
    }

    #[test]
    fn test_equality_and_operator_on_same_field() {
        let features = build("age[lt]=65&age=30");

        assert_eq!(
            features.query().filter,
            doc! { "age": { "$eq": 30_i64, "$lt": 65_i64 } }
        );
    }

    #[test]
    fn test_values_follow_stored_field_types() {
        let features = build("username=12345");
        assert_eq!(
            features.query().filter.get("username"),
            Some(&Bson::String("12345".to_string()))
        );

        let id = ObjectId::new();
        let features = build(&format!("requestUser={}", id.to_hex()));
        assert_eq!(features.query().filter.get("requestUser"), Some(&Bson::ObjectId(id)));

        let features = build("createdAt[gte]=2020-01-01");
        let created = features.query().filter.get_document("createdAt").unwrap();
        assert!(matches!(created.get("$gte"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn test_unrecognized_bracket_is_literal() {
        let features = build("age[regex]=abc");

        assert_eq!(features.query().filter, doc! { "age[regex]": "abc" });
    }

    #[test]
    fn test_repeated_key_becomes_in() {
        let features = build("role=user&role=admin");

        assert_eq!(
            features.query().filter,
            doc! { "role": { "$in": ["user", "admin"] } }
        );
    }

    #[test]
    fn test_base_filter_is_preserved() {
        let base = FindQuery {
            filter: doc! { "status": "active" },
            ..Default::default()
        };
        let features = ApiFeatures::new(base, QueryParams::parse("role=user"), FIELDS).filter();

        assert_eq!(
            features.query().filter,
            doc! { "status": "active", "role": "user" }
        );
    }

    #[test]
    fn test_sort_keys_in_order() {
        let features = build("sort=-createdAt,name");
        let sort = features.query().options.sort.clone().unwrap();

        let entries: Vec<(String, Bson)> = sort.into_iter().collect();
        assert_eq!(
            entries,
            vec![
                ("createdAt".to_string(), Bson::Int32(-1)),
                ("name".to_string(), Bson::Int32(1)),
            ]
        );
    }

    #[test]
    fn test_default_sort_is_created_at_descending() {
        let features = build("");

        assert_eq!(
            features.query().options.sort,
            Some(doc! { "createdAt": -1 })
        );
    }

    #[test]
    fn test_field_projection() {
        let features = build("fields=firstName,lastName");

        assert_eq!(
            features.query().options.projection,
            Some(doc! { "firstName": 1, "lastName": 1 })
        );
        assert_eq!(
            features.spec().projection,
            Projection::Include(vec!["firstName".to_string(), "lastName".to_string()])
        );
    }

    #[test]
    fn test_default_projection_excludes_version() {
        let features = build("");

        assert_eq!(
            features.query().options.projection,
            Some(doc! { "__v": 0 })
        );
    }

    #[test]
    fn test_pagination() {
        let features = build("page=3&limit=10");
        assert_eq!(features.query().options.skip, Some(20));
        assert_eq!(features.query().options.limit, Some(10));

        let features = build("");
        assert_eq!(features.query().options.skip, Some(0));
        assert_eq!(features.query().options.limit, Some(100));
    }

    #[test]
    fn test_pagination_clamps_bad_values() {
        let features = build("page=0&limit=-5");
        assert_eq!(features.spec().page, 1);
        assert_eq!(features.spec().limit, 1);
        assert_eq!(features.query().options.skip, Some(0));

        let features = build("page=abc&limit=xyz");
        assert_eq!(features.spec().page, 1);
        assert_eq!(features.spec().limit, 100);

        let features = build("limit=50000");
        assert_eq!(features.spec().limit, MAX_LIMIT);
    }

    #[test]
    fn test_steps_compose_in_any_order() {
        let params = QueryParams::parse("page=2&limit=5&sort=name&role=user");
        let forward = ApiFeatures::new(FindQuery::default(), params.clone(), FIELDS)
            .filter()
            .sort()
            .limit_fields()
            .paginate();
        let reversed = ApiFeatures::new(FindQuery::default(), params, FIELDS)
            .paginate()
            .limit_fields()
            .sort()
            .filter();

        assert_eq!(forward.spec(), reversed.spec());
        assert_eq!(forward.query().filter, reversed.query().filter);
    }
}
