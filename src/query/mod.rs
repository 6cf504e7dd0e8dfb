//! 목록 조회용 쿼리 빌더
//!
//! - [`condition`] - `field[op]=value` 해석과 BSON 변환
//! - [`features`] - filter / sort / limit_fields / paginate 체이닝 빌더

pub mod condition;
pub mod features;

pub use condition::{Condition, FieldFilter, FieldType, FieldTypes, FilterValue, Operator};
pub use features::{ApiFeatures, FindQuery, Projection, QueryParams, QuerySpec, SortKey};
