//! HTTP 파라미터 오염(HPP) 방지 미들웨어
//!
//! 같은 쿼리 키가 여러 번 오면 마지막 값만 남깁니다.
//! 화이트리스트에 있는 키는 반복을 그대로 유지하며, 목록 조회에서 `$in` 조건이 됩니다.

use std::collections::HashSet;
use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;

use super::sanitize::replace_query;

pub struct ParameterPollution {
    whitelist: Rc<HashSet<String>>,
}

impl ParameterPollution {
    pub fn new<I, T>(whitelist: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            whitelist: Rc::new(whitelist.into_iter().map(Into::into).collect()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ParameterPollution
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ParameterPollutionService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ParameterPollutionService {
            service: Rc::new(service),
            whitelist: self.whitelist.clone(),
        }))
    }
}

pub struct ParameterPollutionService<S> {
    service: Rc<S>,
    whitelist: Rc<HashSet<String>>,
}

impl<S, B> Service<ServiceRequest> for ParameterPollutionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if !req.query_string().is_empty() {
            let pairs: Vec<(String, String)> =
                url::form_urlencoded::parse(req.query_string().as_bytes())
                    .into_owned()
                    .collect();
            let collapsed = collapse_duplicates(pairs, &self.whitelist);
            replace_query(&mut req, &collapsed);
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// 화이트리스트가 아닌 키의 중복을 마지막 값 하나로 합칩니다.
///
/// 결과 순서는 각 키의 첫 등장 순서를 따릅니다.
pub fn collapse_duplicates(
    pairs: Vec<(String, String)>,
    whitelist: &HashSet<String>,
) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::with_capacity(pairs.len());

    for (key, value) in pairs {
        if whitelist.contains(&key) {
            result.push((key, value));
            continue;
        }
        match result.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => result.push((key, value)),
        }
    }
    result
}
