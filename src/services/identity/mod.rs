//! 외부 아이덴티티 프로바이더 연동
//!
//! - [`identity_provider`] - 서비스가 의존하는 trait
//! - [`auth0_client`] - Auth0 Management API 구현

pub mod auth0_client;
pub mod identity_provider;

pub use auth0_client::Auth0Client;
pub use identity_provider::IdentityProvider;
