pub mod identity_user;

pub use identity_user::IdentityUser;
