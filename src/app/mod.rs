pub mod auth;
pub mod credentials;
pub mod engagement;
pub mod media;
pub mod posts;
pub mod social;
pub mod users;
