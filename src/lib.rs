pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::infra::{db::Db, storage::ObjectStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub storage: ObjectStorage,
    pub upload_max_bytes: usize,
}
