//! Backend whose every call fails, for exercising degradation paths.

use std::time::Duration;

use async_trait::async_trait;

use super::{BackendInfo, RemoteBackend};
use crate::error::{CacheError, Result};

pub(crate) struct FailingBackend;

fn down<T>() -> Result<T> {
    Err(CacheError::BackendUnavailable("down".to_string()))
}

#[async_trait]
impl RemoteBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        down()
    }

    async fn set_ex(&self, _key: &str, _payload: &str, _ttl: Duration) -> Result<()> {
        down()
    }

    async fn delete(&self, _keys: &[String]) -> Result<u64> {
        down()
    }

    async fn scan(&self, _glob: &str) -> Result<Vec<String>> {
        down()
    }

    async fn info(&self) -> Result<BackendInfo> {
        down()
    }
}
