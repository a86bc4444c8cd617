use crate::domain::model::{NewOrderRecord, OrderRecord, OrderUpdate};
use crate::domain::ports::OrderStore;
use crate::utils::error::{FunnelError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 內嵌式訂單存放區,供測試與單機情境使用;id 為隨機 uuid
#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    records: Arc<Mutex<HashMap<String, OrderRecord>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, record: NewOrderRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut records = self.records.lock().await;
        records.insert(id.clone(), OrderRecord::from_new(id.clone(), record));
        Ok(id)
    }

    async fn update(&self, id: &str, update: OrderUpdate) -> Result<()> {
        let mut records = self.records.lock().await;
        let record = records.get_mut(id).ok_or_else(|| FunnelError::StoreError {
            message: format!("Order record not found: {}", id),
        })?;
        update.apply_to(record);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<OrderRecord>> {
        let records = self.records.lock().await;
        Ok(records.get(id).cloned())
    }
}
