use crate::domain::model::{NewOrderRecord, OrderStatus, OrderUpdate, StepPayload};
use crate::domain::ports::{OrderStore, SessionProvider};
use chrono::Utc;
use std::sync::Arc;

/// 步驟標籤化的訂單紀錄漸進式 upsert
///
/// 持久化是盡力而為:任何失敗只記錄日誌,永不阻斷使用者的下一步。
pub struct OrderPersister {
    store: Arc<dyn OrderStore>,
    session: Arc<dyn SessionProvider>,
}

impl OrderPersister {
    pub fn new(store: Arc<dyn OrderStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self { store, session }
    }

    /// `save(existing_id, payload) -> new_id`
    ///
    /// 紀錄 id 只在第一次 select-plan 寫入時產生;其後的寫入只觸碰
    /// 該步驟標籤對應的欄位,永不刪除先前步驟寫入的值。
    pub async fn save(&self, existing_id: Option<&str>, payload: &StepPayload) -> Option<String> {
        match existing_id {
            None => self.open_record(payload).await,
            Some(id) => self.update_record(id, payload).await,
        }
    }

    async fn open_record(&self, payload: &StepPayload) -> Option<String> {
        let StepPayload::SelectPlan {
            package_id,
            package_name,
        } = payload
        else {
            // 協議違規:沒有既有 id 時只有 select-plan 允許開啟紀錄
            tracing::warn!(
                "🔶 Ignoring '{}' payload without an order id: only select-plan may open a record",
                payload.step_name()
            );
            return None;
        };

        let record = NewOrderRecord {
            status: OrderStatus::Draft,
            user_id: self.session.user_id(),
            package_id: package_id.clone(),
            package_name: package_name.clone(),
            created_at: Utc::now(),
        };

        match self.store.insert(record).await {
            Ok(id) => {
                tracing::debug!("💾 Opened order record {} for package '{}'", id, package_id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("💾 Failed to open order record: {}", e);
                None
            }
        }
    }

    async fn update_record(&self, id: &str, payload: &StepPayload) -> Option<String> {
        let mut update = update_for_step(payload);
        // 會話身份是機會性附加:有就帶上,沒有不擋路
        update.user_id = self.session.user_id();

        match self.store.update(id, update).await {
            Ok(()) => {
                tracing::debug!("💾 Updated order record {} at step '{}'", id, payload.step_name());
            }
            Err(e) => {
                tracing::warn!(
                    "💾 Failed to persist step '{}' for order {}: {}",
                    payload.step_name(),
                    id,
                    e
                );
            }
        }

        Some(id.to_string())
    }
}

/// 由步驟標籤推導更新欄位集;對 StepPayload 的全函數(窮盡比對)
fn update_for_step(payload: &StepPayload) -> OrderUpdate {
    match payload {
        StepPayload::SelectPlan {
            package_id,
            package_name,
        } => OrderUpdate {
            package_id: Some(package_id.clone()),
            package_name: Some(package_name.clone()),
            ..Default::default()
        },
        StepPayload::Checkout {
            first_name,
            last_name,
            email,
            phone,
            business_name,
            province_code,
            province_name,
            city,
        } => OrderUpdate {
            first_name: Some(first_name.clone()),
            last_name: Some(last_name.clone()),
            email: Some(email.clone()),
            phone: Some(phone.clone()),
            business_name: business_name.clone(),
            province_code: Some(province_code.clone()),
            province_name: Some(province_name.clone()),
            city: Some(city.clone()),
            ..Default::default()
        },
        StepPayload::Subscribe {
            subscription_years,
            duration_months,
            addon_quantities,
            subscription_addon_selections,
        } => OrderUpdate {
            subscription_years: Some(*subscription_years),
            duration_months: Some(*duration_months),
            addon_quantities: Some(addon_quantities.clone()),
            subscription_addon_selections: Some(subscription_addon_selections.clone()),
            ..Default::default()
        },
        // 終端步驟:蓋上送出時間戳並標記 pending
        StepPayload::Billing { amount, promo_code } => OrderUpdate {
            amount: *amount,
            promo_code: Some(promo_code.clone()),
            submitted_at: Some(Utc::now()),
            status: Some(OrderStatus::Pending),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryOrderStore;
    use crate::domain::ports::AnonymousSession;
    use crate::utils::error::{FunnelError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedSession {
        user_id: String,
    }

    impl SessionProvider for FixedSession {
        fn user_id(&self) -> Option<String> {
            Some(self.user_id.clone())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl OrderStore for BrokenStore {
        async fn insert(&self, _record: NewOrderRecord) -> Result<String> {
            Err(FunnelError::StoreError {
                message: "insert rejected".to_string(),
            })
        }

        async fn update(&self, _id: &str, _update: OrderUpdate) -> Result<()> {
            Err(FunnelError::StoreError {
                message: "update rejected".to_string(),
            })
        }

        async fn fetch(&self, _id: &str) -> Result<Option<crate::domain::model::OrderRecord>> {
            Ok(None)
        }
    }

    fn select_plan() -> StepPayload {
        StepPayload::SelectPlan {
            package_id: "P1".to_string(),
            package_name: "Growth".to_string(),
        }
    }

    fn checkout() -> StepPayload {
        StepPayload::Checkout {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "0812345678".to_string(),
            business_name: None,
            province_code: "10".to_string(),
            province_name: "Bangkok".to_string(),
            city: "Bangkok".to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_select_plan_without_id_is_a_protocol_violation() {
        let store = Arc::new(MemoryOrderStore::new());
        let persister = OrderPersister::new(store.clone(), Arc::new(AnonymousSession));

        let result = persister.save(None, &checkout()).await;

        assert!(result.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_select_plan_opens_draft_record() {
        let store = Arc::new(MemoryOrderStore::new());
        let persister = OrderPersister::new(store.clone(), Arc::new(AnonymousSession));

        let id = persister.save(None, &select_plan()).await.unwrap();

        let record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(record.status, OrderStatus::Draft);
        assert_eq!(record.package_id.as_deref(), Some("P1"));
        assert_eq!(record.package_name.as_deref(), Some("Growth"));
        assert!(record.submitted_at.is_none());
    }

    #[tokio::test]
    async fn test_checkout_update_leaves_package_fields_unchanged() {
        let store = Arc::new(MemoryOrderStore::new());
        let persister = OrderPersister::new(store.clone(), Arc::new(AnonymousSession));

        let id = persister.save(None, &select_plan()).await.unwrap();
        let same_id = persister.save(Some(&id), &checkout()).await.unwrap();

        assert_eq!(same_id, id);
        let record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(record.package_id.as_deref(), Some("P1"));
        assert_eq!(record.first_name.as_deref(), Some("Ada"));
        assert_eq!(record.city.as_deref(), Some("Bangkok"));
        assert_eq!(record.status, OrderStatus::Draft);
    }

    #[tokio::test]
    async fn test_subscribe_update_touches_only_subscription_fields() {
        let store = Arc::new(MemoryOrderStore::new());
        let persister = OrderPersister::new(store.clone(), Arc::new(AnonymousSession));

        let id = persister.save(None, &select_plan()).await.unwrap();

        let mut quantities = HashMap::new();
        quantities.insert("pages".to_string(), 2u32);
        let mut selections = HashMap::new();
        selections.insert("line-oa".to_string(), true);

        persister
            .save(
                Some(&id),
                &StepPayload::Subscribe {
                    subscription_years: 2,
                    duration_months: 24,
                    addon_quantities: quantities,
                    subscription_addon_selections: selections,
                },
            )
            .await;

        let record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(record.subscription_years, Some(2));
        assert_eq!(record.duration_months, Some(24));
        assert_eq!(record.package_id.as_deref(), Some("P1"));
        assert!(record.first_name.is_none());
    }

    #[tokio::test]
    async fn test_billing_stamps_submission_and_marks_pending() {
        let store = Arc::new(MemoryOrderStore::new());
        let persister = OrderPersister::new(store.clone(), Arc::new(AnonymousSession));

        let id = persister.save(None, &select_plan()).await.unwrap();
        persister
            .save(
                Some(&id),
                &StepPayload::Billing {
                    amount: Some(150000.0),
                    promo_code: "WELCOME10".to_string(),
                },
            )
            .await;

        let record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.amount, Some(150000.0));
        assert_eq!(record.promo_code.as_deref(), Some("WELCOME10"));
        assert!(record.submitted_at.is_some());
    }

    #[tokio::test]
    async fn test_session_user_id_is_attached_when_available() {
        let store = Arc::new(MemoryOrderStore::new());
        let session = Arc::new(FixedSession {
            user_id: "user-7".to_string(),
        });
        let persister = OrderPersister::new(store.clone(), session);

        let id = persister.save(None, &select_plan()).await.unwrap();
        persister.save(Some(&id), &checkout()).await;

        let record = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(record.user_id.as_deref(), Some("user-7"));
    }

    #[tokio::test]
    async fn test_insert_failure_degrades_to_none() {
        let persister = OrderPersister::new(Arc::new(BrokenStore), Arc::new(AnonymousSession));

        assert!(persister.save(None, &select_plan()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_failure_never_blocks_the_funnel() {
        let persister = OrderPersister::new(Arc::new(BrokenStore), Arc::new(AnonymousSession));

        // 更新失敗只記錄日誌,呼叫端仍拿回原本的 id 繼續前進
        let result = persister.save(Some("X"), &checkout()).await;
        assert_eq!(result.as_deref(), Some("X"));
    }
}
