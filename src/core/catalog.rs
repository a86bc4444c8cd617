use crate::domain::model::{AddOnItem, SubscriptionAddOn};
use crate::domain::ports::{AddOnCatalogSource, SubscriptionAddOnSource};
use std::collections::HashMap;
use std::sync::Arc;

/// 按量計價加購目錄;讀取失敗一律靜默退化為空清單
pub struct AddOnCatalog {
    source: Arc<dyn AddOnCatalogSource>,
}

impl AddOnCatalog {
    pub fn new(source: Arc<dyn AddOnCatalogSource>) -> Self {
        Self { source }
    }

    /// 載入方案的有效加購項目,依 sort_order 升冪
    ///
    /// 空方案 id 直接回傳空清單且不發出網路請求。
    pub async fn load(&self, package_id: Option<&str>) -> Vec<AddOnItem> {
        let Some(package_id) = package_id.filter(|id| !id.is_empty()) else {
            return Vec::new();
        };

        match self.source.fetch_addons(package_id).await {
            Ok(mut items) => {
                items.sort_by_key(|item| item.sort_order);
                items
            }
            Err(e) => {
                // 零加購是合法的訂單狀態,不阻斷流程
                tracing::warn!("Add-on catalog fetch failed for '{}': {}", package_id, e);
                Vec::new()
            }
        }
    }
}

/// 總價 = Σ 單價 × 數量;缺少的數量視為 0
pub fn quantity_total(items: &[AddOnItem], quantities: &HashMap<String, u32>) -> f64 {
    items
        .iter()
        .map(|item| {
            let quantity = quantities.get(&item.id).copied().unwrap_or(0);
            item.price_per_unit * f64::from(quantity)
        })
        .sum()
}

/// 訂閱制加購目錄:主來源失敗才落到備援來源(兩層備援)
pub struct SubscriptionCatalog {
    primary: Arc<dyn SubscriptionAddOnSource>,
    fallback: Arc<dyn SubscriptionAddOnSource>,
}

impl SubscriptionCatalog {
    pub fn new(
        primary: Arc<dyn SubscriptionAddOnSource>,
        fallback: Arc<dyn SubscriptionAddOnSource>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// 兩層解析:任一層成功即填入清單,兩層皆失敗退化為空清單
    pub async fn load(&self, package_id: Option<&str>) -> Vec<SubscriptionAddOn> {
        let Some(package_id) = package_id.filter(|id| !id.is_empty()) else {
            return Vec::new();
        };

        let mut items = match self.primary.fetch_subscription_addons(package_id).await {
            Ok(items) => items,
            Err(primary_error) => {
                tracing::warn!(
                    "Primary subscription add-on source failed for '{}', falling back: {}",
                    package_id,
                    primary_error
                );
                match self.fallback.fetch_subscription_addons(package_id).await {
                    Ok(items) => items,
                    Err(fallback_error) => {
                        tracing::warn!(
                            "Fallback subscription add-on source failed for '{}': {}",
                            package_id,
                            fallback_error
                        );
                        return Vec::new();
                    }
                }
            }
        };

        items.sort_by_key(|item| item.sort_order);
        items
    }
}

/// 總價 = Σ 已勾選項目的固定價格;未勾選或不存在的 id 貢獻 0
pub fn selection_total(items: &[SubscriptionAddOn], selections: &HashMap<String, bool>) -> f64 {
    items
        .iter()
        .filter(|item| selections.get(&item.id).copied().unwrap_or(false))
        .map(|item| item.price_fixed)
        .sum()
}
