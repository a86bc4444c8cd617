use crate::domain::model::{
    AddOnItem, DomainSuggestion, GatewaySettingsResponse, InvoiceRequest, InvoiceResponse,
    NewOrderRecord, OrderRecord, OrderUpdate, SubscriptionAddOn,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 單一候選域名的遠端可用性查詢
#[async_trait]
pub trait DomainChecker: Send + Sync {
    async fn check(&self, domain: &str) -> Result<DomainSuggestion>;
}

/// 按量計價加購目錄的資料來源
#[async_trait]
pub trait AddOnCatalogSource: Send + Sync {
    async fn fetch_addons(&self, package_id: &str) -> Result<Vec<AddOnItem>>;
}

/// 訂閱制加購目錄的資料來源(主來源與備援來源共用同一介面)
#[async_trait]
pub trait SubscriptionAddOnSource: Send + Sync {
    async fn fetch_subscription_addons(&self, package_id: &str) -> Result<Vec<SubscriptionAddOn>>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn fetch_settings(&self) -> Result<GatewaySettingsResponse>;
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<InvoiceResponse>;
}

/// 訂單行銷紀錄存放區;insert 回傳後端產生的紀錄 id
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, record: NewOrderRecord) -> Result<String>;
    async fn update(&self, id: &str, update: OrderUpdate) -> Result<()>;
    async fn fetch(&self, id: &str) -> Result<Option<OrderRecord>>;
}

/// 呼叫端注入的會話供應者:只讀取身份與語系,不管理它們
pub trait SessionProvider: Send + Sync {
    fn user_id(&self) -> Option<String>;

    fn locale(&self) -> &str {
        "en"
    }

    /// 翻譯字串查找屬外部協作者;預設直接回傳鍵值
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// 未登入時的預設會話
pub struct AnonymousSession;

impl SessionProvider for AnonymousSession {
    fn user_id(&self) -> Option<String> {
        None
    }
}
