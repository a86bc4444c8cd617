use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 候選域名(正規化關鍵字 + 後綴),僅存在於單次查詢週期,不落地
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCandidate {
    pub domain: String,
}

/// 域名查詢狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Available,
    Unavailable,
    Premium,
    Blocked,
    Unknown,
}

impl DomainStatus {
    /// 後端 availability 字串對應表,未知值一律視為 Unknown
    pub fn from_availability(raw: &str) -> Self {
        match raw {
            "true" => DomainStatus::Available,
            "false" => DomainStatus::Unavailable,
            "premium" => DomainStatus::Premium,
            "blocked" => DomainStatus::Blocked,
            _ => DomainStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainPrice {
    pub amount: f64,
    pub currency: String,
}

/// 單一域名的查詢結果,每個解析週期整批重建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSuggestion {
    pub domain: String,
    pub status: DomainStatus,
    pub price: Option<DomainPrice>,
}

/// 按量計價的加購項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnItem {
    pub id: String,
    pub label: String,
    pub price_per_unit: f64,
    pub unit: String,
    pub unit_step: u32,
    pub max_quantity: Option<u32>,
    pub sort_order: i32,
}

/// 固定價格的訂閱制加購項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionAddOn {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub price_fixed: f64,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEnvironment {
    Sandbox,
    Production,
}

/// 金流設定解析結果;ready = enabled 且 client_id 存在
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub environment: PaymentEnvironment,
    pub enabled: bool,
    pub client_id: Option<String>,
    pub ready: bool,
}

/// 金流設定的後端原始回應;readiness 由 core 計算
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettingsResponse {
    pub ok: bool,
    pub env: PaymentEnvironment,
    pub enabled: Option<bool>,
    pub client_id: Option<String>,
}

/// 發票建立請求,送出前必須通過結構驗證
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub amount: f64,
    pub subscription_years: u32,
    #[serde(default)]
    pub promo_code: String,
    pub domain: String,
    pub template_id: String,
    #[serde(default)]
    pub template_name: String,
    pub customer_name: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceResponse {
    pub ok: bool,
    pub invoice_url: Option<String>,
    pub order_db_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceReceipt {
    pub invoice_url: String,
    pub order_db_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Draft,
    Pending,
}

/// 各表單步驟的帶標籤載荷;標籤決定持久化時允許觸碰的欄位集合
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum StepPayload {
    SelectPlan {
        package_id: String,
        package_name: String,
    },
    Checkout {
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        business_name: Option<String>,
        province_code: String,
        province_name: String,
        city: String,
    },
    Subscribe {
        subscription_years: u32,
        duration_months: u32,
        addon_quantities: HashMap<String, u32>,
        subscription_addon_selections: HashMap<String, bool>,
    },
    Billing {
        amount: Option<f64>,
        promo_code: String,
    },
}

impl StepPayload {
    pub fn step_name(&self) -> &'static str {
        match self {
            StepPayload::SelectPlan { .. } => "select-plan",
            StepPayload::Checkout { .. } => "checkout",
            StepPayload::Subscribe { .. } => "subscribe",
            StepPayload::Billing { .. } => "billing",
        }
    }
}

/// 首次 select-plan 寫入時建立的新紀錄
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderRecord {
    pub status: OrderStatus,
    pub user_id: Option<String>,
    pub package_id: String,
    pub package_name: String,
    pub created_at: DateTime<Utc>,
}

/// 訂單行銷紀錄的完整列形狀(步驟載荷聯集的攤平欄位)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub status: OrderStatus,
    pub user_id: Option<String>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub province_code: Option<String>,
    pub province_name: Option<String>,
    pub city: Option<String>,
    pub subscription_years: Option<u32>,
    pub duration_months: Option<u32>,
    pub addon_quantities: Option<HashMap<String, u32>>,
    pub subscription_addon_selections: Option<HashMap<String, bool>>,
    pub amount: Option<f64>,
    pub promo_code: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn from_new(id: String, record: NewOrderRecord) -> Self {
        Self {
            id,
            status: record.status,
            user_id: record.user_id,
            package_id: Some(record.package_id),
            package_name: Some(record.package_name),
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            business_name: None,
            province_code: None,
            province_name: None,
            city: None,
            subscription_years: None,
            duration_months: None,
            addon_quantities: None,
            subscription_addon_selections: None,
            amount: None,
            promo_code: None,
            submitted_at: None,
            created_at: record.created_at,
        }
    }
}

/// 部分更新集:None 欄位不觸碰既有值,已寫入的欄位永不被刪除
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addon_quantities: Option<HashMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_addon_selections: Option<HashMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    /// 將更新集套用到既有紀錄,僅覆寫 Some 欄位
    pub fn apply_to(&self, record: &mut OrderRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(user_id) = &self.user_id {
            record.user_id = Some(user_id.clone());
        }
        if let Some(package_id) = &self.package_id {
            record.package_id = Some(package_id.clone());
        }
        if let Some(package_name) = &self.package_name {
            record.package_name = Some(package_name.clone());
        }
        if let Some(first_name) = &self.first_name {
            record.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            record.last_name = Some(last_name.clone());
        }
        if let Some(email) = &self.email {
            record.email = Some(email.clone());
        }
        if let Some(phone) = &self.phone {
            record.phone = Some(phone.clone());
        }
        if let Some(business_name) = &self.business_name {
            record.business_name = Some(business_name.clone());
        }
        if let Some(province_code) = &self.province_code {
            record.province_code = Some(province_code.clone());
        }
        if let Some(province_name) = &self.province_name {
            record.province_name = Some(province_name.clone());
        }
        if let Some(city) = &self.city {
            record.city = Some(city.clone());
        }
        if let Some(subscription_years) = self.subscription_years {
            record.subscription_years = Some(subscription_years);
        }
        if let Some(duration_months) = self.duration_months {
            record.duration_months = Some(duration_months);
        }
        if let Some(addon_quantities) = &self.addon_quantities {
            record.addon_quantities = Some(addon_quantities.clone());
        }
        if let Some(selections) = &self.subscription_addon_selections {
            record.subscription_addon_selections = Some(selections.clone());
        }
        if let Some(amount) = self.amount {
            record.amount = Some(amount);
        }
        if let Some(promo_code) = &self.promo_code {
            record.promo_code = Some(promo_code.clone());
        }
        if let Some(submitted_at) = self.submitted_at {
            record.submitted_at = Some(submitted_at);
        }
    }
}
