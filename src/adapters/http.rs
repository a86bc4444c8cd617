use crate::config::FunnelConfig;
use crate::domain::model::{
    AddOnItem, DomainPrice, DomainStatus, DomainSuggestion, GatewaySettingsResponse,
    InvoiceRequest, InvoiceResponse, NewOrderRecord, OrderRecord, OrderUpdate, SubscriptionAddOn,
};
use crate::domain::ports::{
    AddOnCatalogSource, DomainChecker, OrderStore, PaymentGateway, SubscriptionAddOnSource,
};
use crate::utils::error::{FunnelError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn build_client(config: &FunnelConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.backend.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout));
    }
    Ok(builder.build()?)
}

fn trimmed_base_url(config: &FunnelConfig) -> String {
    config.backend.base_url.trim_end_matches('/').to_string()
}

#[derive(Serialize)]
struct CheckDomainBody<'a> {
    domain: &'a str,
}

#[derive(Deserialize)]
struct CheckDomainResponse {
    availability: String,
    price: Option<f64>,
    currency: Option<String>,
}

#[derive(Serialize)]
struct PackageBody<'a> {
    package_id: &'a str,
}

/// 發票建立的線上格式:amount 欄位沿用後端的舊鍵名
#[derive(Serialize)]
struct CreateInvoiceBody<'a> {
    #[serde(rename = "package_price")]
    amount: f64,
    subscription_years: u32,
    promo_code: &'a str,
    domain: &'a str,
    template_id: &'a str,
    template_name: &'a str,
    customer_name: &'a str,
    customer_email: &'a str,
}

#[derive(Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
}

/// 後端遠端函數的 reqwest 實作
///
/// 同時覆蓋域名檢查、按量加購目錄、訂閱加購主來源與金流閘道。
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &FunnelConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: trimmed_base_url(config),
        })
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/fn/{}", self.base_url, name)
    }

    fn table_url(&self, name: &str) -> String {
        format!("{}/tables/{}", self.base_url, name)
    }

    async fn post_function<B: Serialize, T: DeserializeOwned>(
        &self,
        name: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("📡 Calling backend function: {}", name);
        let response = self
            .client
            .post(self.function_url(name))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FunnelError::BackendError {
                message: format!(
                    "Backend function '{}' failed with status: {}",
                    name,
                    response.status()
                ),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DomainChecker for HttpBackend {
    async fn check(&self, domain: &str) -> Result<DomainSuggestion> {
        let response: CheckDomainResponse = self
            .post_function("check-domain", &CheckDomainBody { domain })
            .await?;

        let price = match (response.price, response.currency) {
            (Some(amount), Some(currency)) => Some(DomainPrice { amount, currency }),
            _ => None,
        };

        Ok(DomainSuggestion {
            domain: domain.to_string(),
            status: DomainStatus::from_availability(&response.availability),
            price,
        })
    }
}

#[async_trait]
impl AddOnCatalogSource for HttpBackend {
    async fn fetch_addons(&self, package_id: &str) -> Result<Vec<AddOnItem>> {
        let response = self
            .client
            .get(self.table_url("marketing_addons"))
            .query(&[("package_id", package_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FunnelError::BackendError {
                message: format!(
                    "Add-on catalog read failed with status: {}",
                    response.status()
                ),
            });
        }

        let envelope: ItemsEnvelope<AddOnItem> = response.json().await?;
        Ok(envelope.items)
    }
}

#[async_trait]
impl SubscriptionAddOnSource for HttpBackend {
    /// 主來源:後端函數,可見性規則由後端保證
    async fn fetch_subscription_addons(&self, package_id: &str) -> Result<Vec<SubscriptionAddOn>> {
        let envelope: ItemsEnvelope<SubscriptionAddOn> = self
            .post_function("subscription-addons", &PackageBody { package_id })
            .await?;
        Ok(envelope.items)
    }
}

#[async_trait]
impl PaymentGateway for HttpBackend {
    async fn fetch_settings(&self) -> Result<GatewaySettingsResponse> {
        self.post_function("paypal-settings", &serde_json::json!({}))
            .await
    }

    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<InvoiceResponse> {
        let body = CreateInvoiceBody {
            amount: request.amount,
            subscription_years: request.subscription_years,
            promo_code: &request.promo_code,
            domain: &request.domain,
            template_id: &request.template_id,
            template_name: &request.template_name,
            customer_name: &request.customer_name,
            customer_email: &request.customer_email,
        };

        let response = self
            .client
            .post(self.function_url("create-invoice"))
            .json(&body)
            .send()
            .await?;

        // 後端以 4xx 帶錯誤載荷回覆時,仍交給上層檢視錯誤訊息
        if !response.status().is_success() {
            let status = response.status();
            if let Ok(parsed) = response.json::<InvoiceResponse>().await {
                return Ok(parsed);
            }
            return Err(FunnelError::BackendError {
                message: format!("Invoice creation failed with status: {}", status),
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct SubscriptionAddOnRow {
    id: String,
    label: String,
    description: Option<String>,
    price_fixed: f64,
    is_active: Option<bool>,
    sort_order: i32,
}

/// 訂閱加購的備援來源:直接過濾資料表
///
/// 僅此層將缺席的 is_active 視為啟用;主來源沒有這種寬容。
pub struct TableSubscriptionSource {
    client: Client,
    base_url: String,
}

impl TableSubscriptionSource {
    pub fn new(config: &FunnelConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: trimmed_base_url(config),
        })
    }
}

#[async_trait]
impl SubscriptionAddOnSource for TableSubscriptionSource {
    async fn fetch_subscription_addons(&self, package_id: &str) -> Result<Vec<SubscriptionAddOn>> {
        let response = self
            .client
            .get(format!("{}/tables/subscription_addons", self.base_url))
            .query(&[("package_id", package_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FunnelError::BackendError {
                message: format!(
                    "Subscription add-on table read failed with status: {}",
                    response.status()
                ),
            });
        }

        let envelope: ItemsEnvelope<SubscriptionAddOnRow> = response.json().await?;
        let mut items: Vec<SubscriptionAddOn> = envelope
            .items
            .into_iter()
            .filter(|row| row.is_active.unwrap_or(true))
            .map(|row| SubscriptionAddOn {
                id: row.id,
                label: row.label,
                description: row.description,
                price_fixed: row.price_fixed,
                is_active: true,
                sort_order: row.sort_order,
            })
            .collect();
        items.sort_by_key(|item| item.sort_order);
        Ok(items)
    }
}

#[derive(Deserialize)]
struct InsertedRow {
    id: String,
}

/// 訂單行銷紀錄表的 HTTP 實作
pub struct HttpOrderStore {
    client: Client,
    base_url: String,
}

impl HttpOrderStore {
    pub fn new(config: &FunnelConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: trimmed_base_url(config),
        })
    }

    fn row_url(&self, id: &str) -> String {
        format!("{}/tables/order_marketing/{}", self.base_url, id)
    }
}

#[async_trait]
impl OrderStore for HttpOrderStore {
    async fn insert(&self, record: NewOrderRecord) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/tables/order_marketing", self.base_url))
            .json(&record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FunnelError::StoreError {
                message: format!("Order insert failed with status: {}", response.status()),
            });
        }

        let row: InsertedRow = response.json().await?;
        Ok(row.id)
    }

    async fn update(&self, id: &str, update: OrderUpdate) -> Result<()> {
        let response = self
            .client
            .patch(self.row_url(id))
            .json(&update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FunnelError::StoreError {
                message: format!(
                    "Order update for '{}' failed with status: {}",
                    id,
                    response.status()
                ),
            });
        }

        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<OrderRecord>> {
        let response = self.client.get(self.row_url(id)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FunnelError::StoreError {
                message: format!(
                    "Order fetch for '{}' failed with status: {}",
                    id,
                    response.status()
                ),
            });
        }

        Ok(Some(response.json().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&FunnelConfig::with_base_url(&server.base_url())).unwrap()
    }

    #[tokio::test]
    async fn test_check_domain_maps_availability_string() {
        let server = MockServer::start();
        let check_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/fn/check-domain")
                .json_body(serde_json::json!({"domain": "foo.com"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"availability": "premium", "price": 2990.0, "currency": "THB"}));
        });

        let backend = backend_for(&server);
        let suggestion = backend.check("foo.com").await.unwrap();

        check_mock.assert();
        assert_eq!(suggestion.status, DomainStatus::Premium);
        let price = suggestion.price.unwrap();
        assert_eq!(price.amount, 2990.0);
        assert_eq!(price.currency, "THB");
    }

    #[tokio::test]
    async fn test_check_domain_unknown_mapping_and_no_price() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/fn/check-domain");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"availability": "weird"}));
        });

        let backend = backend_for(&server);
        let suggestion = backend.check("foo.com").await.unwrap();

        assert_eq!(suggestion.status, DomainStatus::Unknown);
        assert!(suggestion.price.is_none());
    }

    #[tokio::test]
    async fn test_check_domain_server_error_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/fn/check-domain");
            then.status(500);
        });

        let backend = backend_for(&server);
        assert!(backend.check("foo.com").await.is_err());
    }

    #[tokio::test]
    async fn test_create_invoice_uses_legacy_amount_key() {
        let server = MockServer::start();
        let invoice_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/fn/create-invoice")
                .json_body_partial(r#"{"package_price": 150000.0, "domain": "myshop.com"}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "ok": true,
                    "invoice_url": "https://pay.example.com/inv/1",
                    "order_db_id": "ord-1"
                }));
        });

        let backend = backend_for(&server);
        let request = InvoiceRequest {
            amount: 150000.0,
            subscription_years: 1,
            promo_code: String::new(),
            domain: "myshop.com".to_string(),
            template_id: "tpl-1".to_string(),
            template_name: String::new(),
            customer_name: "Ada".to_string(),
            customer_email: "ada@example.com".to_string(),
        };

        let response = backend.create_invoice(&request).await.unwrap();
        invoice_mock.assert();
        assert!(response.ok);
        assert_eq!(response.order_db_id.as_deref(), Some("ord-1"));
    }

    #[tokio::test]
    async fn test_create_invoice_parses_error_payload_on_4xx() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/fn/create-invoice");
            then.status(403)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "ok": false,
                    "invoice_url": null,
                    "order_db_id": null,
                    "error": "REQUEST_FORBIDDEN_ERROR"
                }));
        });

        let backend = backend_for(&server);
        let request = InvoiceRequest {
            amount: 100.0,
            subscription_years: 1,
            promo_code: String::new(),
            domain: "x.com".to_string(),
            template_id: "tpl".to_string(),
            template_name: String::new(),
            customer_name: "Ada".to_string(),
            customer_email: "ada@example.com".to_string(),
        };

        let response = backend.create_invoice(&request).await.unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("REQUEST_FORBIDDEN_ERROR"));
    }

    #[tokio::test]
    async fn test_table_source_filters_inactive_and_sorts() {
        let server = MockServer::start();
        let table_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/tables/subscription_addons")
                .query_param("package_id", "P1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"items": [
                    {"id": "b", "label": "B", "description": null, "price_fixed": 200.0, "is_active": true, "sort_order": 2},
                    {"id": "off", "label": "Off", "description": null, "price_fixed": 900.0, "is_active": false, "sort_order": 0},
                    {"id": "a", "label": "A", "description": null, "price_fixed": 100.0, "sort_order": 1}
                ]}));
        });

        let source =
            TableSubscriptionSource::new(&FunnelConfig::with_base_url(&server.base_url())).unwrap();
        let items = source.fetch_subscription_addons("P1").await.unwrap();

        table_mock.assert();
        // is_active 缺席的列在備援層被視為啟用
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(items.iter().all(|i| i.is_active));
    }

    #[tokio::test]
    async fn test_order_store_insert_update_fetch() {
        let server = MockServer::start();
        let insert_mock = server.mock(|when, then| {
            when.method(POST).path("/tables/order_marketing");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": "row-1"}));
        });
        let update_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/tables/order_marketing/row-1")
                .json_body_partial(r#"{"first_name": "Ada"}"#);
            then.status(204);
        });

        let store = HttpOrderStore::new(&FunnelConfig::with_base_url(&server.base_url())).unwrap();

        let id = store
            .insert(NewOrderRecord {
                status: crate::domain::model::OrderStatus::Draft,
                user_id: None,
                package_id: "P1".to_string(),
                package_name: "Growth".to_string(),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(id, "row-1");

        store
            .update(
                "row-1",
                OrderUpdate {
                    first_name: Some("Ada".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        insert_mock.assert();
        update_mock.assert();
    }

    #[tokio::test]
    async fn test_order_fetch_returns_none_on_404() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tables/order_marketing/missing");
            then.status(404);
        });

        let store = HttpOrderStore::new(&FunnelConfig::with_base_url(&server.base_url())).unwrap();
        assert!(store.fetch("missing").await.unwrap().is_none());
    }
}
