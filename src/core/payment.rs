use crate::domain::model::{InvoiceReceipt, InvoiceRequest, PaymentSettings};
use crate::domain::ports::PaymentGateway;
use crate::utils::error::{FunnelError, Result};
use crate::utils::validation::{
    validate_email, validate_finite_positive, validate_string_length, Validate,
};
use std::sync::Arc;

/// 權限不足時給使用者的可行動訊息,取代後端原始錯誤字串
const PERMISSION_HELP_MESSAGE: &str = "PayPal rejected the invoice request due to missing \
permissions. Enable the Invoicing scope for this app in the PayPal developer dashboard, \
then try again.";

const GENERIC_INVOICE_FAILURE: &str = "Invoice creation failed. Please try again later.";

impl Validate for InvoiceRequest {
    fn validate(&self) -> Result<()> {
        validate_finite_positive("amount", self.amount)?;
        if self.subscription_years == 0 {
            return Err(FunnelError::ValidationError {
                field: "subscription_years".to_string(),
                reason: "Must be a positive integer".to_string(),
            });
        }
        validate_string_length("promo_code", &self.promo_code, 0, 64)?;
        validate_string_length("domain", &self.domain, 1, 253)?;
        validate_string_length("template_id", &self.template_id, 1, 128)?;
        validate_string_length("template_name", &self.template_name, 0, 200)?;
        validate_string_length("customer_name", &self.customer_name, 1, 120)?;
        validate_string_length("customer_email", &self.customer_email, 1, 255)?;
        validate_email("customer_email", &self.customer_email)?;
        Ok(())
    }
}

/// 金流設定解析:單次請求,不重試
pub struct PaymentSettingsResolver {
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentSettingsResolver {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// 成功需要回應確認旗標為真;enabled 缺席時預設為啟用
    ///
    /// 傳輸失敗或未確認的回應回傳單一錯誤訊息,readiness 維持 false。
    pub async fn resolve(&self) -> Result<PaymentSettings> {
        let response = self.gateway.fetch_settings().await.map_err(|e| {
            tracing::warn!("Payment settings fetch failed: {}", e);
            FunnelError::GatewayError {
                message: format!("Payment settings unavailable: {}", e),
            }
        })?;

        if !response.ok {
            return Err(FunnelError::GatewayError {
                message: "Payment settings request was not acknowledged by the backend"
                    .to_string(),
            });
        }

        let enabled = response.enabled.unwrap_or(true);
        let ready = enabled && response.client_id.is_some();

        Ok(PaymentSettings {
            environment: response.env,
            enabled,
            client_id: response.client_id,
            ready,
        })
    }
}

/// 發票請求提交:先驗證、後送出,並翻譯後端錯誤為使用者可讀訊息
pub struct InvoiceRequester {
    gateway: Arc<dyn PaymentGateway>,
}

impl InvoiceRequester {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// 驗證失敗同步拒絕,不發出任何請求
    pub async fn submit(&self, request: &InvoiceRequest) -> Result<InvoiceReceipt> {
        request.validate()?;

        let response = self.gateway.create_invoice(request).await.map_err(|e| {
            tracing::warn!("Invoice request transport failure: {}", e);
            FunnelError::GatewayError {
                message: friendly_failure_message(&e.to_string()),
            }
        })?;

        if !response.ok {
            let raw = response.error.unwrap_or_default();
            return Err(FunnelError::GatewayError {
                message: friendly_failure_message(&raw),
            });
        }

        // 傳輸成功仍需明確的成功旗標與非空發票網址
        let invoice_url = match response.invoice_url {
            Some(url) if !url.is_empty() => url,
            _ => {
                return Err(FunnelError::GatewayError {
                    message: "Invoice service acknowledged the request but returned no \
                              invoice URL"
                        .to_string(),
                });
            }
        };

        tracing::debug!("📡 Invoice created: {}", invoice_url);
        Ok(InvoiceReceipt {
            invoice_url,
            order_db_id: response.order_db_id,
        })
    }
}

/// 權限類錯誤換成指名儀表板動作的訊息;其餘保留原始訊息或通用退路
fn friendly_failure_message(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if lowered.contains("forbidden")
        || lowered.contains("insufficient permission")
        || lowered.contains("not authorized")
    {
        return PERMISSION_HELP_MESSAGE.to_string();
    }
    if raw.trim().is_empty() {
        return GENERIC_INVOICE_FAILURE.to_string();
    }
    raw.to_string()
}
