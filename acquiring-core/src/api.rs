//! Typed acquiring API client

use crate::config::AcquiringConfig;
use crate::decoder::decode;
use crate::error::{AcquiringError, AcquiringResult};
use crate::keys;
use crate::models::{
    AddCardPayload, AttachCardPayload, ChargePayload, Check3DSVersionPayload,
    FinishAuthorizePayload, GetPaymentStatePayload, GetQrPayload, GetSbpBanksPayload,
    GetTerminalPayMethodsPayload, InitPayload, PaymentCard, PaymentId, PaymentInitData,
    RemoveCardPayload, TinkoffPayLinkPayload, TinkoffPayStatusPayload,
};
use crate::request::AcquiringRequest;
use crate::requests::*;
use crate::token::{PasswordTokenProvider, TokenFormation, TokenProvider, parameters_for_token};
use acquiring_http::{Method, NetworkClient, NetworkClientConfig, NetworkRequest};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Client for the acquiring API.
///
/// Signs requests, decodes the response envelope and maps every failure onto
/// [`AcquiringError`]. Cloning is cheap.
#[derive(Clone)]
pub struct AcquiringApi {
    client: NetworkClient,
    config: Arc<AcquiringConfig>,
    token_provider: Arc<dyn TokenProvider>,
}

impl AcquiringApi {
    /// Client signing with the configured terminal password.
    pub fn new(config: AcquiringConfig) -> AcquiringResult<Self> {
        let provider = Arc::new(PasswordTokenProvider::new(config.password.clone()));
        Self::with_token_provider(config, provider)
    }

    /// Client with a custom token provider.
    pub fn with_token_provider(
        config: AcquiringConfig,
        token_provider: Arc<dyn TokenProvider>,
    ) -> AcquiringResult<Self> {
        let network_config = NetworkClientConfig::builder()
            .base_url(config.api_base_url())
            .timeout(config.request_timeout)
            .build();
        let client = NetworkClient::new(network_config)?;
        Ok(Self::with_client(config, client, token_provider))
    }

    /// Client over an existing transport.
    pub fn with_client(
        config: AcquiringConfig,
        client: NetworkClient,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            config: Arc::new(config),
            token_provider,
        }
    }

    pub fn config(&self) -> &AcquiringConfig {
        &self.config
    }

    /// Sign, send and decode a request.
    pub async fn perform_request<R: AcquiringRequest>(&self, request: &R) -> AcquiringResult<R::Payload> {
        let path = request.path();
        let network_request = self.build_request(request).await?;

        debug!(path = %path, method = %request.method(), "Performing acquiring request");
        let response = self.client.perform(&network_request).await.map_err(|e| {
            warn!(path = %path, error = %e, "Acquiring request failed");
            AcquiringError::from(e)
        })?;

        let result = decode::<R::Payload>(response.bytes(), request.decode_strategy());
        match &result {
            Ok(_) => debug!(path = %path, "Acquiring request succeeded"),
            Err(AcquiringError::Api(failure)) => warn!(
                path = %path,
                error_code = failure.error_code,
                message = failure.error_message.as_deref().unwrap_or_default(),
                "Acquiring API reported failure"
            ),
            Err(e) => warn!(path = %path, error = %e, "Undecodable acquiring response"),
        }
        result
    }

    /// Like [`perform_request`](Self::perform_request), but gives up with
    /// [`AcquiringError::Cancelled`] once `cancel` fires.
    ///
    /// A response that arrives after cancellation is discarded.
    pub async fn perform_cancellable<R: AcquiringRequest>(
        &self,
        request: &R,
        cancel: &CancellationToken,
    ) -> AcquiringResult<R::Payload> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AcquiringError::Cancelled),
            result = self.perform_request(request) => {
                if cancel.is_cancelled() {
                    Err(AcquiringError::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    async fn build_request<R: AcquiringRequest>(&self, request: &R) -> AcquiringResult<NetworkRequest> {
        let mut parameters = request.parameters()?;

        if let TokenFormation::Signed { ignored } = request.token_formation() {
            parameters.insert(
                keys::TERMINAL_KEY.into(),
                Value::String(self.config.terminal_key.clone()),
            );
            let token = self
                .token_provider
                .provide_token(&parameters_for_token(&parameters, ignored))
                .await?;
            parameters.insert(keys::TOKEN.into(), Value::String(token));
        }

        let method = request.method();
        let mut network_request = NetworkRequest::new(method.clone(), request.path());
        if method == Method::GET {
            for (key, value) in query_pairs(&parameters) {
                network_request = network_request.query(key, value);
            }
        } else {
            network_request = network_request.json(&parameters);
        }

        Ok(network_request)
    }

    pub async fn init(&self, data: PaymentInitData) -> AcquiringResult<InitPayload> {
        self.perform_request(&InitRequest { data }).await
    }

    pub async fn check_3ds_version(
        &self,
        data: Check3DSVersionData,
    ) -> AcquiringResult<Check3DSVersionPayload> {
        self.perform_request(&Check3DSVersionRequest { data }).await
    }

    pub async fn finish_authorize(
        &self,
        data: FinishAuthorizeData,
    ) -> AcquiringResult<FinishAuthorizePayload> {
        self.perform_request(&FinishAuthorizeRequest { data }).await
    }

    /// Confirm a 3DS v1 challenge.
    pub async fn submit_3ds_authorization(
        &self,
        data: Submit3DSAuthorizationData,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        self.perform_request(&Submit3DSAuthorizationRequest { data })
            .await
    }

    /// Confirm a 3DS v2 challenge with its CRes.
    pub async fn submit_3ds_authorization_v2(
        &self,
        data: CresData,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        self.perform_request(&Submit3DSAuthorizationV2Request { data })
            .await
    }

    pub async fn get_payment_state(
        &self,
        payment_id: PaymentId,
    ) -> AcquiringResult<GetPaymentStatePayload> {
        self.perform_request(&GetPaymentStateRequest {
            data: GetPaymentStateData { payment_id },
        })
        .await
    }

    pub async fn charge(&self, data: ChargeData) -> AcquiringResult<ChargePayload> {
        self.perform_request(&ChargeRequest { data }).await
    }

    pub async fn add_card(&self, data: AddCardData) -> AcquiringResult<AddCardPayload> {
        self.perform_request(&AddCardRequest { data }).await
    }

    pub async fn attach_card(&self, data: AttachCardData) -> AcquiringResult<AttachCardPayload> {
        self.perform_request(&AttachCardRequest { data }).await
    }

    pub async fn get_card_list(
        &self,
        customer_key: impl Into<String>,
    ) -> AcquiringResult<Vec<PaymentCard>> {
        self.perform_request(&GetCardListRequest {
            customer_key: customer_key.into(),
        })
        .await
    }

    pub async fn remove_card(&self, data: RemoveCardData) -> AcquiringResult<RemoveCardPayload> {
        self.perform_request(&RemoveCardRequest { data }).await
    }

    pub async fn get_tinkoff_pay_status(&self) -> AcquiringResult<TinkoffPayStatusPayload> {
        self.perform_request(&GetTinkoffPayStatusRequest {
            terminal_key: self.config.terminal_key.clone(),
        })
        .await
    }

    pub async fn get_tinkoff_pay_link(
        &self,
        payment_id: PaymentId,
        version: impl Into<String>,
    ) -> AcquiringResult<TinkoffPayLinkPayload> {
        self.perform_request(&GetTinkoffPayLinkRequest {
            payment_id,
            version: version.into(),
        })
        .await
    }

    pub async fn get_qr(&self, data: GetQrData) -> AcquiringResult<GetQrPayload> {
        self.perform_request(&GetQrRequest { data }).await
    }

    pub async fn get_terminal_pay_methods(&self) -> AcquiringResult<GetTerminalPayMethodsPayload> {
        self.perform_request(&GetTerminalPayMethodsRequest {
            terminal_key: self.config.terminal_key.clone(),
        })
        .await
    }

    /// SBP participants from the external dictionary.
    pub async fn get_sbp_banks(&self) -> AcquiringResult<GetSbpBanksPayload> {
        self.perform_request(&GetSbpBanksRequest {
            url: self.config.sbp_banks_url.clone(),
        })
        .await
    }
}

fn query_pairs(parameters: &Map<String, Value>) -> Vec<(String, String)> {
    parameters
        .iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key.clone(), s.clone())),
            Value::Number(n) => Some((key.clone(), n.to_string())),
            Value::Bool(b) => Some((key.clone(), b.to_string())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api() -> AcquiringApi {
        let config = AcquiringConfig::builder()
            .terminal_key("TestSDK")
            .password("secret")
            .build()
            .unwrap();
        AcquiringApi::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_signed_request_carries_terminal_key_and_token() {
        let request = InitRequest {
            data: PaymentInitData {
                amount: 320,
                order_id: "12345".into(),
                customer_key: None,
                description: None,
                recurrent: None,
                pay_type: None,
                data: Default::default(),
                receipt: None,
                shops: None,
                receipts: None,
            },
        };
        let network_request = api().build_request(&request).await.unwrap();
        let body: Value = match network_request.body() {
            acquiring_http::RequestBody::Json(bytes) => serde_json::from_slice(bytes).unwrap(),
            other => panic!("unexpected body {:?}", other),
        };

        assert_eq!(body["TerminalKey"], "TestSDK");
        assert_eq!(
            body["Token"],
            "d05679f5cd9a99e2936c7ba54c60177cd27f71cbc53f860268f6abdbc106c532"
        );
    }

    #[tokio::test]
    async fn test_unsigned_get_uses_query() {
        let request = GetTerminalPayMethodsRequest {
            terminal_key: "TestSDK".into(),
        };
        let network_request = api().build_request(&request).await.unwrap();
        let url = network_request
            .url(Some("https://securepay.tinkoff.ru/"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://securepay.tinkoff.ru/v2/GetTerminalPayMethods?TerminalKey=TestSDK&PaySource=SDK"
        );
        assert_eq!(network_request.body(), &acquiring_http::RequestBody::Empty);
    }

    #[test]
    fn test_query_pairs_skip_nested_values() {
        let map = match json!({"a": "1", "b": 2, "c": {"d": 1}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let pairs = query_pairs(&map);
        assert_eq!(pairs.len(), 2);
    }
}
