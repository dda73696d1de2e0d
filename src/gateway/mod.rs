use std::sync::Arc;

use crate::{
    config::GatewayConfig,
    connect::interaction_log::InteractionSpan,
    gateway::{
        auth::authenticated_headers,
        error::GatewayError,
        instrument::{Money, PaymentInstrument, TransactionOptions},
        payin::{ChargeRequest, InvoiceRequest},
        response::GatewayResponse,
        route::Operation,
        transport::{ReqwestTransport, Transport, TransportOutcome, TransportRequest},
    },
};

/// Street line parsing
pub mod address;
mod auth;
pub mod error;
/// Payment instruments, money and caller options
pub mod instrument;
/// Requisite masking
pub mod mask;
/// Processor request payloads
pub mod payin;
/// Processor response classification
pub mod response;
pub mod route;
pub mod transport;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Amount authorized and released again by [MundipaggGateway::verify]
pub const VERIFY_AMOUNT: u64 = 100;

#[derive(Debug, Clone)]
pub struct MundipaggGateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
}

impl MundipaggGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::MissingConfig("api_key"));
        }
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    /// Authorize and settle in one step
    #[tracing::instrument(skip_all, fields(amount = money.amount))]
    pub async fn purchase(
        &self,
        money: &Money,
        instrument: &PaymentInstrument,
        options: &TransactionOptions,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        let request = ChargeRequest::build(
            Operation::Sale,
            money,
            &self.config.default_currency,
            instrument,
            options,
        );
        let body = serde_json::to_value(&request)?;
        self.commit(Operation::Sale, Some(body), None, span).await
    }

    /// Hold funds, the charge is created with `capture: false`
    #[tracing::instrument(skip_all, fields(amount = money.amount))]
    pub async fn authorize(
        &self,
        money: &Money,
        instrument: &PaymentInstrument,
        options: &TransactionOptions,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        let request = ChargeRequest::build(
            Operation::AuthOnly,
            money,
            &self.config.default_currency,
            instrument,
            options,
        );
        let body = serde_json::to_value(&request)?;
        self.commit(Operation::AuthOnly, Some(body), None, span).await
    }

    #[tracing::instrument(skip_all, fields(%authorization))]
    pub async fn capture(
        &self,
        authorization: &str,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        self.commit(Operation::Capture, None, Some(authorization), span)
            .await
    }

    #[tracing::instrument(skip_all, fields(%authorization, amount = money.amount))]
    pub async fn refund(
        &self,
        money: &Money,
        authorization: &str,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        let request = InvoiceRequest::build(money, &self.config.default_currency);
        let body = serde_json::to_value(&request)?;
        self.commit(Operation::Refund, Some(body), Some(authorization), span)
            .await
    }

    #[tracing::instrument(skip_all, fields(%authorization))]
    pub async fn void(
        &self,
        authorization: &str,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        self.commit(Operation::Void, None, Some(authorization), span)
            .await
    }

    /// Check a card by authorizing [VERIFY_AMOUNT] and voiding it right away.
    ///
    /// The result is always the one of the authorization. The void is cleanup only: it is skipped
    /// when the authorization failed and its own outcome is logged and dropped.
    #[tracing::instrument(skip_all)]
    pub async fn verify(
        &self,
        instrument: &PaymentInstrument,
        options: &TransactionOptions,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        let money = Money::new(VERIFY_AMOUNT);
        let authorize = self.authorize(&money, instrument, options, span).await?;
        if !authorize.success {
            tracing::info!(reason = %authorize.message, "Verification authorization declined");
            return Ok(authorize);
        }
        let Some(authorization) = authorize.authorization.as_deref() else {
            tracing::warn!("Verification authorization has no id, skipping void");
            return Ok(authorize);
        };

        match self.void(authorization, span).await {
            Ok(void) if !void.success => {
                tracing::warn!(reason = %void.message, "Verification void was declined")
            }
            Ok(_) => tracing::debug!("Verification authorization voided"),
            Err(e) => tracing::warn!("Failed to void verification authorization: {e}"),
        }
        Ok(authorize)
    }

    pub fn supports_scrubbing() -> bool {
        true
    }

    pub fn scrub(transcript: &str) -> String {
        mask::scrub(transcript)
    }

    async fn commit(
        &self,
        operation: Operation,
        body: Option<serde_json::Value>,
        authorization: Option<&str>,
        span: &mut InteractionSpan,
    ) -> Result<GatewayResponse> {
        let route = route::route(operation, authorization)?;
        let url = route.url(&self.config.base_url);

        let secured_request = body.as_ref().map(mask::secure_value);
        tracing::debug!(
            %operation,
            method = %route.method,
            %url,
            data = ?secured_request,
            "Gateway API request"
        );
        span.set_request(
            &operation.to_string(),
            &route.method,
            url.clone(),
            &secured_request,
        );

        let outcome = self
            .transport
            .send(TransportRequest {
                method: route.method,
                url,
                headers: authenticated_headers(&self.config.api_key),
                body,
            })
            .await?;

        let status = outcome.status();
        span.set_response_status(status.as_u16());
        match &outcome {
            TransportOutcome::Body { body, .. } => {
                let secured_response = mask::secure_value(body);
                span.set_response(&secured_response);
                tracing::debug!(%status, data = %secured_response, "Gateway API response");
            }
            TransportOutcome::Failure { body, .. } => {
                span.set_response(body);
                tracing::debug!(%status, data = %body, "Gateway API failure response");
            }
        }

        let response = response::classify(outcome, self.config.test)?;
        tracing::info!(
            %operation,
            success = response.success,
            reason = %response.message,
            "Gateway operation finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;
    use reqwest::{Method, StatusCode, header};
    use serde_json::json;

    use super::*;
    use crate::gateway::instrument::{CardDetails, Voucher};

    /// Replays queued outcomes and keeps every request it was given
    #[derive(Debug, Default)]
    struct RecordingTransport {
        outcomes: Mutex<VecDeque<Result<TransportOutcome>>>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl RecordingTransport {
        fn replying(outcomes: Vec<Result<TransportOutcome>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportOutcome> {
            self.requests.lock().unwrap().push(request);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request")
        }
    }

    fn ok(body: serde_json::Value) -> Result<TransportOutcome> {
        Ok(TransportOutcome::Body {
            status: StatusCode::OK,
            body,
        })
    }

    fn failed(status: u16) -> Result<TransportOutcome> {
        Ok(TransportOutcome::Failure {
            status: StatusCode::from_u16(status).unwrap(),
            body: "{}".into(),
        })
    }

    fn gateway(transport: Arc<RecordingTransport>) -> MundipaggGateway {
        let config = GatewayConfig::new("sk_test_123").unwrap().with_test(true);
        MundipaggGateway::with_transport(config, transport).unwrap()
    }

    fn credit_card() -> PaymentInstrument {
        PaymentInstrument::CreditCard(CardDetails::new(
            "4000100011112224",
            "Longbob Longsen",
            9,
            2030,
            "123",
        ))
    }

    #[tokio::test]
    async fn purchase_posts_charge() {
        let transport = RecordingTransport::replying(vec![ok(json!({
            "id": "ch_1", "status": "paid", "message": "Approved"
        }))]);
        let gateway = gateway(transport.clone());
        let mut span = InteractionSpan::enter();

        let res = gateway
            .purchase(
                &Money::new(1000),
                &credit_card(),
                &TransactionOptions::default(),
                &mut span,
            )
            .await
            .unwrap();

        assert!(res.success);
        assert!(res.test);
        assert_eq!(res.authorization.as_deref(), Some("ch_1"));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "https://api.mundipagg.com/core/v1/charges/");
        assert_eq!(requests[0].headers[header::AUTHORIZATION], "Basic c2tfdGVzdF8xMjM6");
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["amount"], 1000);
        assert_eq!(body["currency"], "USD");
        assert!(body["payment"]["credit_card"].get("capture").is_none());
    }

    #[tokio::test]
    async fn authorize_holds_voucher_funds() {
        let transport = RecordingTransport::replying(vec![ok(json!({
            "id": "ch_2", "status": "pending", "message": "Pending"
        }))]);
        let gateway = gateway(transport.clone());
        let voucher = PaymentInstrument::Voucher(Voucher {
            card: CardDetails::new("6062825624254001", "Longbob Longsen", 9, 2030, "123"),
            holder_document: Some("93095135270".into()),
        });

        gateway
            .authorize(
                &Money::new(500).with_currency("BRL"),
                &voucher,
                &TransactionOptions::default(),
                &mut InteractionSpan::enter(),
            )
            .await
            .unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["currency"], "BRL");
        assert_eq!(body["payment"]["voucher"]["capture"], json!(false));
        assert!(body["payment"]["voucher"]["card"].get("capture").is_none());
    }

    #[tokio::test]
    async fn follow_up_operations_route_by_authorization() {
        let reply = || ok(json!({ "id": "ch_1", "status": "paid", "message": "ok" }));
        let transport = RecordingTransport::replying(vec![reply(), reply(), reply()]);
        let gateway = gateway(transport.clone());
        let mut span = InteractionSpan::enter();

        gateway.capture("ch_1", &mut span).await.unwrap();
        gateway
            .refund(&Money::new(300), "ch_1", &mut span)
            .await
            .unwrap();
        gateway.void("ch_1", &mut span).await.unwrap();

        let requests = transport.requests();
        let base = "https://api.mundipagg.com/core/v1/charges/ch_1/";
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, format!("{base}capture/"));
        assert!(requests[0].body.is_none());
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].url, base);
        assert_eq!(
            requests[1].body,
            Some(json!({ "amount": 300, "currency": "USD" }))
        );
        assert_eq!(requests[2].method, Method::DELETE);
        assert_eq!(requests[2].url, base);
        assert!(requests[2].body.is_none());
        assert_eq!(span.len(), 3);
    }

    #[tokio::test]
    async fn missing_authorization_never_hits_network() {
        let transport = RecordingTransport::replying(vec![]);
        let gateway = gateway(transport.clone());
        let mut span = InteractionSpan::enter();

        let err = gateway.capture("", &mut span).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MissingAuthorization {
                operation: Operation::Capture
            }
        ));
        assert!(transport.requests().is_empty());
        assert!(span.is_empty());
    }

    #[tokio::test]
    async fn mapped_failure_becomes_failed_response() {
        let transport = RecordingTransport::replying(vec![failed(401)]);
        let gateway = gateway(transport);

        let res = gateway
            .void("ch_1", &mut InteractionSpan::enter())
            .await
            .unwrap();
        assert!(!res.success);
        assert_eq!(res.message, "Invalid API key");
    }

    #[tokio::test]
    async fn unmapped_failure_is_raised() {
        let transport = RecordingTransport::replying(vec![failed(418)]);
        let gateway = gateway(transport);

        let err = gateway
            .void("ch_1", &mut InteractionSpan::enter())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnmappedStatus { .. }));
    }

    #[tokio::test]
    async fn verify_voids_successful_authorization() {
        let transport = RecordingTransport::replying(vec![
            ok(json!({ "id": "ch_9", "status": "pending", "message": "Authorized" })),
            ok(json!({ "id": "ch_9", "status": "voided", "message": "Voided" })),
        ]);
        let gateway = gateway(transport.clone());
        let mut span = InteractionSpan::enter();

        let res = gateway
            .verify(&credit_card(), &TransactionOptions::default(), &mut span)
            .await
            .unwrap();

        assert!(res.success);
        assert_eq!(res.message, "Authorized");
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body.as_ref().unwrap()["amount"], VERIFY_AMOUNT);
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(requests[1].url, "https://api.mundipagg.com/core/v1/charges/ch_9/");
        assert_eq!(span.len(), 2);
    }

    #[tokio::test]
    async fn verify_skips_void_after_decline() {
        let transport = RecordingTransport::replying(vec![ok(json!({
            "id": "ch_3",
            "status": "failed",
            "last_transaction": { "acquirer_message": "Não autorizada" }
        }))]);
        let gateway = gateway(transport.clone());

        let res = gateway
            .verify(
                &credit_card(),
                &TransactionOptions::default(),
                &mut InteractionSpan::enter(),
            )
            .await
            .unwrap();

        assert!(!res.success);
        assert_eq!(res.message, "Não autorizada");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn verify_ignores_void_outcome() {
        let authorized = json!({ "id": "ch_4", "status": "pending", "message": "Authorized" });
        for void in [failed(404), failed(418), ok(json!({ "status": "failed" }))] {
            let transport = RecordingTransport::replying(vec![ok(authorized.clone()), void]);
            let gateway = gateway(transport.clone());

            let res = gateway
                .verify(
                    &credit_card(),
                    &TransactionOptions::default(),
                    &mut InteractionSpan::enter(),
                )
                .await
                .unwrap();

            assert!(res.success);
            assert_eq!(res.authorization.as_deref(), Some("ch_4"));
            assert_eq!(res.raw_body, authorized);
            assert_eq!(transport.requests().len(), 2);
        }
    }

    #[tokio::test]
    async fn span_holds_masked_card_data() {
        let transport = RecordingTransport::replying(vec![ok(json!({
            "id": "ch_1", "status": "paid", "message": "ok"
        }))]);
        let gateway = gateway(transport);
        let mut span = InteractionSpan::enter();

        gateway
            .purchase(
                &Money::new(1000),
                &credit_card(),
                &TransactionOptions::default(),
                &mut span,
            )
            .await
            .unwrap();

        let logs = span.interaction_logs();
        let params = logs[0].params().unwrap();
        let card = &params["payment"]["credit_card"]["card"];
        assert_eq!(card["number"], "************2224");
        assert_eq!(card["cvv"], "***");
        assert_eq!(logs[0].status(), Some(200));
    }

    #[test]
    fn gateway_requires_api_key() {
        let mut config = GatewayConfig::new("sk_test_123").unwrap();
        config.api_key = String::new();
        let err = MundipaggGateway::with_transport(config, RecordingTransport::replying(vec![]))
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingConfig(_)));
    }

    #[test]
    fn gateway_debug_hides_api_key() {
        let config = GatewayConfig::new("sk_test_123").unwrap();
        let gate =
            MundipaggGateway::with_transport(config, RecordingTransport::replying(vec![])).unwrap();
        assert!(!format!("{gate:?}").contains("sk_test_123"));
    }

    #[test]
    fn scrubbing_is_supported() {
        assert!(MundipaggGateway::supports_scrubbing());
        assert_eq!(
            MundipaggGateway::scrub("Authorization: Basic c2tfdGVzdF8xMjM6"),
            "Authorization: Basic [FILTERED]"
        );
    }
}
