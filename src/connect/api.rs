use axum::{extract::State, response::IntoResponse, routing::post};
use serde::Serialize;
use tracing::instrument;

use crate::{
    connect::{
        GwConnectErrorResponse, Result,
        interaction_log::{InteractionLog, InteractionSpan},
    },
    gateway::{self, MundipaggGateway, response::GatewayResponse},
    state::AppState,
};

fn respond(
    kind: &str,
    result: gateway::Result<GatewayResponse>,
    span: InteractionSpan,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let logs = span.interaction_logs();
    match result {
        Ok(res) => {
            tracing::info!(kind, success = res.success, "Dispatched gateway result");
            Ok(GwConnectResponse::new(res, logs))
        }
        Err(e) => {
            tracing::error!(kind, "Gateway operation failed: {e}");
            Err(GwConnectErrorResponse::new(e.to_string(), logs))
        }
    }
}

#[instrument(skip_all)]
pub async fn purchase(
    State(gate): State<MundipaggGateway>,
    Json(request): Json<payment::ChargeRequest>,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let mut span = InteractionSpan::enter();
    let res = gate
        .purchase(&request.money, &request.instrument, &request.options, &mut span)
        .await;
    respond("purchase", res, span)
}

#[instrument(skip_all)]
pub async fn authorize(
    State(gate): State<MundipaggGateway>,
    Json(request): Json<payment::ChargeRequest>,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let mut span = InteractionSpan::enter();
    let res = gate
        .authorize(&request.money, &request.instrument, &request.options, &mut span)
        .await;
    respond("authorize", res, span)
}

#[instrument(skip_all)]
pub async fn capture(
    State(gate): State<MundipaggGateway>,
    Json(request): Json<payment::ReferenceRequest>,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let mut span = InteractionSpan::enter();
    let res = gate.capture(&request.authorization, &mut span).await;
    respond("capture", res, span)
}

#[instrument(skip_all)]
pub async fn refund(
    State(gate): State<MundipaggGateway>,
    Json(request): Json<payment::RefundRequest>,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let mut span = InteractionSpan::enter();
    let res = gate
        .refund(&request.money, &request.authorization, &mut span)
        .await;
    respond("refund", res, span)
}

#[instrument(skip_all)]
pub async fn void(
    State(gate): State<MundipaggGateway>,
    Json(request): Json<payment::ReferenceRequest>,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let mut span = InteractionSpan::enter();
    let res = gate.void(&request.authorization, &mut span).await;
    respond("void", res, span)
}

#[instrument(skip_all)]
pub async fn verify(
    State(gate): State<MundipaggGateway>,
    Json(request): Json<payment::VerifyRequest>,
) -> Result<GwConnectResponse<GatewayResponse>> {
    let mut span = InteractionSpan::enter();
    let res = gate
        .verify(&request.instrument, &request.options, &mut span)
        .await;
    respond("verify", res, span)
}

#[derive(Debug, Serialize)]
pub struct GwConnectResponse<T> {
    result: bool,
    logs: Vec<InteractionLog>,
    #[serde(flatten)]
    data: T,
}

impl<T> GwConnectResponse<T> {
    pub fn new(data: T, logs: Vec<InteractionLog>) -> Self {
        Self {
            result: true,
            logs,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for GwConnectResponse<T> {
    fn into_response(self) -> axum::response::Response {
        match serde_json::to_value(self) {
            Ok(value) => {
                tracing::debug!(data = %crate::gateway::mask::secure_value(&value), "Connect API response payload");
                axum::Json(value).into_response()
            }
            Err(e) => GwConnectErrorResponse::new(e.to_string(), vec![]).into_response(),
        }
    }
}

pub mod payment {
    use serde::Deserialize;

    use crate::gateway::instrument::{Money, PaymentInstrument, TransactionOptions};

    /// Body of `/purchase` and `/authorize`
    #[derive(Debug, Deserialize)]
    pub struct ChargeRequest {
        pub money: Money,
        pub instrument: PaymentInstrument,
        #[serde(default)]
        pub options: TransactionOptions,
    }

    /// Body of `/capture` and `/void`
    #[derive(Debug, Deserialize)]
    pub struct ReferenceRequest {
        pub authorization: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct RefundRequest {
        pub money: Money,
        pub authorization: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct VerifyRequest {
        pub instrument: PaymentInstrument,
        #[serde(default)]
        pub options: TransactionOptions,
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/purchase", post(purchase))
        .route("/authorize", post(authorize))
        .route("/capture", post(capture))
        .route("/refund", post(refund))
        .route("/void", post(void))
        .route("/verify", post(verify))
}

/// `Json` extractor wrapper that customizes the error from `axum::extract::Json`
pub struct Json<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for Json<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = axum::Json<GwConnectErrorResponse>;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let rejection = match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => return Ok(Self(value)),
            Err(e) => e.to_string(),
        };
        Err(axum::Json(GwConnectErrorResponse::new(rejection, vec![])))
    }
}
