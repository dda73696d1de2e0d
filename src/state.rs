use crate::gateway::MundipaggGateway;

#[derive(Debug, Clone, axum::extract::FromRef)]
pub struct AppState {
    pub gate: MundipaggGateway,
}

impl AppState {
    pub fn new(gate: MundipaggGateway) -> Self {
        Self { gate }
    }
}
