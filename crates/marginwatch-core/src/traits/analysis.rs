use async_trait::async_trait;

use crate::errors::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResponse};

/// External engine that investigates a breach and returns findings.
///
/// A transport failure is an `Err`; an engine-reported failure is an `Ok`
/// response with `status == Error`. Callers treat both as a failed analysis.
#[async_trait]
pub trait IAnalysisClient: Send + Sync {
    async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError>;

    fn name(&self) -> &str;
}
