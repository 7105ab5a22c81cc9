use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::prompt::{SYSTEM_INSTRUCTION, build_prompt};
use crate::completion::{CompletionProvider, GatewayError};
use crate::config::{PlannerConfig, ValidationMode};
use crate::models::{FieldIssue, GeneratedPlan, TripParameters, TripRequest};

/// Outcome of a failed planning attempt
#[derive(Error, Debug)]
pub enum PlanError {
    /// The request was rejected before reaching the provider
    #[error("Invalid trip request: {}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Render field issues as one `; `-separated line
#[must_use]
pub fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Orchestrates trip parameters, prompt construction and the completion call
pub struct PlannerService {
    provider: Arc<dyn CompletionProvider>,
    settings: PlannerConfig,
}

impl PlannerService {
    pub fn new(provider: Arc<dyn CompletionProvider>, settings: PlannerConfig) -> Self {
        Self { provider, settings }
    }

    /// Label of the completion provider behind this planner
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Turn a raw request into prompt parameters according to the validation mode
    pub fn prepare(&self, request: &TripRequest) -> Result<TripParameters, PlanError> {
        match self.settings.validation {
            ValidationMode::Strict => {
                TripParameters::validate(request, self.settings.max_trip_days)
                    .map_err(PlanError::Invalid)
            }
            ValidationMode::Lenient => Ok(TripParameters::coerce(request)),
        }
    }

    /// Plan a trip: exactly one provider call for every request that passes preparation
    #[instrument(name = "plan_trip", skip_all, fields(provider = %self.provider.name()))]
    pub async fn plan(&self, request: &TripRequest) -> Result<GeneratedPlan, PlanError> {
        let params = match self.prepare(request) {
            Ok(params) => params,
            Err(err) => {
                info!("Rejected trip request: {}", err);
                return Err(err);
            }
        };
        let prompt = build_prompt(&params, &self.settings.currency_symbol);
        debug!("Built planning prompt:\n{}", prompt);

        match self.provider.complete(SYSTEM_INSTRUCTION, &prompt).await {
            Ok(text) => {
                let plan = GeneratedPlan::new(text);
                info!("Trip plan generated ({} chars)", plan.text.len());
                if let Some(days) = whole_days(params.trip_days) {
                    let covered = plan.day_markers(days);
                    if covered < days as usize {
                        warn!("Plan itinerary covers {} of {} days", covered, days);
                    }
                }
                Ok(plan)
            }
            Err(err) => {
                warn!("{} completion failed: {}", self.provider.name(), err);
                Err(err.into())
            }
        }
    }
}

/// Longest itinerary checked for `Day N` markers
const MAX_CHECKED_DAYS: u32 = 365;

/// Trip length as a day count, when it is one (lenient mode can yield `NaN`, fractions or huge values)
fn whole_days(trip_days: f64) -> Option<u32> {
    (trip_days.fract() == 0.0 && (1.0..=f64::from(MAX_CHECKED_DAYS)).contains(&trip_days))
        .then_some(trip_days as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every prompt and answers with a canned outcome
    struct RecordingProvider {
        prompts: Mutex<Vec<(String, String)>>,
        reply: fn() -> Result<String, GatewayError>,
    }

    impl RecordingProvider {
        fn new(reply: fn() -> Result<String, GatewayError>) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        fn name(&self) -> &str {
            "Stub"
        }

        async fn complete(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            (self.reply)()
        }
    }

    fn seven_days() -> Result<String, GatewayError> {
        Ok((1..=7).map(|day| format!("Day {day}: walk\n")).collect())
    }

    fn planner(provider: Arc<RecordingProvider>, validation: ValidationMode) -> PlannerService {
        let settings = PlannerConfig {
            validation,
            ..PlannerConfig::default()
        };
        PlannerService::new(provider, settings)
    }

    #[tokio::test]
    async fn plan_calls_provider_once_with_system_instruction() {
        let provider = RecordingProvider::new(seven_days);
        let service = planner(provider.clone(), ValidationMode::Strict);

        let request = TripRequest::from_form("Everest Base Camp", "50000", "7", "Delhi");
        let plan = service.plan(&request).await.unwrap();

        assert_eq!(plan.day_markers(7), 7);
        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SYSTEM_INSTRUCTION);
        assert!(calls[0].1.starts_with("Plan a 7-day trek for the Everest Base Camp"));
    }

    #[tokio::test]
    async fn strict_mode_rejects_before_calling_provider() {
        let provider = RecordingProvider::new(seven_days);
        let service = planner(provider.clone(), ValidationMode::Strict);

        let request = TripRequest::from_json(&json!({
            "trekId": "Everest Base Camp",
            "budget": "50000",
            "location": "Delhi"
        }));
        let err = service.plan(&request).await.unwrap_err();

        match &err {
            PlanError::Invalid(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, "tripDays");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(err.to_string(), "Invalid trip request: tripDays is required");
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn lenient_mode_forwards_nan_prompt() {
        let provider = RecordingProvider::new(seven_days);
        let service = planner(provider.clone(), ValidationMode::Lenient);

        let request = TripRequest::from_json(&json!({
            "trekId": "Everest Base Camp",
            "budget": "50000",
            "location": "Delhi"
        }));
        assert!(service.plan(&request).await.is_ok());

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.starts_with("Plan a NaN-day trek"));
    }

    #[tokio::test]
    async fn gateway_errors_pass_through() {
        let provider = RecordingProvider::new(|| {
            Err(GatewayError::NoContent {
                result: json!({ "choices": [] }),
            })
        });
        let service = planner(provider, ValidationMode::Strict);

        let request = TripRequest::from_form("Kedarkantha", "15000", "4", "Dehradun");
        let err = service.plan(&request).await.unwrap_err();
        assert!(matches!(err, PlanError::Gateway(GatewayError::NoContent { .. })));
    }

    #[test]
    fn whole_days_only_for_counts() {
        assert_eq!(whole_days(7.0), Some(7));
        assert_eq!(whole_days(2.5), None);
        assert_eq!(whole_days(0.0), None);
        assert_eq!(whole_days(f64::NAN), None);
        assert_eq!(whole_days(f64::INFINITY), None);
        assert_eq!(whole_days(1e9), None);
    }

    #[test]
    fn join_issues_uses_semicolons() {
        let request = TripRequest::default();
        let issues = TripParameters::validate(&request, 60).unwrap_err();
        assert_eq!(
            join_issues(&issues),
            "trekId is required; budget is required; tripDays is required; location is required"
        );
    }
}
