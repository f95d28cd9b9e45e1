use crate::page::{render_page, FormInput, Outcome};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rentbot_core::averages::comparison_bars;
use rentbot_core::chart::{format_rwf, render_bar_chart};
use rentbot_core::predictor::{EstimateSource, PredictError, PredictionContext};
use rentbot_core::record::{PropertyForm, ValidationError};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

const FILL_ALL_FIELDS: &str = "Please fill all fields before predicting.";

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub ctx: PredictionContext,
    pub averages: BTreeMap<String, f64>,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/form", get(form_page).post(form_submit))
        .with_state(state)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn error_status(e: &PredictError) -> StatusCode {
    match e {
        PredictError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn index(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "RentBot API is running. Use POST /predict",
        "mode": state.ctx.source(),
    }))
}

/// JSON body of `POST /predict`. Missing keys surface as validation errors.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "District")]
    pub district: Option<String>,
    #[serde(rename = "HouseType")]
    pub house_type: Option<String>,
    #[serde(rename = "Bedrooms")]
    pub bedrooms: Option<i64>,
    #[serde(rename = "Bathrooms")]
    pub bathrooms: Option<i64>,
    #[serde(rename = "Amenity")]
    pub amenity: Option<String>,
}

impl From<PredictRequest> for PropertyForm {
    fn from(r: PredictRequest) -> Self {
        PropertyForm {
            district: r.district,
            house_type: r.house_type,
            bedrooms: r.bedrooms,
            bathrooms: r.bathrooms,
            amenity: r.amenity,
        }
    }
}

fn run_estimate(
    ctx: &PredictionContext,
    form: PropertyForm,
) -> Result<rentbot_core::Estimate, PredictError> {
    let record = form.validate()?;
    let est = ctx.estimate(&record);
    match &est {
        Ok(e) => tracing::debug!("{record} -> {} ({})", e.rent, e.source),
        Err(PredictError::Validation(v)) => tracing::debug!("{record}: {v}"),
        Err(e) => tracing::error!("{record}: {e}"),
    }
    est
}

async fn predict(
    State(state): State<SharedState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            // well-formed JSON with wrong value types counts as bad input, not a bad body
            let status = if matches!(rejection, JsonRejection::JsonDataError(_)) {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::BAD_REQUEST
            };
            return error_response(status, rejection.body_text());
        },
    };

    match run_estimate(&state.ctx, req.into()) {
        Ok(est) => Json(json!({ "predicted_rent": est.rent, "source": est.source })).into_response(),
        Err(e) => error_response(error_status(&e), e.to_string()),
    }
}

async fn form_page(State(state): State<SharedState>) -> Html<String> {
    Html(page(&state, &FormInput::default(), None))
}

// blank or non-numeric counts are treated as unset
fn parse_count(value: &Option<String>) -> Option<i64> {
    value.as_deref().map(str::trim).and_then(|v| v.parse().ok())
}

async fn form_submit(
    State(state): State<SharedState>,
    Form(input): Form<FormInput>,
) -> (StatusCode, Html<String>) {
    let form = PropertyForm {
        district: input.district.clone(),
        house_type: input.house_type.clone(),
        bedrooms: parse_count(&input.bedrooms),
        bathrooms: parse_count(&input.bathrooms),
        amenity: input.amenity.clone(),
    };

    let (status, outcome) = match run_estimate(&state.ctx, form) {
        Ok(est) => {
            let district = input.district.as_deref().unwrap_or_default();
            let bars = comparison_bars(&state.averages, district, est.rent);
            let chart = render_bar_chart(&bars)
                .inspect_err(|e| tracing::warn!("{e}"))
                .ok();
            (StatusCode::OK, Outcome::Estimate { rent: format_rwf(est.rent), chart })
        },
        Err(PredictError::Validation(ValidationError::MissingField(_))) => {
            (StatusCode::OK, Outcome::Warning(FILL_ALL_FIELDS.to_owned()))
        },
        Err(e @ PredictError::Validation(_)) => (StatusCode::OK, Outcome::Warning(e.to_string())),
        Err(e) => (error_status(&e), Outcome::Error(e.to_string())),
    };

    (status, Html(page(&state, &input, Some(&outcome))))
}

fn page(state: &AppState, input: &FormInput, outcome: Option<&Outcome>) -> String {
    let fallback = state.ctx.source() == EstimateSource::Fallback;
    render_page(&state.ctx.choices(), fallback, input, outcome)
}
