mod table;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    FinancialParameters, HealthStatus, ProjectionError, ProjectionResult, YearRecord,
    try_compute_projection,
};

pub use table::{format_currency, render_projection_table};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Longest horizon accepted at the boundary.
pub const MAX_PROJECTION_YEARS: u32 = 200;

#[derive(Parser, Debug)]
#[command(
    name = "realty",
    about = "Real-estate investment profile calculator (down payment, appreciation, net return)"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute a projection and print it
    Project(Cli),
    /// Serve the calculator page and JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Args, Debug, Clone)]
pub struct Cli {
    #[arg(long, default_value_t = 200_000.0)]
    initial_property_value: f64,
    #[arg(long, default_value_t = 71, help = "Owner age, shown for context only")]
    owner_age: u32,
    #[arg(
        long,
        default_value = "good",
        help = "good|fair|poor (or bueno|regular|malo); anything else counts as good"
    )]
    health_status: String,
    #[arg(long, default_value_t = 10, help = "Projection horizon, year 0 included")]
    years: u32,
    #[arg(
        long,
        default_value_t = 0.03,
        allow_negative_numbers = true,
        help = "Annual property appreciation as a fraction, e.g. 0.03"
    )]
    annual_appreciation_rate: f64,
    #[arg(
        long,
        default_value_t = 0.06,
        allow_negative_numbers = true,
        help = "Annual return on the down payment as a fraction"
    )]
    annual_return_rate: f64,
    #[arg(
        long,
        default_value_t = 0.01,
        allow_negative_numbers = true,
        help = "Yearly maintenance as a fraction of property value"
    )]
    annual_maintenance_cost_rate: f64,
    #[arg(
        long,
        default_value_t = 0.002,
        allow_negative_numbers = true,
        help = "Yearly property tax as a fraction of property value"
    )]
    property_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 0.10,
        allow_negative_numbers = true,
        help = "Income tax as a fraction of gross return"
    )]
    income_tax_rate: f64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl Default for Cli {
    fn default() -> Self {
        let defaults = FinancialParameters::default();
        Self {
            initial_property_value: defaults.initial_property_value,
            owner_age: defaults.owner_age,
            health_status: defaults.health_status.as_str().to_string(),
            years: defaults.years,
            annual_appreciation_rate: defaults.annual_appreciation_rate,
            annual_return_rate: defaults.annual_return_rate,
            annual_maintenance_cost_rate: defaults.annual_maintenance_cost_rate,
            property_tax_rate: defaults.property_tax_rate,
            income_tax_rate: defaults.income_tax_rate,
            format: OutputFormat::Json,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    #[serde(alias = "initial_property_value")]
    initial_property_value: Option<f64>,
    #[serde(alias = "owner_age")]
    owner_age: Option<u32>,
    #[serde(alias = "health_status")]
    health_status: Option<String>,
    years: Option<u32>,
    #[serde(alias = "annual_appreciation_rate")]
    annual_appreciation_rate: Option<f64>,
    #[serde(alias = "annual_return_rate")]
    annual_return_rate: Option<f64>,
    #[serde(alias = "annual_maintenance_cost_rate")]
    annual_maintenance_cost_rate: Option<f64>,
    #[serde(alias = "property_tax_rate")]
    property_tax_rate: Option<f64>,
    #[serde(alias = "income_tax_rate")]
    income_tax_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    health_status: HealthStatus,
    owner_age: u32,
    down_payment_factor: f64,
    initial_payment: i64,
    yearly_series: Vec<YearRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_parameters(cli: &Cli) -> Result<FinancialParameters, ProjectionError> {
    if !cli.initial_property_value.is_finite() || cli.initial_property_value <= 0.0 {
        return Err(ProjectionError::invalid(
            "initial-property-value",
            "must be a finite number > 0",
        ));
    }

    if cli.years > MAX_PROJECTION_YEARS {
        return Err(ProjectionError::invalid(
            "years",
            format!("must be <= {MAX_PROJECTION_YEARS}"),
        ));
    }

    for (name, rate) in [
        ("annual-appreciation-rate", cli.annual_appreciation_rate),
        ("annual-return-rate", cli.annual_return_rate),
        ("annual-maintenance-cost-rate", cli.annual_maintenance_cost_rate),
        ("property-tax-rate", cli.property_tax_rate),
        ("income-tax-rate", cli.income_tax_rate),
    ] {
        if !rate.is_finite() {
            return Err(ProjectionError::invalid(name, "must be a finite number"));
        }
    }

    Ok(FinancialParameters {
        initial_property_value: cli.initial_property_value,
        owner_age: cli.owner_age,
        health_status: HealthStatus::from_tag(&cli.health_status),
        years: cli.years,
        annual_appreciation_rate: cli.annual_appreciation_rate,
        annual_return_rate: cli.annual_return_rate,
        annual_maintenance_cost_rate: cli.annual_maintenance_cost_rate,
        property_tax_rate: cli.property_tax_rate,
        income_tax_rate: cli.income_tax_rate,
    })
}

/// Runs the `project` subcommand and returns the text to print.
pub fn run_projection_command(cli: &Cli) -> Result<String, ProjectionError> {
    let params = build_parameters(cli)?;
    let result = try_compute_projection(&params)?;
    tracing::debug!(
        years = params.years,
        health_status = %params.health_status,
        initial_payment = result.initial_payment,
        "projection computed"
    );

    match cli.format {
        OutputFormat::Json => {
            let response = build_project_response(&params, result);
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputFormat::Table => Ok(render_projection_table(&result)),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        url = %format!("http://127.0.0.1:{port}/"),
        "realty HTTP API listening"
    );

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

fn rejected_payload_response(msg: &str) -> Response {
    tracing::info!(error = msg, "rejected undecodable projection request");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let projection = parameters_from_payload(payload)
        .and_then(|params| try_compute_projection(&params).map(|result| (params, result)));
    let (params, result) = match projection {
        Ok(projection) => projection,
        Err(err) => {
            tracing::info!(%err, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    tracing::info!(
        years = params.years,
        health_status = %params.health_status,
        initial_payment = result.initial_payment,
        "projection request handled"
    );
    json_response(StatusCode::OK, build_project_response(&params, result))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn parameters_from_json(json: &str) -> Result<FinancialParameters, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    parameters_from_payload(payload).map_err(|e| e.to_string())
}

fn parameters_from_payload(payload: ProjectPayload) -> Result<FinancialParameters, ProjectionError> {
    let mut cli = Cli::default();

    if let Some(v) = payload.initial_property_value {
        cli.initial_property_value = v;
    }
    if let Some(v) = payload.owner_age {
        cli.owner_age = v;
    }
    if let Some(v) = payload.health_status {
        cli.health_status = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.annual_appreciation_rate {
        cli.annual_appreciation_rate = v;
    }
    if let Some(v) = payload.annual_return_rate {
        cli.annual_return_rate = v;
    }
    if let Some(v) = payload.annual_maintenance_cost_rate {
        cli.annual_maintenance_cost_rate = v;
    }
    if let Some(v) = payload.property_tax_rate {
        cli.property_tax_rate = v;
    }
    if let Some(v) = payload.income_tax_rate {
        cli.income_tax_rate = v;
    }

    build_parameters(&cli)
}

fn build_project_response(params: &FinancialParameters, result: ProjectionResult) -> ProjectResponse {
    ProjectResponse {
        health_status: params.health_status,
        owner_age: params.owner_age,
        down_payment_factor: params.health_status.down_payment_factor(),
        initial_payment: result.initial_payment,
        yearly_series: result.yearly_series,
    }
}
