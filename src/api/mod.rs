use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::chart::ChartError;
use crate::core::ProjectionInput;
use crate::debounce::{Debouncer, INPUT_DEBOUNCE, RESIZE_DEBOUNCE};

mod report;

pub use report::{
    ChartsView, FormattedRow, FormattedSummary, InsightView, Presenter, Report, SummaryView,
    TableRowView, Viewport, build_report, render_text,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

pub const MAX_YEARS: u32 = 50;
pub const MIN_CHART_SIZE: u32 = 200;
pub const MAX_CHART_SIZE: u32 = 4000;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InputError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("{0} must be >= 0")]
    Negative(&'static str),
    #[error("--inflation-rate must be > -100")]
    InflationTooLow,
    #[error("--income-growth-rate must be >= -100")]
    GrowthTooLow,
    #[error("--years must be between 1 and {max}, got {0}", max = MAX_YEARS)]
    YearsOutOfRange(u32),
    #[error("{0} must be between {min} and {max}", min = MIN_CHART_SIZE, max = MAX_CHART_SIZE)]
    ChartSizeOutOfRange(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to render charts: {0}")]
    Chart(#[from] ChartError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "inflation-projector",
    about = "Projects nominal and inflation-adjusted income and savings over a horizon"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculator page and JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Compute a projection and print it
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 5000.0, help = "Monthly take-home income")]
    pub monthly_income: f64,
    #[arg(long, default_value_t = 20000.0, help = "Savings held as cash today")]
    pub current_savings: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        allow_hyphen_values = true,
        help = "Expected annual inflation in percent, e.g. 3"
    )]
    pub inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        allow_hyphen_values = true,
        help = "Expected annual income growth in percent; may be negative"
    )]
    pub income_growth_rate: f64,
    #[arg(long, default_value_t = 10, help = "Projection horizon in years (1-50)")]
    pub years: u32,
    #[arg(long, default_value_t = 800, help = "Chart width in pixels")]
    pub chart_width: u32,
    #[arg(long, default_value_t = 400, help = "Chart height in pixels")]
    pub chart_height: u32,
    #[arg(long, help = "Print the full report as JSON instead of a table")]
    pub json: bool,
    #[arg(long, help = "Directory to write income.svg and savings.svg into")]
    pub chart_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    monthly_income: Option<f64>,
    current_savings: Option<f64>,
    inflation_rate: Option<f64>,
    income_growth_rate: Option<f64>,
    years: Option<u32>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResizePayload {
    chart_width: u32,
    chart_height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum EventPayload {
    Input(ProjectPayload),
    Resize(ResizePayload),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduledResponse {
    scheduled: &'static str,
    delay_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    presenter: Arc<Mutex<Presenter>>,
    input_debounce: Arc<Debouncer>,
    resize_debounce: Arc<Debouncer>,
}

impl AppState {
    fn new(presenter: Presenter) -> Self {
        Self {
            presenter: Arc::new(Mutex::new(presenter)),
            input_debounce: Arc::new(Debouncer::new(INPUT_DEBOUNCE)),
            resize_debounce: Arc::new(Debouncer::new(RESIZE_DEBOUNCE)),
        }
    }
}

pub fn build_inputs(args: &ProjectArgs) -> Result<(ProjectionInput, Viewport), InputError> {
    for (name, value) in [
        ("--monthly-income", args.monthly_income),
        ("--current-savings", args.current_savings),
        ("--inflation-rate", args.inflation_rate),
        ("--income-growth-rate", args.income_growth_rate),
    ] {
        if !value.is_finite() {
            return Err(InputError::NotFinite(name));
        }
    }

    if args.monthly_income < 0.0 {
        return Err(InputError::Negative("--monthly-income"));
    }

    if args.current_savings < 0.0 {
        return Err(InputError::Negative("--current-savings"));
    }

    if args.inflation_rate <= -100.0 {
        return Err(InputError::InflationTooLow);
    }

    if args.income_growth_rate < -100.0 {
        return Err(InputError::GrowthTooLow);
    }

    if !(1..=MAX_YEARS).contains(&args.years) {
        return Err(InputError::YearsOutOfRange(args.years));
    }

    let viewport = build_viewport(args.chart_width, args.chart_height)?;

    Ok((
        ProjectionInput {
            monthly_income: args.monthly_income,
            current_savings: args.current_savings,
            inflation_rate_percent: args.inflation_rate,
            income_growth_rate_percent: args.income_growth_rate,
            years: args.years,
        },
        viewport,
    ))
}

fn build_viewport(width: u32, height: u32) -> Result<Viewport, InputError> {
    for (name, value) in [("--chart-width", width), ("--chart-height", height)] {
        if !(MIN_CHART_SIZE..=MAX_CHART_SIZE).contains(&value) {
            return Err(InputError::ChartSizeOutOfRange(name));
        }
    }
    Ok(Viewport { width, height })
}

pub fn run_project(args: &ProjectArgs) -> Result<String, CliError> {
    let (input, viewport) = build_inputs(args)?;
    let report = build_report(&input, viewport)?;
    info!(years = input.years, "projection computed");

    if let Some(dir) = &args.chart_dir {
        write_chart(dir, "income.svg", &report.charts.income_svg)?;
        write_chart(dir, "savings.svg", &report.charts.savings_svg)?;
    }

    if args.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render_text(&report))
    }
}

fn write_chart(dir: &Path, name: &str, svg: &str) -> Result<(), CliError> {
    let path = dir.join(name);
    std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&path, svg))
        .map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "chart written");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let defaults = default_args_for_api();
    let (input, viewport) = build_inputs(&defaults).map_err(std::io::Error::other)?;
    let mut presenter = Presenter::new(input, viewport);
    presenter.recompute().map_err(std::io::Error::other)?;

    let app = router(AppState::new(presenter));

    let listener = TcpListener::bind(addr).await?;
    info!("inflation projector listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/events", post(event_handler))
        .route("/api/latest", get(latest_handler))
        .fallback(not_found_handler)
        .with_state(state)
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

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let (input, viewport) = match inputs_from_payload(payload) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(%err, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    match build_report(&input, viewport) {
        Ok(report) => {
            debug!(years = input.years, "projection served");
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

async fn event_handler(
    State(state): State<AppState>,
    Json(event): Json<EventPayload>,
) -> Response {
    match event {
        EventPayload::Input(payload) => {
            let requested_size = (payload.chart_width, payload.chart_height);
            let (input, _) = match inputs_from_payload(payload) {
                Ok(parsed) => parsed,
                Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
            };
            let presenter = Arc::clone(&state.presenter);
            state.input_debounce.call(move || {
                let mut presenter = presenter.lock().unwrap_or_else(PoisonError::into_inner);
                presenter.set_input(input);
                // An input event moves the viewport only when it carries a size.
                if let Some(viewport) = overlay_viewport(presenter.viewport(), requested_size) {
                    presenter.resize(viewport);
                }
                recompute_logged(&mut presenter, "input");
            });
            scheduled_response("input", state.input_debounce.delay())
        }
        EventPayload::Resize(ResizePayload {
            chart_width,
            chart_height,
        }) => {
            let viewport = match build_viewport(chart_width, chart_height) {
                Ok(viewport) => viewport,
                Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
            };
            let presenter = Arc::clone(&state.presenter);
            state.resize_debounce.call(move || {
                let mut presenter = presenter.lock().unwrap_or_else(PoisonError::into_inner);
                presenter.resize(viewport);
                recompute_logged(&mut presenter, "resize");
            });
            scheduled_response("resize", state.resize_debounce.delay())
        }
    }
}

async fn latest_handler(State(state): State<AppState>) -> Response {
    let presenter = state
        .presenter
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    match presenter.latest() {
        Some(report) => json_response(StatusCode::OK, report),
        None => error_response(StatusCode::NOT_FOUND, "No projection has been computed yet"),
    }
}

fn overlay_viewport(current: Viewport, requested: (Option<u32>, Option<u32>)) -> Option<Viewport> {
    match requested {
        (None, None) => None,
        (width, height) => Some(Viewport {
            width: width.unwrap_or(current.width),
            height: height.unwrap_or(current.height),
        }),
    }
}

fn recompute_logged(presenter: &mut Presenter, trigger: &str) {
    match presenter.recompute() {
        Ok(report) => debug!(trigger, years = report.projection.horizon(), "recomputed"),
        Err(err) => warn!(trigger, %err, "recompute failed"),
    }
}

fn scheduled_response(kind: &'static str, delay: std::time::Duration) -> Response {
    json_response(
        StatusCode::ACCEPTED,
        ScheduledResponse {
            scheduled: kind,
            delay_ms: delay.as_millis() as u64,
        },
    )
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
fn inputs_from_json(json: &str) -> Result<(ProjectionInput, Viewport), String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload).map_err(|e| e.to_string())
}

fn inputs_from_payload(payload: ProjectPayload) -> Result<(ProjectionInput, Viewport), InputError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.monthly_income {
        args.monthly_income = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.income_growth_rate {
        args.income_growth_rate = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.chart_width {
        args.chart_width = v;
    }
    if let Some(v) = payload.chart_height {
        args.chart_height = v;
    }

    build_inputs(&args)
}

fn default_args_for_api() -> ProjectArgs {
    ProjectArgs {
        monthly_income: 5_000.0,
        current_savings: 20_000.0,
        inflation_rate: 3.0,
        income_growth_rate: 2.0,
        years: 10,
        chart_width: 800,
        chart_height: 400,
        json: false,
        chart_dir: None,
    }
}
