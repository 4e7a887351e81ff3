mod report;

use std::ffi::OsString;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::core::{
    ComparisonResult, InputMode, PaymentScheme, SchemeKind, SharedTerms,
    coerce_installment_count, compare_schemes,
};
use crate::error::CompareError;

use report::{ComparisonDisplay, build_display, render_report};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Upper bound on monthly installments (100 years) so one request cannot
/// run an unbounded discount loop.
const MAX_INSTALLMENTS: u32 = 1_200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInputMode {
    #[value(alias = "pct")]
    Percentage,
    #[value(alias = "abs")]
    Absolute,
}

impl From<CliInputMode> for InputMode {
    fn from(value: CliInputMode) -> Self {
        match value {
            CliInputMode::Percentage => InputMode::Percentage,
            CliInputMode::Absolute => InputMode::Absolute,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiInputMode {
    #[serde(alias = "pct", alias = "percent")]
    Percentage,
    #[serde(alias = "abs", alias = "amount")]
    Absolute,
}

impl From<ApiInputMode> for CliInputMode {
    fn from(value: ApiInputMode) -> Self {
        match value {
            ApiInputMode::Percentage => CliInputMode::Percentage,
            ApiInputMode::Absolute => CliInputMode::Absolute,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    base_value: Option<f64>,
    annual_rate: Option<f64>,
    installment_count: Option<f64>,

    traditional_mode: Option<ApiInputMode>,
    traditional_initial_pct: Option<f64>,
    traditional_installments_pct: Option<f64>,
    traditional_initial_amount: Option<f64>,
    traditional_installments_amount: Option<f64>,
    traditional_defer_remainder: Option<bool>,

    custom_mode: Option<ApiInputMode>,
    custom_initial_pct: Option<f64>,
    custom_installments_pct: Option<f64>,
    custom_initial_amount: Option<f64>,
    custom_installments_amount: Option<f64>,
    custom_defer_remainder: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "presale-npv",
    about = "Compare the net present value of a traditional and a custom pre-sale payment scheme",
    after_help = "Run `presale-npv serve [port]` to start the browser calculator."
)]
struct Cli {
    #[arg(
        long,
        default_value_t = 5_000_000.0,
        allow_negative_numbers = true,
        help = "Property value shared by both schemes"
    )]
    base_value: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        allow_negative_numbers = true,
        help = "Nominal annual discount rate in percent"
    )]
    annual_rate: f64,
    #[arg(
        long,
        default_value_t = 24.0,
        allow_negative_numbers = true,
        help = "Number of equal monthly installments; floored, negatives count as 0"
    )]
    installments: f64,

    #[arg(long, value_enum, default_value_t = CliInputMode::Percentage)]
    traditional_mode: CliInputMode,
    #[arg(long, default_value_t = 10.0, help = "Traditional initial payment in percent")]
    traditional_initial_pct: f64,
    #[arg(long, default_value_t = 60.0, help = "Traditional installments in percent")]
    traditional_installments_pct: f64,
    #[arg(long, default_value_t = 500_000.0, help = "Traditional initial payment amount")]
    traditional_initial_amount: f64,
    #[arg(long, default_value_t = 3_000_000.0, help = "Traditional installments total amount")]
    traditional_installments_amount: f64,
    #[arg(long, help = "Pay the traditional remainder one month after the last installment")]
    traditional_defer_remainder: bool,

    #[arg(long, value_enum, default_value_t = CliInputMode::Percentage)]
    custom_mode: CliInputMode,
    #[arg(long, default_value_t = 30.0, help = "Custom initial payment in percent")]
    custom_initial_pct: f64,
    #[arg(long, default_value_t = 50.0, help = "Custom installments in percent")]
    custom_installments_pct: f64,
    #[arg(long, default_value_t = 1_500_000.0, help = "Custom initial payment amount")]
    custom_initial_amount: f64,
    #[arg(long, default_value_t = 2_500_000.0, help = "Custom installments total amount")]
    custom_installments_amount: f64,
    #[arg(long, help = "Pay the custom remainder one month after the last installment")]
    custom_defer_remainder: bool,

    #[arg(long, help = "Print the API response body instead of the text report")]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
struct CompareRequest {
    terms: SharedTerms,
    traditional: PaymentScheme,
    custom: PaymentScheme,
}

impl CompareRequest {
    fn evaluate(self) -> ComparisonResult {
        compare_schemes(self.terms, self.traditional, self.custom)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    #[serde(flatten)]
    comparison: ComparisonResult,
    display: ComparisonDisplay,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn scheme_from_cli(
    kind: SchemeKind,
    mode: CliInputMode,
    pct: (f64, f64),
    amount: (f64, f64),
    defer_remainder: bool,
) -> PaymentScheme {
    let input_mode = InputMode::from(mode);
    let (initial_raw, installment_raw) = match input_mode {
        InputMode::Percentage => pct,
        InputMode::Absolute => amount,
    };
    PaymentScheme {
        kind,
        input_mode,
        initial_raw,
        installment_raw,
        defer_remainder,
    }
}

fn build_inputs(cli: Cli) -> Result<CompareRequest, CompareError> {
    if !cli.base_value.is_finite() || cli.base_value < 0.0 {
        return Err(CompareError::invalid("--base-value", "must be >= 0"));
    }

    let installment_count = coerce_installment_count(cli.installments);
    if installment_count > MAX_INSTALLMENTS {
        return Err(CompareError::invalid(
            "--installments",
            format!("must be <= {MAX_INSTALLMENTS}"),
        ));
    }

    let terms = SharedTerms {
        base_value: cli.base_value,
        annual_rate_pct: cli.annual_rate,
        installment_count,
    };

    let traditional = scheme_from_cli(
        SchemeKind::Traditional,
        cli.traditional_mode,
        (cli.traditional_initial_pct, cli.traditional_installments_pct),
        (
            cli.traditional_initial_amount,
            cli.traditional_installments_amount,
        ),
        cli.traditional_defer_remainder,
    );
    let custom = scheme_from_cli(
        SchemeKind::Custom,
        cli.custom_mode,
        (cli.custom_initial_pct, cli.custom_installments_pct),
        (cli.custom_initial_amount, cli.custom_installments_amount),
        cli.custom_defer_remainder,
    );

    Ok(CompareRequest {
        terms,
        traditional,
        custom,
    })
}

/// Parses command line arguments and renders the comparison as text, or as
/// the API response body with `--json`. Argument errors and `--help` come
/// back as [`CompareError::Usage`].
pub fn run_cli<I, T>(args: I) -> Result<String, CompareError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let as_json = cli.json;
    let comparison = build_inputs(cli)?.evaluate();

    if as_json {
        let body = serde_json::to_string_pretty(&build_compare_response(comparison))?;
        Ok(format!("{body}\n"))
    } else {
        Ok(render_report(&comparison))
    }
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!("NPV comparison API listening on http://{}", config.addr);
    tracing::info!(
        "Local access: http://127.0.0.1:{}/",
        config.addr.port()
    );

    axum::serve(listener, app).await
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

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "rejected comparison request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    json_response(StatusCode::OK, build_compare_response(request.evaluate()))
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
fn api_request_from_json(json: &str) -> Result<CompareRequest, CompareError> {
    let payload = serde_json::from_str::<ComparePayload>(json)?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComparePayload) -> Result<CompareRequest, CompareError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.base_value {
        cli.base_value = v;
    }
    if let Some(v) = payload.annual_rate {
        cli.annual_rate = v;
    }
    if let Some(v) = payload.installment_count {
        cli.installments = v;
    }

    if let Some(v) = payload.traditional_mode {
        cli.traditional_mode = v.into();
    }
    if let Some(v) = payload.traditional_initial_pct {
        cli.traditional_initial_pct = v;
    }
    if let Some(v) = payload.traditional_installments_pct {
        cli.traditional_installments_pct = v;
    }
    if let Some(v) = payload.traditional_initial_amount {
        cli.traditional_initial_amount = v;
    }
    if let Some(v) = payload.traditional_installments_amount {
        cli.traditional_installments_amount = v;
    }
    if let Some(v) = payload.traditional_defer_remainder {
        cli.traditional_defer_remainder = v;
    }

    if let Some(v) = payload.custom_mode {
        cli.custom_mode = v.into();
    }
    if let Some(v) = payload.custom_initial_pct {
        cli.custom_initial_pct = v;
    }
    if let Some(v) = payload.custom_installments_pct {
        cli.custom_installments_pct = v;
    }
    if let Some(v) = payload.custom_initial_amount {
        cli.custom_initial_amount = v;
    }
    if let Some(v) = payload.custom_installments_amount {
        cli.custom_installments_amount = v;
    }
    if let Some(v) = payload.custom_defer_remainder {
        cli.custom_defer_remainder = v;
    }

    build_inputs(cli).map_err(|err| match err {
        CompareError::InvalidInput { field, reason } => {
            CompareError::InvalidInput {
                field: api_field_name(&field).to_string(),
                reason,
            }
        }
        other => other,
    })
}

fn api_field_name(cli_flag: &str) -> &str {
    match cli_flag {
        "--base-value" => "baseValue",
        "--installments" => "installmentCount",
        other => other,
    }
}

fn default_cli_for_api() -> Cli {
    Cli {
        base_value: 5_000_000.0,
        annual_rate: 12.0,
        installments: 24.0,
        traditional_mode: CliInputMode::Percentage,
        traditional_initial_pct: 10.0,
        traditional_installments_pct: 60.0,
        traditional_initial_amount: 500_000.0,
        traditional_installments_amount: 3_000_000.0,
        traditional_defer_remainder: false,
        custom_mode: CliInputMode::Percentage,
        custom_initial_pct: 30.0,
        custom_installments_pct: 50.0,
        custom_initial_amount: 1_500_000.0,
        custom_installments_amount: 2_500_000.0,
        custom_defer_remainder: false,
        json: false,
    }
}

fn build_compare_response(comparison: ComparisonResult) -> CompareResponse {
    CompareResponse {
        display: build_display(&comparison),
        comparison,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn clap_defaults_match_api_defaults() {
        let parsed = Cli::parse_from(["presale-npv"]);
        let defaults = default_cli_for_api();
        assert_approx(parsed.base_value, defaults.base_value);
        assert_approx(parsed.annual_rate, defaults.annual_rate);
        assert_approx(parsed.installments, defaults.installments);
        assert_eq!(parsed.traditional_mode, defaults.traditional_mode);
        assert_approx(parsed.traditional_initial_pct, defaults.traditional_initial_pct);
        assert_approx(
            parsed.traditional_installments_amount,
            defaults.traditional_installments_amount,
        );
        assert_approx(parsed.custom_initial_pct, defaults.custom_initial_pct);
        assert_approx(parsed.custom_initial_amount, defaults.custom_initial_amount);
        assert!(!parsed.custom_defer_remainder);
    }

    #[test]
    fn build_inputs_selects_raw_values_by_mode() {
        let mut cli = sample_cli();
        cli.custom_mode = CliInputMode::Absolute;

        let request = build_inputs(cli).expect("valid inputs");
        assert_eq!(request.traditional.input_mode, InputMode::Percentage);
        assert_approx(request.traditional.initial_raw, 10.0);
        assert_approx(request.traditional.installment_raw, 60.0);
        assert_eq!(request.custom.input_mode, InputMode::Absolute);
        assert_approx(request.custom.initial_raw, 1_500_000.0);
        assert_approx(request.custom.installment_raw, 2_500_000.0);
        assert_eq!(request.custom.kind, SchemeKind::Custom);
    }

    #[test]
    fn build_inputs_coerces_installment_count() {
        let mut cli = sample_cli();
        cli.installments = 18.7;
        assert_eq!(build_inputs(cli).expect("valid").terms.installment_count, 18);

        let mut cli = sample_cli();
        cli.installments = -4.0;
        assert_eq!(build_inputs(cli).expect("valid").terms.installment_count, 0);
    }

    #[test]
    fn build_inputs_rejects_negative_base_value() {
        let mut cli = sample_cli();
        cli.base_value = -1.0;
        let err = build_inputs(cli).expect_err("must reject negative base value");
        assert!(err.to_string().contains("--base-value"));
    }

    #[test]
    fn build_inputs_rejects_excessive_installment_count() {
        let mut cli = sample_cli();
        cli.installments = 1_201.0;
        let err = build_inputs(cli).expect_err("must reject huge schedules");
        assert!(err.to_string().contains("--installments"));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "baseValue": 3200000,
          "annualRate": 10.5,
          "installmentCount": 36,
          "traditionalMode": "pct",
          "traditionalInitialPct": 15,
          "traditionalInstallmentsPct": 55,
          "traditionalDeferRemainder": true,
          "customMode": "absolute",
          "customInitialAmount": 800000,
          "customInstallmentsAmount": 1600000
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_approx(request.terms.base_value, 3_200_000.0);
        assert_approx(request.terms.annual_rate_pct, 10.5);
        assert_eq!(request.terms.installment_count, 36);
        assert_eq!(request.traditional.input_mode, InputMode::Percentage);
        assert_approx(request.traditional.initial_raw, 15.0);
        assert_approx(request.traditional.installment_raw, 55.0);
        assert!(request.traditional.defer_remainder);
        assert_eq!(request.custom.input_mode, InputMode::Absolute);
        assert_approx(request.custom.initial_raw, 800_000.0);
        assert_approx(request.custom.installment_raw, 1_600_000.0);
        assert!(!request.custom.defer_remainder);
    }

    #[test]
    fn api_request_from_json_uses_defaults_for_missing_fields() {
        let request = api_request_from_json("{}").expect("empty payload is valid");
        assert_approx(request.terms.base_value, 5_000_000.0);
        assert_approx(request.terms.annual_rate_pct, 12.0);
        assert_eq!(request.terms.installment_count, 24);
        assert_approx(request.custom.initial_raw, 30.0);
        assert_approx(request.custom.installment_raw, 50.0);
    }

    #[test]
    fn api_request_errors_use_payload_field_names() {
        let err = api_request_from_json(r#"{"baseValue": -10}"#).expect_err("negative base");
        assert!(err.to_string().starts_with("baseValue"));

        let err = api_request_from_json(r#"{"installmentCount": 5000}"#).expect_err("too many");
        assert!(err.to_string().starts_with("installmentCount"));

        let err = api_request_from_json(r#"{"customMode": "weekly"}"#).expect_err("bad mode");
        assert!(matches!(err, CompareError::Json(_)));
    }

    #[test]
    fn compare_response_serialization_contains_expected_fields() {
        let request = build_inputs(sample_cli()).expect("valid inputs");
        let response = build_compare_response(request.evaluate());
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"terms\""));
        assert!(json.contains("\"monthlyRate\""));
        assert!(json.contains("\"traditional\""));
        assert!(json.contains("\"custom\""));
        assert!(json.contains("\"npvDifference\""));
        assert!(json.contains("\"totalNpv\""));
        assert!(json.contains("\"installmentPayment\""));
        assert!(json.contains("\"remainderPct\""));
        assert!(json.contains("\"display\""));
        assert!(json.contains("\"entered\""));
        assert!(json.contains("\"kind\":\"traditional\""));
        assert!(json.contains("\"inputMode\":\"percentage\""));
    }

    #[test]
    fn compare_response_difference_matches_scheme_totals() {
        let request = build_inputs(sample_cli()).expect("valid inputs");
        let response = build_compare_response(request.evaluate());
        let value = serde_json::to_value(&response).expect("response should serialize");

        let traditional = value["traditional"]["npv"]["totalNpv"]
            .as_f64()
            .expect("traditional total");
        let custom = value["custom"]["npv"]["totalNpv"]
            .as_f64()
            .expect("custom total");
        let difference = value["npvDifference"].as_f64().expect("difference");
        assert_approx(difference, traditional - custom);
        assert_eq!(value["terms"]["installmentCount"], 24);
    }

    #[test]
    fn run_cli_renders_text_and_json() {
        let report = run_cli(["presale-npv", "--installments", "12"]).expect("report");
        assert!(report.contains("Installments           12"));
        assert!(report.contains("$4,662,164.71"));

        let json = run_cli(["presale-npv", "--json", "--custom-mode", "abs"]).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["custom"]["inputMode"], "absolute");
        assert!(value["display"]["npvDifference"].is_string());
    }

    #[test]
    fn run_cli_returns_usage_errors_instead_of_exiting() {
        let err = run_cli(["presale-npv", "--installment-count", "12"]).expect_err("unknown flag");
        match err {
            CompareError::Usage(e) => assert_eq!(e.kind(), ErrorKind::UnknownArgument),
            other => panic!("expected usage error, got {other:?}"),
        }

        let err = run_cli(["presale-npv", "--help"]).expect_err("help is not a report");
        match err {
            CompareError::Usage(e) => {
                assert_eq!(e.kind(), ErrorKind::DisplayHelp);
                assert!(e.to_string().contains("--json"));
            }
            other => panic!("expected help output, got {other:?}"),
        }
    }

    #[test]
    fn run_cli_reports_invalid_base_value() {
        let err = run_cli(["presale-npv", "--base-value", "-5"]).expect_err("negative base");
        assert!(err.to_string().contains("--base-value"));
    }
}
