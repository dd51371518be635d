use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use axum::body::Body;
use tower_http::limit::ResponseBody;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, HttpMakeClassifier};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer, LatencyUnit};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Converts the body-limit response body back into `Body` so `CorsLayer`
/// (which needs a `Default` body) can wrap it.
type LimitBodyAdapter = MapResponseBodyLayer<fn(ResponseBody<Body>) -> Body>;

pub type HttpStack = Stack<
    RequestBodyLimitLayer,
    Stack<LimitBodyAdapter, Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>>,
>;

/// JSON logs. `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

pub fn stack(config: &Config) -> ServiceBuilder<HttpStack> {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );
    let limit = RequestBodyLimitLayer::new(config.body_limit_bytes);

    ServiceBuilder::new()
        .layer(trace)
        .layer(CorsLayer::permissive())
        .layer(MapResponseBodyLayer::new(Body::new as fn(ResponseBody<Body>) -> Body))
        .layer(limit)
}
