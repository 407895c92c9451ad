use http::{HeaderValue, Method};
use http::header::HeaderName;
use hush_config::{AnyOrList, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer for the browser front-end
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = match &config.origins {
        AnyOrList::Any => AllowOrigin::any(),
        AnyOrList::List(origins) => AllowOrigin::list(origins.iter().filter_map(|origin| origin.parse::<HeaderValue>().ok())),
    };

    let methods = match &config.methods {
        AnyOrList::Any => AllowMethods::any(),
        AnyOrList::List(methods) => {
            AllowMethods::list(methods.iter().filter_map(|method| method.parse::<Method>().ok()))
        }
    };

    let headers = match &config.headers {
        AnyOrList::Any => AllowHeaders::any(),
        AnyOrList::List(headers) => {
            AllowHeaders::list(headers.iter().filter_map(|header| header.parse::<HeaderName>().ok()))
        }
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers);

    if let Some(max_age) = config.max_age_duration() {
        layer = layer.max_age(max_age);
    }

    layer
}
