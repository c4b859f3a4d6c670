use actix_web::HttpRequest;

/// Builds absolute URLs for named routes, for hypermedia links and `Location` headers.
pub trait LinkGenerator: Send + Sync {
    fn absolute_url(
        &self,
        request: &HttpRequest,
        route_name: &str,
        controller_name: &str,
        route_values: &[String],
    ) -> Option<String>;
}

/// Resolves resources registered as `"{controller}.{route}"`, taking scheme and
/// host from the request's connection info.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteLinkGenerator;

pub fn route_name(controller_name: &str, route_name: &str) -> String {
    format!("{}.{}", controller_name, route_name)
}

impl LinkGenerator for RouteLinkGenerator {
    fn absolute_url(
        &self,
        request: &HttpRequest,
        route_name: &str,
        controller_name: &str,
        route_values: &[String],
    ) -> Option<String> {
        let name = self::route_name(controller_name, route_name);
        match request.url_for(&name, route_values) {
            Ok(url) => Some(url.to_string()),
            Err(err) => {
                tracing::warn!(route = %name, error = %err, "Could not build link");
                None
            }
        }
    }
}
