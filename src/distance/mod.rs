pub mod adapter;
pub mod matrix;
pub mod providers;

pub use adapter::{
    fallback_route, haversine_km, route_with_fallback, MockProvider, RouteResult, RoutingCache,
    RoutingProvider, RoutingProviderError,
};
pub use providers::OsrmProvider;
