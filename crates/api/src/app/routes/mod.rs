pub mod accounts;
pub mod companies;
pub mod jobs;
pub mod system;

use std::collections::BTreeMap;

use axum::Router;

pub type RouteConstructor = fn() -> Router;

/// Resource route groups keyed by mount prefix.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    groups: BTreeMap<&'static str, RouteConstructor>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a prefix twice keeps the later constructor.
    pub fn register(mut self, prefix: &'static str, constructor: RouteConstructor) -> Self {
        self.groups.insert(prefix, constructor);
        self
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.keys().copied()
    }

    pub fn build(&self) -> Router {
        self.groups
            .iter()
            .fold(Router::new(), |router, (prefix, constructor)| router.nest(prefix, constructor()))
    }
}

pub fn registry() -> RouteRegistry {
    RouteRegistry::new()
        .register("/jobs", jobs::router)
        .register("/companies", companies::router)
        .register("/accounts", accounts::router)
}
