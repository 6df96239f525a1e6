//! Route registration and lookup.
//!
//! # Responsibilities
//! - Declare routes: verb, template, bindings, backend method
//! - Resolve every field path against the request schema at registration
//! - Look up the most specific route for a request
//! - Report explicit not-found and method-not-allowed outcomes
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) template scan (acceptable for typical route counts)
//! - Most literal segments wins; then non-wildcard; then registration order
//! - Duplicate (verb, template shape) registrations are rejected

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use futures_util::Stream;
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::binding::body::parse_body;
use crate::binding::{
    BindError, BindingOrder, BodyBinding, CoercionError, FieldPath, FieldPathError, PendingMessage,
    QueryBinding, QueryParam, RequestMessage,
};
use crate::routing::matcher::{PathTemplate, TemplateError};
use crate::rpc::{MethodDescriptor, MethodHandler, MethodKind, RpcError, StreamingMethod, UnaryMethod};

/// Error registering a route.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("route {route}: {source}")]
    FieldPath {
        route: String,
        #[source]
        source: FieldPathError,
    },

    #[error("route {route}: path variable '{variable}' must bind a singular scalar or enum field")]
    InvalidPathField { route: String, variable: String },

    #[error("route {route}: query parameter '{param}' cannot bind a message field")]
    InvalidQueryField { route: String, param: String },

    #[error("duplicate route {verb} {template}")]
    Duplicate { verb: Method, template: String },
}

/// Declaration of a route, completed by naming its backend method.
#[derive(Debug, Clone)]
pub struct Route {
    verb: Method,
    template: String,
    query: Vec<(String, String)>,
    body: String,
    order: BindingOrder,
    response_field: Option<String>,
}

impl Route {
    pub fn new(verb: Method, template: impl Into<String>) -> Self {
        Self {
            verb,
            template: template.into(),
            query: Vec::new(),
            body: String::new(),
            order: BindingOrder::default(),
            response_field: None,
        }
    }

    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    pub fn post(template: impl Into<String>) -> Self {
        Self::new(Method::POST, template)
    }

    pub fn put(template: impl Into<String>) -> Self {
        Self::new(Method::PUT, template)
    }

    pub fn patch(template: impl Into<String>) -> Self {
        Self::new(Method::PATCH, template)
    }

    pub fn delete(template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, template)
    }

    /// Bind query parameter `name` to the field of the same path.
    pub fn query(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.query_as(name.clone(), name)
    }

    /// Bind query parameter `name` to `field`.
    pub fn query_as(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.query.push((name.into(), field.into()));
        self
    }

    /// Body target: `"*"` for the whole request, a field path, or `""` for none.
    pub fn body(mut self, target: impl Into<String>) -> Self {
        self.body = target.into();
        self
    }

    pub fn binding_order(mut self, order: BindingOrder) -> Self {
        self.order = order;
        self
    }

    /// Wrap the encoded response under `field`.
    pub fn response_field(mut self, field: impl Into<String>) -> Self {
        self.response_field = Some(field.into());
        self
    }

    /// Complete the route with a unary method.
    pub fn unary<Req, Resp, F, Fut>(self, name: &str, f: F) -> Result<RouteDefinition, RouteError>
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, RpcError>> + Send + 'static,
        Req: RequestMessage,
        Resp: Serialize + Send + 'static,
    {
        let rpc = MethodDescriptor::new(name, MethodKind::Unary);
        self.build::<Req>(rpc, Arc::new(UnaryMethod::<F, Req, Resp>::new(f)))
    }

    /// Complete the route with a server-streaming method.
    pub fn server_streaming<Req, Resp, F, S>(self, name: &str, f: F) -> Result<RouteDefinition, RouteError>
    where
        F: Fn(Req) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<Resp, RpcError>> + Send + 'static,
        Req: RequestMessage,
        Resp: Serialize + Send + 'static,
    {
        let rpc = MethodDescriptor::new(name, MethodKind::ServerStreaming);
        self.build::<Req>(rpc, Arc::new(StreamingMethod::<F, Req, Resp>::new(f)))
    }

    fn build<Req: RequestMessage>(
        self,
        rpc: MethodDescriptor,
        handler: Arc<dyn MethodHandler>,
    ) -> Result<RouteDefinition, RouteError> {
        let schema = Req::schema();
        let route = format!("{} {}", self.verb, self.template);
        let resolve = |path: &str| {
            FieldPath::resolve(schema, path).map_err(|source| RouteError::FieldPath {
                route: route.clone(),
                source,
            })
        };

        let template = PathTemplate::parse(&self.template)?;

        let mut path_fields = Vec::new();
        for variable in template.variables() {
            let field = resolve(variable)?;
            if field.leaf().kind.is_message() || field.leaf().repeated {
                return Err(RouteError::InvalidPathField {
                    route: route.clone(),
                    variable: variable.to_string(),
                });
            }
            path_fields.push(field);
        }

        let query = if self.query.is_empty() {
            QueryBinding::None
        } else {
            let mut params = Vec::with_capacity(self.query.len());
            for (name, field) in &self.query {
                let path = resolve(field)?;
                if path.leaf().kind.is_message() {
                    return Err(RouteError::InvalidQueryField {
                        route: route.clone(),
                        param: name.clone(),
                    });
                }
                params.push(QueryParam {
                    name: name.clone(),
                    path,
                });
            }
            QueryBinding::Params(params)
        };

        let body = match self.body.as_str() {
            "" => BodyBinding::None,
            "*" => BodyBinding::Wildcard,
            field => BodyBinding::Field(resolve(field)?),
        };

        Ok(RouteDefinition {
            verb: self.verb,
            template,
            rpc,
            handler,
            path_fields,
            query,
            body,
            order: self.order,
            response_field: self.response_field,
        })
    }
}

/// A registered route. Immutable once built.
pub struct RouteDefinition {
    verb: Method,
    template: PathTemplate,
    rpc: MethodDescriptor,
    handler: Arc<dyn MethodHandler>,
    path_fields: Vec<FieldPath>,
    query: QueryBinding,
    body: BodyBinding,
    order: BindingOrder,
    response_field: Option<String>,
}

impl RouteDefinition {
    pub fn verb(&self) -> &Method {
        &self.verb
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn rpc(&self) -> &MethodDescriptor {
        &self.rpc
    }

    pub fn handler(&self) -> &dyn MethodHandler {
        self.handler.as_ref()
    }

    pub fn query_binding(&self) -> &QueryBinding {
        &self.query
    }

    pub fn body_binding(&self) -> &BodyBinding {
        &self.body
    }

    pub fn binding_order(&self) -> BindingOrder {
        self.order
    }

    pub fn response_field(&self) -> Option<&str> {
        self.response_field.as_deref()
    }

    /// Build the request message from raw path captures, query and body.
    ///
    /// Query parameters bind first, so path and body always win over them.
    pub fn bind(&self, captures: &[String], query: Option<&str>, body: &[u8]) -> Result<PendingMessage, BindError> {
        let mut pending = PendingMessage::new();
        let root = pending.fields_mut();

        self.query.bind(query, root)?;

        let body = match self.body {
            BodyBinding::None => None,
            _ => Some(parse_body(body)?),
        };

        match self.order {
            BindingOrder::BodyThenPath => {
                if let Some(body) = body {
                    self.body.apply(body, root)?;
                }
                self.bind_path(captures, root)?;
            }
            BindingOrder::PathThenBody => {
                self.bind_path(captures, root)?;
                if let Some(body) = body {
                    self.body.apply(body, root)?;
                }
            }
        }

        Ok(pending)
    }

    fn bind_path(
        &self,
        captures: &[String],
        root: &mut serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), BindError> {
        for (field, capture) in self.path_fields.iter().zip(captures) {
            let decoded = percent_decode_str(capture)
                .decode_utf8()
                .map_err(|_| CoercionError::new(capture))?;
            field.bind(root, [&*decoded])?;
        }
        Ok(())
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("verb", &self.verb)
            .field("template", &self.template.as_str())
            .field("rpc", &self.rpc)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("order", &self.order)
            .field("response_field", &self.response_field)
            .finish_non_exhaustive()
    }
}

/// A route selected for a request, with its raw (still percent-encoded) path captures.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDefinition,
    pub captures: Vec<String>,
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum Lookup<'a> {
    Matched(RouteMatch<'a>),
    /// The path matched, but only under these other verbs.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// The immutable route registry.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = RouteDefinition>) -> Result<Self, RouteError> {
        let routes: Vec<RouteDefinition> = routes.into_iter().collect();

        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert((route.verb.clone(), route.template.shape())) {
                return Err(RouteError::Duplicate {
                    verb: route.verb.clone(),
                    template: route.template.to_string(),
                });
            }
        }

        for route in &routes {
            tracing::debug!(
                verb = %route.verb,
                template = %route.template,
                rpc = %route.rpc,
                "Route registered"
            );
        }

        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    /// Find the most specific route for `verb` and `path`.
    pub fn lookup(&self, verb: &Method, path: &str) -> Lookup<'_> {
        let mut best: Option<((usize, bool), RouteMatch<'_>)> = None;
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(captures) = route.template.matches(path) else {
                continue;
            };

            if route.verb != *verb {
                if !allowed.contains(&route.verb) {
                    allowed.push(route.verb.clone());
                }
                continue;
            }

            let rank = (route.template.literal_count(), !route.template.has_wildcard());
            if best.as_ref().map_or(true, |(current, _)| rank > *current) {
                best = Some((rank, RouteMatch { route, captures }));
            }
        }

        match best {
            Some((_, matched)) => Lookup::Matched(matched),
            None if !allowed.is_empty() => Lookup::MethodNotAllowed(allowed),
            None => Lookup::NotFound,
        }
    }
}
