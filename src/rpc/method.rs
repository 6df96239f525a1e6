//! Backend method references.
//!
//! Service methods are registered as typed closures and stored behind the
//! object-safe [`MethodHandler`] trait. The handler owns the typed decode of
//! the bound request and the encode of the reply, so the rest of the gateway
//! only sees JSON trees.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::binding::{BindError, PendingMessage, RequestMessage};
use crate::rpc::status::Status;

/// Boxed error for unstructured faults.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure returned by a service method.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Declared failure raised on purpose by service logic.
    #[error(transparent)]
    Status(#[from] Status),

    /// Anything else that went wrong during the call.
    #[error("{0}")]
    Fault(BoxError),
}

impl RpcError {
    pub fn fault(error: impl Into<BoxError>) -> Self {
        RpcError::Fault(error.into())
    }
}

/// Shape of a method's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// One response message.
    Unary,
    /// A sequence of response messages.
    ServerStreaming,
}

/// Identity of a backend method, e.g. `EchoService/GetEcho`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub service: String,
    pub method: String,
    pub kind: MethodKind,
}

impl MethodDescriptor {
    /// Parse `Service/Method`. A name without `/` is taken as the method.
    pub fn new(full_name: &str, kind: MethodKind) -> Self {
        let (service, method) = full_name.rsplit_once('/').unwrap_or(("", full_name));
        Self {
            service: service.to_string(),
            method: method.to_string(),
            kind,
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.service.is_empty() {
            f.write_str(&self.method)
        } else {
            write!(f, "{}/{}", self.service, self.method)
        }
    }
}

/// Encoded result of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Message(Value),
    Sequence(Vec<Value>),
}

/// Type-erased backend method.
pub trait MethodHandler: Send + Sync {
    /// Decode the bound request and start the call.
    ///
    /// Decode failures are returned before anything is invoked.
    fn call(&self, request: PendingMessage) -> Result<BoxFuture<'static, Result<Reply, RpcError>>, BindError>;
}

/// A unary method: one request, one response.
pub struct UnaryMethod<F, Req, Resp> {
    f: Arc<F>,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<F, Req, Resp> UnaryMethod<F, Req, Resp> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(Req) -> Fut,
        Fut: Future<Output = Result<Resp, RpcError>>,
    {
        Self {
            f: Arc::new(f),
            _types: PhantomData,
        }
    }
}

impl<F, Fut, Req, Resp> MethodHandler for UnaryMethod<F, Req, Resp>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, RpcError>> + Send + 'static,
    Req: RequestMessage,
    Resp: Serialize + Send + 'static,
{
    fn call(&self, request: PendingMessage) -> Result<BoxFuture<'static, Result<Reply, RpcError>>, BindError> {
        let request: Req = request.decode()?;
        let f = Arc::clone(&self.f);
        Ok(Box::pin(async move {
            let response = f(request).await?;
            let value = serde_json::to_value(response).map_err(RpcError::fault)?;
            Ok(Reply::Message(value))
        }))
    }
}

/// A server-streaming method: one request, zero or more responses.
///
/// The first failing item aborts the whole call.
pub struct StreamingMethod<F, Req, Resp> {
    f: Arc<F>,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<F, Req, Resp> StreamingMethod<F, Req, Resp> {
    pub fn new<S>(f: F) -> Self
    where
        F: Fn(Req) -> S,
        S: Stream<Item = Result<Resp, RpcError>>,
    {
        Self {
            f: Arc::new(f),
            _types: PhantomData,
        }
    }
}

impl<F, S, Req, Resp> MethodHandler for StreamingMethod<F, Req, Resp>
where
    F: Fn(Req) -> S + Send + Sync + 'static,
    S: Stream<Item = Result<Resp, RpcError>> + Send + 'static,
    Req: RequestMessage,
    Resp: Serialize + Send + 'static,
{
    fn call(&self, request: PendingMessage) -> Result<BoxFuture<'static, Result<Reply, RpcError>>, BindError> {
        let request: Req = request.decode()?;
        let f = Arc::clone(&self.f);
        Ok(Box::pin(async move {
            let mut stream = Box::pin(f(request));
            let mut items = Vec::new();
            while let Some(item) = stream.next().await {
                items.push(serde_json::to_value(item?).map_err(RpcError::fault)?);
            }
            Ok(Reply::Sequence(items))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::schema::fixtures::TestRequest;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn pending(value: Value) -> PendingMessage {
        let mut pending = PendingMessage::new();
        *pending.fields_mut() = value.as_object().cloned().unwrap();
        pending
    }

    #[test]
    fn test_descriptor_display() {
        let d = MethodDescriptor::new("echo.EchoService/GetEcho", MethodKind::Unary);
        assert_eq!(d.service, "echo.EchoService");
        assert_eq!(d.method, "GetEcho");
        assert_eq!(d.to_string(), "echo.EchoService/GetEcho");
        assert_eq!(MethodDescriptor::new("Ping", MethodKind::Unary).to_string(), "Ping");
    }

    #[tokio::test]
    async fn test_unary_call() {
        let method = UnaryMethod::new(|req: TestRequest| async move {
            Ok::<_, RpcError>(json!({"doubled": req.id * 2}))
        });
        let reply = method.call(pending(json!({"id": 21}))).unwrap().await.unwrap();
        assert_eq!(reply, Reply::Message(json!({"doubled": 42})));
    }

    #[tokio::test]
    async fn test_decode_failure_happens_before_call() {
        let invoked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&invoked);
        let method = UnaryMethod::new(move |_: TestRequest| {
            flag.store(true, Ordering::SeqCst);
            async move { Ok::<_, RpcError>(Value::Null) }
        });
        assert!(method.call(pending(json!({"id": "nope"}))).is_err());
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_streaming_collects_in_order() {
        let method = StreamingMethod::new(|req: TestRequest| {
            futures_util::stream::iter(req.ids.into_iter().map(|id| Ok::<_, RpcError>(json!({ "id": id }))))
        });
        let reply = method.call(pending(json!({"ids": [3, 1]}))).unwrap().await.unwrap();
        assert_eq!(reply, Reply::Sequence(vec![json!({"id": 3}), json!({"id": 1})]));

        let empty = method.call(pending(json!({}))).unwrap().await.unwrap();
        assert_eq!(empty, Reply::Sequence(vec![]));
    }

    #[tokio::test]
    async fn test_streaming_stops_at_first_failure() {
        let method = StreamingMethod::new(|_: TestRequest| {
            futures_util::stream::iter(vec![
                Ok(json!({"id": 1})),
                Err(RpcError::from(Status::not_found("gone"))),
                Ok(json!({"id": 2})),
            ])
        });
        let err = method.call(pending(json!({}))).unwrap().await.unwrap_err();
        assert!(matches!(err, RpcError::Status(s) if s.message() == "gone"));
    }
}
