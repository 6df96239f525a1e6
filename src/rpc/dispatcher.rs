//! Backend invocation.
//!
//! # Responsibilities
//! - Invoke a bound method with the fully bound request
//! - Forward declared failures as handled
//! - Turn every other fault, panics included, into an unhandled `UNKNOWN`
//!
//! # Design Decisions
//! - Only the failing request is affected by a fault; the panic is caught
//!   at the invocation boundary
//! - Fault details go to the log, never to the client

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::binding::{BindError, PendingMessage};
use crate::rpc::method::{MethodDescriptor, MethodHandler, Reply, RpcError};
use crate::rpc::status::{Code, Status};

/// What a failed invocation reports to the error translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDescriptor {
    pub code: Code,
    pub message: String,
    /// Raised on purpose by service logic, as opposed to an unexpected fault.
    pub handled: bool,
}

impl FailureDescriptor {
    /// A declared failure. `OK` is not a failure code, so it is reported as
    /// an unhandled `UNKNOWN` and can never surface as a 200.
    pub fn handled(status: &Status) -> Self {
        if status.code() == Code::Ok {
            return Self::unhandled();
        }
        Self {
            code: status.code(),
            message: status.describe(),
            handled: true,
        }
    }

    pub fn unhandled() -> Self {
        Self {
            code: Code::Unknown,
            message: Code::Unknown.name().to_string(),
            handled: false,
        }
    }
}

/// Failure of a dispatch attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The request could not be decoded; the method was never invoked.
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("{}", .0.message)]
    Failed(FailureDescriptor),
}

/// Invoke `handler` with `request`.
pub async fn dispatch(
    rpc: &MethodDescriptor,
    handler: &dyn MethodHandler,
    request: PendingMessage,
) -> Result<Reply, DispatchError> {
    let call = handler.call(request)?;

    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(RpcError::Status(status))) if status.code() == Code::Ok => {
            tracing::error!(rpc = %rpc, message = status.message(), "Service failed with status OK");
            Err(DispatchError::Failed(FailureDescriptor::unhandled()))
        }
        Ok(Err(RpcError::Status(status))) => {
            tracing::debug!(rpc = %rpc, code = %status.code(), message = status.message(), "Service returned failure");
            Err(DispatchError::Failed(FailureDescriptor::handled(&status)))
        }
        Ok(Err(RpcError::Fault(error))) => {
            tracing::error!(rpc = %rpc, error = %error, "Unhandled fault in service method");
            Err(DispatchError::Failed(FailureDescriptor::unhandled()))
        }
        Err(panic) => {
            tracing::error!(rpc = %rpc, panic = panic_message(&*panic), "Service method panicked");
            Err(DispatchError::Failed(FailureDescriptor::unhandled()))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
