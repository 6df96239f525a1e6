//! Backend RPC subsystem.
//!
//! # Data Flow
//! ```text
//! PendingMessage (bound request)
//!     → method.rs (typed decode, invoke service closure, encode reply)
//!     → dispatcher.rs (capture declared failures, faults and panics)
//!     → Reply | FailureDescriptor
//!     → status.rs (code → HTTP status)
//! ```
//!
//! # Design Decisions
//! - Declared failures and faults are separate variants, not a hierarchy
//! - Status mapping is total over the code enumeration
//! - Method references are registered once and shared read-only

pub mod dispatcher;
pub mod method;
pub mod status;

pub use dispatcher::{dispatch, DispatchError, FailureDescriptor};
pub use method::{
    BoxError, MethodDescriptor, MethodHandler, MethodKind, Reply, RpcError, StreamingMethod,
    UnaryMethod,
};
pub use status::{Code, Status};
