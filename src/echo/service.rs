//! Echo backend.
//!
//! Every method answers with an [`Echo`] whose content names the method
//! that produced it, so callers can tell which route was dispatched.

use futures_util::stream::{self, Stream};

use crate::echo::messages::*;
use crate::rpc::{RpcError, Status};

const SERVICE: &str = "EchoService";

fn content(method: &str) -> String {
    format!("{SERVICE}#{method}")
}

#[derive(Debug, Default)]
pub struct EchoService;

impl EchoService {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_echo(&self, req: GetEchoRequest) -> Result<Echo, RpcError> {
        Ok(Echo::new(req.id, content("getEcho")))
    }

    pub async fn get_echo_by_content(&self, _req: GetEchoByContentRequest) -> Result<Echo, RpcError> {
        Ok(Echo::new(2, content("getEchoByContent")))
    }

    pub async fn single_get_echo(&self, req: SingleGetEchoRequest) -> Result<Echo, RpcError> {
        Ok(Echo::new(req.id, content("singleGetEcho")))
    }

    pub async fn enum_get_echo(&self, req: EnumGetEchoRequest) -> Result<Echo, RpcError> {
        let types = req
            .types
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Echo::new(
            99,
            format!("{}:{},[{}]", content("enumGetEcho"), req.kind, types),
        ))
    }

    /// One echo per requested id, in request order.
    pub fn multi_get_echo(
        &self,
        req: MultiGetEchoRequest,
    ) -> impl Stream<Item = Result<Echo, RpcError>> + Send + 'static {
        stream::iter(
            req.id
                .into_iter()
                .map(|id| Ok(Echo::new(id, content("multiGetEcho")))),
        )
    }

    pub async fn delete_echo(&self, req: DeleteEchoRequest) -> Result<Echo, RpcError> {
        Ok(Echo::new(req.id, content("deleteEcho")))
    }

    pub async fn new_echo(&self, req: NewEchoRequest) -> Result<Echo, RpcError> {
        Ok(Echo::new(req.echo.id, content("newEcho")))
    }

    pub async fn update_echo(&self, req: UpdateEchoRequest) -> Result<Echo, RpcError> {
        Ok(Echo::new(req.echo.id, content("updateEcho")))
    }

    /// Id 1 fails with a declared status, id 2 with an undeclared fault.
    pub async fn error_echo(&self, req: ErrorEchoRequest) -> Result<Echo, RpcError> {
        match req.id {
            1 => Err(Status::invalid_argument("Handled Exception!").into()),
            2 => Err(RpcError::fault(format!("echo {} could not be produced", req.id))),
            id => Ok(Echo::new(id, content("errorEcho"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::Code;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_enum_content() {
        let echo = EchoService::new()
            .enum_get_echo(EnumGetEchoRequest {
                kind: EchoType::TypeB,
                types: vec![EchoType::TypeA, EchoType::TypeB],
            })
            .await
            .unwrap();
        assert_eq!(echo.id, 99);
        assert_eq!(echo.content, "EchoService#enumGetEcho:TYPE_B,[TYPE_A, TYPE_B]");
    }

    #[tokio::test]
    async fn test_multi_get_keeps_order() {
        let echoes: Vec<_> = EchoService::new()
            .multi_get_echo(MultiGetEchoRequest { id: vec![3, 1] })
            .map(|r| r.unwrap().id)
            .collect()
            .await;
        assert_eq!(echoes, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_error_echo() {
        let service = EchoService::new();
        match service.error_echo(ErrorEchoRequest { id: 1 }).await {
            Err(RpcError::Status(status)) => assert_eq!(status.code(), Code::InvalidArgument),
            other => panic!("expected status, got {other:?}"),
        }
        assert!(matches!(
            service.error_echo(ErrorEchoRequest { id: 2 }).await,
            Err(RpcError::Fault(_))
        ));
        assert_eq!(service.error_echo(ErrorEchoRequest { id: 5 }).await.unwrap().id, 5);
    }
}
