//! HTTP routes for the echo backend.

use std::sync::Arc;

use crate::binding::BindingOrder;
use crate::echo::messages::*;
use crate::echo::service::EchoService;
use crate::routing::{Route, RouteError, RouteTable};

/// Response messages are wrapped under this key.
const ECHO_FIELD: &str = "echo";

/// Wrap an async `EchoService` method as a route closure.
macro_rules! unary {
    ($service:expr, $method:ident, $req:ty) => {{
        let service = Arc::clone(&$service);
        move |req: $req| {
            let service = Arc::clone(&service);
            async move { service.$method(req).await }
        }
    }};
}

/// Build the route table served in front of `service`.
pub fn echo_routes(service: Arc<EchoService>) -> Result<RouteTable, RouteError> {
    let multi = Arc::clone(&service);

    RouteTable::new([
        Route::get("/echo/{id}")
            .response_field(ECHO_FIELD)
            .unary("EchoService/GetEcho", unary!(service, get_echo, GetEchoRequest))?,
        Route::get("/echo/contents/{content}")
            .response_field(ECHO_FIELD)
            .unary(
                "EchoService/GetEchoByContent",
                unary!(service, get_echo_by_content, GetEchoByContentRequest),
            )?,
        Route::get("/echo_single")
            .query("id")
            .response_field(ECHO_FIELD)
            .unary(
                "EchoService/SingleGetEcho",
                unary!(service, single_get_echo, SingleGetEchoRequest),
            )?,
        Route::get("/echo_enum")
            .query("type")
            .query("types")
            .response_field(ECHO_FIELD)
            .unary(
                "EchoService/EnumGetEcho",
                unary!(service, enum_get_echo, EnumGetEchoRequest),
            )?,
        Route::get("/echo")
            .query("id")
            .response_field(ECHO_FIELD)
            .server_streaming("EchoService/MultiGetEcho", move |req: MultiGetEchoRequest| {
                multi.multi_get_echo(req)
            })?,
        Route::delete("/echo/{id}")
            .response_field(ECHO_FIELD)
            .unary("EchoService/DeleteEcho", unary!(service, delete_echo, DeleteEchoRequest))?,
        Route::post("/echo")
            .body("*")
            .response_field(ECHO_FIELD)
            .unary("EchoService/NewEcho", unary!(service, new_echo, NewEchoRequest))?,
        Route::post("/echo/in")
            .body("echo")
            .response_field(ECHO_FIELD)
            .unary("EchoService/NewEcho", unary!(service, new_echo, NewEchoRequest))?,
        Route::post("/echo/{echo.id}")
            .body("echo")
            .binding_order(BindingOrder::BodyThenPath)
            .response_field(ECHO_FIELD)
            .unary("EchoService/NewEcho", unary!(service, new_echo, NewEchoRequest))?,
        Route::put("/echo")
            .body("echo")
            .response_field(ECHO_FIELD)
            .unary("EchoService/UpdateEcho", unary!(service, update_echo, UpdateEchoRequest))?,
        Route::patch("/echo/{echo.id}")
            .body("echo")
            .binding_order(BindingOrder::PathThenBody)
            .response_field(ECHO_FIELD)
            .unary("EchoService/UpdateEcho", unary!(service, update_echo, UpdateEchoRequest))?,
        Route::get("/echo/error/{id}")
            .response_field(ECHO_FIELD)
            .unary("EchoService/ErrorEcho", unary!(service, error_echo, ErrorEchoRequest))?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    use crate::routing::Lookup;

    fn table() -> RouteTable {
        echo_routes(Arc::new(EchoService::new())).unwrap()
    }

    fn rpc_for(table: &RouteTable, verb: Method, path: &str) -> String {
        match table.lookup(&verb, path) {
            Lookup::Matched(m) => m.route.rpc().to_string(),
            other => panic!("{verb} {path} did not match: {other:?}"),
        }
    }

    #[test]
    fn test_every_route_registers() {
        assert_eq!(table().len(), 12);
    }

    #[test]
    fn test_literal_routes_beat_variables() {
        let table = table();
        assert_eq!(rpc_for(&table, Method::POST, "/echo/in"), "EchoService/NewEcho");
        assert_eq!(
            rpc_for(&table, Method::GET, "/echo/contents/c"),
            "EchoService/GetEchoByContent"
        );
        assert_eq!(rpc_for(&table, Method::GET, "/echo/error/1"), "EchoService/ErrorEcho");
        assert_eq!(rpc_for(&table, Method::GET, "/echo/7"), "EchoService/GetEcho");
    }

    #[test]
    fn test_unknown_verb_on_known_path() {
        let table = table();
        match table.lookup(&Method::PUT, "/echo/1") {
            Lookup::MethodNotAllowed(allowed) => {
                assert!(allowed.contains(&Method::GET));
                assert!(allowed.contains(&Method::PATCH));
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }
}
