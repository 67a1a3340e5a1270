//! Built-in session operations.
//!
//! These touch only session state: login binds a user and opens the
//! readiness gate, logout closes it again.

use sdkgate_core::SdkError;
use sdkgate_dispatch::{InvocationContext, OperationCatalog, operation};
use tracing::info;

/// Version reported by `GetSdkVersion`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `GetLoginStatus` values.
pub mod login_status {
    /// No user bound.
    pub const LOGOUT: i32 = 1;
    /// User bound, resources loaded.
    pub const LOGGED: i32 = 3;
}

/// Catalog of every built-in operation, keyed by wire method name.
pub fn catalog() -> OperationCatalog {
    let mut catalog = OperationCatalog::new();
    catalog.register("Login", operation(login));
    catalog.register("Logout", operation(logout));
    catalog.register("GetLoginStatus", operation(get_login_status));
    catalog.register(
        "GetLoginUserID",
        operation(get_login_user_id).named("GetLoginUserID"),
    );
    catalog.register("GetSdkVersion", operation(get_sdk_version));
    catalog.register_with_progress("UploadFile", operation(upload_file));
    catalog
}

async fn login(ctx: InvocationContext, user_id: String, token: String) -> Result<(), SdkError> {
    if user_id.is_empty() {
        return Err(SdkError::args("user id is empty"));
    }
    if token.is_empty() {
        return Err(SdkError::args("token is empty"));
    }
    info!(user_id, session_id = %ctx.session().id(), "login");
    ctx.session().establish(user_id);
    Ok(())
}

async fn logout(ctx: InvocationContext) -> Result<(), SdkError> {
    info!(session_id = %ctx.session().id(), "logout");
    ctx.session().clear();
    Ok(())
}

async fn get_login_status(ctx: InvocationContext) -> i32 {
    let session = ctx.session();
    if session.readiness().is_loaded() && session.user_id().is_some() {
        login_status::LOGGED
    } else {
        login_status::LOGOUT
    }
}

async fn get_login_user_id(ctx: InvocationContext) -> String {
    ctx.session().user_id().unwrap_or_default()
}

async fn get_sdk_version(_ctx: InvocationContext) -> String {
    SDK_VERSION.to_owned()
}

async fn upload_file(
    ctx: InvocationContext,
    path: String,
    chunks: i32,
) -> Result<String, SdkError> {
    if path.is_empty() {
        return Err(SdkError::args("file path is empty"));
    }
    if chunks <= 0 {
        return Err(SdkError::args(format!("chunk count must be positive, got {chunks}")));
    }
    for sent in 1..=chunks {
        ctx.report_percent(chunk_percent(sent, chunks))
            .await
            .map_err(|e| SdkError::internal(e.to_string()))?;
        tokio::task::yield_now().await;
    }
    Ok(path)
}

fn chunk_percent(sent: i32, chunks: i32) -> u32 {
    u32::try_from(i64::from(sent) * 100 / i64::from(chunks)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use sdkgate_core::{EventData, codes};
    use sdkgate_dispatch::wire::WireArg;
    use sdkgate_dispatch::{FuncRouter, Responder, SessionState};
    use tokio::sync::mpsc;

    use super::*;

    fn make_test_router() -> (FuncRouter, mpsc::Receiver<EventData>) {
        let (responder, rx) = Responder::channel(32);
        (
            FuncRouter::new(responder, Arc::new(SessionState::default())),
            rx,
        )
    }

    async fn call(
        router: &FuncRouter,
        rx: &mut mpsc::Receiver<EventData>,
        method: &str,
        args: Vec<WireArg>,
    ) -> EventData {
        let catalog = catalog();
        let entry = catalog.get(method).unwrap();
        router.call_entry("op", entry, args).await.unwrap().unwrap();
        let mut last = None;
        while let Ok(Some(ev)) = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
            let terminal = !ev.event.ends_with("Progress");
            last = Some(ev);
            if terminal {
                break;
            }
        }
        last.unwrap()
    }

    fn s(v: &str) -> WireArg {
        WireArg::from(v)
    }

    #[test]
    fn catalog_lists_builtins() {
        let c = catalog();
        assert_eq!(
            c.methods(),
            vec![
                "GetLoginStatus",
                "GetLoginUserID",
                "GetSdkVersion",
                "Login",
                "Logout",
                "UploadFile"
            ]
        );
        assert!(c.get("UploadFile").unwrap().progress);
    }

    // ── Login / Logout ──────────────────────────────────────────────

    #[tokio::test]
    async fn login_opens_gate() {
        let (router, mut rx) = make_test_router();
        let ev = call(&router, &mut rx, "Login", vec![s("u1"), s("tok")]).await;
        assert_eq!(ev.event, "Login");
        assert_eq!(ev.err_code, 0);

        let ev = call(&router, &mut rx, "GetLoginStatus", vec![]).await;
        assert_eq!(ev.data, login_status::LOGGED.to_string());

        let ev = call(&router, &mut rx, "GetLoginUserID", vec![]).await;
        assert_eq!(ev.event, "GetLoginUserID");
        assert_eq!(ev.data, "\"u1\"");
    }

    #[tokio::test]
    async fn login_rejects_empty_token() {
        let (router, mut rx) = make_test_router();
        let ev = call(&router, &mut rx, "Login", vec![s("u1"), s("")]).await;
        assert_eq!(ev.err_code, codes::ARGS_ERROR);
        assert_eq!(ev.err_msg, "token is empty");
        assert!(!router.session().readiness().is_loaded());
    }

    #[tokio::test]
    async fn calls_before_login_are_gated() {
        let (router, mut rx) = make_test_router();
        let ev = call(&router, &mut rx, "GetSdkVersion", vec![]).await;
        assert_eq!(ev.err_code, codes::RESOURCE_LOAD_NOT_COMPLETE);
    }

    #[tokio::test]
    async fn logout_closes_gate() {
        let (router, mut rx) = make_test_router();
        let _ = call(&router, &mut rx, "Login", vec![s("u1"), s("tok")]).await;
        let ev = call(&router, &mut rx, "Logout", vec![]).await;
        assert_eq!(ev.err_code, 0);
        assert!(router.session().user_id().is_none());

        let ev = call(&router, &mut rx, "GetLoginStatus", vec![]).await;
        assert_eq!(ev.err_code, codes::RESOURCE_LOAD_NOT_COMPLETE);
    }

    #[tokio::test]
    async fn login_status_direct() {
        let session = Arc::new(SessionState::default());
        let ctx = InvocationContext::new("op", "GetLoginStatus", Arc::clone(&session), None);
        assert_eq!(get_login_status(ctx.clone()).await, login_status::LOGOUT);
        session.establish("u1");
        assert_eq!(get_login_status(ctx).await, login_status::LOGGED);
    }

    // ── Version / Upload ────────────────────────────────────────────

    #[tokio::test]
    async fn sdk_version() {
        let (router, mut rx) = make_test_router();
        let _ = call(&router, &mut rx, "Login", vec![s("u1"), s("tok")]).await;
        let ev = call(&router, &mut rx, "GetSdkVersion", vec![]).await;
        assert_eq!(ev.data, format!("\"{SDK_VERSION}\""));
    }

    #[tokio::test]
    async fn upload_reports_progress() {
        let (router, mut rx) = make_test_router();
        let _ = call(&router, &mut rx, "Login", vec![s("u1"), s("tok")]).await;

        let entry = catalog();
        router
            .call_entry(
                "op-up",
                entry.get("UploadFile").unwrap(),
                vec![s("/tmp/a.png"), WireArg::Number(2.0)],
            )
            .await
            .unwrap()
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event, "UploadFileProgress");
        assert_eq!(first.data, r#"{"progress":50}"#);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.data, r#"{"progress":100}"#);
        let done = rx.recv().await.unwrap();
        assert_eq!(done.event, "UploadFile");
        assert_eq!(done.operation_id, "op-up");
        assert_eq!(done.data, "\"/tmp/a.png\"");
    }

    #[test]
    fn chunk_percent_handles_large_counts() {
        assert_eq!(chunk_percent(1, 4), 25);
        assert_eq!(chunk_percent(i32::MAX, i32::MAX), 100);
        assert_eq!(chunk_percent(30_000_000, 60_000_000), 50);
    }

    #[tokio::test]
    async fn upload_rejects_bad_chunk_count() {
        let (router, mut rx) = make_test_router();
        let _ = call(&router, &mut rx, "Login", vec![s("u1"), s("tok")]).await;
        let ev = call(
            &router,
            &mut rx,
            "UploadFile",
            vec![s("/tmp/a.png"), WireArg::Number(0.0)],
        )
        .await;
        assert_eq!(ev.err_code, codes::ARGS_ERROR);
    }
}
