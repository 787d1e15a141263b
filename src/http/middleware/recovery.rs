//! Panic recovery middleware.
//!
//! # Responsibilities
//! - Run the rest of the chain behind `catch_unwind`
//! - Log the panic message with a backtrace taken at the panic site
//! - Answer `500 Internal Server Error` instead of letting the panic escape
//!
//! # Design Decisions
//! - The client only ever sees the fixed body; detail goes to the log
//! - Backtraces come from a panic hook installed once per process. Inside a
//!   barrier it records the trace for the current thread; outside one it
//!   defers to the previously installed hook
//! - Log first, then respond

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use axum::http::StatusCode;

use crate::http::context::Context;

pub const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

thread_local! {
    static BARRIER_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Marks the current thread as being inside a barrier while alive.
struct Barrier;

impl Barrier {
    fn enter() -> Self {
        BARRIER_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Barrier
    }
}

impl Drop for Barrier {
    fn drop(&mut self) {
        BARRIER_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if BARRIER_DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let location = info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            let trace = format!("at {location}\n{}", Backtrace::force_capture());
            LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Converts a panic anywhere later in the chain into a 500 response.
pub fn recovery() -> impl Fn(&mut Context) + Send + Sync + 'static {
    install_hook();
    |ctx: &mut Context| {
        let outcome = {
            let _barrier = Barrier::enter();
            panic::catch_unwind(AssertUnwindSafe(|| ctx.next()))
        };

        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            let trace = LAST_TRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(|| "<no backtrace captured>".to_string());
            tracing::error!(
                method = %ctx.method(),
                path = %ctx.path(),
                panic = %message,
                "{message}\nTraceback:\n{trace}"
            );
            ctx.fail(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::{ChainState, HandlerFunc};
    use axum::body::Bytes;
    use std::sync::{Arc, Mutex};

    fn context(handlers: Vec<HandlerFunc>) -> Context {
        let request = axum::http::Request::builder()
            .uri("/panic")
            .body(Bytes::new())
            .unwrap();
        let mut ctx = Context::new(request.into());
        ctx.set_handlers(handlers);
        ctx
    }

    #[test]
    fn test_panic_becomes_500() {
        let boom = Arc::new(|c: &mut Context| {
            c.string(StatusCode::OK, "half written");
            let names: Vec<&str> = Vec::new();
            c.string(StatusCode::OK, names[3]);
        }) as HandlerFunc;
        let guard: HandlerFunc = Arc::new(recovery());
        let mut ctx = context(vec![guard, boom]);
        ctx.dispatch();

        assert_eq!(ctx.state(), ChainState::Failed);
        assert_eq!(ctx.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.response().body(), INTERNAL_SERVER_ERROR_BODY.as_bytes());
    }

    #[test]
    fn test_outer_middleware_unwinds_after_recovery() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let outer = {
            let log = log.clone();
            Arc::new(move |c: &mut Context| {
                c.next();
                log.lock().unwrap().push(c.status_code().as_u16());
            }) as HandlerFunc
        };
        let boom = Arc::new(|_: &mut Context| {
            panic!("boom");
        }) as HandlerFunc;
        let guard: HandlerFunc = Arc::new(recovery());
        let mut ctx = context(vec![outer, guard, boom]);
        ctx.dispatch();

        assert_eq!(*log.lock().unwrap(), vec![500]);
    }

    #[test]
    fn test_no_panic_passes_through() {
        let ok = Arc::new(|c: &mut Context| c.string(StatusCode::OK, "fine")) as HandlerFunc;
        let guard: HandlerFunc = Arc::new(recovery());
        let mut ctx = context(vec![guard, ok]);
        ctx.dispatch();

        assert_eq!(ctx.state(), ChainState::Completed);
        assert_eq!(ctx.response().body(), b"fine");
    }

    fn take_trace() -> Option<String> {
        LAST_TRACE.with(|slot| slot.borrow_mut().take())
    }

    #[test]
    fn test_hook_records_trace_inside_barrier() {
        install_hook();
        take_trace();

        let outcome = {
            let _barrier = Barrier::enter();
            panic::catch_unwind(|| panic!("inside"))
        };
        assert!(outcome.is_err());

        let trace = take_trace().expect("trace recorded at the panic site");
        assert!(trace.starts_with("at "));
        assert!(trace.contains("recovery.rs:"));
        assert_eq!(BARRIER_DEPTH.with(Cell::get), 0);
    }

    #[test]
    fn test_hook_defers_outside_barrier() {
        install_hook();
        take_trace();

        let outcome = panic::catch_unwind(|| panic!("outside"));
        assert!(outcome.is_err());
        assert!(take_trace().is_none());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "non-string panic payload");
    }
}
