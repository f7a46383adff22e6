//! Shared helpers for unit and integration tests.

use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::errors::CallbackResult;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "cmdtree=trace");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Ordered record of which callbacks ran.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that records `label` and succeeds.
    pub fn ok(&self, label: &str) -> impl FnMut() -> CallbackResult + 'static {
        let calls = Rc::clone(&self.calls);
        let label = label.to_string();
        move || {
            calls.borrow_mut().push(label.clone());
            Ok(())
        }
    }

    /// Callback that records `label` and fails with `message`.
    pub fn fail(&self, label: &str, message: &str) -> impl FnMut() -> CallbackResult + 'static {
        let calls = Rc::clone(&self.calls);
        let label = label.to_string();
        let message = message.to_string();
        move || {
            calls.borrow_mut().push(label.clone());
            Err(message.clone().into())
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_recorded_callbacks_when_called_then_log_keeps_order() {
        init_test_setup();
        let log = CallLog::new();
        let mut first = log.ok("first");
        let mut second = log.fail("second", "boom");
        assert!(first().is_ok());
        assert_eq!(second().unwrap_err().to_string(), "boom");
        assert_eq!(log.calls(), vec!["first", "second"]);
    }
}
