//! Handles for reading parsed flag and argument values from callbacks.
//!
//! Hooks and actions take no arguments. Registering a flag or argument hands
//! back a [`Value`], a shared slot that the dispatcher fills from the parse
//! before the first hook runs.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use clap::parser::ValueSource;
use clap::ArgMatches;
use tracing::instrument;

#[derive(Debug, Default)]
struct Slot {
    present: bool,
    values: Vec<String>,
}

/// Parsed value(s) of one flag or positional argument.
///
/// Cloning is cheap and every clone observes the same slot, so the same
/// handle can be moved into several callbacks.
#[derive(Debug, Clone)]
pub struct Value {
    id: String,
    slot: Rc<RefCell<Slot>>,
}

impl Value {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slot: Rc::new(RefCell::new(Slot::default())),
        }
    }

    /// Identifier the value was registered under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last value given, or the default value if one was declared.
    pub fn get(&self) -> Option<String> {
        self.slot.borrow().values.last().cloned()
    }

    pub fn get_all(&self) -> Vec<String> {
        self.slot.borrow().values.clone()
    }

    /// Whether the value came from the command line or the environment
    /// rather than a declared default.
    pub fn is_present(&self) -> bool {
        self.slot.borrow().present
    }

    /// Parse the last value with [`FromStr`].
    pub fn parse<T: FromStr>(&self) -> Option<Result<T, T::Err>> {
        self.slot.borrow().values.last().map(|v| v.parse())
    }

    #[instrument(level = "trace", skip(matches))]
    pub(crate) fn bind(&self, matches: &ArgMatches) {
        let mut slot = self.slot.borrow_mut();
        *slot = Slot::default();
        if let Ok(Some(raw)) = matches.try_get_raw(&self.id) {
            slot.values = raw.map(|v| v.to_string_lossy().into_owned()).collect();
        }
        slot.present = matches!(
            matches.value_source(&self.id),
            Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable)
        );
    }

    pub(crate) fn reset(&self) {
        *self.slot.borrow_mut() = Slot::default();
    }
}
