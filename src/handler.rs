/*
 * The event-procedure contract. A procedure receives the platform itself, so
 * it can create and destroy windows, change redirection targets or run a
 * nested modal loop while handling an event. Procedures are shared (`Rc`)
 * rather than owned by the router: the router clones the procedure out of the
 * window record before calling it, which keeps re-entrant dispatch to the
 * same window sound. Procedures that need mutable state capture a `Cell` or
 * `RefCell`.
 */
use crate::app::Platform;
use crate::types::Event;

use std::fmt;
use std::rc::Rc;

/// `(kind, window, param1, param2) -> bool`. Returning `true` lets the router
/// perform the event's default action; `false` vetoes it.
pub trait EventProcedure {
    fn handle_event(&self, platform: &mut Platform, event: &Event) -> bool;
}

impl<F> EventProcedure for F
where
    F: Fn(&mut Platform, &Event) -> bool,
{
    fn handle_event(&self, platform: &mut Platform, event: &Event) -> bool {
        self(platform, event)
    }
}

/// Per-window handler slot. `NoHandler` falls through to the main handler.
#[derive(Clone, Default)]
pub enum WindowHandler {
    #[default]
    NoHandler,
    Custom(Rc<dyn EventProcedure>),
}

impl WindowHandler {
    pub fn custom(procedure: impl EventProcedure + 'static) -> Self {
        WindowHandler::Custom(Rc::new(procedure))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, WindowHandler::Custom(_))
    }

    pub(crate) fn procedure(&self) -> Option<Rc<dyn EventProcedure>> {
        match self {
            WindowHandler::NoHandler => None,
            WindowHandler::Custom(procedure) => Some(Rc::clone(procedure)),
        }
    }
}

impl fmt::Debug for WindowHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowHandler::NoHandler => f.write_str("NoHandler"),
            WindowHandler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
