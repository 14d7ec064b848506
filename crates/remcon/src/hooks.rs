//! Extension hooks: ordered interceptors over the inbound pipeline.
//!
//! Plugins can observe and veto console traffic at two points without
//! modifying the pipeline itself:
//!
//! 1. [`ConsoleHook::on_message`] — after an envelope decodes and its
//!    session handle is resolved, before tokenization.
//! 2. [`ConsoleHook::on_command`] — after tokenization, before the
//!    command executor runs.
//!
//! Hooks run in registration order; the first one returning
//! `Some(HookOutcome::Handled)` short-circuits the rest of the pipeline
//! for that message. Returning `None` lets processing continue.

use std::sync::Arc;

use remcon_protocol::RemoteMessage;
use remcon_session::RemoteClient;

/// What a hook decided about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// The hook fully handled the event; stop processing it.
    Handled,
}

/// An interceptor over inbound console traffic.
///
/// Both methods default to `None` ("not my business"), so a hook only
/// implements the point it cares about.
pub trait ConsoleHook: Send + Sync {
    /// Inspects a decoded envelope before it is tokenized.
    fn on_message(
        &self,
        client: &Arc<dyn RemoteClient>,
        message: &RemoteMessage,
    ) -> Option<HookOutcome> {
        let _ = (client, message);
        None
    }

    /// Inspects a tokenized command before it is dispatched.
    fn on_command(
        &self,
        client: &Arc<dyn RemoteClient>,
        command: &str,
        args: &[String],
    ) -> Option<HookOutcome> {
        let _ = (client, command, args);
        None
    }
}

/// Runs the `on_message` point of each hook in order, stopping at the
/// first non-absent outcome.
pub(crate) fn run_message_hooks(
    hooks: &[Arc<dyn ConsoleHook>],
    client: &Arc<dyn RemoteClient>,
    message: &RemoteMessage,
) -> Option<HookOutcome> {
    hooks.iter().find_map(|hook| hook.on_message(client, message))
}

/// Runs the `on_command` point of each hook in order, stopping at the
/// first non-absent outcome.
pub(crate) fn run_command_hooks(
    hooks: &[Arc<dyn ConsoleHook>],
    client: &Arc<dyn RemoteClient>,
    command: &str,
    args: &[String],
) -> Option<HookOutcome> {
    hooks
        .iter()
        .find_map(|hook| hook.on_command(client, command, args))
}
