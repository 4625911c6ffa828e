//! Fan-out of inbound messages and user commands to active sessions.
//!
//! One call marshals once, lends the host once, and runs every interested
//! session in activation order. The marshaled arena and the context handle
//! are locals of the call, so they are released on every exit path,
//! unwinding included.

use slirc_wire::RawIrcMsg;
use tracing::trace;

use super::host::{ContextHandle, ExtensionHost};
use super::loader::PluginLibrary;
use super::marshal::{CommandView, MarshaledMessage};
use super::session::Session;

/// Deliver `msg`, received on `network`, to every session with a message
/// hook. Returns how many sessions were invoked.
///
/// Nothing is marshaled, and nothing allocated, when no session wants
/// messages. Hook return values are not interpreted.
pub fn notify<L: PluginLibrary>(
    network: &str,
    host: &mut dyn ExtensionHost,
    msg: &RawIrcMsg,
    sessions: &[Session<L>],
) -> usize {
    let mut targets = sessions
        .iter()
        .filter(|s| s.hooks().handles_messages())
        .peekable();
    if targets.peek().is_none() {
        return 0;
    }

    let marshaled = MarshaledMessage::new(network, msg);
    let view = marshaled.view();
    let mut ctx = ContextHandle::new(host);
    let ctx_ptr = ctx.as_ptr();

    let mut invoked = 0;
    for session in targets {
        let _status = session
            .hooks()
            .process_message(ctx_ptr, session.token().as_raw(), view.as_ptr());
        invoked += 1;
    }

    trace!(
        network,
        command = %String::from_utf8_lossy(&msg.command),
        invoked,
        "Dispatched message"
    );
    invoked
}

/// Deliver a user command to every session with a command hook.
pub fn notify_command<L: PluginLibrary>(
    host: &mut dyn ExtensionHost,
    text: &str,
    sessions: &[Session<L>],
) -> usize {
    let mut targets = sessions
        .iter()
        .filter(|s| s.hooks().handles_commands())
        .peekable();
    if targets.peek().is_none() {
        return 0;
    }

    let cmd = CommandView::new(text.as_bytes());
    let mut ctx = ContextHandle::new(host);
    let ctx_ptr = ctx.as_ptr();

    let mut invoked = 0;
    for session in targets {
        let _status = session
            .hooks()
            .process_command(ctx_ptr, session.token().as_raw(), cmd.as_ptr());
        invoked += 1;
    }

    trace!(invoked, "Dispatched command");
    invoked
}
