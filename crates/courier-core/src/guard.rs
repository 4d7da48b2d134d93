//! Authorization predicates over (message, principal). Stateless and
//! side-effect-free; the boundary evaluates these before any message store
//! call reachable by an external principal, and raises Forbidden itself on
//! a false answer.

use courier_types::models::Message;

/// True iff the principal is a party to the message — its sender or its
/// recipient.
pub fn can_read(message: &Message, principal: &str) -> bool {
    message.from_user.username == principal || message.to_user.username == principal
}

/// True iff the principal is the recipient. The sender may never mark
/// their own sent message as read.
pub fn can_mark_read(message: &Message, principal: &str) -> bool {
    message.to_user.username == principal
}
