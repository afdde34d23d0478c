// Discord censor adapters - translate between Discord messages and the
// core element model.

pub mod message_handler;
pub mod send_hook;
