//! Discord delivery for verwatch: a channel sink for update notices and a
//! gateway bot that answers `ping` and `status` commands.

pub mod client;
pub mod handler;
pub mod sink;

pub use {client::build_client, handler::BotHandler, sink::ChannelSink};
