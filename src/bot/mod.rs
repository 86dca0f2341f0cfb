// Chat command handling: parse, dispatch, render
pub mod command;
pub mod dispatcher;

pub use command::{parse_message, Command, ParsedMessage};
pub use dispatcher::{CommandReply, Dispatcher, InstrumentQuote};
