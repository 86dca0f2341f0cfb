pub mod oanda;
pub mod telegram;

pub use oanda::{MarketDataError, OandaClient};
pub use telegram::{Chat, DeliveryError, IncomingMessage, TelegramClient, Update};
