use crate::api::oanda::OandaClient;
use crate::bot::command::{parse_message, Command, ParsedMessage, MM_PIPS_MSG};
use crate::indicators::{compute_indicators, IndicatorSet, DEFAULT_WINDOWS};
use crate::models::Instrument;
use crate::risk::{lot_size, LotSizeError};

/// Candles requested per instrument for `/price`
const PRICE_CANDLE_COUNT: u32 = 1;
/// Granularity used for `/price` quotes
const PRICE_GRANULARITY: &str = "M1";
/// History depth fetched for `/indicator`, enough for the longest window
const INDICATOR_CANDLE_COUNT: u32 = 200;

/// Routes parsed commands to their handlers and renders reply text.
///
/// The dispatcher holds read-only state (broker client, instrument list), so
/// one instance serves concurrent requests without locking.
pub struct Dispatcher {
    oanda: OandaClient,
    instruments: Vec<Instrument>,
}

/// Result of one `/price` fetch for one instrument
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentQuote {
    /// Latest close price
    Quote { symbol: String, close: f64 },
    /// Broker answered but had no candles
    NoData { symbol: String },
    /// The fetch itself failed (status, transport, or payload)
    FetchFailed { symbol: String },
}

/// Successful command payload, kept apart from rendering so handlers stay
/// assertable in tests
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Prices(Vec<InstrumentQuote>),
    MoneyManagement {
        margin_balance: f64,
        risk_percentage: f64,
        sl_pips: i64,
        lots: f64,
    },
    ChatId(i64),
    Indicators {
        symbol: String,
        granularity: String,
        set: IndicatorSet,
    },
    /// `/indicator` fallback when no series could be fetched
    IndicatorsUnavailable { symbol: String },
}

impl Dispatcher {
    pub fn new(oanda: OandaClient, instruments: Vec<Instrument>) -> Self {
        Self { oanda, instruments }
    }

    /// Handle one inbound message end to end: parse, run, render.
    ///
    /// `None` means the message was not addressed to the bot and no reply
    /// should be sent.
    pub async fn dispatch(&self, text: &str, chat_id: i64) -> Option<String> {
        match parse_message(text) {
            ParsedMessage::Unrecognized => None,
            ParsedMessage::Invalid(reply) => Some(reply.to_string()),
            ParsedMessage::Command(command) => {
                tracing::info!(chat_id, ?command, "handling command");
                let rendered = match self.handle(command, chat_id).await {
                    Ok(reply) => reply.render(),
                    Err(user_error) => user_error,
                };
                Some(rendered)
            }
        }
    }

    /// Run one command. `Err` carries a user-facing reply, never an internal
    /// failure; upstream trouble is folded into the payload variants instead.
    async fn handle(&self, command: Command, chat_id: i64) -> Result<CommandReply, String> {
        match command {
            Command::Price => Ok(CommandReply::Prices(self.fetch_quotes().await)),
            Command::MoneyManagement {
                margin_balance,
                risk_percentage,
                sl_pips,
            } => match lot_size(margin_balance, risk_percentage, sl_pips) {
                Ok(lots) => Ok(CommandReply::MoneyManagement {
                    margin_balance,
                    risk_percentage,
                    sl_pips,
                    lots,
                }),
                Err(LotSizeError::NonPositiveStopLoss) => Err(MM_PIPS_MSG.to_string()),
            },
            Command::ChatId => Ok(CommandReply::ChatId(chat_id)),
            Command::Indicator {
                symbol,
                granularity,
            } => Ok(self.fetch_indicators(symbol, granularity).await),
        }
    }

    /// Latest close per configured instrument, one line's worth each.
    /// A failing instrument never aborts the walk.
    async fn fetch_quotes(&self) -> Vec<InstrumentQuote> {
        let mut quotes = Vec::with_capacity(self.instruments.len());

        for instrument in &self.instruments {
            let symbol = instrument.symbol.clone();
            let quote = match self
                .oanda
                .fetch_candles(&symbol, PRICE_GRANULARITY, PRICE_CANDLE_COUNT)
                .await
            {
                Ok(series) => match series.latest() {
                    Some(candle) => InstrumentQuote::Quote {
                        symbol,
                        close: candle.close,
                    },
                    None => InstrumentQuote::NoData { symbol },
                },
                Err(e) if e.is_no_data() => InstrumentQuote::NoData { symbol },
                Err(e) => {
                    tracing::warn!(instrument = %symbol, error = %e, "price fetch failed");
                    InstrumentQuote::FetchFailed { symbol }
                }
            };
            quotes.push(quote);
        }

        quotes
    }

    async fn fetch_indicators(&self, symbol: String, granularity: String) -> CommandReply {
        match self
            .oanda
            .fetch_candles(&symbol, &granularity, INDICATOR_CANDLE_COUNT)
            .await
        {
            Ok(series) => {
                let set = compute_indicators(&series.closes(), &DEFAULT_WINDOWS);
                CommandReply::Indicators {
                    symbol,
                    granularity,
                    set,
                }
            }
            Err(e) => {
                if !e.is_no_data() {
                    tracing::warn!(instrument = %symbol, error = %e, "indicator fetch failed");
                }
                CommandReply::IndicatorsUnavailable { symbol }
            }
        }
    }
}

impl CommandReply {
    /// Render the reply body sent back to the chat
    pub fn render(&self) -> String {
        match self {
            CommandReply::Prices(quotes) => quotes
                .iter()
                .map(InstrumentQuote::render)
                .collect::<Vec<_>>()
                .join("\n"),
            CommandReply::MoneyManagement {
                margin_balance,
                risk_percentage,
                sl_pips,
                lots,
            } => format!(
                "Money management calculation result:\n\nMargin Balance: ${}\nRisk Percentage: {}%\nSL Pips: {}\nLot Size: {}",
                margin_balance, risk_percentage, sl_pips, lots
            ),
            CommandReply::ChatId(chat_id) => format!("Your Chat ID is: {}", chat_id),
            CommandReply::Indicators {
                symbol,
                granularity,
                set,
            } => {
                let lines: Vec<String> = set
                    .entries()
                    .iter()
                    .map(|(label, value)| match value {
                        Some(v) => format!("{}: {}", label, v),
                        None => format!("{}: n/a", label),
                    })
                    .collect();
                format!(
                    "Indicators for {} ({}):\n\n{}",
                    symbol,
                    granularity,
                    lines.join("\n")
                )
            }
            CommandReply::IndicatorsUnavailable { symbol } => {
                format!("No data available for symbol: {}", symbol)
            }
        }
    }
}

impl InstrumentQuote {
    fn render(&self) -> String {
        match self {
            InstrumentQuote::Quote { symbol, close } => {
                format!("Symbol: {}, Close Price: {}", symbol, close)
            }
            InstrumentQuote::NoData { symbol } => {
                format!("No price available for symbol: {}", symbol)
            }
            InstrumentQuote::FetchFailed { symbol } => {
                format!("Failed to fetch price for symbol: {}", symbol)
            }
        }
    }
}
