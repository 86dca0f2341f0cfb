/// Chat command grammar
///
/// Parsing is pure and total: any text either becomes a typed command, a
/// fixed usage reply for a known verb with bad arguments, or is ignored.

/// Usage reply for `/mm` with the wrong argument count
pub const MM_USAGE_MSG: &str =
    "Invalid parameters. Please use the format `/mm margin_balance risk_percentage sl_pips`.";

/// Reply for `/mm` arguments that fail numeric parsing
pub const MM_NUMERIC_MSG: &str =
    "Invalid parameters. Please use numeric values for margin balance, risk percentage, and SL pips.";

/// Reply for a zero or negative stop-loss distance
pub const MM_PIPS_MSG: &str = "Invalid parameters. SL pips must be greater than zero.";

/// Usage reply for `/indicator` with the wrong argument count
pub const INDICATOR_USAGE_MSG: &str =
    "Invalid parameters. Please use the format `/indicator symbol granularity`.";

/// A recognized chat command with typed arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Latest close for every configured instrument
    Price,
    /// Position-size calculation from balance, risk, and stop distance
    MoneyManagement {
        margin_balance: f64,
        risk_percentage: f64,
        sl_pips: i64,
    },
    /// Echo the numeric chat id back to the sender
    ChatId,
    /// SMA/EMA snapshot for one instrument and granularity
    Indicator { symbol: String, granularity: String },
}

/// Outcome of parsing one inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    /// A well-formed command
    Command(Command),
    /// A known verb with malformed arguments; carries the reply to send
    Invalid(&'static str),
    /// Not addressed to the bot; stays silent
    Unrecognized,
}

/// Parse one message. The first whitespace token must be a known verb
/// exactly; anything else is ignored rather than answered.
pub fn parse_message(text: &str) -> ParsedMessage {
    let mut tokens = text.split_whitespace();
    let verb = match tokens.next() {
        Some(verb) => verb,
        None => return ParsedMessage::Unrecognized,
    };
    let args: Vec<&str> = tokens.collect();

    match verb {
        "/price" => ParsedMessage::Command(Command::Price),
        "/chatid" => ParsedMessage::Command(Command::ChatId),
        "/mm" => parse_money_management(&args),
        "/indicator" => parse_indicator(&args),
        _ => ParsedMessage::Unrecognized,
    }
}

fn parse_money_management(args: &[&str]) -> ParsedMessage {
    if args.len() != 3 {
        return ParsedMessage::Invalid(MM_USAGE_MSG);
    }

    let margin_balance = args[0].parse::<f64>();
    let risk_percentage = strip_unit(args[1], "%").parse::<f64>();
    let sl_pips = strip_unit(args[2], "pips").parse::<i64>();

    match (margin_balance, risk_percentage, sl_pips) {
        (Ok(margin_balance), Ok(risk_percentage), Ok(sl_pips)) => {
            ParsedMessage::Command(Command::MoneyManagement {
                margin_balance,
                risk_percentage,
                sl_pips,
            })
        }
        _ => ParsedMessage::Invalid(MM_NUMERIC_MSG),
    }
}

fn parse_indicator(args: &[&str]) -> ParsedMessage {
    if args.len() != 2 {
        return ParsedMessage::Invalid(INDICATOR_USAGE_MSG);
    }

    ParsedMessage::Command(Command::Indicator {
        symbol: args[0].to_string(),
        // Broker granularities are uppercase (M1, H4, D)
        granularity: args[1].to_uppercase(),
    })
}

/// Strip one trailing unit suffix (`%`, `pips`) when present
fn strip_unit<'a>(raw: &'a str, unit: &str) -> &'a str {
    raw.strip_suffix(unit).unwrap_or(raw)
}
