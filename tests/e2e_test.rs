use std::net::SocketAddr;

use fxbot::api::{OandaClient, TelegramClient};
use fxbot::bot::Dispatcher;
use fxbot::models::Instrument;
use fxbot::server::{create_router, AppState};
use mockito::Matcher;
use serde_json::json;

// ============== Helpers ==============

fn instruments(symbols: &[&str]) -> Vec<Instrument> {
    symbols
        .iter()
        .map(|s| Instrument {
            symbol: s.to_string(),
        })
        .collect()
}

fn candles_body(closes: &[&str]) -> String {
    let candles: Vec<serde_json::Value> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            json!({
                "complete": true,
                "volume": 10,
                "time": format!("2024-03-01T12:{:02}:00.000000000Z", i),
                "mid": {"o": close, "h": close, "l": close, "c": close}
            })
        })
        .collect();
    json!({ "candles": candles }).to_string()
}

fn update(text: &str) -> serde_json::Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 7,
            "chat": {"id": 42, "type": "private"},
            "date": 1709294400,
            "text": text
        }
    })
}

/// Bind the real router on an ephemeral port, with both upstreams pointed at
/// mock servers.
async fn spawn_app(
    broker: &mockito::ServerGuard,
    telegram: &mockito::ServerGuard,
    symbols: &[&str],
) -> SocketAddr {
    let oanda = OandaClient::new("broker-token".to_string())
        .unwrap()
        .with_api_base(broker.url());
    let tg = TelegramClient::new("tg-token".to_string())
        .unwrap()
        .with_api_base(telegram.url());

    let state = AppState::new(Dispatcher::new(oanda, instruments(symbols)), tg);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn post_update(addr: SocketAddr, body: &serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{}/telegram-webhook", addr))
        .json(body)
        .send()
        .await
        .unwrap()
}

// ============== Tests ==============

#[tokio::test]
async fn test_e2e_price_command() {
    let _ = tracing_subscriber::fmt::try_init();
    println!("=== /price over the webhook ===\n");

    println!("1. Arranging broker candles (one instrument healthy, one failing)...");
    let mut broker = mockito::Server::new_async().await;
    let _quote_mock = broker
        .mock("GET", "/instruments/EUR_USD/candles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("count".into(), "1".into()),
            Matcher::UrlEncoded("granularity".into(), "M1".into()),
        ]))
        .match_header("authorization", "Bearer broker-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candles_body(&["1.0713"]))
        .create_async()
        .await;
    let _broken_mock = broker
        .mock("GET", "/instruments/GBP_USD/candles")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    println!("2. Expecting one reply with both price lines...");
    let mut telegram = mockito::Server::new_async().await;
    let send_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": 42,
            "reply_to_message_id": 7,
            "parse_mode": "Markdown",
            "text": "Symbol: EUR_USD, Close Price: 1.0713\nFailed to fetch price for symbol: GBP_USD",
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let addr = spawn_app(&broker, &telegram, &["EUR_USD", "GBP_USD"]).await;

    println!("3. Posting the webhook update...");
    let response = post_update(addr, &update("/price")).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
    send_mock.assert_async().await;
    println!("   ✓ Reply delivered with a line per instrument");
}

#[tokio::test]
async fn test_e2e_indicator_command() {
    println!("=== /indicator over the webhook ===\n");

    println!("1. Arranging five hourly candles (enough for the 5 window only)...");
    let mut broker = mockito::Server::new_async().await;
    let _candles_mock = broker
        .mock("GET", "/instruments/AUD_USD/candles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("count".into(), "200".into()),
            Matcher::UrlEncoded("granularity".into(), "H1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candles_body(&["1", "2", "3", "4", "5"]))
        .create_async()
        .await;

    let expected = "Indicators for AUD_USD (H1):\n\n\
        SMA_5: 3\nEMA_5: 3\n\
        SMA_10: n/a\nEMA_10: n/a\n\
        SMA_14: n/a\nEMA_14: n/a\n\
        SMA_21: n/a\nEMA_21: n/a\n\
        SMA_34: n/a\nEMA_34: n/a\n\
        SMA_50: n/a\nEMA_50: n/a\n\
        SMA_100: n/a\nEMA_100: n/a\n\
        SMA_200: n/a\nEMA_200: n/a";
    let mut telegram = mockito::Server::new_async().await;
    let send_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": 42,
            "text": expected,
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let addr = spawn_app(&broker, &telegram, &[]).await;

    println!("2. Posting /indicator with a lowercase granularity...");
    let response = post_update(addr, &update("/indicator AUD_USD h1")).await;

    assert_eq!(response.status(), 200);
    send_mock.assert_async().await;
    println!("   ✓ Short windows computed, long windows reported n/a");
}

#[tokio::test]
async fn test_e2e_money_management_command() {
    println!("=== /mm over the webhook ===\n");

    let broker = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let ok_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "text": "Money management calculation result:\n\nMargin Balance: $10000\nRisk Percentage: 2%\nSL Pips: 50\nLot Size: 0.308",
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;
    let zero_pips_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "text": "Invalid parameters. SL pips must be greater than zero.",
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;
    let usage_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "text": "Invalid parameters. Please use numeric values for margin balance, risk percentage, and SL pips.",
        })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let addr = spawn_app(&broker, &telegram, &[]).await;

    println!("1. Well-formed /mm with unit suffixes...");
    post_update(addr, &update("/mm 10000 2% 50pips")).await;
    ok_mock.assert_async().await;
    println!("   ✓ Lot size rounded to 0.308");

    println!("2. Zero stop-loss distance...");
    post_update(addr, &update("/mm 10000 2% 0pips")).await;
    zero_pips_mock.assert_async().await;
    println!("   ✓ Division guarded with a fixed reply");

    println!("3. Non-numeric arguments...");
    post_update(addr, &update("/mm ten 2% 50pips")).await;
    usage_mock.assert_async().await;
    println!("   ✓ Numeric-usage reply sent");
}

#[tokio::test]
async fn test_e2e_webhook_stays_silent_for_noise() {
    let broker = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;
    let send_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .expect(0)
        .create_async()
        .await;

    let addr = spawn_app(&broker, &telegram, &[]).await;

    // Plain conversation is acknowledged but never answered
    let response = post_update(addr, &update("good morning everyone")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");

    // Unknown slash command, same treatment
    let response = post_update(addr, &update("/unknown")).await;
    assert_eq!(response.status(), 200);

    // Sticker message without text
    let sticker = json!({
        "update_id": 2,
        "message": {
            "message_id": 8,
            "chat": {"id": 42},
            "sticker": {"file_id": "abc"}
        }
    });
    let response = post_update(addr, &sticker).await;
    assert_eq!(response.status(), 200);

    // Update that is not a message at all
    let edited = json!({
        "update_id": 3,
        "edited_message": {"message_id": 9, "chat": {"id": 42}, "text": "/price"}
    });
    let response = post_update(addr, &edited).await;
    assert_eq!(response.status(), 200);

    send_mock.assert_async().await;
}

#[tokio::test]
async fn test_e2e_webhook_rejects_malformed_payload() {
    let broker = mockito::Server::new_async().await;
    let telegram = mockito::Server::new_async().await;
    let addr = spawn_app(&broker, &telegram, &[]).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/telegram-webhook", addr))
        .header("content-type", "application/json")
        .body(r#"{"update_id": "not a number"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_e2e_webhook_acks_when_delivery_fails() {
    let broker = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;
    let _delivery_mock = telegram
        .mock("POST", "/bottg-token/sendMessage")
        .with_status(500)
        .create_async()
        .await;

    let addr = spawn_app(&broker, &telegram, &[]).await;

    // The update is still acknowledged so the platform does not re-deliver
    let response = post_update(addr, &update("/chatid")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_e2e_command_endpoint() {
    println!("=== Manual command endpoint ===\n");

    let broker = mockito::Server::new_async().await;
    let telegram = mockito::Server::new_async().await;
    let addr = spawn_app(&broker, &telegram, &[]).await;
    let client = reqwest::Client::new();

    println!("1. Liveness probe...");
    let body = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "worked");
    println!("   ✓ Root answers");

    println!("2. Command form...");
    let body = client
        .get(format!("http://{}/command", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(r#"name="input_text""#));
    println!("   ✓ Form served");

    println!("3. Dispatching /mm through the form...");
    let body = client
        .post(format!("http://{}/command", addr))
        .form(&[("input_text", "/mm 10000 2% 50pips")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Lot Size: 0.308"));
    println!("   ✓ Same grammar as the chat");

    println!("4. /chatid over HTTP uses the synthetic chat id...");
    let body = client
        .post(format!("http://{}/command", addr))
        .form(&[("input_text", "/chatid")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Your Chat ID is: 0");
    println!("   ✓ Chat id echoed");

    println!("5. Arbitrary input is parsed, never executed...");
    let response = client
        .post(format!("http://{}/command", addr))
        .form(&[("input_text", "rm -rf / && echo pwned")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "");
    println!("   ✓ Unrecognized input yields an empty body");
}
