//! Mock backend binary for integration testing
//!
//! Implements minimal versions of the two external HTTP surfaces the runner
//! talks to - the provider REST API (token, Smart Transactions) and a W3C
//! WebDriver endpoint with a scripted checkout page - so the full scenario
//! can run without a provider account or a real browser.
//!
//! Prints `listening at: 127.0.0.1:PORT` on startup. An optional `--mode`
//! argument selects a misbehavior to simulate:
//! - `happy` (default): everything succeeds
//! - `wrong-path`: the created transaction's checkout URL has no checkout path
//! - `declined`: submitting the order redirects to the error return URL

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn main() {
    let mode = parse_mode();

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");
    println!("listening at: {addr}");

    let mut state = MockState::new(mode);

    for stream in listener.incoming() {
        let Ok(stream) = stream else { continue };
        handle_connection(stream, &mut state);
    }
}

fn parse_mode() -> Mode {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--mode" {
            return match args.next().as_deref() {
                Some("wrong-path") => Mode::WrongPath,
                Some("declined") => Mode::Declined,
                _ => Mode::Happy,
            };
        }
    }
    Mode::Happy
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Happy,
    WrongPath,
    Declined,
}

/// Which part of the scripted checkout page is currently rendered
#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Blank,
    CustomerForm,
    PaymentForm,
    Done,
}

struct MockState {
    mode: Mode,
    phase: Phase,
    current_url: String,
    transaction_created: bool,
}

impl MockState {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            phase: Phase::Blank,
            current_url: "about:blank".to_string(),
            transaction_created: false,
        }
    }

    /// Selectors the current phase's markup would match
    fn elements(&self) -> &'static [&'static str] {
        match self.phase {
            Phase::Blank => &["body"],
            Phase::CustomerForm => &[
                "body",
                "#email",
                "#first-name",
                "#last-name",
                "#zip",
                "#city",
                "#street",
                "#continue",
            ],
            Phase::PaymentForm => &[
                "body",
                "#card-holder",
                "#card-number",
                "#exp-date",
                "#cardCvv",
                "#pay-now",
            ],
            Phase::Done => &["body"],
        }
    }

    fn checkout_url(&self) -> String {
        match self.mode {
            Mode::WrongPath => "http://pay.invalid/start/STX_MOCK_1".to_string(),
            _ => "http://pay.invalid/checkout/STX_MOCK_1".to_string(),
        }
    }

    fn redirect_after_pay(&self) -> String {
        match self.mode {
            Mode::Declined => "https://example.org/ERROR?code=card_declined".to_string(),
            _ => "https://example.org/SUCCESS?stx=STX_MOCK_1".to_string(),
        }
    }
}

struct Request {
    method: String,
    path: String,
    body: Value,
}

fn handle_connection(stream: TcpStream, state: &mut MockState) {
    let Some(request) = read_request(&stream) else {
        return;
    };

    let (status, body) = route(&request, state);
    respond(stream, status, &body);
}

fn read_request(stream: &TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        let lowered = line.trim().to_ascii_lowercase();
        if let Some(value) = lowered.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body_bytes = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body_bytes).ok()?;
    }
    let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    Some(Request { method, path, body })
}

fn respond(mut stream: TcpStream, status: u16, body: &Value) {
    let body = body.to_string();
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).ok();
    stream.flush().ok();
}

fn route(request: &Request, state: &mut MockState) -> (u16, Value) {
    let segments: Vec<&str> = request.path.split('/').filter(|s| !s.is_empty()).collect();

    match (request.method.as_str(), segments.as_slice()) {
        // === Provider API ===
        ("POST", ["oauth", "token"]) => (
            200,
            json!({
                "access_token": "tok_mock_1",
                "token_type": "bearer",
                "expires_in": 3600
            }),
        ),

        ("POST", ["api", "v2", "Smart", "Transactions"]) => {
            state.transaction_created = true;
            (
                200,
                json!({
                    "id": "STX_MOCK_1",
                    "status": "created",
                    "links": { "checkout": { "href": state.checkout_url() } }
                }),
            )
        }

        ("GET", ["api", "v2", "Smart", "Transactions", id]) => {
            if state.transaction_created && *id == "STX_MOCK_1" {
                (200, json!({ "id": id, "status": "approved" }))
            } else {
                (404, json!({ "error": "transaction not found" }))
            }
        }

        // === WebDriver ===
        ("POST", ["session"]) => {
            state.phase = Phase::Blank;
            state.current_url = "about:blank".to_string();
            (
                200,
                json!({
                    "value": { "sessionId": "mock-session-1", "capabilities": {} }
                }),
            )
        }

        ("DELETE", ["session", _id]) => (200, json!({ "value": null })),

        ("POST", ["session", _id, "url"]) => {
            let url = request.body["url"].as_str().unwrap_or("about:blank");
            state.current_url = url.to_string();
            state.phase = if url.contains("/checkout/") {
                Phase::CustomerForm
            } else {
                Phase::Blank
            };
            (200, json!({ "value": null }))
        }

        ("GET", ["session", _id, "url"]) => (200, json!({ "value": state.current_url })),

        ("POST", ["session", _id, "element"]) => {
            let selector = request.body["value"].as_str().unwrap_or("");
            if state.elements().contains(&selector) {
                // Element ids land in URL paths, so strip the '#'
                let id = format!("el-{}", selector.trim_start_matches('#'));
                (200, json!({ "value": { (ELEMENT_KEY): id } }))
            } else {
                (
                    404,
                    json!({
                        "value": {
                            "error": "no such element",
                            "message": format!("Unable to locate element: {selector}")
                        }
                    }),
                )
            }
        }

        ("POST", ["session", _id, "element", _el, "clear"])
        | ("POST", ["session", _id, "element", _el, "value"]) => (200, json!({ "value": null })),

        ("POST", ["session", _id, "element", element, "click"]) => {
            match *element {
                "el-continue" if state.phase == Phase::CustomerForm => {
                    state.phase = Phase::PaymentForm;
                }
                "el-pay-now" if state.phase == Phase::PaymentForm => {
                    state.current_url = state.redirect_after_pay();
                    state.phase = Phase::Done;
                }
                _ => {}
            }
            (200, json!({ "value": null }))
        }

        ("GET", ["session", _id, "element", _el, "text"]) => {
            let text = match state.phase {
                Phase::Done => "Vielen Dank für Ihre Bestellung",
                _ => "",
            };
            (200, json!({ "value": text }))
        }

        _ => (
            404,
            json!({
                "value": { "error": "unknown command", "message": request.path }
            }),
        ),
    }
}
