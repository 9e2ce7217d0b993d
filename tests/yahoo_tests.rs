use std::sync::{Arc, Mutex};

use portfolio_reports::errors::ReportError;
use portfolio_reports::market::yahoo::MAX_RETRIES;
use portfolio_reports::market::{QuoteSource, YahooFinanceClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const CHART_OK: &str = r#"{"chart":{"result":[{
    "meta":{"gmtoffset":0},
    "timestamp":[1704153600,1704240000],
    "indicators":{"quote":[{
        "open":[185.0,184.0],"high":[188.0,186.0],"low":[183.0,182.0],
        "close":[185.6,184.2],"volume":[1000,2000]
    }]}
}],"error":null}}"#;

const CHART_UNKNOWN: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

/// Chart API stand-in answering each request with the next scripted
/// response; the last one repeats.
struct StubChartServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubChartServer {
    async fn start(script: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            let mut served = 0;
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = Vec::new();
                let mut chunk = [0_u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or_default();
                seen.lock().unwrap().push(path.to_string());

                let (status, body) = script[served.min(script.len() - 1)];
                served += 1;
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{addr}/v8/finance/chart"),
            requests,
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_history_requests_daily_bars_for_the_period() {
    let server = StubChartServer::start(vec![(200, CHART_OK)]).await;
    let client = YahooFinanceClient::with_base_url(&server.base_url).unwrap();

    let history = client.history("BRK.B", "1mo").await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(
        server.requests(),
        vec!["/v8/finance/chart/BRK-B?range=1mo&interval=1d".to_string()]
    );
}

#[tokio::test]
async fn test_rate_limit_and_server_errors_are_retried() {
    let server =
        StubChartServer::start(vec![(429, "slow down"), (503, "unavailable"), (200, CHART_OK)])
            .await;
    let client = YahooFinanceClient::with_base_url(&server.base_url).unwrap();

    let history = client.history("AAPL", "2mo").await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_persistent_server_errors_surface_as_http_error() {
    let server = StubChartServer::start(vec![(500, "boom")]).await;
    let client = YahooFinanceClient::with_base_url(&server.base_url).unwrap();

    let err = client.history("AAPL", "2mo").await.unwrap_err();

    assert!(matches!(err, ReportError::HttpError(_)));
    assert!(!err.is_rejection());
    assert_eq!(server.requests().len(), MAX_RETRIES + 1);
}

#[tokio::test]
async fn test_unknown_symbol_is_not_retried() {
    let server = StubChartServer::start(vec![(404, CHART_UNKNOWN)]).await;
    let client = YahooFinanceClient::with_base_url(&server.base_url).unwrap();

    let err = client.history("ZZZZ", "2mo").await.unwrap_err();

    assert!(matches!(err, ReportError::TickerNotFound(_)));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_a_parse_error() {
    let server = StubChartServer::start(vec![(200, "<html>maintenance</html>")]).await;
    let client = YahooFinanceClient::with_base_url(&server.base_url).unwrap();

    let err = client.history("AAPL", "2mo").await.unwrap_err();

    assert!(matches!(err, ReportError::ParseError(_)));
    assert_eq!(server.requests().len(), 1);
}
