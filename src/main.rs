use std::sync::Arc;

use async_trait::async_trait;
use rawhttp::config::Config;
use rawhttp::http::headers::Headers;
use rawhttp::http::request::Request;
use rawhttp::http::response::{StatusCode, default_headers};
use rawhttp::http::writer::WriteError;
use rawhttp::server::{self, ConnectionWriter, Handler};

const PAGE_200: &str = "<html>\n  <head><title>200 OK</title></head>\n  <body><h1>Success!</h1></body>\n</html>\n";
const PAGE_400: &str = "<html>\n  <head><title>400 Bad Request</title></head>\n  <body><h1>Bad Request</h1></body>\n</html>\n";
const PAGE_500: &str = "<html>\n  <head><title>500 Internal Server Error</title></head>\n  <body><h1>Internal Server Error</h1></body>\n</html>\n";

const STREAM_BODY: &str =
    "Streaming a response body one chunk at a time, with a trailer at the end \
     reporting how many bytes went out.\n";

struct DemoHandler;

#[async_trait]
impl Handler for DemoHandler {
    async fn handle(&self, writer: &mut ConnectionWriter, request: &Request) {
        let result = match request.request_line.target.as_str() {
            "/yourproblem" => canned_page(writer, StatusCode::BadRequest, PAGE_400).await,
            "/myproblem" => canned_page(writer, StatusCode::InternalServerError, PAGE_500).await,
            "/stream" => stream_page(writer).await,
            _ => canned_page(writer, StatusCode::Ok, PAGE_200).await,
        };
        if let Err(e) = result {
            tracing::error!("handler write failed: {e}");
        }
    }
}

async fn canned_page(
    writer: &mut ConnectionWriter,
    status: StatusCode,
    page: &str,
) -> Result<(), WriteError> {
    writer.write_status_line(status).await?;
    let mut headers = default_headers(page.len());
    headers.insert("Content-Type", "text/html");
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}

/// Streams the demo payload through the chunked writer and reports the byte
/// count in an advertised trailer.
async fn stream_page(writer: &mut ConnectionWriter) -> Result<(), WriteError> {
    writer.write_status_line(StatusCode::Ok).await?;

    let mut headers = Headers::new();
    headers.set("Content-Type", "text/plain");
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Connection", "close");
    headers.set("Trailer", "X-Content-Length");
    writer.write_headers(&headers).await?;

    let mut total = 0;
    for chunk in STREAM_BODY.as_bytes().chunks(32) {
        writer.write_chunk(chunk).await?;
        total += chunk.len();
    }
    writer.end_chunks().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", total.to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();
    let server = server::serve(&cfg.listen_addr, Arc::new(DemoHandler)).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    server.close();
    server.wait().await;
    Ok(())
}
