//! The interactive web page.
//!
//! `GET /` shows the form, `GET /fetch?days=N` runs the pipeline and shows the form again with
//! the report underneath. Everything is rendered on the server; there is no JavaScript.

use crate::pipeline::{DaysToSearch, QueryPipeline};
use crate::report::{Block, Report};
use bytes::Bytes;
use eyre::Context;
use http::{HeaderValue, Method, StatusCode, header};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

const PAGE: &str = include_str!("../page.html");

/// Shared state of the web server.
#[derive(Debug)]
pub struct App {
    pipeline: QueryPipeline,
    /// Held for the whole of a run so that two runs never overlap.
    run_lock: Mutex<()>,
}

impl App {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self {
            pipeline,
            run_lock: Mutex::new(()),
        }
    }

    /// Routes a single request.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        tracing::info!(method = %req.method(), uri = %req.uri(), "request");

        if *req.method() != Method::GET {
            let mut response = error_page(
                StatusCode::METHOD_NOT_ALLOWED,
                "Only GET requests are supported.",
            );
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
            return response;
        }

        let days = query_param(&req, "days");
        match req.uri().path() {
            "/" => {
                let days = days
                    .and_then(|d| d.parse::<DaysToSearch>().ok())
                    .unwrap_or_default();
                html(StatusCode::OK, render_page(days, &Report::new()))
            }
            "/fetch" => {
                let days = match days.map(|d| d.parse::<DaysToSearch>()) {
                    None => DaysToSearch::default(),
                    Some(Ok(days)) => days,
                    Some(Err(e)) => return error_page(StatusCode::BAD_REQUEST, &format!("{e:#}")),
                };
                let report = self.fetch(days).await;
                html(StatusCode::OK, render_page(days, &report))
            }
            _ => error_page(StatusCode::NOT_FOUND, "Page not found."),
        }
    }

    /// Runs the pipeline once, waiting for any run already in progress.
    async fn fetch(&self, days: DaysToSearch) -> Report {
        let _running = self.run_lock.lock().await;

        let mut report = Report::new();
        if let Err(e) = self.pipeline.run(days, &mut report).await {
            tracing::error!("run failed: {e:?}");
            report.error(format!("An error occurred: {e:#}"));
        }
        report
    }
}

/// Serves `app` on `listener` until accepting a connection fails.
pub async fn serve(listener: TcpListener, app: Arc<App>) -> eyre::Result<()> {
    loop {
        let (conn, peer) = listener.accept().await.context("accept connection")?;
        let conn = TokioIo::new(conn);
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let app = Arc::clone(&app);
                async move { Ok::<_, Infallible>(app.handle(req).await) }
            });
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(conn, service)
                .await
            {
                tracing::debug!(%peer, "connection ended with error: {e}");
            }
        });
    }
}

fn query_param<B>(req: &Request<B>, name: &str) -> Option<String> {
    form_urlencoded::parse(req.uri().query().unwrap_or("").as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// The bare form with a single error notice underneath.
fn error_page(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let mut report = Report::new();
    report.error(message);
    html(status, render_page(DaysToSearch::default(), &report))
}

fn html(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

/// Fills the page template with the form value and the rendered report.
pub fn render_page(days: DaysToSearch, report: &Report) -> String {
    // body goes last so that nothing inside it is treated as a placeholder
    PAGE.replace("{{days}}", &days.to_string())
        .replace("{{body}}", &render_report(report))
}

/// Renders report blocks as HTML, escaping everything that came from the API.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    for block in report.blocks() {
        match block {
            Block::Text(m) => push_notice(&mut out, "notice", m),
            Block::Success(m) => push_notice(&mut out, "notice success", m),
            Block::Warning(m) => push_notice(&mut out, "notice warning", m),
            Block::Error(m) => push_notice(&mut out, "notice error", m),
            Block::Record(r) => {
                out.push_str("<div class=\"record\">\n");
                out.push_str(&format!(
                    "<strong>Title:</strong> {}<br>\n",
                    escape_html(&r.title)
                ));
                out.push_str(&format!(
                    "<strong>Description:</strong> {}<br>\n",
                    escape_html(&r.description)
                ));
                out.push_str(&format!(
                    "<strong>URL:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Watch Video</a><br>\n",
                    escape_html(&r.url)
                ));
                out.push_str(&format!("<strong>Views:</strong> {}<br>\n", r.views));
                out.push_str(&format!(
                    "<strong>Subscribers:</strong> {}\n",
                    r.subscribers
                ));
                out.push_str("</div>\n");
            }
            Block::Divider => out.push_str("<hr>\n"),
        }
    }
    out
}

fn push_notice(out: &mut String, class: &str, message: &str) {
    out.push_str(&format!(
        "<p class=\"{class}\">{}</p>\n",
        escape_html(message)
    ));
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
