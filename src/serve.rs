//! HTTP server for the directory tree page
//!
//! `sitetree serve` → serves the page, the tree document and a JSON summary.
//! Every page request mounts the tree into a fresh document, so edits to the
//! data file show up on the next reload.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::config::Config;
use crate::loader::Source;
use crate::model::TreeSummary;
use crate::mount::{mount, Page};
use crate::page;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Server settings
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub port: u16,
    /// Tree document on disk
    pub data: PathBuf,
    pub title: String,
    pub config: Config,
}

fn content_type(value: &'static str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .expect("static header is valid ASCII")
}

/// Start the directory tree server
pub fn start(options: ServeOptions) -> crate::error::Result<()> {
    let addr = format!("127.0.0.1:{}", options.port);
    let server = Server::http(&addr).map_err(|e| crate::error::Error::Server(e.to_string()))?;

    eprintln!("\n\x1b[1;32m🌲 sitetree\x1b[0m");
    eprintln!("   Directory tree: http://localhost:{}", options.port);
    eprintln!("   Data: {}", options.data.display());
    eprintln!("   Press Ctrl+C to stop\n");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &options) {
            log::error!("request failed: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, options: &ServeOptions) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let method = request.method().clone();
    log::debug!("{} {}", method, path);

    match (&method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            let doc = render_page(&options.data, &options.config);
            let response = Response::from_string(page::to_string(&doc, &options.title))
                .with_header(content_type("text/html; charset=utf-8"));
            request.respond(response)
        }

        // Container content only, for clients that swap it in after navigation
        (&Method::Get, "/fragment") => {
            let doc = render_page(&options.data, &options.config);
            let html = doc
                .get_element_by_id(&options.config.mount.container_id)
                .map(|c| doc.inner_html(c))
                .unwrap_or_default();
            let response =
                Response::from_string(html).with_header(content_type("text/html; charset=utf-8"));
            request.respond(response)
        }

        (&Method::Get, p) if p == data_route(&options.config) => {
            match std::fs::read_to_string(&options.data) {
                Ok(body) => request.respond(
                    Response::from_string(body).with_header(content_type("application/json")),
                ),
                Err(_) => request.respond(Response::from_string("Not found").with_status_code(404)),
            }
        }

        (&Method::Get, "/api/tree") => {
            let (json, status) = match tree_summary(&options.data) {
                Ok(summary) => (serde_json::to_string(&ApiResponse::success(summary))?, 200),
                Err(e) => (
                    serde_json::to_string(&ApiResponse::<TreeSummary>::failure(e))?,
                    500,
                ),
            };
            let response = Response::from_string(json)
                .with_status_code(status)
                .with_header(content_type("application/json"));
            request.respond(response)
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

/// Route the tree document is served under, e.g. `/directory-tree.json`.
fn data_route(config: &Config) -> String {
    let path = config.source.path.as_str();
    if path.starts_with('/') {
        path.to_string()
    } else {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("/{}", name)
    }
}

fn render_page(data: &Path, config: &Config) -> crate::dom::Document {
    let mut page = Page::with_container(&config.mount.container_id);
    mount(&mut page, &Source::File(data.to_path_buf()), config);
    page.into_document()
}

fn tree_summary(data: &Path) -> Result<TreeSummary, String> {
    Source::File(data.to_path_buf())
        .load()
        .map(|tree| tree.summary())
        .map_err(|e| e.to_string())
}
