use crate::{
    request::{Headers, IncomingRequest},
    webhook::Webhook,
};
use log::{debug, error, info};
use std::{io::Read, sync::Arc, thread};
use thiserror::Error;
use tiny_http::{Method, Request, Response, Server};

/// A custom error describing the error cases of the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server cannot bind to the address.
    #[error("cannot start server on {0}: {1}")]
    CannotStart(String, String),
}

/// A minimal HTTP 1.1 server, serving the webhook on a single POST endpoint.
///
/// Every delivery is handled on its own thread, so a long test run does not
/// block unrelated requests.
pub struct HttpServer {
    http: String,
    path: String,
}

fn normalize_path(path: &str) -> &str {
    path.trim_end_matches('/')
}

impl HttpServer {
    /// Create a new server with an address, for example "0.0.0.0:5000",
    /// and the path of the endpoint, for example "/webhook".
    pub fn new(http: String, path: String) -> Self {
        Self { http, path }
    }

    /// Bind to the address and serve requests until the listener stops.
    pub fn listen(&self, webhook: Arc<Webhook>) -> Result<(), ServerError> {
        let listener = Server::http(&self.http)
            .map_err(|err| ServerError::CannotStart(self.http.clone(), err.to_string()))?;
        info!("Listening on {}{}...", self.http, self.path);

        for request in listener.incoming_requests() {
            let webhook = Arc::clone(&webhook);
            let path = self.path.clone();
            thread::spawn(move || {
                if let Err(err) = respond(request, &path, &webhook) {
                    error!("Failed responding to request: {err}.");
                }
            });
        }

        Ok(())
    }
}

fn read_request(request: &mut Request) -> std::io::Result<IncomingRequest> {
    let mut body = Vec::new();
    request.as_reader().read_to_end(&mut body)?;

    let headers: Headers = request
        .headers()
        .iter()
        .map(|header| (header.field.as_str().as_str(), header.value.as_str()))
        .collect();
    let remote_address = request.remote_addr().map(|address| address.ip().to_string());

    Ok(IncomingRequest::new(body)
        .with_headers(headers)
        .with_remote_address(remote_address))
}

fn respond(mut request: Request, path: &str, webhook: &Webhook) -> std::io::Result<()> {
    debug!("Received request on {} {}.", request.method(), request.url());

    let url = request.url();
    let url_path = url.split_once('?').map_or(url, |(path, _)| path);
    if normalize_path(url_path) != normalize_path(path) {
        return request.respond(Response::from_string("Not Found").with_status_code(404));
    }
    if *request.method() != Method::Post {
        return request
            .respond(Response::from_string("Method Not Allowed").with_status_code(405));
    }

    let incoming = read_request(&mut request)?;
    let outcome = webhook.handle(&incoming);

    request.respond(Response::from_string(outcome.message).with_status_code(outcome.status_code))
}
