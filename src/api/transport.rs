//! Purpose: The seam between the client and the wire.
//! Exports: `Transport`, `UreqTransport`, `Prepared`, `Reply`.
//! Role: The client prepares a fully resolved request; a transport executes it synchronously.
//! Invariants: Any HTTP status is a `Reply`; only connection and I/O failures are errors.
use url::Url;

use super::client::ClientConfig;
use super::{Body, Headers, Method, Status};
use crate::core::error::{Error, ErrorKind};

/// A request with its URL resolved and default headers merged in.
#[derive(Clone, Debug)]
pub struct Prepared {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Body>,
}

#[derive(Clone, Debug)]
pub struct Reply {
    pub status: Status,
    pub headers: Headers,
    pub body: Option<Body>,
}

/// Executes one prepared request; called from the client's worker threads.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &Prepared) -> Result<Reply, Error>;
}

/// Blocking HTTP/1.1 transport backed by a pooled `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(config.user_agent());
        if config.keepalive().is_none() {
            builder = builder.max_idle_connections(0);
        }
        Self {
            agent: builder.build(),
        }
    }

    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &Prepared) -> Result<Reply, Error> {
        let mut call = self
            .agent
            .request(request.method.as_str(), request.url.as_str());
        for (name, value) in request.headers.iter() {
            call = call.set(name, value);
        }
        let result = match &request.body {
            Some(body) => call.send_string(&body.data),
            None => call.call(),
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message(format!("{} {} failed", request.method, request.url))
                    .with_source(err));
            }
        };
        read_reply(response)
    }
}

fn read_reply(response: ureq::Response) -> Result<Reply, Error> {
    let status = Status::new(response.status());
    let mut headers = Headers::new();
    for name in response.headers_names() {
        if let Some(value) = response.header(&name) {
            headers.insert(name.as_str(), value);
        }
    }
    let content_type = response.header("Content-Type").map(str::to_owned);
    let data = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    let body = if data.is_empty() {
        None
    } else {
        Some(Body { content_type, data })
    };
    Ok(Reply {
        status,
        headers,
        body,
    })
}
