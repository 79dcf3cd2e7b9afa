use anyhow::{anyhow, Result};
use log::{info, warn};
use tiny_http::{Header, Method, Response, Server};

use crate::gamedata::GameData;

pub const GAMEDATA_PATH: &str = "/gamedata";

/// Response produced for a request, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub allow: Option<&'static str>,
}

impl Reply {
    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            allow: None,
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_string(self.body).with_status_code(self.status);
        let headers = [
            Some(("Content-Type", "application/json")),
            Some(("Access-Control-Allow-Origin", "*")),
            self.allow.map(|allow| ("Allow", allow)),
        ];
        for (name, value) in headers.into_iter().flatten() {
            if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response.add_header(header);
            }
        }
        response
    }
}

/// Read-only service answering `GET /gamedata` from a payload serialized
/// once at startup.
#[derive(Debug, Clone)]
pub struct GameDataService {
    body: String,
}

impl GameDataService {
    pub fn new(data: &GameData) -> Result<Self> {
        Ok(Self {
            body: data.to_json()?,
        })
    }

    pub fn handle(&self, method: &Method, url: &str) -> Reply {
        let path = url.split('?').next().unwrap_or(url);
        if path != GAMEDATA_PATH {
            return Reply::json(404, r#"{"error":"not found"}"#.to_string());
        }
        match method {
            Method::Get => Reply::json(200, self.body.clone()),
            _ => Reply {
                allow: Some("GET"),
                ..Reply::json(405, r#"{"error":"method not allowed"}"#.to_string())
            },
        }
    }

    /// Accepts requests until the listener fails. Requests are answered one
    /// at a time.
    pub fn serve(&self, addr: &str) -> Result<()> {
        let server =
            Server::http(addr).map_err(|err| anyhow!("unable to listen on {addr}: {err}"))?;
        info!("serving game data on http://{addr}{GAMEDATA_PATH}");
        for request in server.incoming_requests() {
            let reply = self.handle(request.method(), request.url());
            info!("{} {} -> {}", request.method(), request.url(), reply.status);
            if let Err(err) = request.respond(reply.into_response()) {
                warn!("failed to send response: {err}");
            }
        }
        Ok(())
    }
}
