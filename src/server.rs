use std::{
    convert::Infallible,
    io::{self, Cursor},
};

use rocket::{
    catchers,
    data::{self, ByteUnit, FromData},
    figment::Figment,
    http::{Method, Status},
    request::{self, FromRequest},
    response::{self, Responder},
    routes, Build, Data, Request, Response, Rocket, State,
};
use tracing::{debug, trace};

use crate::webhooks::{WebhookError, WebhookHandler, WebhookRequest, WebhookResponse};

pub const LIVENESS: &str = "Bot webhook server is running!";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "X-Hub-Signature-256, Content-Type"),
];

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

/// Method dispatch in front of the [`WebhookHandler`], shared by every deployment shape.
pub struct ServerAdapter {
    handler: WebhookHandler,
}

impl ServerAdapter {
    pub fn new(handler: WebhookHandler) -> Self {
        Self { handler }
    }

    pub async fn dispatch(&self, request: &WebhookRequest) -> WebhookResponse {
        let response = match request.method() {
            Method::Options => WebhookResponse::text(200, "OK"),
            Method::Post => self.handler.handle(request).await,
            method => {
                debug!("rejecting {} request on webhook endpoint", method);
                WebhookError::MethodNotAllowed.into()
            }
        };

        with_cors(response)
    }
}

/// Answer for a request whose method we can't even name.
pub fn method_not_allowed() -> WebhookResponse {
    with_cors(WebhookError::MethodNotAllowed.into())
}

fn with_cors(response: WebhookResponse) -> WebhookResponse {
    CORS_HEADERS
        .iter()
        .fold(response, |response, (name, value)| {
            response.with_header(name, value)
        })
}

fn collect_headers(request: &Request<'_>) -> Vec<(String, String)> {
    request
        .headers()
        .iter()
        .map(|header| (header.name().as_str().to_owned(), header.value().to_owned()))
        .collect()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for WebhookRequest {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        request::Outcome::Success(WebhookRequest::new(
            request.method(),
            collect_headers(request),
            Vec::new(),
        ))
    }
}

#[rocket::async_trait]
impl<'r> FromData<'r> for WebhookRequest {
    type Error = io::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        trace!("received payload on webhook endpoint: {:?}", request);

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let body = match data.open(size_limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                let eof = io::ErrorKind::UnexpectedEof;
                trace!("payload was too big");
                return data::Outcome::Error((
                    Status::PayloadTooLarge,
                    io::Error::new(eof, "data limit exceeded"),
                ));
            }
            Err(e) => return data::Outcome::Error((Status::BadRequest, e)),
        };

        data::Outcome::Success(WebhookRequest::new(
            request.method(),
            collect_headers(request),
            body,
        ))
    }
}

impl<'r> Responder<'r, 'static> for WebhookResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Response::build();
        response.status(Status::new(self.status));
        for (name, value) in self.headers {
            response.raw_header(name, value);
        }
        response
            .sized_body(self.body.len(), Cursor::new(self.body))
            .ok()
    }
}

#[rocket::get("/")]
fn index() -> &'static str {
    LIVENESS
}

#[rocket::post("/webhook", data = "<request>")]
async fn webhook(request: WebhookRequest, adapter: &State<ServerAdapter>) -> WebhookResponse {
    adapter.dispatch(&request).await
}

#[rocket::options("/webhook")]
async fn webhook_preflight(
    request: WebhookRequest,
    adapter: &State<ServerAdapter>,
) -> WebhookResponse {
    adapter.dispatch(&request).await
}

#[rocket::get("/webhook")]
async fn webhook_get(request: WebhookRequest, adapter: &State<ServerAdapter>) -> WebhookResponse {
    adapter.dispatch(&request).await
}

#[rocket::put("/webhook")]
async fn webhook_put(request: WebhookRequest, adapter: &State<ServerAdapter>) -> WebhookResponse {
    adapter.dispatch(&request).await
}

#[rocket::delete("/webhook")]
async fn webhook_delete(
    request: WebhookRequest,
    adapter: &State<ServerAdapter>,
) -> WebhookResponse {
    adapter.dispatch(&request).await
}

#[rocket::patch("/webhook")]
async fn webhook_patch(
    request: WebhookRequest,
    adapter: &State<ServerAdapter>,
) -> WebhookResponse {
    adapter.dispatch(&request).await
}

/// Anything Rocket fails on by itself (unknown route, oversized body, panicking handler) still
/// gets a JSON error body.
#[rocket::catch(default)]
fn json_error(status: Status, _: &Request<'_>) -> WebhookResponse {
    with_cors(WebhookResponse::error(status.code, status.reason_lossy()))
}

pub fn build_rocket(figment: Figment, adapter: ServerAdapter) -> Rocket<Build> {
    rocket::custom(figment)
        .mount(
            "/",
            routes![
                index,
                webhook,
                webhook_preflight,
                webhook_get,
                webhook_put,
                webhook_delete,
                webhook_patch,
            ],
        )
        .register("/", catchers![json_error])
        .manage(adapter)
}
