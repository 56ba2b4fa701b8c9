use std::{
    collections::BTreeMap,
    io::{Read, Write},
    str::FromStr,
};

use anyhow::Context;
use rocket::http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    server::{method_not_allowed, ServerAdapter},
    webhooks::{WebhookRequest, WebhookResponse},
};

/// One request, as handed over by a serverless platform.
#[derive(Debug, Deserialize)]
pub struct InvocationRequest {
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<WebhookResponse> for InvocationResponse {
    fn from(response: WebhookResponse) -> Self {
        Self {
            status_code: response.status,
            headers: response.headers.into_iter().collect(),
            body: response.body,
        }
    }
}

/// Handles exactly one request read from `input` and writes the response to `output`.
pub async fn invoke<R, W>(adapter: &ServerAdapter, input: R, mut output: W) -> anyhow::Result<()>
where
    R: Read,
    W: Write,
{
    let request: InvocationRequest =
        serde_json::from_reader(input).context("couldn't parse invocation request")?;
    debug!("invoked with a {} request", request.method);

    let response = match Method::from_str(&request.method.to_ascii_uppercase()) {
        Ok(method) => {
            let request =
                WebhookRequest::new(method, request.headers, request.body.into_bytes());
            adapter.dispatch(&request).await
        }
        Err(_) => {
            warn!("unknown method `{}`", request.method);
            method_not_allowed()
        }
    };

    serde_json::to_writer(&mut output, &InvocationResponse::from(response))
        .context("couldn't write invocation response")?;
    writeln!(output)?;

    Ok(())
}
