use reqwest::header::CONTENT_TYPE;

pub trait ResponseSender {
    fn send_response(&self, response_url: &str, body: &str) -> Result<(), String>;
}

/// PUTs the report to the pre-signed S3 URL CloudFormation hands out. The
/// signature covers an empty `Content-Type`, so the header is sent blank.
pub struct HttpResponseSender {
    http_client: reqwest::Client,
}

impl HttpResponseSender {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl ResponseSender for HttpResponseSender {
    fn send_response(&self, response_url: &str, body: &str) -> Result<(), String> {
        let url = response_url.to_string();
        let request_body = body.to_string();
        let client = self.http_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put(url)
                    .header(CONTENT_TYPE, "")
                    .body(request_body)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map(|_| ())
                    .map_err(|error| format!("failed to send custom resource response: {error}"))
            })
        })
    }
}
