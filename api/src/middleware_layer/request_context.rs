//! Outermost middleware: correlation id + last-resort fault boundary.
//!
//! Every request gets a [`RequestId`] (from `X-Request-Id` or freshly
//! generated) stored in the request extensions and echoed in the response
//! header. A panic anywhere below is logged with that id and turned into the
//! generic 500 JSON body, so clients always receive a well-formed response.

use std::{any::Any, panic::AssertUnwindSafe};

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::error;

use crate::{
    core::http::request_id::{REQUEST_ID_HEADER, RequestId},
    error_handler::AppError,
};

pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers());
    req.extensions_mut().insert(request_id.clone());

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut res = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => {
            error!(
                request_id = %request_id,
                %method,
                %path,
                panic = %panic_message(panic.as_ref()),
                "unhandled fault while serving request"
            );
            AppError::Internal.for_request(&request_id).into_response()
        }
    };

    if let Ok(v) = HeaderValue::from_str(request_id.as_str()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
    res
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
