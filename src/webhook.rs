use crate::{
    guard::{Access, AccessGuard},
    processors::{Dispatcher, ProcessingOutcome, Processor},
    request::IncomingRequest,
    validation::{check_content_type, parse_payload, ValidationError},
    verification::{authenticate, Authentication, SchemeEnablement},
};
use log::{debug, info, warn};
use thiserror::Error;

/// A custom error describing why a delivery was rejected before processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The remote address is missing or not on the allow-list.
    #[error("Forbidden")]
    AccessDenied,
    /// The content type is not JSON.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(ValidationError),
    /// The body is not a JSON object.
    #[error("Invalid payload: {0}")]
    MalformedPayload(ValidationError),
    /// The request could not be authenticated. No details are given, so
    /// the response does not help anybody guessing the token.
    #[error("Unauthorized")]
    Unauthenticated,
}

impl WebhookError {
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookError::AccessDenied => 403,
            WebhookError::UnsupportedMediaType(_) => 415,
            WebhookError::MalformedPayload(_) => 400,
            WebhookError::Unauthenticated => 401,
        }
    }
}

impl From<ValidationError> for WebhookError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::UnsupportedMediaType(_) => WebhookError::UnsupportedMediaType(value),
            ValidationError::InvalidJson(_) | ValidationError::NotAnObject => {
                WebhookError::MalformedPayload(value)
            }
        }
    }
}

impl From<WebhookError> for ProcessingOutcome {
    fn from(value: WebhookError) -> Self {
        ProcessingOutcome::new(value.status_code(), value.to_string())
    }
}

/// A webhook endpoint: checks, verifies and processes deliveries.
///
/// Every delivery goes through the same steps, the first failing one decides the response:
///
/// ```ignore
/// +--------------+     +--------------+     +--------------+     +------+     +-----------+
/// | access guard | --> | content type | --> | authenticate | --> | JSON | --> | processor |
/// +--------------+     +--------------+     +--------------+     +------+     +-----------+
///       403                  415                  401              400
/// ```
pub struct Webhook {
    token: Option<String>,
    schemes: SchemeEnablement,
    guard: AccessGuard,
    dispatcher: Dispatcher,
}

impl Webhook {
    /// Create a webhook with every scheme enabled and no allow-list.
    ///
    /// Without a token no delivery is verified, which is logged as a warning.
    pub fn new(token: Option<String>, processor: Processor) -> Self {
        if token.is_none() {
            warn!("No webhook token provided, requests will not be verified. THIS IS VERY UNSAFE.");
        }

        Webhook {
            token,
            schemes: SchemeEnablement::default(),
            guard: AccessGuard::default(),
            dispatcher: Dispatcher::new(processor),
        }
    }

    pub fn with_schemes(mut self, schemes: SchemeEnablement) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn with_allow_list(mut self, allow_list: Option<Vec<String>>) -> Self {
        self.guard = AccessGuard::new(allow_list);
        self
    }

    /// Whether deliveries are verified at all.
    pub fn is_verified(&self) -> bool {
        self.token.is_some()
    }

    pub fn schemes(&self) -> &SchemeEnablement {
        &self.schemes
    }

    pub fn processor(&self) -> &Processor {
        self.dispatcher.processor()
    }

    fn handle_inner(&self, request: &IncomingRequest) -> Result<ProcessingOutcome, WebhookError> {
        if self.guard.check(request.remote_address()) == Access::Denied {
            return Err(WebhookError::AccessDenied);
        }
        debug!("Received a POST request to the webhook endpoint.");

        check_content_type(request)?;

        if let Authentication::Rejected(_) =
            authenticate(request, self.token.as_deref(), &self.schemes)
        {
            return Err(WebhookError::Unauthenticated);
        }

        let payload = parse_payload(request)?;

        Ok(self.dispatcher.dispatch(&payload))
    }

    /// Handle one delivery, always producing exactly one outcome.
    pub fn handle(&self, request: &IncomingRequest) -> ProcessingOutcome {
        match self.handle_inner(request) {
            Ok(outcome) => {
                info!(
                    "Webhook processed with status code {} and message: {}",
                    outcome.status_code, outcome.message
                );
                outcome
            }
            Err(err) => {
                debug!("Webhook rejected with status code {}.", err.status_code());
                err.into()
            }
        }
    }
}
