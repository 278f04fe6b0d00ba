use crate::request::Payload;
use log::debug;

/// Validate the payload with a chain of functions.
pub mod function;
/// Pull the working tree, run the tests and abort the merge if they fail.
pub mod pull;

use function::FunctionChainProcessor;
use pull::PullAndTestProcessor;

/// The status code and body returned for a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    pub status_code: u16,
    pub message: String,
}

impl ProcessingOutcome {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        ProcessingOutcome {
            status_code,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        ProcessingOutcome::new(200, "OK")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// What happens with a verified webhook.
///
/// Processors may include:
///   - doing nothing, useful to only verify deliveries ([Processor::PassThrough])
///   - validating the payload ([function::FunctionChainProcessor])
///   - pulling and testing the working tree ([pull::PullAndTestProcessor])
#[derive(Default)]
pub enum Processor {
    #[default]
    PassThrough,
    FunctionChain(FunctionChainProcessor),
    PullAndTest(PullAndTestProcessor),
}

impl Processor {
    pub fn process(&self, payload: &Payload) -> ProcessingOutcome {
        match self {
            Processor::PassThrough => ProcessingOutcome::ok(),
            Processor::FunctionChain(processor) => processor.process(payload),
            Processor::PullAndTest(processor) => processor.process(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Processor::PassThrough => "PASS_THROUGH",
            Processor::FunctionChain(_) => "FUNCTION_CHAIN",
            Processor::PullAndTest(_) => "PULL_AND_TEST",
        }
    }
}

/// Hands the verified payload to the processor of the endpoint.
#[derive(Default)]
pub struct Dispatcher {
    processor: Processor,
}

impl Dispatcher {
    pub fn new(processor: Processor) -> Self {
        Dispatcher { processor }
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn dispatch(&self, payload: &Payload) -> ProcessingOutcome {
        debug!("Processing webhook with {}: {payload:?}.", self.processor.name());
        self.processor.process(payload)
    }
}
