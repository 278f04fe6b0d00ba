use args::{parse_args, Args};
use git_webhook::{
    config::{load_token, ConfigError},
    processors::{
        function::{FunctionChainProcessor, FunctionEntry},
        pull::PullAndTestProcessor,
        Processor,
    },
    repository::git::GitRepository,
    server::{HttpServer, ServerError},
    suites::{script::ScriptTestSuite, TestSuite},
    verification::SchemeEnablement,
    webhook::Webhook,
};
use log::{debug, SetLoggerError};
use logger::init_logger;
use std::{process, sync::Arc, time::Duration};
use thiserror::Error;

mod args;
mod logger;

/// A custom error describing why the program could not start.
#[derive(Debug, Error)]
pub enum MainError {
    #[error("Timezone offset cannot be determined for the logger.")]
    FailedLoggerTimezones,
    #[error("Cannot initialize the logger: {0}.")]
    FailedLogger(#[from] SetLoggerError),
    #[error("Cannot load the webhook token: {0}.")]
    FailedToken(#[from] ConfigError),
    #[error("You can either pull (--pull) or check the payload (--check), not both.")]
    ConflictingProcessors,
    #[error("Tests (--test) only run after pulling, add --pull.")]
    TestsWithoutPull,
    #[error("Server failed: {0}.")]
    FailedServer(#[from] ServerError),
}

fn create_processor(args: &Args) -> Result<Processor, MainError> {
    let directory = args.directory.clone().unwrap_or_else(|| String::from("."));
    let timeout = Duration::from(args.timeout.clone());
    let timeout = (!timeout.is_zero()).then_some(timeout);

    match (args.pull, args.checks.is_empty()) {
        (true, false) => Err(MainError::ConflictingProcessors),
        (true, true) => {
            let mut repository = GitRepository::new(directory.clone())
                .with_git(args.git.clone())
                .with_timeout(timeout);
            if !args.envs.is_empty() {
                repository = repository.with_env(
                    args.envs
                        .iter()
                        .map(|env| (env.0.clone(), env.1.clone()))
                        .collect(),
                );
            }

            let tests: Option<Box<dyn TestSuite>> = if args.tests.is_empty() {
                None
            } else {
                Some(Box::new(
                    ScriptTestSuite::new(directory, args.tests.clone())
                        .with_shell(args.shell)
                        .with_timeout(timeout),
                ))
            };

            Ok(Processor::PullAndTest(PullAndTestProcessor::new(
                Box::new(repository),
                tests,
            )))
        }
        (false, false) => Ok(Processor::FunctionChain(FunctionChainProcessor::new(
            args.checks
                .iter()
                .map(|check| FunctionEntry::field_equals(check.field.clone(), check.value.clone()))
                .collect(),
        ))),
        (false, true) if !args.tests.is_empty() => Err(MainError::TestsWithoutPull),
        (false, true) => Ok(Processor::PassThrough),
    }
}

fn main_inner(args: Args) -> Result<(), MainError> {
    init_logger(&args)?;

    // Setup token.
    let token = match (&args.token, &args.token_file) {
        (Some(token), _) => Some(token.clone()),
        (None, Some(token_file)) => Some(load_token(token_file, &args.token_key)?),
        (None, None) => None,
    };

    // Setup processor.
    let processor = create_processor(&args)?;
    debug!("Webhooks will be processed with {}.", processor.name());

    // Setup webhook.
    let webhook = Webhook::new(token, processor)
        .with_schemes(SchemeEnablement {
            github: !args.no_github,
            gitlab: !args.no_gitlab,
            gitea: !args.no_gitea,
        })
        .with_allow_list(Some(args.allow_ips.clone()));

    // Start the server.
    HttpServer::new(args.http.clone(), args.path.clone()).listen(Arc::new(webhook))?;

    Ok(())
}

fn main() {
    let args = parse_args();
    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(err) = main_inner(args) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
