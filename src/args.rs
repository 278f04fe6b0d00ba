use duration_string::DurationString;
use gumdrop::Options;
use std::str::FromStr;

fn split_pair(s: &str, example: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("cannot parse {s}, expected {example}")),
    }
}

/// An environment variable for git, in the form of `KEY=VALUE`.
#[derive(Clone, Debug)]
pub struct EnvVar(pub String, pub String);

impl FromStr for EnvVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = split_pair(s, "KEY=VALUE")?;
        Ok(EnvVar(key, value))
    }
}

/// A check on the payload, in the form of `field=value`.
#[derive(Clone, Debug)]
pub struct FieldCheck {
    pub field: String,
    pub value: String,
}

impl FromStr for FieldCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = split_pair(s, "field=value")?;
        Ok(FieldCheck { field, value })
    }
}

/// Receive git webhooks, verify them and pull, test or validate.
#[derive(Debug, Options)]
pub struct Args {
    /// The working tree to pull and test in (default: current directory).
    #[options(free)]
    pub directory: Option<String>,

    /// The address to listen on.
    #[options(no_short, default = "0.0.0.0:5000")]
    pub http: String,

    /// The path of the webhook endpoint.
    #[options(no_short, default = "/")]
    pub path: String,

    /// The shared secret of the webhook.
    ///
    /// If neither this nor a token file is given, requests are not verified.
    #[options(no_short)]
    pub token: Option<String>,

    /// Load the shared secret from a JSON file.
    #[options(no_short)]
    pub token_file: Option<String>,

    /// The key of the shared secret in the token file.
    #[options(no_short, default = "webhookGit")]
    pub token_key: String,

    /// Don't accept GitHub signatures.
    #[options(no_short)]
    pub no_github: bool,

    /// Don't accept GitLab tokens.
    #[options(no_short)]
    pub no_gitlab: bool,

    /// Don't accept basic authorization (used by Gitea).
    #[options(no_short)]
    pub no_gitea: bool,

    /// Only accept requests from this address, you can define multiple times.
    #[options(no_short, long = "allow-ip")]
    pub allow_ips: Vec<String>,

    /// Pull the working tree on every webhook.
    #[options(no_short)]
    pub pull: bool,

    /// Check that a payload field equals a value (field=value), you can define multiple times.
    ///
    /// Nested fields are separated by dots, e.g. repository.name=gw.
    #[options(no_short, long = "check")]
    pub checks: Vec<FieldCheck>,

    /// The path of the git executable.
    #[options(no_short, default = "/usr/bin/git")]
    pub git: String,

    /// The environment of git (KEY=VALUE), you can define multiple times.
    ///
    /// If there are none given, GIT_SSH_COMMAND=/usr/bin/ssh is used.
    #[options(no_short, long = "env")]
    pub envs: Vec<EnvVar>,

    /// A test command to run after pulling, you can define multiple times.
    ///
    /// If any of them fails, the merge is aborted.
    #[options(no_short, long = "test")]
    pub tests: Vec<String>,

    /// Run the test commands in a shell.
    #[options(short = "S")]
    pub shell: bool,

    /// Kill git and the tests after this long, 0s means never.
    ///
    /// Can be a number postfixed with s(econd), m(inutes), h(ours), d(ays)
    #[options(no_short, default = "0s")]
    pub timeout: DurationString,

    /// Increase verbosity, can be set multiple times (-v debug, -vv tracing)
    #[options(count)]
    pub verbose: u8,

    /// Only print errors.
    #[options()]
    pub quiet: bool,

    /// Print the current version.
    #[options(short = "V")]
    pub version: bool,

    /// Print this help.
    #[options()]
    pub help: bool,
}

pub fn parse_args() -> Args {
    Args::parse_args_default_or_exit()
}
