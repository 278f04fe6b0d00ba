use crate::request::IncomingRequest;
use log::{debug, warn};

/// Basic authorization, as sent by Gitea and most generic webhook senders.
pub mod basic;
/// HMAC-SHA256 signatures sent by GitHub.
pub mod github;
/// Plain shared tokens sent by GitLab.
pub mod gitlab;

use basic::{verify_basic_auth, BasicCredentials};
use github::{verify_github_request, GITHUB_HEADER};
use gitlab::{verify_gitlab_request, GITLAB_HEADER};

/// The way a request is authenticated. It is chosen per request from the headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationScheme {
    GithubHmac,
    GitlabToken,
    BasicAuth,
    None,
}

/// The schemes in the order of precedence, the first one present and enabled wins.
const SCHEMES: [VerificationScheme; 3] = [
    VerificationScheme::GithubHmac,
    VerificationScheme::GitlabToken,
    VerificationScheme::BasicAuth,
];

/// Which schemes are considered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeEnablement {
    pub github: bool,
    pub gitlab: bool,
    pub gitea: bool,
}

impl Default for SchemeEnablement {
    fn default() -> Self {
        SchemeEnablement {
            github: true,
            gitlab: true,
            gitea: true,
        }
    }
}

/// The result of authenticating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authentication {
    /// The request is authentic, verified with the scheme (or `None` if there is no token).
    Authentic(VerificationScheme),
    /// The request failed the scheme, or no scheme could be selected.
    Rejected(VerificationScheme),
}

impl VerificationScheme {
    pub fn is_enabled(&self, enablement: &SchemeEnablement) -> bool {
        match self {
            VerificationScheme::GithubHmac => enablement.github,
            VerificationScheme::GitlabToken => enablement.gitlab,
            VerificationScheme::BasicAuth => enablement.gitea,
            VerificationScheme::None => false,
        }
    }

    /// Whether the request carries the header of this scheme.
    pub fn is_present(&self, request: &IncomingRequest) -> bool {
        match self {
            VerificationScheme::GithubHmac => request.headers().contains(GITHUB_HEADER),
            VerificationScheme::GitlabToken => request.headers().contains(GITLAB_HEADER),
            VerificationScheme::BasicAuth => BasicCredentials::from_request(request).is_some(),
            VerificationScheme::None => false,
        }
    }

    pub fn verify(&self, request: &IncomingRequest, token: &str) -> bool {
        match self {
            VerificationScheme::GithubHmac => verify_github_request(request, token),
            VerificationScheme::GitlabToken => verify_gitlab_request(request, token),
            VerificationScheme::BasicAuth => verify_basic_auth(request, token),
            VerificationScheme::None => false,
        }
    }
}

/// Select the first scheme that is both present on the request and enabled.
pub fn select_scheme(
    request: &IncomingRequest,
    enablement: &SchemeEnablement,
) -> VerificationScheme {
    SCHEMES
        .into_iter()
        .find(|scheme| scheme.is_present(request) && scheme.is_enabled(enablement))
        .unwrap_or(VerificationScheme::None)
}

/// Authenticate the request with the shared token.
///
/// Without a token every request is authentic. Otherwise exactly one scheme is tried,
/// chosen by [select_scheme]: a failing scheme never falls back to the next one.
pub fn authenticate(
    request: &IncomingRequest,
    token: Option<&str>,
    enablement: &SchemeEnablement,
) -> Authentication {
    let Some(token) = token else {
        debug!("There is no webhook token, skipping verification.");
        return Authentication::Authentic(VerificationScheme::None);
    };

    match select_scheme(request, enablement) {
        VerificationScheme::None => {
            warn!("A request with no signature found.");
            Authentication::Rejected(VerificationScheme::None)
        }
        scheme if scheme.verify(request, token) => {
            debug!("Request verified with {scheme:?}.");
            Authentication::Authentic(scheme)
        }
        scheme => {
            warn!("A request with an invalid {scheme:?} signature.");
            Authentication::Rejected(scheme)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOKEN: &str = "1234";
    const BODY: &str = r#"{"ref":"refs/heads/main"}"#;

    fn github_signature(token: &str) -> String {
        github::sign(BODY.as_bytes(), token).unwrap()
    }

    fn basic_header(token: &str) -> String {
        BasicCredentials {
            username: "gitea".to_string(),
            password: token.to_string(),
        }
        .to_string()
    }

    #[test]
    fn it_should_accept_everything_without_token() {
        let request = IncomingRequest::new(BODY);

        assert_eq!(
            Authentication::Authentic(VerificationScheme::None),
            authenticate(&request, None, &SchemeEnablement::default())
        );
    }

    #[test]
    fn it_should_reject_requests_without_any_signature() {
        let request = IncomingRequest::new(BODY);

        assert_eq!(
            Authentication::Rejected(VerificationScheme::None),
            authenticate(&request, Some(VALID_TOKEN), &SchemeEnablement::default())
        );
    }

    #[test]
    fn it_should_authenticate_with_each_scheme() {
        let enablement = SchemeEnablement::default();

        let github = IncomingRequest::new(BODY)
            .with_header(GITHUB_HEADER, github_signature(VALID_TOKEN));
        assert_eq!(
            Authentication::Authentic(VerificationScheme::GithubHmac),
            authenticate(&github, Some(VALID_TOKEN), &enablement)
        );

        let gitlab = IncomingRequest::new(BODY).with_header(GITLAB_HEADER, VALID_TOKEN);
        assert_eq!(
            Authentication::Authentic(VerificationScheme::GitlabToken),
            authenticate(&gitlab, Some(VALID_TOKEN), &enablement)
        );

        let token = basic_header(VALID_TOKEN);
        let gitea = IncomingRequest::new(BODY).with_header("Authorization", &token);
        assert_eq!(
            Authentication::Authentic(VerificationScheme::BasicAuth),
            authenticate(&gitea, Some(&token), &enablement)
        );
    }

    #[test]
    fn it_should_prefer_github_over_gitlab() {
        // Invalid GitHub signature, valid GitLab token: judged only on GitHub
        let request = IncomingRequest::new(BODY)
            .with_header(GITHUB_HEADER, github_signature("12345"))
            .with_header(GITLAB_HEADER, VALID_TOKEN);

        assert_eq!(
            VerificationScheme::GithubHmac,
            select_scheme(&request, &SchemeEnablement::default())
        );
        assert_eq!(
            Authentication::Rejected(VerificationScheme::GithubHmac),
            authenticate(&request, Some(VALID_TOKEN), &SchemeEnablement::default())
        );
    }

    #[test]
    fn it_should_prefer_gitlab_over_basic_auth() {
        let request = IncomingRequest::new(BODY)
            .with_header("Authorization", basic_header(VALID_TOKEN))
            .with_header(GITLAB_HEADER, VALID_TOKEN);

        assert_eq!(
            VerificationScheme::GitlabToken,
            select_scheme(&request, &SchemeEnablement::default())
        );
    }

    #[test]
    fn it_should_skip_disabled_schemes() {
        let request = IncomingRequest::new(BODY)
            .with_header(GITHUB_HEADER, github_signature("12345"))
            .with_header(GITLAB_HEADER, VALID_TOKEN);
        let enablement = SchemeEnablement {
            github: false,
            ..SchemeEnablement::default()
        };

        assert_eq!(
            Authentication::Authentic(VerificationScheme::GitlabToken),
            authenticate(&request, Some(VALID_TOKEN), &enablement)
        );
    }

    #[test]
    fn it_should_reject_if_only_disabled_schemes_are_present() {
        let request = IncomingRequest::new(BODY).with_header(GITLAB_HEADER, VALID_TOKEN);
        let enablement = SchemeEnablement {
            gitlab: false,
            ..SchemeEnablement::default()
        };

        assert_eq!(VerificationScheme::None, select_scheme(&request, &enablement));
        assert_eq!(
            Authentication::Rejected(VerificationScheme::None),
            authenticate(&request, Some(VALID_TOKEN), &enablement)
        );
    }

    #[test]
    fn it_should_ignore_authorization_headers_that_are_not_basic() {
        let request = IncomingRequest::new(BODY).with_header("Authorization", "Bearer 1234");

        assert_eq!(
            VerificationScheme::None,
            select_scheme(&request, &SchemeEnablement::default())
        );
    }
}
