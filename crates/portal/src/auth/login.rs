use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use super::forms::{credential_submission, keypad_request, HiddenFields};
use super::keypad::{parse_hidden_fields, validate_secret, Keypad};
use crate::client::{Page, SessionClient};
use crate::errors::{PortalError, Result};
use crate::html::attr;
use crate::patterns::MarkupPatterns;

/// Present only on the account summary page of a logged-in session.
pub const ACCOUNT_TABLE_MARKER: &str = ".ca-table tbody tr img";

lazy_static! {
    static ref SCRIPT: Selector = Selector::parse("script").expect("Invalid selector");
    static ref ACCOUNT_MARKER: Selector =
        Selector::parse(ACCOUNT_TABLE_MARKER).expect("Invalid selector");
    static ref SESSION_SAG: Selector =
        Selector::parse("input[name=sessionSAG]").expect("Invalid selector");
}

/// Login identifier and numeric secret.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            secret: secret.into(),
        }
    }

    /// Login with everything but the last three characters hidden.
    pub fn masked_login(&self) -> String {
        let visible = self.login.chars().count().saturating_sub(3);
        self.login
            .chars()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { c })
            .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.masked_login())
            .field("secret", &"***")
            .finish()
    }
}

/// Everything later stages need from a successful login.
#[derive(Clone)]
pub struct AuthenticatedSession {
    pub client: SessionClient,
    /// `scheme://host[:port]` of the login endpoint.
    pub base_url: String,
    pub statements_url: String,
    /// Account summary page returned by the credential submission.
    pub accounts_page: Page,
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("base_url", &self.base_url)
            .field("accounts_page", &self.accounts_page.url.as_str())
            .finish()
    }
}

/// Progress of a login.
#[derive(Debug)]
pub enum LoginState {
    Start {
        bank_url: String,
    },
    PortalLoaded {
        bank_url: String,
        login_url: String,
        base_url: String,
    },
    LoginFormSubmitted {
        login_url: String,
        base_url: String,
        keypad: Keypad,
        hidden: HiddenFields,
    },
    Authenticated(Box<AuthenticatedSession>),
    LoginFailed(String),
}

impl LoginState {
    pub fn name(&self) -> &'static str {
        match self {
            LoginState::Start { .. } => "Start",
            LoginState::PortalLoaded { .. } => "PortalLoaded",
            LoginState::LoginFormSubmitted { .. } => "LoginFormSubmitted",
            LoginState::Authenticated(_) => "Authenticated",
            LoginState::LoginFailed(_) => "LoginFailed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoginState::Authenticated(_) | LoginState::LoginFailed(_))
    }
}

/// Finds the login endpoint in the landing page scripts.
///
/// Returns the absolute login URL and the base URL (`scheme://host[:port]`)
/// every later path is built on.
pub fn discover_login(page: &Page, patterns: &dyn MarkupPatterns) -> Result<(String, String)> {
    let html = page.html();
    let path = html
        .select(&SCRIPT)
        .map(|script| script.text().collect::<String>())
        .find_map(|text| patterns.login_path(&text))
        .ok_or_else(|| PortalError::missing("landing page", "no `var chemin` login script"))?;

    let login_url = page
        .url
        .join(&path)
        .map_err(|source| PortalError::InvalidUrl {
            url: path.clone(),
            source,
        })?;
    Ok((login_url.to_string(), origin_of(&login_url)))
}

fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Interprets the credential submission response.
fn check_authenticated(html: &Html, base_url: &str) -> Result<Option<String>> {
    if html.select(&ACCOUNT_MARKER).next().is_none() {
        return Ok(None);
    }
    let session_id = html
        .select(&SESSION_SAG)
        .next()
        .and_then(|input| attr(&input, "value"))
        .ok_or_else(|| PortalError::missing("accounts page", "hidden input sessionSAG"))?;
    Ok(Some(statements_url(base_url, &session_id)))
}

fn statements_url(base_url: &str, session_id: &str) -> String {
    format!(
        "{}/stb/entreeBam?sessionSAG={}&stbpg=pagePU&act=Edocsynth&stbzn=bnt&actCrt=Edocsynth#null",
        base_url, session_id
    )
}

/// Drives [`LoginState`] transitions over one [`SessionClient`].
pub struct LoginFlow {
    client: SessionClient,
    patterns: Arc<dyn MarkupPatterns>,
    credentials: Credentials,
}

impl LoginFlow {
    pub fn new(
        client: SessionClient,
        patterns: Arc<dyn MarkupPatterns>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            patterns,
            credentials,
        }
    }

    /// Runs the login to completion.
    pub async fn run(&self, bank_url: &str) -> Result<AuthenticatedSession> {
        validate_secret(&self.credentials.secret)?;
        info!("Logging in as {}", self.credentials.masked_login());

        let mut state = LoginState::Start {
            bank_url: bank_url.trim_end_matches('/').to_string(),
        };
        while !state.is_terminal() {
            state = self.step(state).await?;
            info!("Login state: {}", state.name());
        }

        match state {
            LoginState::Authenticated(session) => {
                info!("LOGIN_OK");
                Ok(*session)
            }
            LoginState::LoginFailed(reason) => {
                warn!("Login failed: {}", reason);
                Err(PortalError::LoginRefused(reason))
            }
            other => Err(PortalError::missing("login", format!("stopped in {}", other.name()))),
        }
    }

    /// Performs the request leaving `state` and returns the next state.
    pub async fn step(&self, state: LoginState) -> Result<LoginState> {
        match state {
            LoginState::Start { bank_url } => {
                let landing = self
                    .client
                    .get_page(&format!("{}/particuliers.html", bank_url))
                    .await?;
                let (login_url, base_url) = discover_login(&landing, self.patterns.as_ref())?;
                Ok(LoginState::PortalLoaded {
                    bank_url,
                    login_url,
                    base_url,
                })
            }
            LoginState::PortalLoaded {
                bank_url,
                login_url,
                base_url,
            } => {
                let page = self
                    .client
                    .post_form(&login_url, &keypad_request(&bank_url))
                    .await?;
                let (keypad, hidden) = {
                    let html = page.html();
                    (
                        Keypad::parse(&html, self.patterns.as_ref())?,
                        parse_hidden_fields(&html)?,
                    )
                };
                Ok(LoginState::LoginFormSubmitted {
                    login_url,
                    base_url,
                    keypad,
                    hidden,
                })
            }
            LoginState::LoginFormSubmitted {
                login_url,
                base_url,
                keypad,
                hidden,
            } => {
                let encoded = keypad.encode(&self.credentials.secret)?;
                let form = credential_submission(&hidden, encoded, &self.credentials.login);
                let page = self.client.post_form(&login_url, &form).await?;

                let checked = check_authenticated(&page.html(), &base_url)?;
                Ok(match checked {
                    Some(statements_url) => LoginState::Authenticated(Box::new(AuthenticatedSession {
                        client: self.client.clone(),
                        base_url,
                        statements_url,
                        accounts_page: page,
                    })),
                    None => LoginState::LoginFailed(
                        "account summary missing after credential submission".to_string(),
                    ),
                })
            }
            terminal => Ok(terminal),
        }
    }
}
