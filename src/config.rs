//! Run configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "https://www.welcometothejungle.com/";
const DEFAULT_REPOSITORY_LINK: &str = "https://github.com/grandlay-e/company-scraper";
const DEFAULT_COVER_LETTER: &str = "Paris, le {date}\n\n\
Madame, Monsieur,\n\n\
Je me permets de vous adresser ma candidature spontanée au sein de {name}. \
Votre activité correspond exactement au domaine dans lequel je souhaite évoluer, \
et je serais ravi d'échanger avec vous sur les besoins de vos équipes.\n\n\
Cette candidature a été envoyée automatiquement par un outil que j'ai développé : \
{repository_link}\n\n\
Je vous prie d'agréer, Madame, Monsieur, mes salutations distinguées.";

/// Everything a run needs from its environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub companies_url: Url,
    pub sign_in_url: Url,
    pub json_file: PathBuf,
    pub db_file: PathBuf,
    /// Sinks retried when the configured paths cannot be written
    pub fallback_json_file: PathBuf,
    pub fallback_db_file: PathBuf,
    pub log_file: PathBuf,
    pub applied_file: PathBuf,
    pub log_level: String,
    pub headless: bool,
    pub credentials: Option<Credentials>,
    pub candidates: CandidateFilter,
    pub cover_letter: CoverLetterTemplate,
    pub timing: Timing,
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Which persisted companies the application flow targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    pub location_contains: String,
    pub domain_contains: String,
    pub require_unsolicited: bool,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            location_contains: "Paris".to_string(),
            domain_contains: "Logiciels".to_string(),
            require_unsolicited: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterTemplate {
    pub template: String,
    pub repository_link: String,
}

impl Default for CoverLetterTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_COVER_LETTER.to_string(),
            repository_link: DEFAULT_REPOSITORY_LINK.to_string(),
        }
    }
}

/// Bounded waits and fixed delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub element_timeout: Duration,
    pub pagination_timeout: Duration,
    pub listing_settle: Duration,
    pub jobs_settle: Duration,
    pub detail_settle: Duration,
    pub between_cards: Duration,
    pub before_click: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(10),
            pagination_timeout: Duration::from_secs(15),
            listing_settle: Duration::from_secs(5),
            jobs_settle: Duration::from_secs(2),
            detail_settle: Duration::from_secs(1),
            between_cards: Duration::from_secs(1),
            before_click: Duration::from_secs(3),
        }
    }
}

impl Timing {
    /// No settle or throttle delays; timeouts kept short.
    pub fn immediate() -> Self {
        Self {
            element_timeout: Duration::from_millis(50),
            pagination_timeout: Duration::from_millis(50),
            listing_settle: Duration::ZERO,
            jobs_settle: Duration::ZERO,
            detail_settle: Duration::ZERO,
            between_cards: Duration::ZERO,
            before_click: Duration::ZERO,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_url("SCRAPER_BASE_URL", &var("SCRAPER_BASE_URL", DEFAULT_BASE_URL))?;
        let companies_url = join_url(
            &base_url,
            "SCRAPER_COMPANIES_PATH",
            &var("SCRAPER_COMPANIES_PATH", "fr/companies"),
        )?;
        let sign_in_url = join_url(
            &base_url,
            "SCRAPER_SIGN_IN_PATH",
            &var("SCRAPER_SIGN_IN_PATH", "fr/signin"),
        )?;

        let credentials = match (lookup("APPLY_EMAIL"), lookup("APPLY_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            _ => None,
        };

        let defaults = CandidateFilter::default();
        let candidates = CandidateFilter {
            location_contains: var("APPLY_LOCATION", &defaults.location_contains),
            domain_contains: var("APPLY_DOMAIN", &defaults.domain_contains),
            require_unsolicited: parse_bool(
                "APPLY_REQUIRE_SPONTANEOUS",
                lookup("APPLY_REQUIRE_SPONTANEOUS"),
                defaults.require_unsolicited,
            )?,
        };

        let letter = CoverLetterTemplate::default();
        let cover_letter = CoverLetterTemplate {
            template: var("COVER_LETTER_TEMPLATE", &letter.template),
            repository_link: var("REPOSITORY_LINK", &letter.repository_link),
        };

        let base = Timing::default();
        let millis = |key: &'static str, default: Duration| {
            parse_millis(key, lookup(key)).map(|value| value.unwrap_or(default))
        };
        let timing = Timing {
            element_timeout: millis("ELEMENT_TIMEOUT_MS", base.element_timeout)?,
            pagination_timeout: millis("PAGINATION_TIMEOUT_MS", base.pagination_timeout)?,
            listing_settle: millis("LISTING_SETTLE_MS", base.listing_settle)?,
            jobs_settle: millis("JOBS_SETTLE_MS", base.jobs_settle)?,
            detail_settle: millis("DETAIL_SETTLE_MS", base.detail_settle)?,
            between_cards: millis("BETWEEN_CARDS_MS", base.between_cards)?,
            before_click: millis("BEFORE_CLICK_MS", base.before_click)?,
        };

        Ok(Self {
            base_url,
            companies_url,
            sign_in_url,
            json_file: PathBuf::from(var("JSON_FILE", "data/data.json")),
            db_file: PathBuf::from(var("DB_FILE", "data/data.db")),
            fallback_json_file: PathBuf::from(var("FALLBACK_JSON_FILE", "data.json")),
            fallback_db_file: PathBuf::from(var("FALLBACK_DB_FILE", "data.db")),
            log_file: PathBuf::from(var("LOG_FILE", "log/sites.log")),
            applied_file: PathBuf::from(var("APPLIED_FILE", "data/applied.txt")),
            log_level: var("LOG_LEVEL", "info"),
            headless: parse_bool("HEADLESS", lookup("HEADLESS"), true)?,
            credentials,
            candidates,
            cover_letter,
            timing,
        })
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { key, source })
}

fn join_url(base: &Url, key: &'static str, path: &str) -> Result<Url, ConfigError> {
    base.join(path)
        .map_err(|source| ConfigError::InvalidUrl { key, source })
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value }),
    }
}

fn parse_millis(key: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
        })
        .transpose()
}
