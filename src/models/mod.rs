//! Company records and their persisted shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BuildError;

/// Job-title entry the site shows when a company takes unsolicited applications.
pub const OPEN_APPLICATION: &str = "Candidature spontanée";

const HEADCOUNT_TITLE: &str = "Collaborateurs";
const AVERAGE_AGE_TITLE: &str = "Âge moyen";

/// A numeric field that is either known or could not be parsed.
///
/// Serialized as an integer or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Count {
    Known(u32),
    #[default]
    Unknown,
}

impl Count {
    /// Known iff the whole trimmed text is ASCII digits.
    pub fn parse_whole(raw: &str) -> Self {
        parse_digits(raw.trim())
    }

    /// Known iff the first whitespace-delimited token is ASCII digits.
    pub fn parse_leading(raw: &str) -> Self {
        raw.split_whitespace()
            .next()
            .map_or(Self::Unknown, parse_digits)
    }

    pub fn value(self) -> Option<u32> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

fn parse_digits(token: &str) -> Count {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Count::Unknown;
    }
    token.parse().map_or(Count::Unknown, Count::Known)
}

impl From<Option<u32>> for Count {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl From<Count> for Option<u32> {
    fn from(count: Count) -> Self {
        count.value()
    }
}

/// Title/content pairs read from a company's detail page.
///
/// The two titles the record model understands get typed slots; every other
/// title lands in `extra`. Inserting a title twice keeps the later content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailAttributes {
    pub headcount: Option<String>,
    pub average_age: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl DetailAttributes {
    pub fn insert(&mut self, title: &str, content: &str) {
        let title = title.trim();
        let content = content.trim().to_string();
        match title {
            HEADCOUNT_TITLE => self.headcount = Some(content),
            AVERAGE_AGE_TITLE => self.average_age = Some(content),
            _ => {
                self.extra.insert(title.to_string(), content);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headcount.is_none() && self.average_age.is_none() && self.extra.is_empty()
    }
}

/// Fields gathered for one company before typing and validation.
#[derive(Debug, Clone, Default)]
pub struct RawCompany {
    pub name: String,
    pub listing_url: String,
    pub website_url: Option<String>,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub offer_text: Option<String>,
    pub job_titles: Vec<String>,
    /// Flag reported alongside the listing. Ignored in favour of `job_titles`.
    pub unsolicited_hint: Option<bool>,
    pub attributes: DetailAttributes,
}

/// A company discovered on the directory site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    pub listing_url: String,
    pub website_url: Option<String>,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub headcount: Count,
    pub average_age: Count,
    pub offer_count: Count,
    pub job_titles: Vec<String>,
    pub email: String,
    pub phone: String,
}

impl Company {
    /// Type and validate raw fields. Unparseable numbers become [`Count::Unknown`].
    pub fn from_raw(raw: RawCompany) -> Result<Self, BuildError> {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(BuildError::MissingName);
        }

        let accepts_unsolicited = has_open_application(&raw.job_titles);
        if let Some(hint) = raw.unsolicited_hint
            && hint != accepts_unsolicited
        {
            debug!(company = %name, hint, "ignoring unsolicited-application hint that disagrees with job titles");
        }

        let offer_count = match raw.offer_text.as_deref().map(Count::parse_leading) {
            Some(count @ Count::Known(_)) => count,
            _ if accepts_unsolicited => Count::Known(1),
            _ => Count::Unknown,
        };

        if !raw.attributes.extra.is_empty() {
            debug!(
                company = %name,
                titles = ?raw.attributes.extra.keys().collect::<Vec<_>>(),
                "detail attributes without a record field"
            );
        }

        Ok(Self {
            name,
            listing_url: raw.listing_url,
            website_url: raw.website_url,
            domain: raw.domain,
            location: raw.location,
            headcount: raw
                .attributes
                .headcount
                .as_deref()
                .map_or(Count::Unknown, Count::parse_whole),
            average_age: raw
                .attributes
                .average_age
                .as_deref()
                .map_or(Count::Unknown, Count::parse_leading),
            offer_count,
            job_titles: raw.job_titles,
            email: String::new(),
            phone: String::new(),
        })
    }

    /// Always derived from `job_titles`.
    pub fn accepts_unsolicited_applications(&self) -> bool {
        has_open_application(&self.job_titles)
    }

    pub fn to_entry(&self) -> CompanyEntry {
        CompanyEntry {
            domain: self.domain.clone(),
            location: self.location.clone(),
            website_url: self.website_url.clone(),
            headcount: self.headcount,
            listing_url: self.listing_url.clone(),
            offer_count: self.offer_count,
            offers_list: vec![self.job_titles.clone()],
            spontaneous_application: yes_no(self.accepts_unsolicited_applications()).to_string(),
            average_age: self.average_age,
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    pub fn from_entry(name: &str, entry: CompanyEntry) -> Self {
        Self {
            name: name.to_string(),
            listing_url: entry.listing_url,
            website_url: entry.website_url,
            domain: entry.domain,
            location: entry.location,
            headcount: entry.headcount,
            average_age: entry.average_age,
            offer_count: entry.offer_count,
            job_titles: entry.offers_list.into_iter().flatten().collect(),
            email: entry.email,
            phone: entry.phone,
        }
    }
}

fn has_open_application(job_titles: &[String]) -> bool {
    job_titles.iter().any(|title| title.trim() == OPEN_APPLICATION)
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag { "Oui" } else { "Non" }
}

/// One value of the persisted JSON document, keyed by company name.
///
/// `Offers List` wraps the job titles in a single-element list; older
/// documents depend on that nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEntry {
    #[serde(rename = "Domain", default)]
    pub domain: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Web Site", default)]
    pub website_url: Option<String>,
    #[serde(rename = "Number of Salaries", default)]
    pub headcount: Count,
    #[serde(rename = "URL", alias = "URL ", default)]
    pub listing_url: String,
    #[serde(rename = "Offers Number", default)]
    pub offer_count: Count,
    #[serde(rename = "Offers List", default)]
    pub offers_list: Vec<Vec<String>>,
    #[serde(rename = "Spontaneous application", default)]
    pub spontaneous_application: String,
    #[serde(rename = "Average Age", default)]
    pub average_age: Count,
    #[serde(rename = "E-Mail", default)]
    pub email: String,
    #[serde(rename = "Phone", default)]
    pub phone: String,
}
