use chrono::NaiveDate;

use crate::config::CoverLetterTemplate;

/// Fill the `{date}`, `{repository_link}` and `{name}` placeholders.
pub fn render(template: &CoverLetterTemplate, company: &str, date: NaiveDate) -> String {
    template
        .template
        .replace("{date}", &date.format("%d/%m/%Y").to_string())
        .replace("{repository_link}", &template.repository_link)
        .replace("{name}", company)
}
