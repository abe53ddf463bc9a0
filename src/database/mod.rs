//! Persistence sinks: the SQLite table and the merged JSON document

mod json;

pub use json::JsonStore;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::{info, warn};

use crate::models::{Company, Count, yes_no};

/// Relational sink keyed by the unique company name.
///
/// Inserts never update: the first row written for a name is kept.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating directory for {}", path.display()))?;
        }

        let db_url = format!("sqlite:{}", path.display());

        // Create database file if it doesn't exist
        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            info!(path = %path.display(), "Creating database file");
            Sqlite::create_database(&db_url).await?;
        }

        let pool = SqlitePool::connect(&db_url)
            .await
            .with_context(|| format!("opening {}", path.display()))?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(path = %path.display(), "Database initialized successfully");
        Ok(Self { pool })
    }

    /// Insert every company in one transaction, skipping names already stored.
    ///
    /// # Returns
    /// * `Result<u64>` - Number of rows actually inserted
    pub async fn save_companies(&self, companies: &[Company]) -> Result<u64> {
        if companies.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for company in companies {
            let result = sqlx::query(
                r"
                INSERT INTO companies (
                    name, url, web_site, domain, location,
                    number_of_salaries, average_age, offers, all_offers,
                    spontaneous_application, email, phone_number
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(name) DO NOTHING
                ",
            )
            .bind(&company.name)
            .bind(&company.listing_url)
            .bind(&company.website_url)
            .bind(&company.domain)
            .bind(&company.location)
            .bind(company.headcount.value().map(i64::from))
            .bind(company.average_age.value().map(i64::from))
            .bind(company.offer_count.value().map(i64::from))
            .bind(serde_json::to_string(&company.job_titles)?)
            .bind(yes_no(company.accepts_unsolicited_applications()))
            .bind(&company.email)
            .bind(&company.phone)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Every stored company, in insertion order.
    pub async fn companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query(
            r"
            SELECT name, url, web_site, domain, location, number_of_salaries,
                   average_age, offers, all_offers, email, phone_number
            FROM companies
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(company_from_row).collect())
    }
}

fn company_from_row(row: &SqliteRow) -> Company {
    let name: String = row.get("name");
    let all_offers: Option<String> = row.get("all_offers");
    let job_titles = all_offers
        .map(|raw| {
            serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!(company = %name, "Stored job titles are not a JSON list: {}", e);
                Vec::new()
            })
        })
        .unwrap_or_default();

    Company {
        listing_url: row.get::<Option<String>, _>("url").unwrap_or_default(),
        website_url: row.get("web_site"),
        domain: row.get("domain"),
        location: row.get("location"),
        headcount: count(row.get("number_of_salaries")),
        average_age: count(row.get("average_age")),
        offer_count: count(row.get("offers")),
        job_titles,
        email: row.get::<Option<String>, _>("email").unwrap_or_default(),
        phone: row.get::<Option<String>, _>("phone_number").unwrap_or_default(),
        name,
    }
}

fn count(value: Option<i64>) -> Count {
    value
        .and_then(|v| u32::try_from(v).ok())
        .map_or(Count::Unknown, Count::Known)
}
