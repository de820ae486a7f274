//! Handlers for each `folio` subcommand.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use folio_core::auth::{CredentialStore, Session};
use folio_core::models::{FinanceSummary, Product};
use folio_core::utils::format_currency;
use folio_core::{ApiClient, Config, ListQuery, Resource, ResourceCache, Searchable, Store};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::render::{page_footer, render_table, TableRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Services,
    Plans,
    Projects,
    Testimonials,
    Messages,
    Products,
    Customers,
    Sales,
    Transactions,
}

/// Run `$body` with `$cache` bound to the store's cache for `$kind`.
macro_rules! with_cache {
    ($store:expr, $kind:expr, $cache:ident => $body:expr) => {
        match $kind {
            ResourceKind::Services => { let $cache = &$store.services; $body }
            ResourceKind::Plans => { let $cache = &$store.plans; $body }
            ResourceKind::Projects => { let $cache = &$store.projects; $body }
            ResourceKind::Testimonials => { let $cache = &$store.testimonials; $body }
            ResourceKind::Messages => { let $cache = &$store.messages; $body }
            ResourceKind::Products => { let $cache = &$store.products; $body }
            ResourceKind::Customers => { let $cache = &$store.customers; $body }
            ResourceKind::Sales => { let $cache = &$store.sales; $body }
            ResourceKind::Transactions => { let $cache = &$store.transactions; $body }
        }
    };
}

/// Everything a command needs: resolved config plus the on-disk session.
pub struct AppContext {
    pub config: Config,
    pub api_url: String,
    pub session: Session,
}

impl AppContext {
    pub fn load(api_url_override: Option<String>) -> Result<Self> {
        let config = Config::load().context("Failed to load config")?;
        let api_url = api_url_override.unwrap_or_else(|| config.api_url());
        let session = Session::new(config.cache_dir()?);
        Ok(Self {
            config,
            api_url,
            session,
        })
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(self.api_url.clone()).context("Failed to create HTTP client")
    }

    /// Build a store, resuming the saved session or logging in again with a
    /// remembered password when the saved one has expired.
    pub async fn open_store(&mut self) -> Result<Store> {
        let client = self.client()?;

        if self.session.load()? {
            if let Some(data) = self.session.data.clone() {
                if data.api_url == self.api_url {
                    debug!(email = %data.email, "Resuming saved session");
                    return Ok(Store::with_session(client, data));
                }
                warn!(saved = %data.api_url, current = %self.api_url, "Saved session belongs to another API");
            }
        }

        let mut store = Store::new(client);
        if let Some(email) = self.config.last_email.clone() {
            if let Ok(password) = CredentialStore::get_password(&self.api_url, &email) {
                match store.login(&email, &password).await {
                    Ok(data) => {
                        info!(email = %email, "Logged in with remembered credentials");
                        self.session.update(data);
                        self.session.save()?;
                    }
                    Err(e) => warn!(email = %email, error = %e, "Remembered credentials rejected"),
                }
            }
        }
        Ok(store)
    }
}

pub async fn login(ctx: &mut AppContext, email: Option<String>, remember: bool) -> Result<()> {
    let email = match email.or_else(|| ctx.config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;

    let mut store = Store::new(ctx.client()?);
    let data = store.login(&email, &password).await?;

    ctx.session.update(data.clone());
    ctx.session.save().context("Failed to save session")?;

    ctx.config.last_email = Some(email.clone());
    if ctx.config.api_url.is_none() {
        ctx.config.api_url = Some(ctx.api_url.clone());
    }
    ctx.config.save().context("Failed to save config")?;

    if remember {
        CredentialStore::store(&ctx.api_url, &email, &password)?;
    }

    println!(
        "Logged in as {} (session valid for {}h)",
        data.email,
        data.minutes_until_expiry() / 60
    );
    Ok(())
}

pub fn logout(ctx: &mut AppContext, forget: bool) -> Result<()> {
    ctx.session.clear().context("Failed to remove session")?;

    if forget {
        if let Some(ref email) = ctx.config.last_email {
            if let Err(e) = CredentialStore::delete(&ctx.api_url, email) {
                debug!(error = %e, "No remembered credentials to forget");
            }
        }
    }
    println!("Logged out");
    Ok(())
}

pub fn status(ctx: &mut AppContext) -> Result<()> {
    println!("API:     {}", ctx.api_url);
    if ctx.session.load()? {
        if let Some(ref data) = ctx.session.data {
            println!("Account: {}", data.email);
            println!("Session: expires in {}m", data.minutes_until_expiry());
            return Ok(());
        }
    }
    println!("Session: not logged in");
    Ok(())
}

pub async fn list(
    store: &Store,
    kind: ResourceKind,
    query: &ListQuery,
    as_json: bool,
) -> Result<()> {
    with_cache!(store, kind, cache => list_resource(cache, query, as_json).await)
}

async fn list_resource<R>(cache: &ResourceCache<R>, query: &ListQuery, as_json: bool) -> Result<()>
where
    R: Resource + Searchable + TableRow,
{
    let items = cache.fetch().await?;
    let page = query.apply(&items);

    if as_json {
        print_json(&page)?;
    } else {
        print!("{}", render_table(&page.items));
        println!("{}", page_footer(&page));
    }
    Ok(())
}

pub async fn show(store: &Store, kind: ResourceKind, id: &str) -> Result<()> {
    with_cache!(store, kind, cache => show_resource(cache, id).await)
}

async fn show_resource<R>(cache: &ResourceCache<R>, id: &str) -> Result<()>
where
    R: Resource,
    R::Id: for<'a> From<&'a str>,
{
    cache.fetch().await?;
    let record = cache
        .find(&<R::Id>::from(id))
        .await
        .with_context(|| format!("No {} with id {}", R::LABEL, id))?;
    print_json(&record)
}

pub async fn create(store: &Store, kind: ResourceKind, data: &str) -> Result<()> {
    let body = parse_data(data)?;
    with_cache!(store, kind, cache => {
        let created = cache.create(&body).await?;
        println!("Created {} {}", label_of(cache), created.id());
        print_json(&created)
    })
}

pub async fn update(store: &Store, kind: ResourceKind, id: &str, data: &str) -> Result<()> {
    let patch = parse_data(data)?;
    with_cache!(store, kind, cache => {
        let updated = cache.update(&id.into(), &patch).await?;
        println!("Updated {} {}", label_of(cache), updated.id());
        print_json(&updated)
    })
}

pub async fn delete(store: &Store, kind: ResourceKind, id: &str) -> Result<()> {
    with_cache!(store, kind, cache => {
        cache.delete(&id.into()).await?;
        println!("Deleted {} {}", label_of(cache), id);
        Ok(())
    })
}

/// Finance totals plus products running low, fetched side by side.
pub async fn summary(store: &Store, low_stock_threshold: u32) -> Result<()> {
    let (transactions, products) = tokio::join!(store.transactions.fetch(), store.products.fetch());
    let transactions = transactions?;
    let products = products?;

    let finance = FinanceSummary::from_transactions(&transactions);
    println!("Transactions: {}", finance.transaction_count);
    println!("Income:       {}", format_currency(finance.income));
    println!("Expenses:     {}", format_currency(finance.expenses));
    println!("Net:          {}", format_currency(finance.net()));

    let low: Vec<Product> = products
        .iter()
        .filter(|p| p.is_low_stock(low_stock_threshold))
        .cloned()
        .collect();
    println!();
    if low.is_empty() {
        println!("No products at or below {} units", low_stock_threshold);
    } else {
        println!("Low stock (<= {} units):", low_stock_threshold);
        print!("{}", render_table(&low));
    }
    Ok(())
}

fn label_of<R: Resource>(_cache: &ResourceCache<R>) -> &'static str {
    R::LABEL
}

/// Parse `--data`: inline JSON, or `@path` to read it from a file.
fn parse_data(data: &str) -> Result<serde_json::Value> {
    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read {}", path))?,
        None => data.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&text).context("--data must be a JSON object")?;
    if !value.is_object() {
        anyhow::bail!("--data must be a JSON object");
    }
    Ok(value)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label.trim_end_matches([':', ' ']));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_inline() {
        let value = parse_data(r#"{"title":"Web Design"}"#).unwrap();
        assert_eq!(value["title"], "Web Design");
    }

    #[test]
    fn test_parse_data_rejects_non_objects() {
        assert!(parse_data("[1,2]").is_err());
        assert!(parse_data("not json").is_err());
    }

    #[test]
    fn test_logout_removes_saved_session() {
        let dir = std::env::temp_dir().join(format!("folio-logout-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut session = Session::new(dir.clone());
        session.update(folio_core::auth::SessionData {
            token: "jwt-123".to_string(),
            email: "admin@example.com".to_string(),
            api_url: "http://localhost:5000/api".to_string(),
            created_at: chrono::Utc::now(),
        });
        session.save().unwrap();

        let mut ctx = AppContext {
            config: Config::default(),
            api_url: "http://localhost:5000/api".to_string(),
            session,
        };
        logout(&mut ctx, false).unwrap();
        assert!(ctx.session.data.is_none());

        let mut reloaded = Session::new(dir.clone());
        assert!(!reloaded.load().unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parse_data_from_file() {
        let path = std::env::temp_dir().join(format!("folio-data-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"name":"Starter","price":499}"#).unwrap();

        let value = parse_data(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["price"], 499);

        let _ = std::fs::remove_file(&path);
    }
}
