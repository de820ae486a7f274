//! Session-scoped store holding auth state and one cache per resource.
//!
//! A `Store` is created explicitly and handed to whatever needs data; there
//! is no global instance. Logging in or out rebuilds every cache, so nothing
//! fetched under one identity survives into the next.

use tracing::info;

use crate::api::ApiClient;
use crate::auth::SessionData;
use crate::cache::{CacheError, ResourceCache};
use crate::models::{
    Customer, Message, Plan, Product, Project, Sale, Service, Testimonial, Transaction,
};

/// Fallback shown when the login endpoint gives no reason for refusing
const LOGIN_FAILED_MESSAGE: &str = "Login failed";

pub struct Store {
    /// Client without credentials; authenticated clients are derived from it
    base_client: ApiClient,
    client: ApiClient,
    session: Option<SessionData>,

    // Portfolio dashboard
    pub services: ResourceCache<Service>,
    pub plans: ResourceCache<Plan>,
    pub projects: ResourceCache<Project>,
    pub testimonials: ResourceCache<Testimonial>,
    pub messages: ResourceCache<Message>,

    // Store back office
    pub products: ResourceCache<Product>,
    pub customers: ResourceCache<Customer>,
    pub sales: ResourceCache<Sale>,
    pub transactions: ResourceCache<Transaction>,
}

impl Store {
    /// Unauthenticated store with empty caches
    pub fn new(client: ApiClient) -> Self {
        let base_client = client.without_token();
        Self::build(base_client, client, None)
    }

    /// Store that resumes a previously saved session
    pub fn with_session(client: ApiClient, session: SessionData) -> Self {
        let base_client = client.without_token();
        let authed = base_client.with_token(session.token.clone());
        Self::build(base_client, authed, Some(session))
    }

    fn build(base_client: ApiClient, client: ApiClient, session: Option<SessionData>) -> Self {
        Self {
            services: ResourceCache::new(client.clone()),
            plans: ResourceCache::new(client.clone()),
            projects: ResourceCache::new(client.clone()),
            testimonials: ResourceCache::new(client.clone()),
            messages: ResourceCache::new(client.clone()),
            products: ResourceCache::new(client.clone()),
            customers: ResourceCache::new(client.clone()),
            sales: ResourceCache::new(client.clone()),
            transactions: ResourceCache::new(client.clone()),
            base_client,
            client,
            session,
        }
    }

    /// Log in and start over with caches bound to the new token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionData, CacheError> {
        let session = self
            .base_client
            .authenticate(email, password)
            .await
            .map_err(|e| CacheError::from_api(&e, LOGIN_FAILED_MESSAGE))?;

        info!(email = %session.email, "Logged in");
        *self = Self::with_session(self.base_client.clone(), session.clone());
        Ok(session)
    }

    /// Forget the session and every cached collection.
    pub fn logout(&mut self) {
        if let Some(ref session) = self.session {
            info!(email = %session.email, "Logged out");
        }
        *self = Self::new(self.base_client.clone());
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().map(|s| !s.is_expired()).unwrap_or(false)
    }

    /// Client the caches use, carrying the session token if there is one
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Drop every cached collection; the next fetch of each goes to the server.
    pub async fn invalidate_all(&self) {
        self.services.invalidate().await;
        self.plans.invalidate().await;
        self.projects.invalidate().await;
        self.testimonials.invalidate().await;
        self.messages.invalidate().await;
        self.products.invalidate().await;
        self.customers.invalidate().await;
        self.sales.invalidate().await;
        self.transactions.invalidate().await;
    }
}
