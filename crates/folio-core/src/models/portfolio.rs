use serde::{Deserialize, Serialize};

use crate::cache::{Resource, Searchable};

// The portfolio API is document-backed, so ids arrive as `_id` strings.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub icon: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Resource for Service {
    type Id = String;
    const ENDPOINT: &'static str = "/services";
    const LABEL: &'static str = "service";

    fn id(&self) -> &String {
        &self.id
    }
}

impl Searchable for Service {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Billing period label, e.g. "month" or "project"
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "isPopular", default)]
    pub is_popular: bool,
}

impl Plan {
    pub fn price_display(&self) -> String {
        let price = crate::utils::format_currency(self.price);
        match self.period {
            Some(ref period) => format!("{} / {}", price, period),
            None => price,
        }
    }
}

impl Resource for Plan {
    type Id = String;
    const ENDPOINT: &'static str = "/plans";
    const LABEL: &'static str = "plan";

    fn id(&self) -> &String {
        &self.id
    }
}

impl Searchable for Plan {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.features.iter().map(String::as_str));
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "liveUrl", default)]
    pub live_url: Option<String>,
    #[serde(rename = "repoUrl", default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(rename = "isFeatured", default)]
    pub is_featured: bool,
}

impl Resource for Project {
    type Id = String;
    const ENDPOINT: &'static str = "/projects";
    const LABEL: &'static str = "project";

    fn id(&self) -> &String {
        &self.id
    }
}

impl Searchable for Project {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        if let Some(ref category) = self.category {
            fields.push(category);
        }
        fields.extend(self.technologies.iter().map(String::as_str));
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub content: String,
    /// 1-5 stars
    pub rating: Option<u8>,
    pub avatar: Option<String>,
}

impl Testimonial {
    /// "Name, Position at Company" with whatever parts are present
    pub fn attribution(&self) -> String {
        match (&self.position, &self.company) {
            (Some(p), Some(c)) => format!("{}, {} at {}", self.name, p, c),
            (Some(p), None) => format!("{}, {}", self.name, p),
            (None, Some(c)) => format!("{}, {}", self.name, c),
            (None, None) => self.name.clone(),
        }
    }
}

impl Resource for Testimonial {
    type Id = String;
    const ENDPOINT: &'static str = "/testimonials";
    const LABEL: &'static str = "testimonial";

    fn id(&self) -> &String {
        &self.id
    }
}

impl Searchable for Testimonial {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.content.as_str()];
        fields.extend(self.company.as_deref());
        fields
    }
}

/// Contact-form submission from the public site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Resource for Message {
    type Id = String;
    const ENDPOINT: &'static str = "/messages";
    const LABEL: &'static str = "message";

    fn id(&self) -> &String {
        &self.id
    }
}

impl Searchable for Message {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str(), self.body.as_str()];
        fields.extend(self.subject.as_deref());
        fields
    }
}
