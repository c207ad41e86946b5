//! CLI command implementations.

use anyhow::{Context, Result, bail};
use hireline_core::SequencedCollection;
use serde_json::{Value, json};
use std::path::Path;
use url::Url;

/// Thin JSON client for the Hireline REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let mut base =
            Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;
        // Url::join drops the last segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid API path: {}", path))
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let response = self.client.get(self.endpoint(path)?).send().await?;
        read_json(response).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .put(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("no message");
        bail!("API returned {}: {}", status, message);
    }
    Ok(body)
}

fn collection(resource: &str) -> Result<SequencedCollection> {
    SequencedCollection::from_resource(resource).with_context(|| {
        let known: Vec<&str> = SequencedCollection::ALL.iter().map(|c| c.resource()).collect();
        format!(
            "Unknown resource '{}', expected one of: {}",
            resource,
            known.join(", ")
        )
    })
}

pub fn validate(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    match hireline_config::system::parse_system_config(&content) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  listen:      {}", config.server.listen);
            println!("  uploads dir: {}", config.uploads.dir.display());
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

pub async fn list(client: &ApiClient, resource: &str, include_inactive: bool) -> Result<()> {
    let collection = collection(resource)?;
    if collection == SequencedCollection::PlanBenefits {
        bail!("Benefits are listed per plan: GET /plans/{{id}}/benefits");
    }

    let path = format!(
        "{}?include_inactive={}",
        collection.resource(),
        include_inactive
    );
    let rows = client.get(&path).await?;
    for row in rows.as_array().map(Vec::as_slice).unwrap_or_default() {
        println!("{}", format_row(row));
    }
    Ok(())
}

pub async fn reorder(client: &ApiClient, resource: &str, file: &Path) -> Result<()> {
    let collection = collection(resource)?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let entries: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let body = reorder_body(collection, entries)?;
    let response = client
        .put(&format!("{}/sequence", collection.resource()), &body)
        .await?;
    println!(
        "{} ({} updated)",
        response["message"].as_str().unwrap_or("Sequence updated"),
        response["updated"]
    );
    Ok(())
}

/// Wrap an array of entries in the collection's request field.
fn reorder_body(collection: SequencedCollection, entries: Value) -> Result<Value> {
    if !entries.is_array() {
        bail!("Expected a JSON array of {{id, sequence}} entries");
    }
    let mut body = json!({});
    body[collection.entries_field()] = entries;
    Ok(body)
}

fn format_row(row: &Value) -> String {
    let sequence = match &row["sequence"] {
        Value::Null => "-".to_string(),
        other => other.to_string(),
    };
    let label = row["name"]
        .as_str()
        .or_else(|| row["title"].as_str())
        .unwrap_or("");
    let inactive = if row["is_active"] == Value::Bool(false) {
        " (inactive)"
    } else {
        ""
    };
    format!("{:>6}  {:>4}  {}{}", row["id"].to_string(), sequence, label, inactive)
}
