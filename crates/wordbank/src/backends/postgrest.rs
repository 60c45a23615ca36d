//! # 📡 THE POSTGREST BACKEND
//!
//! 🎬 COLD OPEN: INT. HOSTED POSTGRES, SOMEWHERE IN A REGION YOU DIDN'T PICK.
//!
//! A table named `english_words` waits. It has a REST face (PostgREST, the thing
//! Supabase and friends put in front of Postgres) that accepts a JSON array and
//! inserts every element in one statement. One chunk, one POST, one verdict.
//!
//! 🚀 This module is that POST. It builds the request, attaches the key the
//! way the gateway wants it (`apikey` header AND a bearer token, because one
//! header is never enough), and turns anything other than a 2xx into an error
//! with the status and the body the server bothered to send.
//!
//! ⚠️ It does not retry. It does not back off. The loader stops on the first
//! failed chunk and so does our ambition.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::backends::Sink;
use crate::collectors::{JsonArrayCollector, PayloadCollector, serialize_records};
use crate::common::Record;

// 🚰 PostgrestSinkConfig: where the words go and how we prove we're allowed to send them.
//
// 🔒 The key is tri-modal like every good auth story: written in the config (please don't),
// read from the env var named by `api_key_env` (please do), or missing (we refuse to start).
#[derive(Debug, Deserialize, Clone)]
pub struct PostgrestSinkConfig {
    /// 📡 Project base URL, e.g. `https://abcd.supabase.co`. Scheme included. Yes, all of it.
    pub url: String,
    /// 📦 Target table. Defaults to the one the app reads from.
    #[serde(default = "default_table")]
    pub table: String,
    /// 🛣️ Where the REST API is mounted under `url`.
    #[serde(default = "default_rest_path")]
    pub rest_path: String,
    /// 🔒 Inline key. Works. Ends up in git. Choose wisely.
    #[serde(default)]
    pub api_key: Option<String>,
    /// 🔒 Env var holding the key when `api_key` is absent.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// 🗂️ Non-default Postgres schema, sent as `Content-Profile`.
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_table() -> String {
    "english_words".to_string()
}

fn default_rest_path() -> String {
    "/rest/v1".to_string()
}

fn default_api_key_env() -> String {
    "SUPABASE_KEY".to_string()
}

// -- ⏱️ 10s to shake hands, 30s to answer. we will wait, but not forever.
fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl PostgrestSinkConfig {
    /// 📡 `{url}{rest_path}/{table}` with the slash hygiene you didn't know you needed.
    pub fn table_url(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let prefix = self.rest_path.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", base, self.table)
        } else {
            format!("{}/{}/{}", base, prefix, self.table)
        }
    }

    /// 🔒 Inline key first, then the env var. Empty strings count as missing;
    /// an empty key is a 401 with extra steps.
    pub(crate) fn resolve_api_key(&self, lookup_env: impl Fn(&str) -> Option<String>) -> Result<String> {
        let candidate = match &self.api_key {
            Some(key) => Some(key.clone()),
            None => lookup_env(&self.api_key_env),
        };
        match candidate {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => bail!(
                "💀 No API key for '{}'. Set `api_key` in the sink config, or export {} \
                (or point `api_key_env` at whichever variable holds it).",
                self.url,
                self.api_key_env
            ),
        }
    }
}

/// 📡 The sink side of the REST table: one `insert_many` = one POST of a JSON array.
///
/// Holds a `reqwest::Client` reused across chunks, because a new client per
/// request is the networking equivalent of buying a new car to go to the grocery store.
#[derive(Debug)]
pub(crate) struct PostgrestSink {
    client: reqwest::Client,
    table_url: String,
    api_key: String,
    collector: JsonArrayCollector,
    sink_config: PostgrestSinkConfig,
}

impl PostgrestSink {
    pub(crate) fn new(config: PostgrestSinkConfig) -> Result<Self> {
        let api_key = config.resolve_api_key(|name| std::env::var(name).ok())?;
        Self::with_api_key(config, api_key)
    }

    pub(crate) fn with_api_key(config: PostgrestSinkConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("💀 The HTTP client refused to be born. The TLS stack wept. The architect shrugged.")?;
        let table_url = config.table_url();
        debug!("📡 PostgREST sink aimed at {}", table_url);
        Ok(Self {
            client,
            table_url,
            api_key,
            collector: JsonArrayCollector,
            sink_config: config,
        })
    }
}

#[async_trait]
impl Sink for PostgrestSink {
    async fn insert_many(&mut self, chunk: &[Record]) -> Result<()> {
        let body = self.collector.collect(&serialize_records(chunk)?);
        trace!("📦 POSTing {} records ({} bytes)", chunk.len(), body.len());

        let mut request = self
            .client
            .post(&self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            // -- ⚠️ minimal: we only need the verdict, not the rows echoed back at us
            .header("Prefer", "return=minimal");
        if let Some(ref schema) = self.sink_config.schema {
            request = request.header("Content-Profile", schema);
        }

        let response = request
            .body(body)
            .send()
            .await
            .context("💀 The insert never made it to the table. We launched the payload into the network and the network was not vibing with it.")?;

        let status = response.status();
        if !status.is_success() {
            // 💀 We got an answer. It just wasn't good news. PostgREST error bodies
            // usually name the constraint or the column. Dark poetry, but useful poetry.
            let body = response.text().await.unwrap_or_default();
            bail!(
                "💀 '{}' answered {} to our insert. The body read: '{}'",
                self.sink_config.table,
                status,
                body
            );
        }
        trace!("🚀 chunk landed, {} says {}", self.sink_config.table, status);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // -- 🗑️ nothing buffered, nothing to flush. the connection pool drops with us.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Category, Difficulty};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> PostgrestSinkConfig {
        serde_json::from_value(serde_json::json!({ "url": url })).unwrap()
    }

    fn a_chunk() -> Vec<Record> {
        vec![
            Record::new("music", "음악", Category::Music, Difficulty::Easy),
            Record::new("symphony", "교향곡", Category::Music, Difficulty::Medium),
        ]
    }

    #[test]
    fn the_one_where_defaults_point_at_english_words() {
        let the_config = config_for("https://abcd.supabase.co/");
        assert_eq!(the_config.table, "english_words");
        assert_eq!(the_config.api_key_env, "SUPABASE_KEY");
        assert_eq!(the_config.connect_timeout_secs, 10);
        assert_eq!(the_config.request_timeout_secs, 30);
        assert_eq!(
            the_config.table_url(),
            "https://abcd.supabase.co/rest/v1/english_words"
        );
    }

    #[test]
    fn the_one_where_a_bare_postgrest_has_no_prefix() {
        let mut the_config = config_for("http://localhost:3000");
        the_config.rest_path = "".into();
        the_config.table = "words".into();
        assert_eq!(the_config.table_url(), "http://localhost:3000/words");
    }

    #[test]
    fn the_one_where_the_key_comes_from_config_then_env_then_nowhere() {
        let mut the_config = config_for("http://x");
        the_config.api_key = Some("inline".into());
        assert_eq!(the_config.resolve_api_key(|_| Some("env".into())).unwrap(), "inline");

        the_config.api_key = None;
        let the_key = the_config
            .resolve_api_key(|name| (name == "SUPABASE_KEY").then(|| "env".to_string()))
            .unwrap();
        assert_eq!(the_key, "env");

        assert!(the_config.resolve_api_key(|_| None).is_err());
        assert!(the_config.resolve_api_key(|_| Some("   ".into())).is_err());
    }

    #[tokio::test]
    async fn the_one_where_a_chunk_becomes_one_well_dressed_post() {
        let the_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/english_words"))
            .and(header("apikey", "sekrit"))
            .and(header("Authorization", "Bearer sekrit"))
            .and(header("Prefer", "return=minimal"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!([
                {"word":"music","korean":"음악","category":"Music","difficulty":"easy"},
                {"word":"symphony","korean":"교향곡","category":"Music","difficulty":"medium"}
            ])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&the_server)
            .await;

        let mut the_sink =
            PostgrestSink::with_api_key(config_for(&the_server.uri()), "sekrit".into()).unwrap();
        the_sink.insert_many(&a_chunk()).await.unwrap();
        the_sink.close().await.unwrap();
    }

    #[tokio::test]
    async fn the_one_where_the_schema_rides_along_as_content_profile() {
        let the_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/english_words"))
            .and(header("Content-Profile", "learning"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&the_server)
            .await;

        let mut the_config = config_for(&the_server.uri());
        the_config.schema = Some("learning".into());
        let mut the_sink = PostgrestSink::with_api_key(the_config, "k".into()).unwrap();
        the_sink.insert_many(&a_chunk()).await.unwrap();
    }

    #[tokio::test]
    async fn the_one_where_a_constraint_violation_is_a_chunk_failure() {
        let the_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string(
                r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
            ))
            .mount(&the_server)
            .await;

        let mut the_sink =
            PostgrestSink::with_api_key(config_for(&the_server.uri()), "k".into()).unwrap();
        let the_error = the_sink.insert_many(&a_chunk()).await.unwrap_err();
        let the_message = the_error.to_string();
        assert!(the_message.contains("409"), "{the_message}");
        assert!(the_message.contains("duplicate key"), "{the_message}");
    }

    #[tokio::test]
    async fn the_one_where_nobody_is_listening() {
        // -- 📡 port 9 is the discard service. nobody runs it. that's the point.
        let mut the_config = config_for("http://127.0.0.1:9");
        the_config.connect_timeout_secs = 1;
        the_config.request_timeout_secs = 2;
        let mut the_sink = PostgrestSink::with_api_key(the_config, "k".into()).unwrap();
        assert!(the_sink.insert_many(&a_chunk()).await.is_err());
    }
}
