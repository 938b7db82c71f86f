//! External knowledge lookup: Korean Wikipedia plus SerpAPI web snippets.
//!
//! Both sources are best-effort. Whatever answers is stitched into one block
//! of context for the model; if neither answers the caller gets `None` and
//! the model runs on its own knowledge.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;

const WIKI_API_URL: &str = "https://ko.wikipedia.org/w/api.php";
const SERP_API_URL: &str = "https://serpapi.com/search.json";

#[derive(Debug, Clone)]
pub struct Knowledge {
    http: reqwest::Client,
    serpapi_key: String,
}

impl Knowledge {
    pub fn new(http: reqwest::Client, serpapi_key: impl Into<String>) -> Self {
        Self { http, serpapi_key: serpapi_key.into() }
    }

    /// Combined lookup. Returns `None` when neither source produced text.
    pub async fn search(&self, query: &str) -> Option<String> {
        let wiki = match self.wiki_summary(query).await {
            Ok(summary) => summary,
            Err(e) => {
                debug!(%query, error = %e, "wikipedia lookup failed");
                String::new()
            }
        };
        let snippets = match self.serp_snippets(query).await {
            Ok(snippets) => snippets,
            Err(e) => {
                debug!(%query, error = %e, "serpapi lookup failed");
                String::new()
            }
        };

        let mut info = String::new();
        if !wiki.is_empty() {
            info.push_str(&format!("📚 위키백과 요약:\n{wiki}\n"));
        }
        if !snippets.is_empty() {
            info.push_str(&format!("🌐 웹 검색 결과:\n{snippets}\n"));
        }
        (!info.is_empty()).then_some(info)
    }

    /// First two sentences of the best-matching Korean Wikipedia article,
    /// empty when nothing matches.
    async fn wiki_summary(&self, query: &str) -> Result<String, ProviderError> {
        let resp: WikiResponse = self
            .http
            .get(WIKI_API_URL)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let extract = resp
            .query
            .and_then(|q| q.pages.into_values().next())
            .map(|p| p.extract)
            .unwrap_or_default();
        Ok(first_sentences(&extract, 2))
    }

    /// Up to three organic-result snippets, newline-joined. Empty when the
    /// key is unset or the search returns nothing usable.
    async fn serp_snippets(&self, query: &str) -> Result<String, ProviderError> {
        if self.serpapi_key.is_empty() {
            return Ok(String::new());
        }
        let resp: SerpResponse = self
            .http
            .get(SERP_API_URL)
            .query(&[
                ("q", query),
                ("hl", "ko"),
                ("gl", "kr"),
                ("num", "3"),
                ("api_key", &self.serpapi_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let snippets: Vec<String> = resp
            .organic_results
            .into_iter()
            .filter_map(|r| r.snippet)
            .filter(|s| !s.is_empty())
            .take(3)
            .collect();
        Ok(snippets.join("\n"))
    }
}

fn first_sentences(text: &str, count: usize) -> String {
    text.split_inclusive(['.', '!', '?'])
        .take(count)
        .collect::<String>()
        .trim()
        .to_owned()
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WikiResponse {
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    pages: HashMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    #[serde(default)]
    extract: String,
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SerpResult>,
}

#[derive(Debug, Deserialize)]
struct SerpResult {
    snippet: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_sentences_survive() {
        let text = "경복궁은 조선의 법궁이다. 1395년에 창건되었다. 임진왜란 때 소실되었다.";
        assert_eq!(
            first_sentences(text, 2),
            "경복궁은 조선의 법궁이다. 1395년에 창건되었다."
        );
        assert_eq!(first_sentences("한 문장.", 2), "한 문장.");
        assert_eq!(first_sentences("", 2), "");
    }

    #[test]
    fn wiki_response_parses() {
        let raw = r#"{
            "query": {"pages": {"3435": {"pageid": 3435, "title": "경복궁",
                "extract": "경복궁은 조선의 법궁이다. 1395년에 창건되었다."}}}
        }"#;
        let parsed: WikiResponse = serde_json::from_str(raw).unwrap();
        let page = parsed.query.unwrap().pages.into_values().next().unwrap();
        assert!(page.extract.starts_with("경복궁은"));
    }

    #[test]
    fn serp_snippets_skip_empty_entries() {
        let raw = r#"{
            "organic_results": [
                {"snippet": "첫 번째"},
                {"title": "no snippet"},
                {"snippet": "두 번째"}
            ]
        }"#;
        let parsed: SerpResponse = serde_json::from_str(raw).unwrap();
        let snippets: Vec<String> =
            parsed.organic_results.into_iter().filter_map(|r| r.snippet).collect();
        assert_eq!(snippets, vec!["첫 번째".to_owned(), "두 번째".to_owned()]);
    }
}
