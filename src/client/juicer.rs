//! Keyword search and similar-article lookup on the Juicer

use serde_json::Value;

use super::NewsQuery;
use crate::error::Result;
use crate::models::JuicerArticle;
use crate::utils::{format_day, json_string, parse_day};

impl NewsQuery {
    /// Full-text article search
    ///
    /// `published_after` and `published_before` are `YYYY-MM-DD` bounds;
    /// `source_ids` restricts hits to the given Juicer products.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDate` if a supplied bound is not `YYYY-MM-DD`.
    pub async fn search_articles(
        &self,
        text: &str,
        published_after: Option<&str>,
        published_before: Option<&str>,
        source_ids: &[&str],
    ) -> Result<Vec<JuicerArticle>> {
        let after = published_after.map(parse_day).transpose()?.map(format_day);
        let before = published_before.map(parse_day).transpose()?.map(format_day);

        let mut params = vec![("text", text.to_string())];
        if let Some(after) = &after {
            params.push(("published_after", after.clone()));
        }
        if let Some(before) = &before {
            params.push(("published_before", before.clone()));
        }
        params.extend(source_ids.iter().map(|id| ("product[]", id.to_string())));

        let hits = self
            .cached(
                "search_articles",
                &(text, &after, &before, source_ids),
                async {
                    let url = self.juicer_url(&["articles.json"], &params);
                    map_juicer_hits(&self.gateway.get_json(&url).await)
                },
            )
            .await;

        Ok(hits)
    }

    /// Articles similar to a Juicer article
    pub async fn get_similar_articles(&self, article_id: &str) -> Vec<JuicerArticle> {
        self.cached("get_similar_articles", &article_id, async {
            let url = self.juicer_url(&["articles", article_id, "similar.json"], &[]);
            map_juicer_hits(&self.gateway.get_json(&url).await)
        })
        .await
    }

    /// Articles similar to a free-text passage
    pub async fn get_similar_articles_from_text(&self, text: &str) -> Vec<JuicerArticle> {
        self.cached("get_similar_articles_from_text", &text, async {
            let url = self.juicer_url(&["similar_to_text.json"], &[]);
            map_juicer_hits(&self.gateway.post_form(&url, &[("text", text)]).await)
        })
        .await
    }
}

/// Read hits from `hits`, `results` or a top-level array
pub(crate) fn map_juicer_hits(response: &Value) -> Vec<JuicerArticle> {
    let hits = response
        .get("hits")
        .or_else(|| response.get("results"))
        .and_then(Value::as_array)
        .or_else(|| response.as_array());

    hits.map(|hits| hits.iter().map(map_juicer_hit).collect())
        .unwrap_or_default()
}

fn map_juicer_hit(hit: &Value) -> JuicerArticle {
    JuicerArticle {
        id: first_of(hit, &["id", "_id", "cps_id"]),
        title: first_of(hit, &["title"]),
        url: first_of(hit, &["url"]),
        published: first_of(hit, &["published", "published_at", "dateCreated"]),
        source: source_name(&hit["source"]),
        description: first_of(hit, &["description", "summary"]),
        image: first_of(hit, &["image", "thumbnail"]),
    }
}

/// First non-empty scalar among `keys`
fn first_of(hit: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| json_string(&hit[*key]))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Sources arrive as a plain string or as `{"source-name": ..}`
fn source_name(source: &Value) -> String {
    match source {
        Value::Object(_) => first_of(source, &["source-name", "name", "@id"]),
        other => json_string(other),
    }
}
