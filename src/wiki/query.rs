use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{QueryParams, WikiApi};
use crate::error::{FetchError, FetchResult};

/// One list-valued `prop` of the action API and where its items live in a page object.
#[derive(Debug, Clone, Copy)]
pub struct ListProperty {
    pub name: &'static str,
    pub params: &'static [(&'static str, &'static str)],
    pub list_key: &'static str,
    pub sub_key: Option<&'static str>,
}

/// Article-namespace links.
pub const LINKS: ListProperty = ListProperty {
    name: "links",
    params: &[("prop", "links"), ("plnamespace", "0"), ("pllimit", "max")],
    list_key: "links",
    sub_key: None,
};

pub const EXTLINKS: ListProperty = ListProperty {
    name: "extlinks",
    params: &[("prop", "extlinks"), ("ellimit", "max")],
    list_key: "extlinks",
    sub_key: None,
};

/// Visible categories only.
pub const CATEGORIES: ListProperty = ListProperty {
    name: "categories",
    params: &[("prop", "categories"), ("clshow", "!hidden"), ("cllimit", "max")],
    list_key: "categories",
    sub_key: None,
};

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
    #[serde(rename = "continue")]
    cont: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Map<String, Value>>,
}

/// An `extlinks` entry. Depending on `formatversion` the API sends either a
/// bare string or an object keyed by `url` (v2) or `*` (v1).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExternalLinkItem {
    Bare(String),
    Object {
        url: Option<String>,
        #[serde(rename = "*")]
        star: Option<String>,
    },
}

impl ExternalLinkItem {
    pub fn into_url(self) -> Option<String> {
        match self {
            ExternalLinkItem::Bare(url) => Some(url),
            ExternalLinkItem::Object { url, star } => url.or(star),
        }
    }
}

fn base_params(title: &str, property: &ListProperty) -> QueryParams {
    let mut params: QueryParams = [
        ("action", "query"),
        ("format", "json"),
        ("formatversion", "2"),
        ("redirects", "1"),
    ]
    .into_iter()
    .chain(property.params.iter().copied())
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    params.insert("titles".to_string(), title.to_string());
    params
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Items of the first page in one response, at `list_key[.sub_key]`.
fn page_items(response: &QueryResponse, property: &ListProperty) -> FetchResult<Vec<Value>> {
    let Some(page) = response.query.as_ref().and_then(|q| q.pages.first()) else {
        return Ok(Vec::new());
    };

    let mut node = page.get(property.list_key);
    if let Some(sub_key) = property.sub_key {
        node = node.and_then(|n| n.get(sub_key));
    }

    match node {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| FetchError::parse(format!("'{}' list", property.name), e)),
    }
}

/// Fetch every item of `property` for `title`, following `continue` tokens
/// until a response arrives without one.
///
/// Any failing page aborts the whole fetch; items gathered so far are dropped.
pub async fn query_with_continue<A: WikiApi + ?Sized>(
    api: &A,
    title: &str,
    property: &ListProperty,
) -> FetchResult<Vec<Value>> {
    let base = base_params(title, property);
    let mut items = Vec::new();
    let mut cont: Option<Map<String, Value>> = None;
    let mut pages = 0usize;

    loop {
        let mut params = base.clone();
        if let Some(cont) = &cont {
            params.extend(cont.iter().map(|(k, v)| (k.clone(), param_value(v))));
        }

        let value = api
            .query(&params)
            .await
            .map_err(|e| FetchError::query(property.name, e))?;
        let response: QueryResponse = serde_json::from_value(value).map_err(|e| {
            FetchError::query(property.name, FetchError::parse("action API response", e))
        })?;

        items.extend(page_items(&response, property).map_err(|e| FetchError::query(property.name, e))?);
        pages += 1;

        cont = response.cont.filter(|c| !c.is_empty());
        if cont.is_none() {
            break;
        }
    }

    debug!(property = property.name, title, pages, items = items.len(), "Query complete");
    Ok(items)
}

fn title_of(item: &Value) -> String {
    item.get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Titles of all internal links, one entry per raw item (untitled items become `""`).
pub async fn fetch_internal_links<A: WikiApi + ?Sized>(api: &A, title: &str) -> FetchResult<Vec<String>> {
    let items = query_with_continue(api, title, &LINKS).await?;
    Ok(items.iter().map(title_of).collect())
}

/// External link URLs, normalized from whichever item shape the API used.
pub async fn fetch_external_links<A: WikiApi + ?Sized>(api: &A, title: &str) -> FetchResult<Vec<String>> {
    let items = query_with_continue(api, title, &EXTLINKS).await?;
    Ok(items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ExternalLinkItem>(v).ok())
        .filter_map(ExternalLinkItem::into_url)
        .collect())
}

pub async fn fetch_categories<A: WikiApi + ?Sized>(api: &A, title: &str) -> FetchResult<Vec<String>> {
    let items = query_with_continue(api, title, &CATEGORIES).await?;
    Ok(items.iter().map(title_of).collect())
}
