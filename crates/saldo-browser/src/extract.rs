use crate::{Error, Result};
use chromiumoxide::Page;
use saldo_core::heuristics::{
    amount_from_json, first_signal, is_balance_endpoint, truncate_text, BALANCE_SELECTORS,
    RAW_SAMPLE_MAX,
};
use saldo_core::ExtractionResult;

/// How many recent resource-timing entries the network probe inspects.
pub const RESOURCE_PROBE_LIMIT: usize = 10;

/// Derive a balance observation from a loaded, authenticated page.
///
/// An ordered fallback chain; each strategy runs only if the prior one found
/// nothing. This never fails outward: script errors degrade to the next
/// strategy, and a page with no signal still produces a diagnostic result.
pub async fn extract(page: &Page) -> ExtractionResult {
    if let Some((amount, source)) = scan_dom(page).await {
        tracing::info!("DOM scan matched: {source}");
        return ExtractionResult::StructuredBalance { amount, source };
    }

    if let Some(result) = probe_recent_fetches(page).await {
        return result;
    }

    match page_text(page).await {
        Some(text) if !text.trim().is_empty() => {
            tracing::info!("no structured signal; capturing raw page sample");
            ExtractionResult::RawContentSample {
                text: truncate_text(&text, RAW_SAMPLE_MAX),
            }
        }
        _ => {
            tracing::warn!("page yielded no text at all");
            ExtractionResult::Empty
        }
    }
}

/// Strategy 1: scan prioritized selectors for balance-like rendered text.
async fn scan_dom(page: &Page) -> Option<(f64, String)> {
    let texts: Vec<String> = match page.evaluate(dom_scan_js()).await {
        Ok(result) => result.into_value().ok()?,
        Err(err) => {
            tracing::debug!("DOM scan script failed: {err}");
            return None;
        }
    };

    let signal = first_signal(texts.iter().map(String::as_str))?;
    Some((signal.amount, signal.matched))
}

/// Strategy 2: re-fetch the page's own recent balance-looking API calls.
///
/// The page's internal calls are the authoritative source when discoverable,
/// but the resource-timing buffer only keeps a window of them. A failed
/// candidate is skipped, never fatal for the strategy.
async fn probe_recent_fetches(page: &Page) -> Option<ExtractionResult> {
    let urls: Vec<String> = match page.evaluate(probe_js()).await {
        Ok(result) => result.into_value().unwrap_or_default(),
        Err(err) => {
            tracing::debug!("resource-timing probe failed: {err}");
            return None;
        }
    };

    let candidates: Vec<&String> = urls
        .iter()
        .filter(|url| is_balance_endpoint(url))
        .collect();
    if candidates.is_empty() {
        tracing::info!(
            "no balance-like endpoints among {} recent fetches",
            urls.len()
        );
        return None;
    }

    for url in candidates {
        tracing::info!("intercepted candidate: {url}");
        match refetch_candidate(page, url).await {
            Ok(Some(result)) => return Some(result),
            Ok(None) => tracing::debug!("candidate had no parseable amount: {url}"),
            Err(err) => tracing::debug!("candidate re-fetch failed ({url}): {err}"),
        }
    }

    None
}

/// Re-fetch one candidate URL inside the page's own session and parse it.
async fn refetch_candidate(page: &Page, url: &str) -> Result<Option<ExtractionResult>> {
    let body = fetch_in_page(page, url).await?;

    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };

    Ok(amount_from_json(&value).map(|amount| ExtractionResult::StructuredBalance {
        amount,
        source: truncate_text(&body, RAW_SAMPLE_MAX),
    }))
}

/// Strategy 3 input: the page's full visible text.
async fn page_text(page: &Page) -> Option<String> {
    match page
        .evaluate("document.body ? document.body.innerText : ''")
        .await
    {
        Ok(result) => result.into_value().ok(),
        Err(err) => {
            tracing::debug!("page text capture failed: {err}");
            None
        }
    }
}

/// Issue an authenticated same-session fetch from within the page.
async fn fetch_in_page(page: &Page, url: &str) -> Result<String> {
    let response: serde_json::Value = page
        .evaluate(fetch_js(url))
        .await?
        .into_value()
        .map_err(|err| Error::Cdp(err.to_string()))?;

    let ok = response
        .get("ok")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    let status = response
        .get("status")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);
    let text = response
        .get("text")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    if !ok {
        return Err(Error::Cdp(format!(
            "in-page fetch returned status {status}: {}",
            truncate_text(&text, 200)
        )));
    }

    Ok(text)
}

fn dom_scan_js() -> String {
    // Per-selector cap keeps the generic tail from flooding the result;
    // 200 chars of text is plenty for any balance signal.
    let selectors = serde_json::to_string(BALANCE_SELECTORS).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(function(selectors) {{
  const out = [];
  for (const selector of selectors) {{
    let nodes;
    try {{ nodes = document.querySelectorAll(selector); }} catch (_) {{ continue; }}
    let taken = 0;
    for (const el of nodes) {{
      const text = (el.innerText || el.textContent || '').trim();
      if (!text) continue;
      out.push(text.slice(0, 200));
      if (++taken >= 40) break;
    }}
  }}
  return out;
}})({selectors})"#
    )
}

fn probe_js() -> String {
    format!(
        r#"(function() {{
  const entries = performance.getEntriesByType('resource') || [];
  return entries
    .filter((e) => e.initiatorType === 'fetch' || e.initiatorType === 'xmlhttprequest')
    .slice(-{RESOURCE_PROBE_LIMIT})
    .map((e) => e.name);
}})()"#
    )
}

fn fetch_js(url: &str) -> String {
    let target = serde_json::Value::String(url.to_string());
    format!(
        r#"(async function(url) {{
  try {{
    const res = await fetch(url, {{
      credentials: 'include',
      headers: {{ accept: 'application/json, text/plain, */*' }}
    }});
    const text = await res.text();
    return {{ ok: res.ok, status: res.status, text }};
  }} catch (e) {{
    return {{ ok: false, status: 0, text: String((e && e.message) || e || 'fetch failed') }};
  }}
}})({target})"#
    )
}
