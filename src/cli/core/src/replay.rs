/* src/cli/core/src/replay.rs */

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use prewarm_core::{
  BoxFuture, CandidateLink, FetchError, Orchestrator, PageDataFetcher, PageRegistry, Props,
  RoutingContext, closest_to_pointer,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::PrewarmConfig;

/// One recorded host event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
  Navigate {
    path: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    server_render: bool,
  },
  /// A link scrolled into view.
  Visible { href: String },
  /// The pointer entered a link.
  Hover { href: String },
  /// A proximity sample: pointer position and the links on screen.
  Pointer { x: f64, y: f64, links: Vec<CandidateLink> },
  /// The host went idle; queued prerenders apply.
  Flush,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  pub step: usize,
  pub event: String,
  pub note: Option<String>,
  pub warm: Vec<String>,
  pub cached: usize,
  /// Key of the visible slot: a prerendered path, or the live slot.
  pub visible: String,
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceEvent>> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("failed to parse trace {}", path.display()))
}

/// Answers every request with `{"path", "locale"}`; no network.
pub fn echo_fetcher() -> Arc<dyn PageDataFetcher> {
  let fetcher = |path: &str, ctx: &RoutingContext| -> BoxFuture<Result<Value, FetchError>> {
    let props = json!({ "path": path, "locale": ctx.locale });
    Box::pin(async move { Ok(props) })
  };
  Arc::new(fetcher)
}

/// Feed `events` through an orchestrator built from `config`, reporting the
/// state after each one.
pub async fn replay(
  config: &PrewarmConfig,
  events: Vec<TraceEvent>,
  fetcher: Arc<dyn PageDataFetcher>,
) -> Result<Vec<StepReport>> {
  let mut builder =
    Orchestrator::<String>::builder().config(config.prerender.clone()).shared_fetcher(fetcher);
  let mut templates = PageRegistry::new();
  for pattern in &config.pages.patterns {
    let template = pattern.clone();
    builder = builder.page(pattern, move |_props: &Props| template.clone());
    templates.register(pattern, pattern.clone())?;
  }
  let orch = builder.build()?;

  let mut reports = Vec::with_capacity(events.len());
  for (step, event) in events.into_iter().enumerate() {
    debug!(step, ?event, "replaying");
    let (label, note) = match event {
      TraceEvent::Navigate { path, locale, server_render } => {
        let mut ctx = RoutingContext::new(&path, locale.as_deref());
        ctx.is_server_render = server_render;
        let effects = orch.navigate(ctx);
        let mut notes = Vec::new();
        if effects.cleared {
          notes.push("cleared");
        }
        if effects.resized {
          notes.push("resized");
        }
        (format!("navigate {path}"), (!notes.is_empty()).then(|| notes.join(", ")))
      }
      TraceEvent::Visible { href } => {
        let note = match orch.prefetch(&href) {
          Some(fetch) => format!("{:?}", fetch.await).to_lowercase(),
          None => "ignored".to_string(),
        };
        (format!("visible {href}"), Some(note))
      }
      TraceEvent::Hover { href } => {
        let queued = orch.pointer_over(&href);
        (format!("hover {href}"), Some(if queued { "queued" } else { "ignored" }.to_string()))
      }
      TraceEvent::Pointer { x, y, links } => {
        orch.pointer_moved(x, y);
        let grouped = closest_to_pointer(
          links,
          |link| {
            let path = orch.resolve_link(&link.href)?;
            templates.match_page(&path).map(|m| m.page.target.clone())
          },
          orch.pointer().position(),
          &config.prerender.proximity,
        );
        let near = grouped.values().map(Vec::len).sum::<usize>();
        orch.proximity_signal(grouped).await;
        (format!("pointer {x},{y}"), Some(format!("{near} near")))
      }
      TraceEvent::Flush => {
        let applied = orch.flush_transitions();
        ("flush".to_string(), Some(format!("{applied} applied")))
      }
    };

    let frame = orch.render(String::new);
    let visible = frame.visible().map(|slot| slot.key.clone()).unwrap_or_default();
    reports.push(StepReport {
      step: step + 1,
      event: label,
      note,
      warm: orch.warm_paths(),
      cached: orch.cache().len(),
      visible,
    });
  }
  Ok(reports)
}
