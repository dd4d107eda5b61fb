//! Internal implementation for the page walker.
//!
//! Contains the state machine and the page request.
//! Not exposed in public interface.

use log::{debug, info, warn};
use serde_json::Value;

use super::{StopReason, WalkEnd, WalkOutcome, PAGE_SIZE};
use crate::client::{self, NetworkError, RequestClient};
use crate::config::RunConfig;
use crate::pacing::Sleeper;

enum WalkState {
    Fetching { page: u32 },
    Accumulating { page: u32, items: Vec<Value> },
    Done(StopReason),
    Aborted { page: u32, error: NetworkError },
}

pub(super) fn walk<F>(
    client: &dyn RequestClient,
    sleeper: &dyn Sleeper,
    config: &RunConfig,
    mut on_page: F,
) -> WalkOutcome
where
    F: FnMut(u32, Vec<Value>),
{
    let mut pages_fetched = 0;
    let mut state = WalkState::Fetching { page: 1 };

    loop {
        state = match state {
            WalkState::Fetching { page } if page > config.max_pages => {
                WalkState::Done(StopReason::MaxPages {
                    max: config.max_pages,
                })
            }
            WalkState::Fetching { page } => {
                info!("Fetching page {}...", page);
                match fetch_page(client, config, page) {
                    Ok(items) => {
                        pages_fetched += 1;
                        if items.is_empty() {
                            info!("Page {} is empty", page);
                            WalkState::Done(StopReason::EmptyPage { page })
                        } else {
                            info!("Page {}: {} issues", page, items.len());
                            WalkState::Accumulating { page, items }
                        }
                    }
                    Err(error) => WalkState::Aborted { page, error },
                }
            }
            WalkState::Accumulating { page, items } => {
                let count = items.len();
                on_page(page, items);

                if count < PAGE_SIZE {
                    WalkState::Done(StopReason::ShortPage { page, items: count })
                } else if page >= config.max_pages {
                    WalkState::Done(StopReason::MaxPages {
                        max: config.max_pages,
                    })
                } else {
                    sleeper.sleep(config.page_delay);
                    WalkState::Fetching { page: page + 1 }
                }
            }
            WalkState::Done(reason) => {
                debug!("Walk finished: {}", reason);
                return WalkOutcome {
                    pages_fetched,
                    end: WalkEnd::Done(reason),
                };
            }
            WalkState::Aborted { page, error } => {
                warn!("Page {} failed, stopping walk: {}", page, error);
                return WalkOutcome {
                    pages_fetched,
                    end: WalkEnd::Aborted { page, error },
                };
            }
        };
    }
}

pub(super) fn page_query(config: &RunConfig, page: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("state", config.state.as_str().to_string()),
        ("per_page", PAGE_SIZE.to_string()),
        ("page", page.to_string()),
        ("order_by", "created_at".to_string()),
        ("sort", "desc".to_string()),
    ];
    if let Some(labels) = config.labels.server_param() {
        query.push(("labels", labels));
    }
    query
}

fn fetch_page(
    client: &dyn RequestClient,
    config: &RunConfig,
    page: u32,
) -> Result<Vec<Value>, NetworkError> {
    let path = client::issues_path(&config.project);
    let body = client.get_json(&path, &page_query(config, page))?;

    match body {
        Value::Array(items) => Ok(items),
        other => {
            // Not a listing; nothing to accumulate from it.
            warn!("Page {} returned a non-list body, treating as empty: {}", page, other);
            Ok(Vec::new())
        }
    }
}
