//! Waiting for selectors
//!
//! Polls single-element resolution until the requested state is reached.
//! Resolution does not mutate the page, so polling it has no side effects.

use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::debug;

use crate::element_handle::ElementHandle;
use crate::page::Page;
use crate::{AutomationError, Result, WaitForSelectorOptions};

/// Outcome of one poll
enum PollOutcome {
    Pending,
    Ready(Option<ElementHandle>),
}

impl Page {
    /// Wait until `selector` matches an element
    ///
    /// With `visible` the element must also be visible. With `hidden` the
    /// wait ends once nothing matches or the match is hidden, and resolves
    /// to `None` when nothing matches. Resolution errors, such as an unknown
    /// query handler, end the wait immediately.
    ///
    /// A zero timeout waits forever.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        options: WaitForSelectorOptions,
    ) -> Result<Option<ElementHandle>> {
        options.validate()?;
        let limit = options.timeout.unwrap_or(self.config().default_timeout());
        let polling = options.polling.unwrap_or(self.config().polling_interval());
        debug!(
            "Waiting for selector {} (timeout {:?}, polling {:?})",
            selector, limit, polling
        );

        let wait = self.poll_selector(selector, &options, polling);
        if limit.is_zero() {
            return wait.await;
        }
        match timeout(limit, wait).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AutomationError::Timeout {
                selector: selector.to_string(),
                timeout: limit,
            }),
        }
    }

    async fn poll_selector(
        &self,
        selector: &str,
        options: &WaitForSelectorOptions,
        polling: Duration,
    ) -> Result<Option<ElementHandle>> {
        let mut ticker = interval(polling);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // The first tick completes immediately
            ticker.tick().await;
            if let PollOutcome::Ready(found) = self.check_selector(selector, options).await? {
                return Ok(found);
            }
        }
    }

    async fn check_selector(
        &self,
        selector: &str,
        options: &WaitForSelectorOptions,
    ) -> Result<PollOutcome> {
        let found = self.query_selector(selector).await?;
        let poll = match found {
            Some(element) if options.hidden => {
                if element.is_hidden() {
                    PollOutcome::Ready(Some(element))
                } else {
                    PollOutcome::Pending
                }
            }
            None if options.hidden => PollOutcome::Ready(None),
            Some(element) if options.visible && !element.is_visible() => PollOutcome::Pending,
            Some(element) => PollOutcome::Ready(Some(element)),
            None => PollOutcome::Pending,
        };
        Ok(poll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AutomationConfig, AutomationSession};
    use query_handlers::{QueryError, QueryHandler};

    fn page() -> (AutomationSession, Page) {
        let config = AutomationConfig::builder()
            .default_timeout(Duration::from_millis(200))
            .polling_interval(Duration::from_millis(10))
            .build();
        let session = AutomationSession::new(config).unwrap();
        let page = session.new_page();
        (session, page)
    }

    #[tokio::test]
    async fn test_resolves_immediately_when_present() {
        let (_session, page) = page();
        page.set_content(r#"<p class="ready"></p>"#).unwrap();

        let found = page
            .wait_for_selector(".ready", WaitForSelectorOptions::new())
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_resolves_when_element_appears() {
        let (_session, page) = page();
        let writer = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            writer.set_content(r#"<div id="late">here</div>"#).unwrap();
        });

        let found = page
            .wait_for_selector("#late", WaitForSelectorOptions::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.text_content().unwrap(), "here");
    }

    #[tokio::test]
    async fn test_timeout_message() {
        let (_session, page) = page();

        let error = page
            .wait_for_selector(
                "getById/foo",
                WaitForSelectorOptions::new().timeout(Duration::from_millis(50)),
            )
            .await;
        // Unknown handlers fail fast instead of timing out
        assert!(matches!(
            error,
            Err(AutomationError::Query(QueryError::HandlerNotFound(_)))
        ));

        let error = page
            .wait_for_selector(
                ".never",
                WaitForSelectorOptions::new().timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Waiting for selector `.never` failed: timeout 50ms exceeded"
        );
    }

    #[tokio::test]
    async fn test_visible_option_waits_for_box() {
        let (_session, page) = page();
        page.set_content(r#"<p id="grow"></p>"#).unwrap();

        let hidden_wait = page
            .wait_for_selector(
                "#grow",
                WaitForSelectorOptions::new()
                    .visible()
                    .timeout(Duration::from_millis(40)),
            )
            .await;
        assert!(matches!(hidden_wait, Err(AutomationError::Timeout { .. })));

        let grow = page.document().get_element_by_id("grow").unwrap();
        page.document()
            .set_attribute(grow, "style", "width: 5px; height: 5px")
            .unwrap();

        let found = page
            .wait_for_selector("#grow", WaitForSelectorOptions::new().visible())
            .await
            .unwrap();
        assert_eq!(found.map(|element| element.node_id()), Some(grow));
    }

    #[tokio::test]
    async fn test_hidden_option() {
        let (_session, page) = page();
        page.set_content(r#"<p id="toast" style="width: 5px; height: 5px"></p>"#)
            .unwrap();
        let writer = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            writer.set_content("").unwrap();
        });

        let result = page
            .wait_for_selector("#toast", WaitForSelectorOptions::new().hidden())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_custom_handler_is_polled() {
        let (session, page) = page();
        session
            .register_handler(
                "getById",
                QueryHandler::new().with_query_one(|document, scope, id| {
                    Ok(document.query_selector(scope, &format!("[id=\"{}\"]", id))?)
                }),
            )
            .unwrap();
        let writer = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.set_content(r#"<span id="foo"></span>"#).unwrap();
        });

        let found = page
            .wait_for_selector("getById/foo", WaitForSelectorOptions::new())
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
