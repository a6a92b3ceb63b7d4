use super::{SiteAdapter, StepContext, StepFailure, href_of, text_of};
use async_trait::async_trait;
use autohub_browser::Session;
use autohub_core::{Locator, ResultRecord, TaskDescriptor, TaskKind};
use url::Url;

const RESULT_CONTAINER: &str = "#search";
const RESULT_ITEM: &str = "div.g";
const RESULT_ITEM_FALLBACK: &str = "//div[contains(@class, 'g')]";

/// Keyword search on Google, collecting result titles and links
pub struct GoogleSearch;

#[async_trait]
impl SiteAdapter for GoogleSearch {
    fn kind(&self) -> TaskKind {
        TaskKind::Search
    }

    fn source(&self, _descriptor: &TaskDescriptor) -> String {
        "google".to_string()
    }

    async fn run(
        &self,
        session: &dyn Session,
        descriptor: &TaskDescriptor,
        ctx: &StepContext,
    ) -> Result<Vec<ResultRecord>, StepFailure> {
        ctx.log("Opening Google");
        session.goto(&ctx.sites.google).await?;
        ctx.progress(10);

        let search_box = ctx.wait(session, &Locator::name("q")).await?;
        search_box.clear().await?;
        search_box.type_text(descriptor.keyword.trim()).await?;
        ctx.pause().await;
        search_box.press_enter().await?;
        ctx.log(format!("Searching for '{}'", descriptor.keyword.trim()));
        ctx.progress(30);

        ctx.wait(session, &Locator::css(RESULT_CONTAINER)).await?;
        ctx.progress(50);

        let mut items = session.find_all(&Locator::css(RESULT_ITEM)).await?;
        if items.is_empty() {
            tracing::debug!("No {} results, trying XPath fallback", RESULT_ITEM);
            items = session.find_all(&Locator::xpath(RESULT_ITEM_FALLBACK)).await?;
        }
        ctx.log(format!("Found {} result blocks", items.len()));
        ctx.progress(70);

        let title = Locator::css("h3");
        let mut records = Vec::new();
        for item in &items {
            if records.len() >= descriptor.max_results {
                break;
            }

            let Some(title) = text_of(item.as_ref(), &title).await else {
                continue;
            };
            let Some(href) = href_of(item.as_ref()).await.filter(|h| is_web_link(h)) else {
                tracing::debug!("Skipping '{}' without a usable link", title);
                continue;
            };

            records.push(ResultRecord::link(title, href));
        }
        ctx.progress(90);

        ctx.log(format!("Collected {} result(s)", records.len()));
        Ok(records)
    }
}

fn is_web_link(href: &str) -> bool {
    Url::parse(href).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
