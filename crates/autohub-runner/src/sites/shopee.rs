use super::{SiteAdapter, StepContext, StepFailure, href_of, text_of};
use crate::error::RunError;
use async_trait::async_trait;
use autohub_browser::Session;
use autohub_core::{Locator, ResultRecord, TaskDescriptor, TaskKind};
use std::time::Duration;

const POPUP_CLOSE: &str = ".shopee-popup__close-btn";
const SEARCH_INPUT: &str = ".shopee-searchbar-input__input";
const RESULT_LIST: &str = ".shopee-search-item-result__items";
const RESULT_ITEM: &str = ".shopee-search-item-result__item";
const ITEM_NAME: &str = "._3GAFiR";
const ITEM_PRICE: &str = "._1xk7ak";
const NEXT_PAGE: &str = ".shopee-mini-page-controller__next-btn";

const POPUP_WAIT: Duration = Duration::from_secs(5);

/// Product search on Shopee across several result pages
pub struct ShopeeScrape;

#[async_trait]
impl SiteAdapter for ShopeeScrape {
    fn kind(&self) -> TaskKind {
        TaskKind::Scrape
    }

    fn source(&self, _descriptor: &TaskDescriptor) -> String {
        "shopee".to_string()
    }

    async fn run(
        &self,
        session: &dyn Session,
        descriptor: &TaskDescriptor,
        ctx: &StepContext,
    ) -> Result<Vec<ResultRecord>, StepFailure> {
        ctx.log("Opening Shopee");
        session.goto(&ctx.sites.shopee).await?;
        ctx.progress(10);

        dismiss_popup(session, ctx).await;

        let search = ctx.wait(session, &Locator::css(SEARCH_INPUT)).await?;
        search.clear().await?;
        search.type_text(descriptor.keyword.trim()).await?;
        ctx.pause().await;
        search.press_enter().await?;
        ctx.log(format!("Searching for '{}'", descriptor.keyword.trim()));
        ctx.settle().await;
        ctx.progress(30);

        let mut records = Vec::new();
        match walk_pages(session, descriptor, ctx, &mut records).await {
            Ok(()) => {
                ctx.log(format!("Collected {} product(s)", records.len()));
                Ok(records)
            }
            Err(error) => Err(StepFailure::with_partial(error, records)),
        }
    }
}

/// The promotional popup only shows up for some visitors
async fn dismiss_popup(session: &dyn Session, ctx: &StepContext) {
    let wait = ctx.timeout.min(POPUP_WAIT);
    match ctx.wait_up_to(session, &Locator::css(POPUP_CLOSE), wait).await {
        Ok(close) => match close.click().await {
            Ok(()) => ctx.log("Closed popup"),
            Err(e) => tracing::debug!("Popup close failed: {}", e),
        },
        Err(_) => tracing::debug!("No popup to close"),
    }
}

async fn walk_pages(
    session: &dyn Session,
    descriptor: &TaskDescriptor,
    ctx: &StepContext,
    records: &mut Vec<ResultRecord>,
) -> Result<(), RunError> {
    let pages = descriptor.pages.max(1);
    let name = Locator::css(ITEM_NAME);
    let price = Locator::css(ITEM_PRICE);

    for page in 1..=pages {
        ctx.wait(session, &Locator::css(RESULT_LIST)).await?;

        let items = session.find_all(&Locator::css(RESULT_ITEM)).await?;
        let before = records.len();
        for item in &items {
            if records.len() >= descriptor.max_results {
                break;
            }

            // Only complete listings are stored
            let Some(product) = text_of(item.as_ref(), &name).await else {
                continue;
            };
            let Some(cost) = text_of(item.as_ref(), &price).await else {
                continue;
            };
            let Some(url) = href_of(item.as_ref()).await.filter(|u| !u.trim().is_empty()) else {
                continue;
            };

            records.push(ResultRecord::product(product, cost, url));
        }
        ctx.log(format!(
            "Page {}/{}: {} product(s)",
            page,
            pages,
            records.len() - before
        ));
        ctx.progress(page_progress(page, pages));

        if records.len() >= descriptor.max_results || page == pages {
            break;
        }

        let next = match session.find(&Locator::css(NEXT_PAGE)).await {
            Ok(next) => next,
            Err(_) => {
                ctx.log("No further result pages");
                break;
            }
        };
        let class = next.attribute("class").await?.unwrap_or_default();
        if class.contains("disabled") {
            ctx.log("Reached the last result page");
            break;
        }

        next.click().await?;
        ctx.settle().await;
    }

    Ok(())
}

fn page_progress(page: u32, pages: u32) -> u8 {
    let pages = pages.max(1);
    (40 + 50 * page.min(pages) / pages) as u8
}
