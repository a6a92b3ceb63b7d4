use super::{SiteAdapter, StepContext, StepFailure};
use crate::error::RunError;
use async_trait::async_trait;
use autohub_browser::Session;
use autohub_core::script::ScriptStep;
use autohub_core::{ResultRecord, TaskDescriptor, TaskKind};
use std::time::Duration;

/// Interprets user-authored scripts for the `custom` task kind
pub struct ScriptRunner;

#[async_trait]
impl SiteAdapter for ScriptRunner {
    fn kind(&self) -> TaskKind {
        TaskKind::Custom
    }

    fn source(&self, descriptor: &TaskDescriptor) -> String {
        descriptor
            .script
            .as_ref()
            .map(|script| script.source_label().to_string())
            .unwrap_or_else(|| "script".to_string())
    }

    async fn run(
        &self,
        session: &dyn Session,
        descriptor: &TaskDescriptor,
        ctx: &StepContext,
    ) -> Result<Vec<ResultRecord>, StepFailure> {
        let script = descriptor
            .script
            .as_ref()
            .ok_or_else(|| RunError::Config("custom task requires a script".to_string()))?;

        ctx.log(format!(
            "Running script '{}' ({} steps)",
            script.name,
            script.steps.len()
        ));

        let total = script.steps.len().max(1);
        let mut records = Vec::new();
        for (index, step) in script.steps.iter().enumerate() {
            ctx.log(format!("Step {}: {}", index + 1, step.describe()));

            if let Err(error) = execute(session, step, descriptor, ctx, &mut records).await {
                let error = RunError::Step(format!("Step {} failed: {}", index + 1, error));
                return Err(StepFailure::with_partial(error, records));
            }

            ctx.progress((10 + 80 * (index + 1) / total) as u8);
        }

        Ok(records)
    }
}

async fn execute(
    session: &dyn Session,
    step: &ScriptStep,
    descriptor: &TaskDescriptor,
    ctx: &StepContext,
    records: &mut Vec<ResultRecord>,
) -> Result<(), RunError> {
    match step {
        ScriptStep::Goto { url } => {
            session.goto(url).await?;
        }
        ScriptStep::WaitFor { locator } => {
            ctx.wait(session, locator).await?;
        }
        ScriptStep::Click { locator } => {
            ctx.wait(session, locator).await?.click().await?;
            ctx.pause().await;
        }
        ScriptStep::Type { locator, text } => {
            ctx.wait(session, locator).await?.type_text(text).await?;
            ctx.pause().await;
        }
        ScriptStep::Clear { locator } => {
            ctx.wait(session, locator).await?.clear().await?;
        }
        ScriptStep::PressEnter { locator } => {
            ctx.wait(session, locator).await?.press_enter().await?;
        }
        ScriptStep::Sleep { millis } => {
            tokio::time::sleep(Duration::from_millis(*millis)).await;
        }
        ScriptStep::ExpectUrl { contains } => {
            let url = session.current_url().await?;
            if !url.contains(contains.as_str()) {
                return Err(RunError::Step(format!(
                    "expected URL containing '{}', got {}",
                    contains, url
                )));
            }
        }
        ScriptStep::Collect {
            locator,
            label,
            attribute,
        } => {
            for element in session.find_all(locator).await? {
                if records.len() >= descriptor.max_results {
                    break;
                }

                let value = match attribute {
                    Some(name) => element.attribute(name).await?.unwrap_or_default(),
                    None => element.text().await?,
                };
                let value = value.trim();
                if !value.is_empty() {
                    records.push(ResultRecord::extracted(label.as_str(), value));
                }
            }
            tracing::debug!("{} value(s) collected so far", records.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeNode, FakePage, context};
    use autohub_core::Locator;
    use autohub_core::script::Script;

    fn titles_script() -> Script {
        Script::new(
            "titles",
            vec![
                ScriptStep::Goto {
                    url: "https://news.example/".to_string(),
                },
                ScriptStep::WaitFor {
                    locator: Locator::css(".title"),
                },
                ScriptStep::Collect {
                    locator: Locator::css(".title a"),
                    label: "title".to_string(),
                    attribute: None,
                },
                ScriptStep::Collect {
                    locator: Locator::css(".title a"),
                    label: "link".to_string(),
                    attribute: Some("href".to_string()),
                },
            ],
        )
    }

    #[tokio::test]
    async fn test_collects_text_and_attributes() {
        let page = FakePage::new().with("css=.title", FakeNode::new()).with_all(
            "css=.title a",
            vec![
                FakeNode::text("First").attr("href", "https://news.example/1"),
                FakeNode::text("  "),
            ],
        );
        let descriptor = TaskDescriptor::custom(titles_script());

        let records = ScriptRunner
            .run(&page.session(), &descriptor, &context().0)
            .await
            .unwrap();

        assert_eq!(
            records,
            vec![
                ResultRecord::extracted("title", "First"),
                ResultRecord::extracted("link", "https://news.example/1"),
            ]
        );
        assert_eq!(page.actions()[0], "goto https://news.example/");
    }

    #[tokio::test]
    async fn test_expect_url_mismatch_fails_with_partial() {
        let mut script = titles_script();
        script.steps.push(ScriptStep::ExpectUrl {
            contains: "/done".to_string(),
        });
        let page = FakePage::new()
            .with("css=.title", FakeNode::new())
            .with_all("css=.title a", vec![FakeNode::text("Only")]);

        let failure = ScriptRunner
            .run(&page.session(), &TaskDescriptor::custom(script), &context().0)
            .await
            .unwrap_err();

        assert!(failure.error.to_string().starts_with("Step 5 failed"));
        assert_eq!(failure.partial, vec![ResultRecord::extracted("title", "Only")]);
    }

    #[test]
    fn test_source_uses_script_label() {
        let mut script = titles_script();
        assert_eq!(ScriptRunner.source(&TaskDescriptor::custom(script.clone())), "titles");

        script.source = Some("hacker-news".to_string());
        assert_eq!(ScriptRunner.source(&TaskDescriptor::custom(script)), "hacker-news");
    }
}
