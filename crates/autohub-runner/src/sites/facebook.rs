use super::{SiteAdapter, StepContext, StepFailure};
use crate::error::RunError;
use async_trait::async_trait;
use autohub_browser::Session;
use autohub_core::{Credentials, Locator, ResultRecord, TaskDescriptor, TaskKind};
use std::path::PathBuf;

const COMPOSER: &str = "[aria-label='Tạo bài viết'], [aria-label='Create post']";
const POST_BOX: &str =
    "[aria-label='Bạn đang nghĩ gì?'], [aria-label=\"What's on your mind?\"], [contenteditable='true']";
const PHOTO_BUTTON: &str = "[aria-label='Photo/video']";
const FILE_INPUT: &str = "input[type='file']";
const SUBMIT: &str = "[aria-label='Đăng'], [aria-label='Post']";
const POSTED_MARKER: &str = "//*[contains(text(), 'đã được đăng') or contains(text(), 'was posted')]";

/// Facebook email/password login
pub struct FacebookLogin;

#[async_trait]
impl SiteAdapter for FacebookLogin {
    fn kind(&self) -> TaskKind {
        TaskKind::Login
    }

    fn source(&self, _descriptor: &TaskDescriptor) -> String {
        "facebook".to_string()
    }

    async fn run(
        &self,
        session: &dyn Session,
        descriptor: &TaskDescriptor,
        ctx: &StepContext,
    ) -> Result<Vec<ResultRecord>, StepFailure> {
        let credentials = descriptor
            .credentials
            .as_ref()
            .ok_or_else(|| RunError::Config("login requires credentials".to_string()))?;

        let url = log_in(session, credentials, ctx).await?;
        ctx.progress(90);

        Ok(vec![ResultRecord::status(
            "logged_in",
            format!("Logged in as {}", credentials.email),
            url,
        )])
    }
}

/// Fill and submit the login form, then judge the outcome from the landing URL
async fn log_in(
    session: &dyn Session,
    credentials: &Credentials,
    ctx: &StepContext,
) -> Result<String, RunError> {
    ctx.log("Opening Facebook");
    session.goto(&ctx.sites.facebook).await?;
    ctx.progress(10);

    let email = ctx.wait(session, &Locator::id("email")).await?;
    email.clear().await?;
    email.type_text(&credentials.email).await?;
    ctx.pause().await;

    let password = ctx.wait(session, &Locator::id("pass")).await?;
    password.clear().await?;
    password.type_text(&credentials.password).await?;
    ctx.pause().await;
    ctx.progress(30);

    ctx.wait(session, &Locator::name("login")).await?.click().await?;
    ctx.log("Submitted login form");
    ctx.progress(50);

    ctx.settle().await;

    let url = session.current_url().await?;
    tracing::debug!("Landed on {} after login", url);

    if url.contains("checkpoint") {
        return Err(RunError::Step(
            "Login failed: account requires security verification".to_string(),
        ));
    }
    if url.contains("login") {
        return Err(RunError::Step(
            "Login failed: check the email and password".to_string(),
        ));
    }

    ctx.log("Login successful");
    Ok(url)
}

/// Publish a status update, optionally with images
pub struct FacebookPost;

#[async_trait]
impl SiteAdapter for FacebookPost {
    fn kind(&self) -> TaskKind {
        TaskKind::Post
    }

    fn source(&self, _descriptor: &TaskDescriptor) -> String {
        "facebook".to_string()
    }

    async fn run(
        &self,
        session: &dyn Session,
        descriptor: &TaskDescriptor,
        ctx: &StepContext,
    ) -> Result<Vec<ResultRecord>, StepFailure> {
        let content = descriptor.content.as_deref().unwrap_or_default();

        match &descriptor.credentials {
            Some(credentials) => {
                log_in(session, credentials, ctx).await?;
            }
            None => {
                // Relies on a session already stored in the browser profile
                ctx.log("Opening Facebook with the saved profile session");
                session.goto(&ctx.sites.facebook).await?;
            }
        }
        ctx.progress(55);

        ctx.wait(session, &Locator::css(COMPOSER)).await?.click().await?;
        ctx.pause().await;

        let post_box = ctx.wait(session, &Locator::css(POST_BOX)).await?;
        post_box.click().await?;
        post_box.type_text(content).await?;
        ctx.log("Post content entered");
        ctx.progress(65);

        let images = existing_files(&descriptor.images, ctx);
        if !images.is_empty() {
            match attach_images(session, &images, ctx).await {
                Ok(()) => {
                    ctx.log(format!("Attached {} image(s)", images.len()));
                    ctx.settle().await;
                }
                Err(e) => {
                    tracing::warn!("Image attach failed: {}", e);
                    ctx.log(format!("Could not attach images, posting text only: {}", e));
                }
            }
        }
        ctx.progress(75);

        ctx.pause().await;
        ctx.wait(session, &Locator::css(SUBMIT)).await?.click().await?;
        ctx.log("Publishing post");

        ctx.wait(session, &Locator::xpath(POSTED_MARKER)).await?;
        ctx.progress(90);

        let url = session.current_url().await?;
        ctx.log("Post published");
        Ok(vec![ResultRecord::status("posted", "Post published", url)])
    }
}

async fn attach_images(
    session: &dyn Session,
    images: &[PathBuf],
    ctx: &StepContext,
) -> Result<(), RunError> {
    ctx.wait(session, &Locator::css(PHOTO_BUTTON)).await?.click().await?;
    ctx.wait(session, &Locator::css(FILE_INPUT))
        .await?
        .upload(images)
        .await?;
    Ok(())
}

fn existing_files(images: &[PathBuf], ctx: &StepContext) -> Vec<PathBuf> {
    images
        .iter()
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                ctx.log(format!("Skipping missing image {}", path.display()));
            }
            exists
        })
        .cloned()
        .collect()
}
