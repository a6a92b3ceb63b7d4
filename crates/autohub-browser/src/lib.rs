mod browser_finder;
mod cdp_session;
mod error;
mod launcher;
mod profile;
pub mod session;

pub use browser_finder::BrowserFinder;
pub use cdp_session::ChromiumSessionFactory;
pub use error::{Error, Result};
pub use launcher::LaunchOptions;
pub use profile::{ProfileInfo, ProfileManager};
pub use session::{Element, Session, SessionFactory, wait_for};
