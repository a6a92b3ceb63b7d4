pub mod error;
pub mod export;
pub mod locator;
pub mod notification;
pub mod paths;
pub mod proxy;
pub mod record;
pub mod script;
pub mod settings;
pub mod store;
pub mod task;

pub use error::{Error, Result};
pub use locator::Locator;
pub use notification::Notification;
pub use paths::AppDirs;
pub use record::{ResultRecord, RunResults};
pub use settings::{SettingKey, Settings};
pub use store::{DataRow, DataStore};
pub use task::{Credentials, RunState, TaskDescriptor, TaskKind};
