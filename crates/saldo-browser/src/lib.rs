mod chrome;
mod error;
mod extract;
mod session;

pub use chrome::find_chrome;
pub use error::{Error, Result};
pub use extract::extract;
pub use session::{with_authenticated_page, BrowserSession, SessionConfig};
