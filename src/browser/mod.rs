pub mod page;
pub mod session;
pub mod static_page;

pub use page::Page;
pub use session::{BrowserSession, SessionConfig};
pub use static_page::StaticPage;
