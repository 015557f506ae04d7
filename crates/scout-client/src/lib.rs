pub mod browser;

pub use browser::{ChromeElement, ChromeSession, ChromeSessionFactory};
