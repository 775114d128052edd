pub mod common;
pub mod traits;
pub mod web;

use anyhow::Result;
use async_trait::async_trait;

use traits::PageDriver;
use web::{WebDriver, WebDriverConfig};

/// Opens a fresh page for each scenario
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageDriver>>;
}

/// Page factory backed by Playwright
pub struct WebPageFactory {
    config: WebDriverConfig,
}

impl WebPageFactory {
    pub fn new(config: WebDriverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PageFactory for WebPageFactory {
    async fn open(&self) -> Result<Box<dyn PageDriver>> {
        let driver = WebDriver::new(self.config.clone()).await?;
        Ok(Box::new(driver))
    }
}
