//! W3C WebDriver adapter
//!
//! Drives a real browser (chromedriver, geckodriver, a Selenium grid) over the
//! WebDriver HTTP protocol using `reqwest`.

pub mod client;
pub mod models;
pub mod surface;

pub use client::WebDriverClient;
pub use surface::WebDriverSurface;
