use scraper::Html;
use url::Url;

use super::{Error, PageParser, Result};
use crate::menu::DailyMenu;
use crate::static_selector;

static_selector!(PDF_LINK <- "div.cc-m-download-file-link a[href]");
static_selector!(PHOTO <- r#"div.post.j-blog-content img[alt=""]"#);

/// Posts that publish the week as a PDF download or a photo. They are
/// recognised and accepted with no menus, since nothing can be read from them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualParser;

impl PageParser for ManualParser {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn try_process(&self, raw: &str, url: &Url) -> Result<Vec<DailyMenu>> {
        let document = Html::parse_document(raw);
        if let Some(link) = document.select(&PDF_LINK).next() {
            log::info!(
                "{url} publishes its menus as a pdf ({}), skipping",
                link.value().attr("href").unwrap_or_default()
            );
            return Ok(Vec::new());
        }
        if document.select(&PHOTO).next().is_some() {
            log::info!("{url} publishes its menus as a photo, skipping");
            return Ok(Vec::new());
        }
        Err(Error::UnsupportedFormat(format!(
            "{url} holds neither a pdf nor a photo"
        )))
    }
}
