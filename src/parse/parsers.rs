use url::Url;

use super::{html_page::HtmlParser, manual_page::ManualParser, Error, Result};
use crate::menu::DailyMenu;

/// One way of reading a blog page.
pub trait PageParser: Send + Sync {
    fn name(&self) -> &'static str;

    /// The menus of the page, or why this parser cannot read it.
    fn try_process(&self, raw: &str, url: &Url) -> Result<Vec<DailyMenu>>;
}

/// Parsers tried in order until one accepts the page.
pub struct Parsers(Vec<Box<dyn PageParser>>);

impl Default for Parsers {
    fn default() -> Self {
        Self::new(vec![Box::new(HtmlParser), Box::new(ManualParser)])
    }
}

impl Parsers {
    pub fn new(parsers: Vec<Box<dyn PageParser>>) -> Self {
        Self(parsers)
    }

    pub fn parse(&self, raw: &str, url: &Url) -> Result<Vec<DailyMenu>> {
        let mut failures = Vec::with_capacity(self.0.len());
        for parser in &self.0 {
            match parser.try_process(raw, url) {
                Ok(menus) => return Ok(menus),
                Err(e) => {
                    log::debug!("{} parser rejected {url}: {e}", parser.name());
                    failures.push(format!("{}: {e}", parser.name()));
                }
            }
        }
        Err(Error::UnsupportedFormat(format!(
            "no parser could read {url} ({})",
            failures.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn url() -> Url {
        Url::parse("https://www.residenciasantiago.es/2019/03/04/menus/").unwrap()
    }

    struct Refuses;

    impl PageParser for Refuses {
        fn name(&self) -> &'static str {
            "refuses"
        }

        fn try_process(&self, _raw: &str, _url: &Url) -> Result<Vec<DailyMenu>> {
            Err(Error::internal_error("never"))
        }
    }

    #[test]
    fn test_first_success_wins() {
        let raw = fs::read_to_string("./src/parse/html_examples/blog_post.html").unwrap();
        assert_eq!(Parsers::default().parse(&raw, &url()).unwrap().len(), 2);

        let raw = fs::read_to_string("./src/parse/html_examples/photo_post.html").unwrap();
        assert!(Parsers::default().parse(&raw, &url()).unwrap().is_empty());
    }

    #[test]
    fn test_failures_are_aggregated() {
        let parsers = Parsers::new(vec![Box::new(Refuses), Box::new(ManualParser)]);
        let err = parsers
            .parse("<html><body><p>hola</p></body></html>", &url())
            .unwrap_err();
        assert!(
            matches!(&err, Error::UnsupportedFormat(msg) if msg.contains("refuses: ") && msg.contains("manual: ")),
            "{err:?}"
        );
    }
}
