use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use scraper::Selector;

/// Something that can be built once from a literal source string.
pub trait Compile: Sized {
    fn compile(source: &str) -> Result<Self, String>;
}

impl Compile for Selector {
    fn compile(source: &str) -> Result<Self, String> {
        Self::parse(source).map_err(|e| format!("{e:?}"))
    }
}

impl Compile for Regex {
    // the blog mixes upper and lower case freely
    fn compile(source: &str) -> Result<Self, String> {
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug)]
pub struct StaticCompiled<T> {
    cell: OnceLock<T>,
    source: &'static str,
}

impl<T> StaticCompiled<T> {
    pub const fn new(source: &'static str) -> Self {
        Self {
            cell: OnceLock::new(),
            source,
        }
    }
}

impl<T: Compile> core::ops::Deref for StaticCompiled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.cell.get_or_init(|| match T::compile(self.source) {
            Ok(compiled) => compiled,
            Err(e) => panic!("Error compiling static pattern {}: {}", self.source, e),
        })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($vis: vis $x: ident <- $sel: literal) => {
        $vis static $x: $crate::parse::static_compiled::StaticCompiled<scraper::Selector> =
            $crate::parse::static_compiled::StaticCompiled::new($sel);
    };
}

#[macro_export]
macro_rules! static_regex {
    ($vis: vis $x: ident <- $pat: literal) => {
        $vis static $x: $crate::parse::static_compiled::StaticCompiled<regex::Regex> =
            $crate::parse::static_compiled::StaticCompiled::new($pat);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    static_regex!(GREETING <- r"hola\s+(\w+)");
    static_selector!(ARTICLE <- "article.j-blog");

    #[test]
    fn test_regex_is_case_insensitive() {
        let caps = GREETING.captures("HOLA   Mundo").expect("should match");
        assert_eq!(&caps[1], "Mundo");
    }

    #[test]
    fn test_selector_compiles_once() {
        let html = scraper::Html::parse_fragment(r#"<article class="j-blog">x</article>"#);
        assert_eq!(html.select(&ARTICLE).count(), 1);
        assert!(std::ptr::eq(&*ARTICLE, &*ARTICLE));
    }
}
