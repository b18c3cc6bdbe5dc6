use scraper::Html;
use url::Url;

use super::{
    filter::filter_data,
    patterns::{has_day, DESSERT, FIX_DATES_1, FIX_DATES_2, FIX_DATES_3},
    remove_excess_whitespace,
    text_from_selection::text_from_selection,
    Error, PageParser, Result,
};
use crate::menu::{read_menus, DailyMenu};
use crate::static_selector;

static_selector!(ARTICLE <- "article.j-blog");

// words that open a section and so never continue the previous line
const SECTION_WORDS: [&str; 6] = ["comida", "cena", "cóctel", "coctel", "combinado", "postre"];

/// Blog posts whose menus are written as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl PageParser for HtmlParser {
    fn name(&self) -> &'static str {
        "html"
    }

    fn try_process(&self, raw: &str, url: &Url) -> Result<Vec<DailyMenu>> {
        let text = {
            let document = Html::parse_document(raw);
            text_from_selection(&ARTICLE, document.root_element(), "blog page", "blog article")?
        };
        let lines = filter_data(prepare_text(&text));
        if !lines.iter().any(|line| has_day(line)) {
            return Err(Error::NoMenus(format!("no day headers in {url}")));
        }
        Ok(read_menus(&lines, Some(url)))
    }
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn opens_section(line: &str) -> bool {
    let lower = line.to_lowercase();
    SECTION_WORDS.iter().any(|word| lower.contains(word))
}

fn is_wrapped(line: &str) -> bool {
    line.chars().filter(|c| c.is_alphabetic()).count() >= 3
        && line.chars().all(|c| c.is_alphabetic() || c == ' ')
        && !opens_section(line)
}

/// Joins lines that only hold words back onto a previous line ending in a
/// letter, undoing the editor's line wrapping inside dish names.
fn join_wrapped_lines(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let joins = is_wrapped(line)
            && out.last().is_some_and(|prev| {
                !opens_section(prev) && prev.chars().last().is_some_and(char::is_alphabetic)
            });
        match out.last_mut() {
            Some(prev) if joins => {
                prev.push(' ');
                prev.push_str(line);
            }
            _ => out.push(line.to_owned()),
        }
    }
    out.join("\n")
}

/// Repairs the article text before filtering: wrapped dates are put back on
/// one line in canonical form, wrapped dish names rejoined, whitespace runs
/// collapsed and `postre:` moved to its own line.
pub fn prepare_text(text: &str) -> Vec<String> {
    let text = non_empty_lines(text).collect::<Vec<_>>().join("\n");
    let text = FIX_DATES_1.replace_all(&text, "$1 $2");
    let text = FIX_DATES_2.replace_all(&text, "$1 $2");
    let text = FIX_DATES_3.replace_all(&text, "día: $1 de $2 de $3 ($4)");
    let text = join_wrapped_lines(&text);
    let text = remove_excess_whitespace(&text);
    let text = DESSERT.replace_all(&text, "$1\n$2");
    non_empty_lines(&text).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::menu::Meal;

    fn url() -> Url {
        Url::parse("https://www.residenciasantiago.es/2019/03/04/menus/").unwrap()
    }

    #[test]
    fn test_prepare_text() {
        let text = "  Día:   07 de marzo\nde 2019 (jueves\n\nComida:\n1er plato: arroz\na la cubana  fría\n2º plato: pollo   asado fruta postre: flan";
        assert_eq!(
            prepare_text(text),
            vec![
                "día: 07 de marzo de 2019 (jueves)",
                "Comida:",
                "1er plato: arroz a la cubana fría",
                "2º plato: pollo asado fruta",
                "postre: flan",
            ]
        );
    }

    #[test]
    fn test_section_words_are_not_joined() {
        assert_eq!(
            join_wrapped_lines("2º plato: pollo\nCena\nsopa de ajo"),
            "2º plato: pollo\nCena\nsopa de ajo"
        );
    }

    #[test]
    fn test_blog_post() {
        let raw = fs::read_to_string("./src/parse/html_examples/blog_post.html").unwrap();
        let menus = HtmlParser.try_process(&raw, &url()).unwrap();
        assert_eq!(menus.len(), 2);

        let wednesday = &menus[0];
        assert_eq!(wednesday.date(), NaiveDate::from_ymd_opt(2019, 3, 6).unwrap());
        assert_eq!(
            wednesday.lunch(),
            &Meal::new(Some("sopa de fideos"), Some("pollo asado con patatas"))
        );
        assert_eq!(wednesday.dinner(), &Meal::new(Some("pc: jamón y queso"), None));
        assert_eq!(wednesday.url(), &url());

        let thursday = &menus[1];
        assert_eq!(thursday.date(), NaiveDate::from_ymd_opt(2019, 3, 7).unwrap());
        assert_eq!(thursday.lunch(), &Meal::new(Some("lentejas"), Some("merluza")));
        assert_eq!(thursday.dinner(), &Meal::new(Some("cóctel"), None));
    }

    #[test]
    fn test_no_menus() {
        let raw = fs::read_to_string("./src/parse/html_examples/pdf_post.html").unwrap();
        assert!(matches!(
            HtmlParser.try_process(&raw, &url()),
            Err(Error::NoMenus(_))
        ));
        assert!(matches!(
            HtmlParser.try_process("<html><body></body></html>", &url()),
            Err(Error::HtmlParse(_))
        ));
    }
}
