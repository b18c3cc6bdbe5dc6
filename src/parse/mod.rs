mod error;
pub mod filter;
mod html_page;
mod manual_page;
mod parsers;
pub mod patterns;
mod remove_excess_whitespace;
pub mod static_compiled;
mod text_from_selection;

pub use error::{Error, Result};
pub use filter::filter_data;
pub use html_page::HtmlParser;
pub use manual_page::ManualParser;
pub use parsers::{PageParser, Parsers};
pub use remove_excess_whitespace::remove_excess_whitespace;
pub use text_from_selection::{get_block_text, text_from_selection};
