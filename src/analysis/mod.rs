pub mod html;
pub mod keywords;
pub mod rss;
