mod article;

pub use article::{Article, ArticleFilter, ArticleStatus, FileType, NewArticle};
