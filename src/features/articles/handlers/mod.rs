pub mod article_handler;

pub use article_handler::{
    __path_create_article, __path_delete_article, __path_get_article, __path_list_articles,
    __path_list_pending_articles, __path_update_article_status, create_article, delete_article,
    get_article, list_articles, list_pending_articles, update_article_status, ArticleState,
};
