mod article;
mod article_view;
mod slug;

pub use self::{
    article::Article,
    article_view::ArticleView,
    slug::slugify,
};
