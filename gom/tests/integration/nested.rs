use std::collections::HashMap;

use futures::future::join_all;
use futures::future::try_join_all;
use gom::Arguments;
use gom::BatchResolver;
use gom::BoxError;
use gom::FetchError;
use gom::FieldWirings;
use gom::arguments;
use gom::json_ext::Value;
use gom::json_ext::json;
use indexmap::IndexSet;
use pretty_assertions::assert_eq;
use test_log::test;

use super::common::CallLog;
use super::common::settle;

/// `Blog.articles` resolves to article ids, `Article.comments` to comment ids.
fn wirings(blogs: CallLog<String>, articles: CallLog<String>) -> FieldWirings<String, Value> {
    FieldWirings::builder()
        .batched(
            "Blog",
            "articles",
            BatchResolver::sources(move |ids: IndexSet<String>| {
                blogs.record(ids.iter().cloned(), &Arguments::default());
                async move {
                    Ok::<_, BoxError>(
                        ids.into_iter()
                            .map(|id| {
                                let articles = json!([format!("{id}-art1"), format!("{id}-art2")]);
                                (id, articles)
                            })
                            .collect::<HashMap<_, _>>(),
                    )
                }
            }),
        )
        .batched(
            "Article",
            "comments",
            BatchResolver::sources(move |ids: IndexSet<String>| {
                articles.record(ids.iter().cloned(), &Arguments::default());
                async move {
                    Ok::<_, BoxError>(
                        ids.into_iter()
                            .map(|id| {
                                let comments = json!([format!("{id}-c1")]);
                                (id, comments)
                            })
                            .collect::<HashMap<_, _>>(),
                    )
                }
            }),
        )
        .build()
        .unwrap()
}

/// Resolve `{ articles { comments } }` for one blog.
async fn blog_comments(
    wirings: &FieldWirings<String, Value>,
    blog: &str,
) -> Result<Vec<Value>, FetchError> {
    let articles = wirings
        .get("Blog", "articles")
        .unwrap()
        .fetch(Some(blog.to_string()), arguments!())
        .await?;
    let comments = wirings.get("Article", "comments").unwrap();
    try_join_all(
        articles
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|article| article.as_str())
            .map(|article| comments.fetch(Some(article.to_string()), arguments!())),
    )
    .await
}

#[test(tokio::test)]
async fn nested_fields_are_batched_per_level() {
    let blog_calls = CallLog::default();
    let article_calls = CallLog::default();
    let wirings = wirings(blog_calls.clone(), article_calls.clone());

    let (comments, flushed) = tokio::join!(
        join_all(["blog1", "blog2", "blog1"].map(|blog| blog_comments(&wirings, blog))),
        settle(&wirings),
    );

    let comments: Vec<_> = comments.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        comments,
        vec![
            vec![json!(["blog1-art1-c1"]), json!(["blog1-art2-c1"])],
            vec![json!(["blog2-art1-c1"]), json!(["blog2-art2-c1"])],
            vec![json!(["blog1-art1-c1"]), json!(["blog1-art2-c1"])],
        ]
    );
    assert_eq!(flushed, 9);
    assert_eq!(
        blog_calls.calls(),
        vec![(
            vec!["blog1".to_string(), "blog2".to_string()],
            Arguments::default()
        )]
    );
    assert_eq!(
        article_calls.calls(),
        vec![(
            vec![
                "blog1-art1".to_string(),
                "blog1-art2".to_string(),
                "blog2-art1".to_string(),
                "blog2-art2".to_string(),
            ],
            Arguments::default()
        )]
    );
}

#[test(tokio::test)]
async fn settled_wirings_have_nothing_pending() {
    let wirings = wirings(CallLog::default(), CallLog::default());

    assert_eq!(settle(&wirings).await, 0);
    assert_eq!(wirings.pending(), 0);
}
