//! End-to-end composition against an in-memory article table

use qc_db::MemoryQuery;
use qc_queries::{Filter, QueryComposer, QueryTarget, Sort, SortDirection};
use serde::Deserialize;
use serde_json::{json, Value};

type ArticleFilter = Filter<MemoryQuery>;
type ArticleComposer = QueryComposer<MemoryQuery>;

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
    author: String,
    is_featured: bool,
    views: i64,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn article(
    title: &str,
    author: &str,
    status: &str,
    category: &str,
    is_featured: bool,
    is_published: bool,
    views: i64,
    published_at: Option<&str>,
) -> Value {
    json!({
        "title": title,
        "author": author,
        "status": status,
        "category": category,
        "is_featured": is_featured,
        "is_published": is_published,
        "views": views,
        "published_at": published_at,
    })
}

fn articles() -> MemoryQuery {
    MemoryQuery::from_values(vec![
        article("Laravel Best Practices", "John Doe", "published", "tutorial", true, true, 1500, Some("2024-01-15")),
        article("Vue 3 Guide", "Jane Smith", "published", "tutorial", false, true, 800, Some("2024-01-20")),
        article("PHP 8 Features", "John Doe", "draft", "news", false, false, 100, None),
        article("Inertia.js Introduction", "Alice Johnson", "published", "tutorial", true, true, 2000, Some("2024-02-01")),
        article("Database Optimization", "Bob Wilson", "published", "advanced", false, true, 1200, Some("2024-02-10")),
        article("Testing with Pest", "Jane Smith", "draft", "tutorial", false, false, 50, None),
        article("API Design Patterns", "John Doe", "published", "advanced", true, true, 1800, Some("2024-03-01")),
        article("Tailwind CSS Tips", "Alice Johnson", "published", "tutorial", false, true, 900, Some("2024-03-15")),
    ])
}

fn run(composer: &ArticleComposer) -> Vec<Article> {
    init_tracing();
    let mut query = articles();
    composer.apply(&mut query);
    query.get_as().unwrap()
}

fn titles(results: &[Article]) -> Vec<&str> {
    results.iter().map(|a| a.title.as_str()).collect()
}

#[test]
fn test_select_and_boolean_sorted_by_views() {
    let composer = ArticleComposer::new()
        .filters(vec![
            ArticleFilter::select("status").unwrap(),
            ArticleFilter::boolean("is_featured").unwrap(),
        ])
        .apply_filters(json!({"status": "published", "is_featured": true}))
        .sort_by("views", SortDirection::Desc);

    let results = run(&composer);
    assert_eq!(
        titles(&results),
        vec!["Inertia.js Introduction", "API Design Patterns", "Laravel Best Practices"]
    );
    assert!(results.iter().all(|a| a.is_featured));
}

#[test]
fn test_boolean_accepts_string_input() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::boolean("is_featured").unwrap())
        .apply_filters(json!({"is_featured": "true"}));
    assert_eq!(run(&composer).len(), 3);

    let composer = composer.apply_filters(json!({"is_featured": "0"}));
    assert_eq!(run(&composer).len(), 5);
}

#[test]
fn test_false_boolean_is_still_applied() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::boolean("is_published").unwrap())
        .apply_filters(json!({"is_published": false}));

    assert_eq!(
        titles(&run(&composer)),
        vec!["PHP 8 Features", "Testing with Pest"]
    );
}

#[test]
fn test_select_multiple_is_a_union() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::select("category").unwrap().multiple(true))
        .apply_filters(json!({"category": ["tutorial", "advanced"]}));
    assert_eq!(run(&composer).len(), 7);

    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::select("category").unwrap())
        .apply_filters(json!({"category": "advanced"}));
    assert_eq!(
        titles(&run(&composer)),
        vec!["Database Optimization", "API Design Patterns"]
    );
}

#[test]
fn test_text_contains() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::text("title").unwrap().contains())
        .apply_filters(json!({"title": "Laravel"}));

    assert_eq!(titles(&run(&composer)), vec!["Laravel Best Practices"]);
}

#[test]
fn test_text_contains_products() {
    let products = || {
        MemoryQuery::from_values(
            ["iPhone 15", "Samsung Galaxy", "iPhone 14", "Google Pixel"]
                .into_iter()
                .map(|title| json!({"title": title})),
        )
    };

    let composer = QueryComposer::<MemoryQuery>::new()
        .add_filter(ArticleFilter::text("title").unwrap().contains())
        .apply_filters(json!({"title": "iPhone"}));

    let mut query = products();
    composer.apply(&mut query);
    assert_eq!(query.pluck("title"), vec![json!("iPhone 15"), json!("iPhone 14")]);
}

#[test]
fn test_text_exact() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::text("author").unwrap().exact())
        .apply_filters(json!({"author": "John Doe"}));

    let results = run(&composer);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|a| a.author == "John Doe"));
}

#[test]
fn test_date_between_keeps_original_order() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::date("published_at").unwrap().between())
        .apply_filters(json!({"published_at": ["2024-02-01", "2024-03-31"]}));

    assert_eq!(
        titles(&run(&composer)),
        vec![
            "Inertia.js Introduction",
            "Database Optimization",
            "API Design Patterns",
            "Tailwind CSS Tips",
        ]
    );

    let composer = composer.apply_filters(json!({"published_at": ["2024-02-01", "2024-02-28"]}));
    assert_eq!(
        titles(&run(&composer)),
        vec!["Inertia.js Introduction", "Database Optimization"]
    );
}

#[test]
fn test_date_after() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::date("published_at").unwrap().after())
        .apply_filters(json!({"published_at": "2024-03-01"}));

    assert_eq!(titles(&run(&composer)), vec!["Tailwind CSS Tips"]);
}

#[test]
fn test_multiple_filters_together() {
    let composer = ArticleComposer::new()
        .filters(vec![
            ArticleFilter::select("status").unwrap(),
            ArticleFilter::select("category").unwrap(),
            ArticleFilter::boolean("is_published").unwrap(),
        ])
        .apply_filters(json!({
            "status": "published",
            "category": "tutorial",
            "is_published": true,
        }))
        .sort_by("views", SortDirection::Desc);

    let results = run(&composer);
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].title, "Inertia.js Introduction");
    assert_eq!(results[3].title, "Vue 3 Guide");
}

#[test]
fn test_custom_predicate_replaces_default_rule() {
    let composer = ArticleComposer::new()
        .add_filter(
            ArticleFilter::select("status")
                .unwrap()
                .custom_predicate(|query, value| {
                    if value == "published" {
                        query.where_equals("status", &json!("published"));
                        query.where_equals("is_published", &json!(true));
                        query.where_not_null("published_at");
                    }
                }),
        )
        .apply_filters(json!({"status": "published"}));

    assert_eq!(run(&composer).len(), 6);
}

#[test]
fn test_noop_custom_predicate_leaves_query_untouched() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::boolean("is_featured").unwrap().custom_predicate(|_, _| {}))
        .apply_filters(json!({"is_featured": true}));

    assert_eq!(run(&composer).len(), 8);
}

#[test]
fn test_blank_values_return_everything() {
    let composer = ArticleComposer::new()
        .filters(vec![
            ArticleFilter::select("status").unwrap(),
            ArticleFilter::text("title").unwrap(),
        ])
        .apply_filters(json!({"status": null, "title": ""}));

    assert_eq!(run(&composer).len(), 8);
}

#[test]
fn test_sort_by_author() {
    let composer = ArticleComposer::new()
        .sorts(vec![Sort::new("author").unwrap()])
        .sort_by("author", SortDirection::Asc);

    let results = run(&composer);
    assert_eq!(results.first().map(|a| a.author.as_str()), Some("Alice Johnson"));
    assert_eq!(results.last().map(|a| a.author.as_str()), Some("John Doe"));
}

#[test]
fn test_search_hook_runs_after_filters() {
    let composer = ArticleComposer::new()
        .add_filter(ArticleFilter::select("author").unwrap())
        .apply_filters(json!({"author": "John Doe"}))
        .search("api")
        .search_using(|query: &mut MemoryQuery, term| {
            query.where_like("title", &format!("%{}%", term));
        });

    assert_eq!(titles(&run(&composer)), vec!["API Design Patterns"]);
}

#[test]
fn test_pagination() {
    let composer = ArticleComposer::new()
        .per_page(3)
        .sort_by("views", SortDirection::Desc);

    let mut query = articles();
    composer.apply(&mut query);
    if let Some(page) = composer.pagination(2) {
        query.paginate(&page);
    }

    assert_eq!(query.count(), 8);
    assert_eq!(
        query.pluck("title"),
        vec![
            json!("Database Optimization"),
            json!("Tailwind CSS Tips"),
            json!("Vue 3 Guide"),
        ]
    );
}

#[test]
fn test_featured_tutorials_published_in_february() {
    let composer = ArticleComposer::new()
        .filters(vec![
            ArticleFilter::select("category").unwrap().multiple(true),
            ArticleFilter::boolean("is_featured").unwrap(),
            ArticleFilter::boolean("is_published").unwrap(),
            ArticleFilter::date("published_at").unwrap().between(),
        ])
        .apply_filters(json!({
            "category": ["tutorial", "advanced"],
            "is_featured": true,
            "is_published": true,
            "published_at": ["2024-02-01", "2024-02-28"],
        }))
        .sort_by("views", SortDirection::Desc);

    let results = run(&composer);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Inertia.js Introduction");
    assert!(results[0].is_featured);
    assert_eq!(results[0].views, 2000);
}
