use joinery::prelude::*;

mod common;

#[test]
fn limit_with_many_relation_conflicts() {
    let registry = common::blog();
    for limit in [1, 25] {
        let query = MemoryQuery::new().limit(limit);
        let result = registry
            .join("post", query)
            .unwrap()
            .include("category", JoinMode::Inner)
            .unwrap()
            .include("tags", JoinMode::Left)
            .unwrap()
            .execute(&["*"]);

        assert_eq!(
            result.err(),
            Some(JoineryError::ConflictingLimit {
                model: "post".into(),
                relation: "tags".into(),
            })
        );
    }
}

#[test]
fn limit_with_singular_relations_is_allowed() {
    let registry = common::blog();
    let query = MemoryQuery::new().limit(10).with_rows([common::post_row()]);
    let rows = registry
        .join("post", query)
        .unwrap()
        .include("category", JoinMode::Inner)
        .unwrap()
        .execute(&["*"])
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn limit_conflict_sees_default_includes() {
    let registry = Registry::builder()
        .model(
            ModelDef::new("post", "posts")
                .relation(RelationDef::belongs_to_many("tags", "tag"))
                .include(["tags"]),
        )
        .model(ModelDef::new("tag", "tags"))
        .build()
        .unwrap();

    let result = registry
        .join("post", MemoryQuery::new().limit(5))
        .unwrap()
        .execute(&["*"]);
    assert!(matches!(result, Err(JoineryError::ConflictingLimit { .. })));

    let result = registry
        .join("post", MemoryQuery::new().limit(5))
        .unwrap()
        .exclude("tags")
        .execute(&["*"]);
    assert!(result.is_ok());
}

#[test]
fn flatten_strips_markers() {
    let registry = common::blog();
    let rows = registry
        .join("post", MemoryQuery::new().with_rows([common::post_row()]))
        .unwrap()
        .include("category", JoinMode::Left)
        .unwrap()
        .execute(&["posts.*"])
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].attributes(),
        &attributes! {
            "id" => 1,
            "name" => "x",
            "category_id" => 5,
            "category_name" => "cat",
        }
    );
    assert!(rows[0].relations().is_empty());
    assert!(
        rows[0]
            .attributes()
            .columns()
            .all(|column| !column.contains(joinery::TEMP_MARKER))
    );
}

#[test]
fn flatten_keeps_fanned_out_rows() {
    let registry = common::blog();
    let query = MemoryQuery::new().with_rows([
        attributes! { "id" => 1, "tags_TEMP_id" => 10 },
        attributes! { "id" => 1, "tags_TEMP_id" => 11 },
    ]);
    let rows = registry
        .join("post", query)
        .unwrap()
        .include("tags", JoinMode::Left)
        .unwrap()
        .execute(&["*"])
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("tags_id"), Some(&Value::from(11)));
}

#[test]
fn excluded_default_include_is_not_registered() {
    let registry = common::blog_with_default_category();
    let mut query = MemoryQuery::new().with_rows([attributes! { "id" => 1, "name" => "x" }]);
    let rows = registry
        .join("post", &mut query)
        .unwrap()
        .exclude("category")
        .execute(&["*"])
        .unwrap();

    assert!(query.joins().is_empty());
    assert!(query.projections().is_empty());
    assert_eq!(rows[0].attributes(), &attributes! { "id" => 1, "name" => "x" });
}

#[test]
fn default_include_is_loaded_with_model_config() {
    let registry = common::blog_with_default_category();
    let mut query = MemoryQuery::new().with_rows([common::post_row()]);
    let rows = registry
        .join("post", &mut query)
        .unwrap()
        .include("category", JoinMode::Inner)
        .unwrap()
        .execute(&["*"])
        .unwrap();

    // the explicit include came first, so the default one is a no-op
    assert_eq!(query.joins().len(), 1);
    assert_eq!(query.joins()[0].mode, JoinMode::Inner);
    assert_eq!(
        query.config().map(|c| c.aggregate_method),
        Some(AggregateMethod::Count)
    );
    assert_eq!(rows[0].get("category_name"), Some(&Value::from("cat")));
}

#[test]
fn query_errors_are_surfaced() {
    struct Failing;

    impl JoinQuery for Failing {
        fn add_join(&mut self, _: &joinery::core::ResolvedPath, _: JoinMode) {}
        fn add_projected_column(&mut self, _: &str, _: &str) {}
        fn add_group_by(&mut self, _: &str) {}
        fn row_limit(&self) -> Option<u64> {
            None
        }
        fn run(&mut self, _: &[&str]) -> joinery::Result<Vec<Attributes>> {
            Err(JoineryError::Query("connection reset".into()))
        }
    }

    let registry = common::blog();
    let result = registry.join("post", Failing).unwrap().execute(&["*"]);
    assert_eq!(result.err(), Some(JoineryError::Query("connection reset".into())));
}
