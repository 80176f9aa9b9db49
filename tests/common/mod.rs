//! Blog schema shared by the integration tests.
//!
//! ```text
//! post ──belongs_to──▶ category ──belongs_to──▶ user (creator)
//!  │ └──belongs_to_many──▶ tag
//!  └────has_many──────▶ comment ──belongs_to──▶ user (author)
//! ```

#![allow(dead_code)]

use joinery::prelude::*;

pub fn blog() -> Registry {
    Registry::builder()
        .model(
            ModelDef::new("post", "posts")
                .fields(["id", "name", "category_id"])
                .relation(RelationDef::belongs_to("category", "category"))
                .relation(RelationDef::belongs_to_many("tags", "tag"))
                .relation(RelationDef::has_many("comments", "comment")),
        )
        .model(
            ModelDef::new("category", "categories")
                .fields(["id", "name"])
                .relation(RelationDef::belongs_to("creator", "user"))
                .relation(RelationDef::has_many("posts", "post")),
        )
        .model(ModelDef::new("user", "users").fields(["id", "email"]))
        .model(
            ModelDef::new("tag", "tags")
                .collection(CollectionKind::Named("TagCollection")),
        )
        .model(
            ModelDef::new("comment", "comments")
                .fields(["id", "body"])
                .relation(RelationDef::belongs_to("author", "user")),
        )
        .build()
        .expect("blog schema is valid")
}

/// Same schema, but posts join their category by default.
pub fn blog_with_default_category() -> Registry {
    Registry::builder()
        .model(
            ModelDef::new("post", "posts")
                .fields(["id", "name"])
                .relation(RelationDef::belongs_to("category", "category"))
                .relation(RelationDef::belongs_to_many("tags", "tag"))
                .include(["category"])
                .join_config(JoinConfig::new().left().aggregate(AggregateMethod::Count)),
        )
        .model(ModelDef::new("category", "categories").fields(["id", "name"]))
        .model(ModelDef::new("tag", "tags"))
        .build()
        .expect("blog schema is valid")
}

pub fn post_row() -> Attributes {
    attributes! {
        "id" => 1,
        "name" => "x",
        "category_TEMP_id" => 5,
        "category_TEMP_name" => "cat",
    }
}
