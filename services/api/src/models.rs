//! Entities persisted through the repository port, plus request and
//! response payloads
//!
//! Internal numeric ids never leave the process: they are skipped on
//! serialization and every public reference is a uuid.

/// Join row between two tables, unique on the key pair
macro_rules! join_entity {
    ($(#[$meta:meta])* $name:ident, $table:literal, $left:ident, $right:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, sqlx::FromRow)]
        pub struct $name {
            pub id: i64,
            pub $left: i64,
            pub $right: i64,
            pub created_at: chrono::DateTime<chrono::Utc>,
        }

        impl $name {
            pub fn new($left: i64, $right: i64) -> Self {
                Self {
                    id: 0,
                    $left,
                    $right,
                    created_at: chrono::Utc::now(),
                }
            }
        }

        impl common::store::Entity for $name {
            const TABLE: &'static str = $table;
            const UNIQUE: &'static [&'static [&'static str]] =
                &[&[stringify!($left), stringify!($right)]];

            fn id(&self) -> i64 {
                self.id
            }

            fn columns(&self) -> Vec<(&'static str, common::store::SqlValue)> {
                vec![
                    (stringify!($left), self.$left.into()),
                    (stringify!($right), self.$right.into()),
                    ("created_at", self.created_at.into()),
                ]
            }

            fn assign_id(&mut self, id: i64) {
                self.id = id;
            }

            fn assign_default(&mut self, column: &str, now: chrono::DateTime<chrono::Utc>) {
                if column == "created_at" {
                    self.created_at = now;
                }
            }
        }
    };
}

/// A 1..=5 rating of `$target` attached to a reminder
macro_rules! rating_entity {
    ($(#[$meta:meta])* $name:ident, $table:literal, $target:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, sqlx::FromRow)]
        pub struct $name {
            pub id: i64,
            pub reminder_id: i64,
            pub $target: i64,
            pub level: i32,
            pub created_at: chrono::DateTime<chrono::Utc>,
        }

        impl $name {
            pub fn new(reminder_id: i64, $target: i64, level: i32) -> Self {
                Self {
                    id: 0,
                    reminder_id,
                    $target,
                    level,
                    created_at: chrono::Utc::now(),
                }
            }
        }

        impl common::store::Entity for $name {
            const TABLE: &'static str = $table;
            const UNIQUE: &'static [&'static [&'static str]] =
                &[&["reminder_id", stringify!($target)]];

            fn id(&self) -> i64 {
                self.id
            }

            fn columns(&self) -> Vec<(&'static str, common::store::SqlValue)> {
                vec![
                    ("reminder_id", self.reminder_id.into()),
                    (stringify!($target), self.$target.into()),
                    ("level", self.level.into()),
                    ("created_at", self.created_at.into()),
                ]
            }

            fn assign_id(&mut self, id: i64) {
                self.id = id;
            }

            fn assign_default(&mut self, column: &str, now: chrono::DateTime<chrono::Utc>) {
                if column == "created_at" {
                    self.created_at = now;
                }
            }
        }

        impl crate::models::reminder::Rating for $name {
            const TARGET: &'static str = stringify!($target);

            fn rated(reminder_id: i64, target_id: i64, level: i32) -> Self {
                Self::new(reminder_id, target_id, level)
            }

            fn level(&self) -> i32 {
                self.level
            }

            fn set_level(&mut self, level: i32) {
                self.level = level;
            }
        }
    };
}

pub(crate) use join_entity;
pub(crate) use rating_entity;

pub mod article;
pub mod catalog;
pub mod media;
pub mod question;
pub mod recipe;
pub mod reminder;
pub mod symptom;
pub mod treatment;
pub mod user;
