use crate::{
    posts::Post,
    schema::{comments, users},
    users::{Author, User},
    validation::not_blank,
    Connection, Error, Result,
};
use chrono::{NaiveDateTime, Utc};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use validator::Validate;

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub created: NaiveDateTime,
    pub author_id: i32,
    pub post_id: i32,
}

#[derive(Insertable, Validate)]
#[diesel(table_name = comments)]
pub struct NewComment {
    #[validate(custom = "not_blank")]
    pub text: String,
    pub created: NaiveDateTime,
    pub author_id: i32,
    pub post_id: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommentEntry {
    pub id: i32,
    pub text: String,
    pub created: NaiveDateTime,
    pub author: Author,
}

impl Comment {
    insert!(comments, NewComment);

    pub fn add(conn: &mut Connection, author: &User, post: &Post, text: &str) -> Result<Comment> {
        let new = NewComment {
            text: text.trim().to_owned(),
            created: Utc::now().naive_utc(),
            author_id: author.id,
            post_id: post.id,
        };
        new.validate()?;
        let comment = Comment::insert(conn, new)?;
        info!("{} commented on post #{}", author.username, post.id);
        Ok(comment)
    }

    /// Oldest first
    pub fn list_by_post(conn: &mut Connection, post_id: i32) -> Result<Vec<Comment>> {
        comments::table
            .filter(comments::post_id.eq(post_id))
            .order((comments::created.asc(), comments::id.asc()))
            .load::<Comment>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_post(conn: &mut Connection, post_id: i32) -> Result<i64> {
        comments::table
            .filter(comments::post_id.eq(post_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn count(conn: &mut Connection) -> Result<i64> {
        comments::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }
}

impl CommentEntry {
    pub fn for_post(conn: &mut Connection, post_id: i32) -> Result<Vec<CommentEntry>> {
        let comments = Comment::list_by_post(conn, post_id)?;
        let author_ids: Vec<i32> = comments.iter().map(|c| c.author_id).collect();
        let authors: HashMap<i32, Author> = users::table
            .filter(users::id.eq_any(author_ids))
            .load::<User>(conn)?
            .into_iter()
            .map(|u| (u.id, u.to_author()))
            .collect();
        comments
            .into_iter()
            .map(|c| {
                Ok(CommentEntry {
                    author: authors.get(&c.author_id).cloned().ok_or(Error::NotFound)?,
                    id: c.id,
                    text: c.text,
                    created: c.created,
                })
            })
            .collect()
    }
}
