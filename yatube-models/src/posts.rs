use crate::{
    groups::Group,
    schema::{groups, posts, users},
    users::{Author, User},
    validation::{invalid, not_blank},
    Connection, Error, Result,
};
use chrono::{NaiveDateTime, Utc};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::Serialize;
use std::{collections::HashMap, fmt};
use tracing::info;
use validator::Validate;

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

/// What an author can write or change on one of their posts.
///
/// An `image` of `None` keeps the current one when editing.
#[derive(Clone, Debug, Default, Validate)]
pub struct PostData {
    #[validate(custom = "not_blank")]
    pub text: String,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

impl PostData {
    fn check(&self, conn: &mut Connection) -> Result<()> {
        self.validate()?;
        if let Some(group_id) = self.group_id {
            match Group::get(conn, group_id) {
                Ok(_) => {}
                Err(Error::NotFound) => {
                    return Err(invalid(
                        "group",
                        "invalid_choice",
                        "Select a valid choice. That choice is not one of the available choices.",
                    ))
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Post {
    insert!(posts, NewPost);
    get!(posts);

    /// Publishes a new post for `author`
    pub fn create(conn: &mut Connection, author: &User, data: PostData) -> Result<Post> {
        data.check(conn)?;
        let post = Post::insert(
            conn,
            NewPost {
                text: data.text.trim().to_owned(),
                pub_date: Utc::now().naive_utc(),
                author_id: author.id,
                group_id: data.group_id,
                image: data.image,
            },
        )?;
        info!("{} published post #{}", author.username, post.id);
        Ok(post)
    }

    /// Changes a post. Only its author is allowed to do it.
    pub fn edit(&self, conn: &mut Connection, editor: &User, data: PostData) -> Result<Post> {
        if self.author_id != editor.id {
            return Err(Error::Unauthorized);
        }
        data.check(conn)?;
        diesel::update(self)
            .set((
                posts::text.eq(data.text.trim()),
                posts::group_id.eq(data.group_id),
                posts::image.eq(data.image.or_else(|| self.image.clone())),
            ))
            .execute(conn)?;
        info!("{} edited post #{}", editor.username, self.id);
        Post::get(conn, self.id)
    }

    pub fn delete(&self, conn: &mut Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }

    pub fn count(conn: &mut Connection) -> Result<i64> {
        posts::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn get_author(&self, conn: &mut Connection) -> Result<User> {
        User::get(conn, self.author_id)
    }

    pub fn get_group(&self, conn: &mut Connection) -> Result<Option<Group>> {
        self.group_id.map(|id| Group::get(conn, id)).transpose()
    }
}

/// First 15 characters of the text
impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.text.chars().take(15).collect();
        f.write_str(&short)
    }
}

/// A post, with what is needed to display it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostEntry {
    pub id: i32,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub author: Author,
    pub group: Option<Group>,
    pub image: Option<String>,
}

impl PostEntry {
    pub fn from_post(conn: &mut Connection, post: Post) -> Result<PostEntry> {
        let author = post.get_author(conn)?.to_author();
        let group = post.get_group(conn)?;
        Ok(PostEntry::build(post, author, group))
    }

    /// Loads the authors and groups of many posts at once, keeping their order
    pub fn from_posts(conn: &mut Connection, posts: Vec<Post>) -> Result<Vec<PostEntry>> {
        let author_ids: Vec<i32> = posts.iter().map(|p| p.author_id).collect();
        let group_ids: Vec<i32> = posts.iter().filter_map(|p| p.group_id).collect();

        let authors: HashMap<i32, Author> = users::table
            .filter(users::id.eq_any(author_ids))
            .load::<User>(conn)?
            .into_iter()
            .map(|u| (u.id, u.to_author()))
            .collect();
        let groups: HashMap<i32, Group> = groups::table
            .filter(groups::id.eq_any(group_ids))
            .load::<Group>(conn)?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned().ok_or(Error::NotFound)?;
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostEntry::build(post, author, group))
            })
            .collect()
    }

    fn build(post: Post, author: Author, group: Option<Group>) -> PostEntry {
        PostEntry {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author,
            group,
            image: post.image,
        }
    }
}
