use crate::{
    groups::Group,
    posts::{Post, PostEntry},
    schema::{follows, posts},
    users::User,
    Connection, Error, Result, ITEMS_PER_PAGE,
};
use diesel::{sqlite::Sqlite, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::Serialize;
use yatube_common::pagination::Page;

/// The different lists of posts someone can browse
#[derive(Clone, Copy, Debug)]
pub enum Feed<'a> {
    /// Everything
    Global,
    Group(&'a Group),
    Author(&'a User),
    /// Posts of the people this user follows
    Subscriptions(&'a User),
}

/// One page of a feed, newest first
#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub posts: Vec<PostEntry>,
    pub page: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
}

impl<'a> Feed<'a> {
    fn query(&self) -> posts::BoxedQuery<'static, Sqlite> {
        let query = posts::table.into_boxed();
        match *self {
            Feed::Global => query,
            Feed::Group(group) => query.filter(posts::group_id.eq(group.id)),
            Feed::Author(author) => query.filter(posts::author_id.eq(author.id)),
            Feed::Subscriptions(user) => query.filter(
                posts::author_id.eq_any(
                    follows::table
                        .filter(follows::follower_id.eq(user.id))
                        .select(follows::following_id),
                ),
            ),
        }
    }

    pub fn count(&self, conn: &mut Connection) -> Result<i64> {
        self.query()
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    /// Posts of `page`, most recent first
    pub fn page(&self, conn: &mut Connection, page: &Page) -> Result<Vec<Post>> {
        let (offset, limit) = page.limits();
        self.query()
            .order((posts::pub_date.desc(), posts::id.desc()))
            .offset(offset)
            .limit(limit)
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    /// Builds the page asked for by a raw `page` query parameter
    pub fn compose(&self, conn: &mut Connection, raw_page: Option<&str>) -> Result<FeedPage> {
        let total = self.count(conn)?;
        let page = Page::from_query(raw_page, ITEMS_PER_PAGE, total);
        let posts = self.page(conn, &page)?;
        Ok(FeedPage {
            posts: PostEntry::from_posts(conn, posts)?,
            page: page.number,
            num_pages: page.num_pages(),
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            next_page: page.next_page_number(),
            previous_page: page.previous_page_number(),
        })
    }
}

impl Post {
    /// Every post written by someone `user` follows, newest first
    pub fn feed_for(conn: &mut Connection, user: &User) -> Result<Vec<Post>> {
        Feed::Subscriptions(user)
            .query()
            .order((posts::pub_date.desc(), posts::id.desc()))
            .load::<Post>(conn)
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        follows::Follow,
        posts::{tests::fill_database, PostData},
        tests::db,
        users::NewUser,
    };
    use assert_json_diff::assert_json_include;
    use diesel::Connection as _;
    use serde_json::json;

    fn write(conn: &mut Connection, author: &User, text: &str, group: Option<&Group>) -> Post {
        Post::create(
            conn,
            author,
            PostData {
                text: text.to_owned(),
                group_id: group.map(|g| g.id),
                image: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn thirteen_posts() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (_posts, users, _groups) = fill_database(conn);
            for i in 0..11 {
                write(conn, &users[i % 3], &format!("Post {}", i), None);
            }
            assert_eq!(Feed::Global.count(conn)?, 13);

            let first = Feed::Global.compose(conn, None)?;
            assert_eq!(first.posts.len(), 10);
            assert_eq!(first.num_pages, 2);
            assert!(first.has_next);
            assert!(!first.has_previous);
            assert_eq!(first.next_page, Some(2));
            assert_eq!(first.previous_page, None);

            let second = Feed::Global.compose(conn, Some("2"))?;
            assert_eq!(second.posts.len(), 3);
            assert!(!second.has_next);
            assert!(second.has_previous);
            assert_eq!(second.next_page, None);
            assert_eq!(second.previous_page, Some(1));

            assert_eq!(Feed::Global.compose(conn, Some("abc"))?.page, 1);
            assert_eq!(Feed::Global.compose(conn, Some("0"))?.page, 1);
            assert_eq!(Feed::Global.compose(conn, Some("99"))?.page, 2);
            assert_eq!(Feed::Global.compose(conn, Some("last"))?.page, 2);
            Ok(())
        });
    }

    #[test]
    fn newest_first() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (posts, users, _groups) = fill_database(conn);
            let latest = write(conn, &users[2], "Latest", None);
            let ids: Vec<i32> = Feed::Global
                .compose(conn, None)?
                .posts
                .iter()
                .map(|p| p.id)
                .collect();
            assert_eq!(ids, vec![latest.id, posts[1].id, posts[0].id]);
            Ok(())
        });
    }

    #[test]
    fn same_date_keeps_insertion_order() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (posts, _users, _groups) = fill_database(conn);
            diesel::update(posts::table)
                .set(posts::pub_date.eq(posts[0].pub_date))
                .execute(conn)?;
            let ids: Vec<i32> = Feed::Global
                .page(conn, &Page::first(ITEMS_PER_PAGE, 2))?
                .iter()
                .map(|p| p.id)
                .collect();
            assert_eq!(ids, vec![posts[1].id, posts[0].id]);
            Ok(())
        });
    }

    #[test]
    fn group_and_author() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (posts, users, groups) = fill_database(conn);
            let group_feed = Feed::Group(&groups[0]).compose(conn, None)?;
            assert_eq!(group_feed.posts.len(), 1);
            assert_eq!(group_feed.posts[0].id, posts[0].id);
            assert_eq!(Feed::Group(&groups[1]).count(conn)?, 0);

            let author_feed = Feed::Author(&users[1]).compose(conn, None)?;
            assert_eq!(author_feed.posts.len(), 1);
            assert_eq!(author_feed.posts[0].author, users[1].to_author());
            Ok(())
        });
    }

    #[test]
    fn empty_feed_has_one_page() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (_posts, _users, groups) = fill_database(conn);
            let feed = Feed::Group(&groups[1]).compose(conn, Some("3"))?;
            assert!(feed.posts.is_empty());
            assert_eq!(feed.page, 1);
            assert_eq!(feed.num_pages, 1);
            Ok(())
        });
    }

    #[test]
    fn subscriptions() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (posts, users, _groups) = fill_database(conn);
            assert_eq!(Feed::Subscriptions(&users[2]).count(conn)?, 0);

            Follow::follow(conn, &users[2], &users[0])?;
            let feed = Post::feed_for(conn, &users[2])?;
            assert_eq!(feed, vec![posts[0].clone()]);
            assert!(!feed.contains(&posts[1]));

            // users[1] follows nobody
            assert_eq!(Feed::Subscriptions(&users[1]).count(conn)?, 0);
            Ok(())
        });
    }

    #[test]
    fn lots_of_subscriptions() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (_posts, users, _groups) = fill_database(conn);
            let reader = &users[2];
            let mut last = None;
            for i in 0..1200 {
                let author = NewUser::new_local(
                    conn,
                    format!("author{}", i),
                    String::new(),
                    String::new(),
                    String::new(),
                    None,
                )?;
                Follow::follow(conn, reader, &author)?;
                last = Some(author);
            }
            let last = last.unwrap();
            write(conn, &last, "From the last one", None);

            assert_eq!(Feed::Subscriptions(reader).count(conn)?, 1);
            let feed = Feed::Subscriptions(reader).compose(conn, None)?;
            assert_eq!(feed.posts[0].author, last.to_author());
            Ok(())
        });
    }

    #[test]
    fn serialized_page() {
        let conn = &mut db();
        conn.test_transaction::<_, Error, _>(|conn| {
            let (posts, users, groups) = fill_database(conn);
            let feed = Feed::Group(&groups[0]).compose(conn, None)?;
            assert_json_include!(
                actual: serde_json::to_value(&feed).unwrap(),
                expected: json!({
                    "page": 1,
                    "num_pages": 1,
                    "has_next": false,
                    "has_previous": false,
                    "next_page": null,
                    "previous_page": null,
                    "posts": [{
                        "id": posts[0].id,
                        "text": "Test post in a group",
                        "author": {
                            "username": "admin",
                            "display_name": users[0].display_name(),
                        },
                        "group": { "slug": groups[0].slug, "title": groups[0].title },
                        "image": null,
                    }],
                })
            );
            Ok(())
        });
    }
}
