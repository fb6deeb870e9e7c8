use crate::{schema::follows, users::User, Connection, Error, Result};
use diesel::{
    self,
    result::{DatabaseErrorKind, Error as DieselError},
    ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl,
};
use tracing::info;

/// `follower_id` sees the posts of `following_id` in their subscriptions
#[derive(Clone, Debug, Queryable, Identifiable)]
pub struct Follow {
    pub id: i32,
    pub follower_id: i32,
    pub following_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = follows)]
pub struct NewFollow {
    pub follower_id: i32,
    pub following_id: i32,
}

impl Follow {
    insert!(follows, NewFollow);

    pub fn find(conn: &mut Connection, from: i32, to: i32) -> Result<Option<Follow>> {
        follows::table
            .filter(follows::follower_id.eq(from))
            .filter(follows::following_id.eq(to))
            .first(conn)
            .optional()
            .map_err(Error::from)
    }

    /// Makes `follower` follow `target`.
    ///
    /// Following yourself is silently ignored (`None`), and following someone twice
    /// gives back the existing edge.
    pub fn follow(conn: &mut Connection, follower: &User, target: &User) -> Result<Option<Follow>> {
        if follower.id == target.id {
            return Ok(None);
        }
        if let Some(existing) = Follow::find(conn, follower.id, target.id)? {
            return Ok(Some(existing));
        }
        let res = Follow::insert(
            conn,
            NewFollow {
                follower_id: follower.id,
                following_id: target.id,
            },
        );
        match res {
            Ok(follow) => {
                info!("{} now follows {}", follower.username, target.username);
                Ok(Some(follow))
            }
            // someone else created it in the meantime
            Err(Error::Db(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))) => {
                Follow::find(conn, follower.id, target.id)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the edge between `follower` and `target`, if any. Returns whether
    /// something was removed.
    pub fn unfollow(conn: &mut Connection, follower: &User, target: &User) -> Result<bool> {
        let deleted = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(follower.id))
                .filter(follows::following_id.eq(target.id)),
        )
        .execute(conn)?;
        if deleted > 0 {
            info!("{} stopped following {}", follower.username, target.username);
        }
        Ok(deleted > 0)
    }

    pub fn count(conn: &mut Connection) -> Result<i64> {
        follows::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn count_followers(conn: &mut Connection, user_id: i32) -> Result<i64> {
        follows::table
            .filter(follows::following_id.eq(user_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn count_followed(conn: &mut Connection, user_id: i32) -> Result<i64> {
        follows::table
            .filter(follows::follower_id.eq(user_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }
}
