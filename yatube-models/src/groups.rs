use crate::{
    schema::groups,
    validation::{invalid, not_blank, valid_slug},
    Connection, Error, Result,
};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::Serialize;
use std::fmt;
use tracing::info;
use validator::Validate;

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Default, Insertable, Validate)]
#[diesel(table_name = groups)]
pub struct NewGroup {
    #[validate(
        length(max = 200, message = "Ensure this value has at most 200 characters."),
        custom = "not_blank"
    )]
    pub title: String,
    #[validate(custom = "valid_slug")]
    pub slug: String,
    pub description: String,
}

impl Group {
    insert!(groups, NewGroup);
    get!(groups);
    find_by!(groups, find_by_slug, slug as &str);

    /// Validates and saves a new group. Slugs can't be shared between groups.
    pub fn create(conn: &mut Connection, new: NewGroup) -> Result<Group> {
        new.validate()?;
        if Group::find_by_slug(conn, &new.slug).is_ok() {
            return Err(invalid(
                "slug",
                "unique",
                "Group with this slug already exists.",
            ));
        }
        let group = Group::insert(conn, new)?;
        info!("New group {} ({})", group.title, group.slug);
        Ok(group)
    }

    /// All the groups, as offered when writing a post
    pub fn list(conn: &mut Connection) -> Result<Vec<Group>> {
        groups::table
            .order((groups::title.asc(), groups::id.asc()))
            .load::<Group>(conn)
            .map_err(Error::from)
    }

    pub fn delete(&self, conn: &mut Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
