use crate::{render::Rendered, routes::errors::ErrorPage};
use yatube_models::{db_conn::DbConn, feed::Feed, groups::Group};

#[get("/group/<slug>?<page>")]
pub async fn details(
    slug: String,
    page: Option<String>,
    conn: DbConn,
) -> Result<Rendered, ErrorPage> {
    conn.run(move |c| -> Result<Rendered, ErrorPage> {
        let group = Group::find_by_slug(c, &slug)?;
        let feed = Feed::Group(&group).compose(c, page.as_deref())?;
        Ok(render!({
            "group": group,
            "feed": feed,
        }))
    })
    .await
}
