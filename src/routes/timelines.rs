use crate::{
    render::Rendered,
    routes::{errors::ErrorPage, RespondOrRedirect},
};
use rocket::http::uri::Origin;
use yatube_models::{feed::Feed, YatubeRocket};

/// Posts of the authors the current user follows
#[get("/follow?<page>")]
pub async fn subscriptions(
    page: Option<String>,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    let page = conn
        .run(move |c| -> Result<Rendered, ErrorPage> {
            let feed = Feed::Subscriptions(&user).compose(c, page.as_deref())?;
            Ok(render!({ "feed": feed }))
        })
        .await?;
    Ok(page.into())
}
