use crate::routes::{errors::ErrorPage, RespondOrRedirect};
use rocket::{form::Form, http::uri::Origin, response::Redirect};
use tracing::warn;
use yatube_models::{comments::Comment, posts::Post, Error, YatubeRocket};

#[derive(FromForm)]
pub struct NewCommentForm {
    pub text: Option<String>,
}

/// Invalid comments are dropped, the visitor goes back to the post anyway
#[post("/posts/<id>/comment", data = "<form>")]
pub async fn create(
    id: i32,
    form: Form<NewCommentForm>,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    let text = form.into_inner().text.unwrap_or_default();
    let post = conn
        .run(move |c| -> Result<Post, ErrorPage> {
            let post = Post::get(c, id)?;
            match Comment::add(c, &user, &post, &text) {
                Ok(_) => {}
                Err(Error::Validation(errors)) => {
                    warn!("dropped a comment on post #{}: {}", post.id, errors)
                }
                Err(err) => return Err(err.into()),
            }
            Ok(post)
        })
        .await?;
    Ok(Redirect::to(format!("/posts/{}/", post.id)).into())
}
