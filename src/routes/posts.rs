use crate::{
    render::{error_messages, Choice, FormField, Rendered},
    routes::{
        errors::ErrorPage,
        medias::{discard_image, save_image, MediaDir},
        parse_group, profile_uri, RespondOrRedirect,
    },
};
use rocket::{
    form::Form,
    fs::TempFile,
    http::uri::Origin,
    response::Redirect,
    State,
};
use serde::Serialize;
use tracing::warn;
use validator::ValidationErrors;
use yatube_models::{
    comments::CommentEntry,
    groups::Group,
    posts::{Post, PostData, PostEntry},
    users::User,
    validation::invalid,
    Connection, Error, YatubeRocket,
};

#[derive(FromForm)]
pub struct PostForm<'r> {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<TempFile<'r>>,
}

/// What was submitted, to fill the form again
#[derive(Default, Serialize)]
struct FormValues {
    text: String,
    group: Option<String>,
    image: Option<String>,
}

fn post_fields(conn: &mut Connection) -> Result<Vec<FormField>, ErrorPage> {
    let groups = Group::list(conn)?
        .into_iter()
        .map(|g| Choice {
            value: g.id.to_string(),
            label: g.title,
        })
        .collect();
    Ok(vec![
        FormField::new("text", "textarea", true),
        FormField::new("group", "select", false).with_choices(groups),
        FormField::new("image", "file", false),
    ])
}

fn form_page(
    conn: &mut Connection,
    post: Option<&Post>,
    values: &FormValues,
    errors: Option<&ValidationErrors>,
) -> Result<Rendered, ErrorPage> {
    Ok(render!({
        "form": {
            "fields": post_fields(conn)?,
            "values": values,
            "errors": errors.map(error_messages).unwrap_or_default(),
        },
        "is_edit": post.is_some(),
        "post_id": post.map(|p| p.id),
    }))
}

/// The text fields of a submitted form, to fill it again
fn submitted_values(form: &PostForm<'_>) -> FormValues {
    FormValues {
        text: form.text.clone().unwrap_or_default(),
        group: form.group.clone(),
        image: None,
    }
}

/// Turns a submitted form into post data, storing the image if there is one
async fn read_form(
    form: &mut PostForm<'_>,
    media: &MediaDir,
) -> Result<(PostData, FormValues), Error> {
    let values = submitted_values(form);
    let group_id = parse_group(form.group.as_deref()).map_err(|_| {
        invalid(
            "group",
            "invalid_choice",
            "Select a valid choice. That choice is not one of the available choices.",
        )
    })?;
    let image = match form.image.as_mut() {
        Some(file) => save_image(file, media).await?,
        None => None,
    };
    Ok((
        PostData {
            text: values.text.clone(),
            group_id,
            image,
        },
        values,
    ))
}

fn validation_failure(err: Error) -> Result<ValidationErrors, ErrorPage> {
    match err {
        Error::Validation(errors) => Ok(errors),
        err => Err(err.into()),
    }
}

/// A stored image is useless if the form is shown again
async fn discard_unused(outcome: &RespondOrRedirect, image: Option<String>, media: &MediaDir) {
    if let (RespondOrRedirect::Response(_), Some(image)) = (outcome, image) {
        discard_image(&image, media).await;
    }
}

#[get("/posts/<id>")]
pub async fn details(id: i32, rockets: YatubeRocket) -> Result<Rendered, ErrorPage> {
    let YatubeRocket { conn, user } = rockets;
    conn.run(move |c| -> Result<Rendered, ErrorPage> {
        let post = Post::get(c, id)?;
        let author = post.get_author(c)?;
        let is_author = user.map(|u| u.id == author.id).unwrap_or(false);
        Ok(render!({
            "author_posts_count": author.count_posts(c)?,
            "post": PostEntry::from_post(c, post)?,
            "comments": CommentEntry::for_post(c, id)?,
            "comment_form": {
                "action": format!("/posts/{}/comment/", id),
                "fields": [FormField::new("text", "textarea", true)],
            },
            "can_edit": is_author,
        }))
    })
    .await
}

#[get("/create")]
pub async fn new(rockets: YatubeRocket, origin: &Origin<'_>) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, _user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    let page = conn
        .run(|c| form_page(c, None, &FormValues::default(), None))
        .await?;
    Ok(page.into())
}

#[post("/create", data = "<form>")]
pub async fn create(
    mut form: Form<PostForm<'_>>,
    rockets: YatubeRocket,
    media: &State<MediaDir>,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    // nothing is stored for anonymous visitors
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    let (data, values) = match read_form(&mut form, media).await {
        Ok(read) => read,
        Err(err) => {
            let errors = validation_failure(err)?;
            let values = submitted_values(&form);
            let page = conn
                .run(move |c| form_page(c, None, &values, Some(&errors)))
                .await?;
            return Ok(page.into());
        }
    };

    let stored_image = data.image.clone();
    let outcome = conn
        .run(move |c| -> Result<RespondOrRedirect, ErrorPage> {
            match Post::create(c, &user, data) {
                Ok(_) => Ok(Redirect::to(profile_uri(&user.username)).into()),
                Err(err) => {
                    let errors = validation_failure(err)?;
                    Ok(form_page(c, None, &values, Some(&errors))?.into())
                }
            }
        })
        .await?;
    discard_unused(&outcome, stored_image, media).await;
    Ok(outcome)
}

/// Someone who isn't the author is sent back to the post
fn check_author(post: &Post, user: &User) -> Result<(), Redirect> {
    if post.author_id == user.id {
        Ok(())
    } else {
        warn!("{} tried to edit post #{}", user.username, post.id);
        Err(Redirect::to(format!("/posts/{}/", post.id)))
    }
}

#[get("/posts/<id>/edit")]
pub async fn edit(
    id: i32,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    conn.run(move |c| -> Result<RespondOrRedirect, ErrorPage> {
        let post = Post::get(c, id)?;
        if let Err(redirect) = check_author(&post, &user) {
            return Ok(redirect.into());
        }
        let values = FormValues {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
        };
        Ok(form_page(c, Some(&post), &values, None)?.into())
    })
    .await
}

#[post("/posts/<id>/edit", data = "<form>")]
pub async fn update(
    id: i32,
    mut form: Form<PostForm<'_>>,
    rockets: YatubeRocket,
    media: &State<MediaDir>,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    let editor = user.clone();
    let post = conn
        .run(move |c| -> Result<Result<Post, Redirect>, ErrorPage> {
            let post = Post::get(c, id)?;
            Ok(check_author(&post, &editor).map(|_| post))
        })
        .await?;
    let post = match post {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect.into()),
    };

    let (data, values) = match read_form(&mut form, media).await {
        Ok(read) => read,
        Err(err) => {
            let errors = validation_failure(err)?;
            let values = FormValues {
                image: post.image.clone(),
                ..submitted_values(&form)
            };
            let page = conn
                .run(move |c| form_page(c, Some(&post), &values, Some(&errors)))
                .await?;
            return Ok(page.into());
        }
    };

    let stored_image = data.image.clone();
    let outcome = conn
        .run(move |c| -> Result<RespondOrRedirect, ErrorPage> {
            match post.edit(c, &user, data) {
                Ok(post) => Ok(Redirect::to(format!("/posts/{}/", post.id)).into()),
                Err(Error::Unauthorized) => {
                    Ok(Redirect::to(format!("/posts/{}/", post.id)).into())
                }
                Err(err) => {
                    let errors = validation_failure(err)?;
                    let values = FormValues {
                        image: post.image.clone(),
                        ..values
                    };
                    Ok(form_page(c, Some(&post), &values, Some(&errors))?.into())
                }
            }
        })
        .await?;
    discard_unused(&outcome, stored_image, media).await;
    Ok(outcome)
}
