use crate::{
    render::Rendered,
    routes::{errors::ErrorPage, profile_uri, RespondOrRedirect},
};
use rocket::{http::uri::Origin, response::Redirect};
use yatube_models::{feed::Feed, follows::Follow, users::User, YatubeRocket};

#[get("/profile/<username>?<page>")]
pub async fn details(
    username: String,
    page: Option<String>,
    rockets: YatubeRocket,
) -> Result<Rendered, ErrorPage> {
    let YatubeRocket { conn, user } = rockets;
    conn.run(move |c| -> Result<Rendered, ErrorPage> {
        let author = User::find_by_name(c, &username)?;
        let following = match user {
            Some(account) => account.is_following(c, author.id)?,
            None => false,
        };
        let feed = Feed::Author(&author).compose(c, page.as_deref())?;
        Ok(render!({
            "author": author.to_author(),
            "posts_count": author.count_posts(c)?,
            "followers_count": author.count_followers(c)?,
            "following_count": author.count_followed(c)?,
            "following": following,
            "feed": feed,
        }))
    })
    .await
}

async fn follow(
    username: String,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    conn.run(move |c| -> Result<(), ErrorPage> {
        let target = User::find_by_name(c, &username)?;
        Follow::follow(c, &user, &target)?;
        Ok(())
    })
    .await?;
    Ok(Redirect::to("/follow/").into())
}

async fn unfollow(
    username: String,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (conn, user) = match rockets.require_login(&origin.to_string()) {
        Ok(ctx) => ctx,
        Err(redirect) => return Ok(redirect.into()),
    };
    let target = conn
        .run(move |c| -> Result<User, ErrorPage> {
            let target = User::find_by_name(c, &username)?;
            Follow::unfollow(c, &user, &target)?;
            Ok(target)
        })
        .await?;
    Ok(Redirect::to(profile_uri(&target.username)).into())
}

#[get("/profile/<username>/follow")]
pub async fn follow_link(
    username: String,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    follow(username, rockets, origin).await
}

#[post("/profile/<username>/follow")]
pub async fn follow_form(
    username: String,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    follow(username, rockets, origin).await
}

#[get("/profile/<username>/unfollow")]
pub async fn unfollow_link(
    username: String,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    unfollow(username, rockets, origin).await
}

#[post("/profile/<username>/unfollow")]
pub async fn unfollow_form(
    username: String,
    rockets: YatubeRocket,
    origin: &Origin<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    unfollow(username, rockets, origin).await
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{assert_login_redirect, assert_redirect, json, session, TestServer};
    use rocket::http::Status;
    use yatube_models::{
        follows::Follow,
        posts::{Post, PostData},
    };

    #[test]
    fn profile() {
        let server = TestServer::new();
        let author = server.user("author");
        let reader = server.user("reader");
        Post::create(
            &mut server.conn(),
            &author,
            PostData {
                text: "Hello readers".to_owned(),
                ..PostData::default()
            },
        )
        .unwrap();

        let body = json(server.client.get("/profile/author/").dispatch());
        assert_eq!(body["author"]["username"], "author");
        assert_eq!(body["posts_count"], 1);
        assert_eq!(body["following"], false);
        assert_eq!(body["feed"]["posts"][0]["text"], "Hello readers");

        Follow::follow(&mut server.conn(), &reader, &author).unwrap();
        let body = json(
            server
                .client
                .get("/profile/author/")
                .private_cookie(session(&reader))
                .dispatch(),
        );
        assert_eq!(body["following"], true);
        assert_eq!(body["followers_count"], 1);
        assert_eq!(body["following_count"], 0);
    }

    #[test]
    fn unknown_profile() {
        let server = TestServer::new();
        let response = server.client.get("/profile/nobody/").dispatch();
        assert_eq!(response.status(), Status::NotFound);
    }

    #[test]
    fn follow_and_unfollow() {
        let server = TestServer::new();
        let author = server.user("author");
        let reader = server.user("reader");

        let response = server
            .client
            .post("/profile/author/follow/")
            .private_cookie(session(&reader))
            .dispatch();
        assert_redirect(&response, "/follow/");
        assert!(reader.is_following(&mut server.conn(), author.id).unwrap());

        // again, with a link this time
        let response = server
            .client
            .get("/profile/author/follow/")
            .private_cookie(session(&reader))
            .dispatch();
        assert_redirect(&response, "/follow/");
        assert_eq!(Follow::count(&mut server.conn()).unwrap(), 1);

        let response = server
            .client
            .get("/profile/author/unfollow/")
            .private_cookie(session(&reader))
            .dispatch();
        assert_redirect(&response, "/profile/author/");
        assert_eq!(Follow::count(&mut server.conn()).unwrap(), 0);
    }

    #[test]
    fn non_ascii_usernames() {
        let server = TestServer::new();
        let author = server.user("Иван");
        let reader = server.user("reader");
        let encoded = "/profile/%D0%98%D0%B2%D0%B0%D0%BD";

        let body = json(server.client.get(format!("{}/", encoded)).dispatch());
        assert_eq!(body["author"]["username"], "Иван");

        let response = server
            .client
            .get(format!("{}/follow/", encoded))
            .private_cookie(session(&reader))
            .dispatch();
        assert_redirect(&response, "/follow/");
        assert!(reader.is_following(&mut server.conn(), author.id).unwrap());

        let response = server
            .client
            .get(format!("{}/unfollow/", encoded))
            .private_cookie(session(&reader))
            .dispatch();
        assert_redirect(&response, &format!("{}/", encoded));
        assert_eq!(Follow::count(&mut server.conn()).unwrap(), 0);
    }

    #[test]
    fn cant_follow_yourself() {
        let server = TestServer::new();
        let author = server.user("author");
        let response = server
            .client
            .post("/profile/author/follow/")
            .private_cookie(session(&author))
            .dispatch();
        assert_redirect(&response, "/follow/");
        assert_eq!(Follow::count(&mut server.conn()).unwrap(), 0);
    }

    #[test]
    fn follow_needs_login() {
        let server = TestServer::new();
        server.user("author");
        let response = server.client.post("/profile/author/follow/").dispatch();
        assert_login_redirect(&response, "/profile/author/follow/");
        assert_eq!(Follow::count(&mut server.conn()).unwrap(), 0);
    }
}
