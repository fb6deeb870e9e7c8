use crate::{render::Rendered, routes::errors::ErrorPage};
use rocket::State;
use yatube_common::pagination::Page;
use yatube_models::{db_conn::DbConn, feed::Feed, page_cache::PageCache};

pub const INDEX_CACHE_PREFIX: &str = "index_page";

/// The latest posts of everyone. Each page is kept in the cache for a while.
#[get("/?<page>")]
pub async fn index(
    page: Option<String>,
    conn: DbConn,
    cache: &State<PageCache>,
) -> Result<Rendered, ErrorPage> {
    let key = PageCache::key(INDEX_CACHE_PREFIX, Page::requested(page.as_deref()));
    if let Some(body) = cache.get(&key) {
        return Ok(Rendered(body));
    }
    let body = conn
        .run(move |c| -> Result<String, ErrorPage> {
            let feed = Feed::Global.compose(c, page.as_deref())?;
            Ok(serde_json::json!({
                "title": "Latest updates on the site",
                "feed": feed,
            })
            .to_string())
        })
        .await?;
    cache.insert(key, body.clone());
    Ok(Rendered(body))
}

#[cfg(test)]
mod tests {
    use crate::{
        init_rocket,
        routes::{
            medias::MediaDir,
            tests::{json, remove_db, temp_db, TestServer},
        },
    };
    use rocket::{
        futures::future::join,
        http::Status,
        local::asynchronous::Client,
        tokio::time::sleep,
    };
    use std::{
        env::temp_dir,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use yatube_models::{
        db_conn::DbConn,
        page_cache::PageCache,
        posts::{Post, PostData},
        CONFIG,
    };

    fn write(server: &TestServer, author: &yatube_models::users::User, text: &str) -> Post {
        Post::create(
            &mut server.conn(),
            author,
            PostData {
                text: text.to_owned(),
                ..PostData::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn paginated() {
        let server = TestServer::new();
        let author = server.user("author");
        for i in 0..13 {
            write(&server, &author, &format!("Post number {}", i));
        }

        let response = server.client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body = json(response);
        assert_eq!(body["feed"]["posts"].as_array().unwrap().len(), 10);
        assert_eq!(body["feed"]["posts"][0]["text"], "Post number 12");
        assert_eq!(body["feed"]["has_next"], true);

        let body = json(server.client.get("/?page=2").dispatch());
        assert_eq!(body["feed"]["posts"].as_array().unwrap().len(), 3);
        assert_eq!(body["feed"]["page"], 2);

        let body = json(server.client.get("/?page=oops").dispatch());
        assert_eq!(body["feed"]["page"], 1);
        let body = json(server.client.get("/?page=last").dispatch());
        assert_eq!(body["feed"]["page"], 2);
    }

    #[test]
    fn cached() {
        let server = TestServer::new();
        let author = server.user("author");
        write(&server, &author, "Before");
        let before = server.client.get("/").dispatch().into_string().unwrap();

        write(&server, &author, "After");
        let cached = server.client.get("/").dispatch().into_string().unwrap();
        assert_eq!(before, cached);
        assert!(!cached.contains("After"));

        server.cache().clear();
        let fresh = server.client.get("/").dispatch().into_string().unwrap();
        assert!(fresh.contains("After"));
    }

    #[test]
    fn unknown_parameters_share_the_cached_page() {
        let server = TestServer::new();
        for uri in ["/", "/?x=1", "/?x=2", "/?page=1&x=3", "/?page=oops"] {
            assert_eq!(server.client.get(uri).dispatch().status(), Status::Ok);
        }
        assert_eq!(server.cache().len(), 1);

        server.client.get("/?page=2").dispatch();
        assert_eq!(server.cache().len(), 2);
    }

    #[test]
    fn etag() {
        let server = TestServer::new();
        let response = server.client.get("/").dispatch();
        let etag = response.headers().get_one("ETag").unwrap().to_owned();
        let response = server
            .client
            .get("/")
            .header(rocket::http::Header::new("If-None-Match", etag))
            .dispatch();
        assert_eq!(response.status(), Status::NotModified);
    }

    #[rocket::async_test]
    async fn waiting_for_a_connection_lets_other_tasks_run() {
        let db_path = temp_db();
        let config = CONFIG
            .rocket()
            .merge(("databases.yatube.url", db_path.to_str().unwrap()))
            .merge(("databases.yatube.pool_size", 1))
            .merge(("databases.yatube.timeout", 1));
        let rocket = init_rocket(
            config,
            PageCache::new(Duration::from_secs(20)),
            MediaDir(temp_dir()),
        );
        let client = Client::tracked(rocket).await.unwrap();
        let busy = DbConn::get_one(client.rocket()).await.unwrap();

        let ticks = AtomicUsize::new(0);
        let request = async {
            let response = client.get("/").dispatch().await;
            (response.status(), ticks.load(Ordering::SeqCst))
        };
        let ticker = async {
            for _ in 0..20 {
                sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        };
        let ((status, ticked), ()) = join(request, ticker).await;
        assert_eq!(status, Status::ServiceUnavailable);
        assert_eq!(ticked, 20);

        drop(busy);
        drop(client);
        remove_db(&db_path);
    }
}
