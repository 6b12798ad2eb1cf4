//! Catalog flows through the full router over the in-memory store

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use indexmap::IndexSet;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use local_library::{
    config::StoreBackend,
    create_router,
    models::{Author, Book, BookInstance, BookInstanceStatus, Genre},
    repository::{Filter, Repository},
    services::Services,
    views::Views,
    AppConfig, AppState,
};

struct TestApp {
    router: Router,
    repository: Repository,
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl TestApp {
    fn new() -> Self {
        let repository = Repository::in_memory();
        let mut config = AppConfig::default();
        config.database.backend = StoreBackend::Memory;
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(Services::new(repository.clone())),
            views: Arc::new(Views::load("templates").expect("templates load")),
        };
        Self {
            router: create_router(state),
            repository,
        }
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Reply {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, form: &str) -> Reply {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn add_author(&self, first: &str, family: &str) -> Author {
        let author = Author {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            family_name: family.to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        self.repository.insert(&author).await.unwrap();
        author
    }

    async fn add_genre(&self, name: &str) -> Genre {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.repository.insert(&genre).await.unwrap();
        genre
    }

    async fn add_book(&self, title: &str, author: &Author, genres: &[&Genre]) -> Book {
        let book = Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: Some(author.id),
            summary: format!("Summary of {}", title),
            isbn: "9780000000000".to_string(),
            genre: genres.iter().map(|g| g.id).collect::<IndexSet<_>>(),
        };
        self.repository.insert(&book).await.unwrap();
        book
    }

    async fn add_copy(&self, book: &Book, status: BookInstanceStatus) -> BookInstance {
        let copy = BookInstance {
            id: Uuid::new_v4(),
            book: Some(book.id),
            imprint: "Ace Books, 1990".to_string(),
            status,
            due_back: None,
        };
        self.repository.insert(&copy).await.unwrap();
        copy
    }

    async fn all<R: local_library::repository::Record>(&self) -> Vec<R> {
        self.repository.find::<R>(&Filter::all()).await.unwrap()
    }
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = TestApp::new();
    let reply = app.get("/").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/catalog"));
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();
    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert!(health.body.contains("healthy"));
    assert!(!health.body.contains("store"));

    let ready = app.get("/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    assert!(ready.body.contains(r#""store":"memory""#));
}

#[tokio::test]
async fn test_index_shows_counts() {
    let app = TestApp::new();
    let author = app.add_author("Isaac", "Asimov").await;
    let book = app.add_book("Foundation", &author, &[]).await;
    app.add_copy(&book, BookInstanceStatus::Available).await;
    app.add_copy(&book, BookInstanceStatus::Loaned).await;

    let reply = app.get("/catalog").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("<strong>Books:</strong> 1"));
    assert!(reply.body.contains("<strong>Copies:</strong> 2"));
    assert!(reply.body.contains("<strong>Copies available:</strong> 1"));
    assert!(reply.body.contains("<strong>Genres:</strong> 0"));
}

#[tokio::test]
async fn test_author_create_persists_once_and_redirects() {
    let app = TestApp::new();
    let reply = app
        .post(
            "/catalog/author/create",
            "first_name=Isaac&family_name=Asimov&date_of_birth=1920-01-02&date_of_death=",
        )
        .await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    let authors: Vec<Author> = app.all().await;
    assert_eq!(authors.len(), 1);
    assert_eq!(reply.location, Some(authors[0].url()));

    let detail = app.get(&authors[0].url()).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert!(detail.body.contains("Author: Asimov, Isaac"));
    assert!(detail.body.contains("1920-01-02"));
}

#[tokio::test]
async fn test_invalid_author_redisplays_sanitized_values() {
    let app = TestApp::new();
    let reply = app
        .post("/catalog/author/create", "first_name=+%3CBob%3E+&family_name=")
        .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains(r#"value="&lt;Bob&gt;""#));
    assert!(reply
        .body
        .contains(r#"data-field="first_name">First name has non-alphanumeric characters"#));
    assert!(reply
        .body
        .contains(r#"data-field="family_name">Family name must be specified"#));
    assert!(app.all::<Author>().await.is_empty());
}

#[tokio::test]
async fn test_genre_created_twice_is_stored_once() {
    let app = TestApp::new();
    let first = app.post("/catalog/genre/create", "name=Fantasy").await;
    let second = app.post("/catalog/genre/create", "name=Fantasy").await;

    assert_eq!(first.status, StatusCode::SEE_OTHER);
    assert_eq!(second.status, StatusCode::SEE_OTHER);
    assert_eq!(first.location, second.location);

    let genres: Vec<Genre> = app.all().await;
    assert_eq!(genres.len(), 1);
    assert_eq!(first.location, Some(genres[0].url()));
}

#[tokio::test]
async fn test_genre_rename_onto_taken_name_conflicts() {
    let app = TestApp::new();
    app.add_genre("Fantasy").await;
    let horror = app.add_genre("Horror").await;

    let reply = app
        .post(&format!("/catalog/genre/{}/update", horror.id), "name=Fantasy")
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert!(reply.body.contains("409"));
}

#[tokio::test]
async fn test_book_without_genre_gets_empty_set() {
    let app = TestApp::new();
    let author = app.add_author("Frank", "Herbert").await;
    let form = format!("title=Dune&author={}&summary=Spice&isbn=9780441013593", author.id);

    let reply = app.post("/catalog/book/create", &form).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);

    let books: Vec<Book> = app.all().await;
    assert_eq!(books.len(), 1);
    assert!(books[0].genre.is_empty());
    assert_eq!(reply.location, Some(books[0].url()));
}

#[tokio::test]
async fn test_book_with_single_genre_gets_one_element_set() {
    let app = TestApp::new();
    let author = app.add_author("Frank", "Herbert").await;
    let scifi = app.add_genre("Science Fiction").await;
    let form = format!(
        "title=Dune&author={}&summary=Spice&isbn=9780441013593&genre={}",
        author.id, scifi.id
    );

    app.post("/catalog/book/create", &form).await;

    let books: Vec<Book> = app.all().await;
    assert_eq!(books[0].genre.iter().copied().collect::<Vec<_>>(), vec![scifi.id]);

    let detail = app.get(&books[0].url()).await;
    assert!(detail.body.contains("Science Fiction"));
    assert!(detail.body.contains("Herbert, Frank"));
}

#[tokio::test]
async fn test_rejected_book_keeps_checked_genres() {
    let app = TestApp::new();
    let author = app.add_author("Frank", "Herbert").await;
    let (a, b, c) = (
        app.add_genre("A").await,
        app.add_genre("B").await,
        app.add_genre("C").await,
    );
    let form = format!(
        "title=&author={}&summary=Spice&isbn=1&genre={}&genre={}",
        author.id, a.id, c.id
    );

    let reply = app.post("/catalog/book/create", &form).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply
        .body
        .contains(r#"data-field="title">Title must not be empty."#));
    assert!(!reply.body.contains(r#"data-field="isbn""#));
    assert!(reply.body.contains(&format!(r#"value="{}" checked"#, a.id)));
    assert!(reply.body.contains(&format!(r#"value="{}" />"#, b.id)));
    assert!(reply.body.contains(&format!(r#"value="{}" checked"#, c.id)));
    assert!(reply.body.contains(&format!(r#"value="{}" selected"#, author.id)));
    assert!(app.all::<Book>().await.is_empty());
}

#[tokio::test]
async fn test_book_update_form_marks_own_selections() {
    let app = TestApp::new();
    let herbert = app.add_author("Frank", "Herbert").await;
    let asimov = app.add_author("Isaac", "Asimov").await;
    let (a, b) = (app.add_genre("A").await, app.add_genre("B").await);
    let book = app.add_book("Dune", &herbert, &[&b]).await;

    let reply = app.get(&format!("/catalog/book/{}/update", book.id)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains(&format!(r#"value="{}" selected"#, herbert.id)));
    assert!(reply.body.contains(&format!(r#"value="{}">"#, asimov.id)));
    assert!(reply.body.contains(&format!(r#"value="{}" />"#, a.id)));
    assert!(reply.body.contains(&format!(r#"value="{}" checked"#, b.id)));
    assert!(reply.body.contains(r#"value="Dune""#));
}

#[tokio::test]
async fn test_book_update_replaces_record() {
    let app = TestApp::new();
    let author = app.add_author("Frank", "Herbert").await;
    let book = app.add_book("Dune", &author, &[]).await;
    let form = format!(
        "title=Dune+Messiah&author={}&summary=Sequel&isbn=9780593098233",
        author.id
    );

    let reply = app.post(&format!("/catalog/book/{}/update", book.id), &form).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location, Some(book.url()));

    let books: Vec<Book> = app.all().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, book.id);
    assert_eq!(books[0].title, "Dune Messiah");
}

#[tokio::test]
async fn test_update_of_unknown_book_is_not_found() {
    let app = TestApp::new();
    let reply = app.get(&format!("/catalog/book/{}/update", Uuid::new_v4())).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.body.contains("Book not found"));
}

#[tokio::test]
async fn test_author_delete_blocked_lists_every_book() {
    let app = TestApp::new();
    let author = app.add_author("Isaac", "Asimov").await;
    app.add_book("Foundation", &author, &[]).await;
    app.add_book("I, Robot", &author, &[]).await;

    let reply = app
        .post(&format!("/catalog/author/{}/delete", author.id), "")
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Delete the following books"));
    assert!(reply.body.contains("Foundation"));
    assert!(reply.body.contains("I, Robot"));
    assert_eq!(app.all::<Author>().await.len(), 1);
}

#[tokio::test]
async fn test_author_without_books_is_deleted() {
    let app = TestApp::new();
    let author = app.add_author("Isaac", "Asimov").await;

    let confirm = app.get(&format!("/catalog/author/{}/delete", author.id)).await;
    assert!(confirm.body.contains("Do you really want to delete this Author?"));

    let reply = app
        .post(&format!("/catalog/author/{}/delete", author.id), "")
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/catalog/authors"));
    assert!(app.all::<Author>().await.is_empty());
}

#[tokio::test]
async fn test_delete_page_of_unknown_author_redirects_to_list() {
    let app = TestApp::new();
    let reply = app.get(&format!("/catalog/author/{}/delete", Uuid::new_v4())).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/catalog/authors"));
}

#[tokio::test]
async fn test_book_and_genre_deletes_are_guarded() {
    let app = TestApp::new();
    let author = app.add_author("Isaac", "Asimov").await;
    let genre = app.add_genre("Science Fiction").await;
    let book = app.add_book("Foundation", &author, &[&genre]).await;
    let copy = app.add_copy(&book, BookInstanceStatus::Maintenance).await;

    let reply = app.post(&format!("/catalog/genre/{}/delete", genre.id), "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Foundation"));

    let reply = app.post(&format!("/catalog/book/{}/delete", book.id), "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains(&copy.id.to_string()));

    let reply = app
        .post(&format!("/catalog/bookinstance/{}/delete", copy.id), "")
        .await;
    assert_eq!(reply.location.as_deref(), Some("/catalog/bookinstances"));

    let reply = app.post(&format!("/catalog/book/{}/delete", book.id), "").await;
    assert_eq!(reply.location.as_deref(), Some("/catalog/books"));

    let reply = app.post(&format!("/catalog/genre/{}/delete", genre.id), "").await;
    assert_eq!(reply.location.as_deref(), Some("/catalog/genres"));

    assert!(app.all::<Book>().await.is_empty());
    assert!(app.all::<Genre>().await.is_empty());
    assert!(app.all::<BookInstance>().await.is_empty());
}

#[tokio::test]
async fn test_details_of_unknown_ids_are_not_found() {
    let app = TestApp::new();
    let id = Uuid::new_v4();
    for uri in [
        format!("/catalog/author/{}", id),
        format!("/catalog/book/{}", id),
        format!("/catalog/genre/{}", id),
        format!("/catalog/bookinstance/{}", id),
        "/catalog/author/not-an-id".to_string(),
    ] {
        let reply = app.get(&uri).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(!reply.body.contains("Author:"), "{}", uri);
    }
    assert_eq!(app.get("/nowhere").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_instance_create_and_list() {
    let app = TestApp::new();
    let author = app.add_author("Isaac", "Asimov").await;
    let book = app.add_book("Foundation", &author, &[]).await;
    let form = format!(
        "book={}&imprint=Gnome+Press%2C+1951&status=Loaned&due_back=2026-12-01",
        book.id
    );

    let reply = app.post("/catalog/bookinstance/create", &form).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);

    let copies: Vec<BookInstance> = app.all().await;
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].status, BookInstanceStatus::Loaned);
    assert_eq!(reply.location, Some(copies[0].url()));

    let list = app.get("/catalog/bookinstances").await;
    assert!(list.body.contains("Foundation : Gnome Press, 1951"));
    assert!(list.body.contains("(Due: 2026-12-01)"));
}

#[tokio::test]
async fn test_book_instance_with_unknown_status_is_rejected() {
    let app = TestApp::new();
    let author = app.add_author("Isaac", "Asimov").await;
    let book = app.add_book("Foundation", &author, &[]).await;
    let form = format!("book={}&imprint=Gnome+Press&status=Lost", book.id);

    let reply = app.post("/catalog/bookinstance/create", &form).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Invalid status"));
    assert!(app.all::<BookInstance>().await.is_empty());
}

#[tokio::test]
async fn test_lists_are_sorted() {
    let app = TestApp::new();
    app.add_author("Patrick", "Rothfuss").await;
    app.add_author("Isaac", "Asimov").await;
    app.add_genre("Poetry").await;
    app.add_genre("Fantasy").await;

    let authors = app.get("/catalog/authors").await.body;
    let asimov = authors.find("Asimov").unwrap();
    let rothfuss = authors.find("Rothfuss").unwrap();
    assert!(asimov < rothfuss);

    let genres = app.get("/catalog/genres").await.body;
    assert!(genres.find("Fantasy").unwrap() < genres.find("Poetry").unwrap());
}
