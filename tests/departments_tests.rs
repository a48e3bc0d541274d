mod common;

use actix_web::http::StatusCode;
use common::{body_text, count, get, location, memory_pool, post_form};

fn department<'a>(chief: &'a str, title: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", title),
        ("email", chief),
        ("email_dep", "geology@mars.org"),
        ("members", "2, 3"),
    ]
}

#[actix_web::test]
async fn chief_manages_department() {
    let pool = memory_pool().await;
    let app = init_app!(pool);
    register!(app, "ridley@mars.org", "Ridley", "Scott");
    let ridley = login!(app, "ridley@mars.org");

    let resp = send!(app, post_form("/add_department", &department("ridley@mars.org", "Geology"), Some(&ridley)));
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp).as_deref(), Some("/departments"));

    let body = body_text(send!(app, get("/departments", None))).await;
    assert!(body.contains("Geology"));
    assert!(body.contains("Ridley Scott"));
    assert!(body.contains("geology@mars.org"));

    let body = body_text(send!(app, get("/departments/1", Some(&ridley)))).await;
    assert!(body.contains("ridley@mars.org"));

    let resp = send!(
        app,
        post_form("/departments/1", &department("ridley@mars.org", "Geophysics"), Some(&ridley))
    );
    assert_eq!(resp.status(), StatusCode::FOUND);
    let body = body_text(send!(app, get("/departments", None))).await;
    assert!(body.contains("Geophysics"));

    let resp = send!(app, get("/depart_delete/1", Some(&ridley)));
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(count(&pool, "departments").await, 0);
}

#[actix_web::test]
async fn unknown_chief_is_reported() {
    let pool = memory_pool().await;
    let app = init_app!(pool);
    register!(app, "ridley@mars.org", "Ridley", "Scott");
    let ridley = login!(app, "ridley@mars.org");

    let resp = send!(app, post_form("/add_department", &department("ghost@mars.org", "Geology"), Some(&ridley)));
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("No user with this chief email"));
    assert_eq!(count(&pool, "departments").await, 0);

    send!(app, post_form("/add_department", &department("ridley@mars.org", "Geology"), Some(&ridley)));
    let resp = send!(
        app,
        post_form("/departments/1", &department("ghost@mars.org", "Geology"), Some(&ridley))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("No user with this chief email"));
}

#[actix_web::test]
async fn other_users_cannot_touch_department() {
    let pool = memory_pool().await;
    let app = init_app!(pool);
    register!(app, "ridley@mars.org", "Ridley", "Scott");
    register!(app, "andy@mars.org", "Andy", "Weir");
    let ridley = login!(app, "ridley@mars.org");
    let andy = login!(app, "andy@mars.org");

    send!(app, post_form("/add_department", &department("ridley@mars.org", "Geology"), Some(&ridley)));

    let resp = send!(app, get("/departments/1", Some(&andy)));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = send!(app, post_form("/departments/1", &department("andy@mars.org", "Mine"), Some(&andy)));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = send!(app, post_form("/depart_delete/1", &[], Some(&andy)));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(count(&pool, "departments").await, 1);
}

#[actix_web::test]
async fn edit_with_missing_field_keeps_the_department() {
    let pool = memory_pool().await;
    let app = init_app!(pool);
    register!(app, "ridley@mars.org", "Ridley", "Scott");
    let ridley = login!(app, "ridley@mars.org");
    send!(app, post_form("/add_department", &department("ridley@mars.org", "Geology"), Some(&ridley)));

    let fields: Vec<_> = department("ridley@mars.org", "Geophysics")
        .into_iter()
        .filter(|(name, _)| *name != "email_dep")
        .collect();
    let resp = send!(app, post_form("/departments/1", &fields, Some(&ridley)));
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Department email is required"));

    let title: String = sqlx::query_scalar("SELECT title FROM departments WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "Geology");
}
