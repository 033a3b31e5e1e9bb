//! Concurrent registration and routing through a live proxy.

use std::collections::HashSet;

use axum::http::StatusCode;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_all_visible() {
    const N: usize = 50;
    let proxy = common::start_proxy(common::test_config()).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for i in 0..N {
        let client = client.clone();
        let url = proxy.url("/register");
        tasks.push(tokio::spawn(async move {
            client
                .get(url)
                .query(&[
                    ("id", format!("key-{i}")),
                    ("target", format!("http://127.0.0.1:{}", 20_000 + i)),
                ])
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let listing = client.get(proxy.url("/routes")).send().await.unwrap().text().await.unwrap();
    let lines: HashSet<&str> = listing.lines().collect();
    assert_eq!(lines.len(), N);
    for i in 0..N {
        let expected = format!("key-{i} -> http://127.0.0.1:{}", 20_000 + i);
        assert!(lines.contains(expected.as_str()), "missing {expected}");
    }
    assert_eq!(proxy.table.len(), N);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_route_independently() {
    let backend = common::start_mock_backend("live").await;
    let dead = common::closed_addr().await;
    let proxy = common::start_proxy(common::test_config()).await;
    proxy.table.register("live", format!("http://{}", backend));
    proxy.table.register("dead", format!("http://{}", dead));

    let client = common::client();
    let mut tasks = Vec::new();
    for i in 0..40 {
        let client = client.clone();
        let path = if i % 2 == 0 { "/live/x" } else { "/dead/x" };
        let url = proxy.url(path);
        tasks.push(tokio::spawn(async move {
            let res = client.get(url).send().await.unwrap();
            (path, res.status())
        }));
    }

    for task in tasks {
        let (path, status) = task.await.unwrap();
        match path {
            "/live/x" => assert_eq!(status, StatusCode::OK),
            _ => assert_eq!(status, StatusCode::ACCEPTED),
        }
    }
}
