mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn username_returns_only_the_callers_name() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(format!("{}?username=1", server.study_url()))
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "username": "alice" }));
    Ok(())
}

#[tokio::test]
async fn username_wins_over_id() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(format!("{}?username=yes&id=42&clusters=1", server.study_url()))
        .header("Authorization", server.bob.bearer())
        .send()
        .await?;

    assert_eq!(res.json::<Value>().await?, json!({ "username": "bob" }));
    Ok(())
}

#[tokio::test]
async fn lists_only_the_callers_studies() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(server.study_url())
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?, json!({ "studies": [] }));

    let first = common::create_study(&server, &server.alice, "Navigation").await?;
    common::create_study(&server, &server.bob, "Bob's study").await?;

    let res = server
        .client
        .get(server.study_url())
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    let studies = body["studies"].as_array().expect("studies array");

    assert_eq!(studies.len(), 1);
    assert_eq!(studies[0]["id"], first.as_str());
    assert_eq!(studies[0]["title"], "Navigation");
    assert_eq!(studies[0]["isLive"], true);
    assert_eq!(studies[0]["completedNo"], 0);
    assert!(studies[0].get("cards").is_none(), "summary should omit cards: {}", studies[0]);
    Ok(())
}

#[tokio::test]
async fn id_returns_full_study_detail() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = common::create_study(&server, &server.alice, "Checkout").await?;

    let res = server
        .client
        .get(server.study_url())
        .query(&[("id", id.as_str())])
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let study = &body["study"];
    assert_eq!(study["id"], id.as_str());
    assert_eq!(study["title"], "Checkout");
    assert_eq!(study["message"], "Thanks for taking part");
    assert_eq!(study["cards"].as_array().map(Vec::len), Some(2));
    assert_eq!(study["endDate"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn clusters_flag_returns_clusters() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = common::create_study(&server, &server.alice, "Checkout").await?;
    assert!(server.store.add_cluster(&id, "Billing", json!([1])).await);
    assert!(server.store.add_cluster(&id, "Account", json!([2])).await);

    let res = server
        .client
        .get(server.study_url())
        .query(&[("id", id.as_str()), ("clusters", "1")])
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let names: Vec<&str> = body["clusters"]
        .as_array()
        .expect("clusters array")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Billing", "Account"]);
    Ok(())
}

#[tokio::test]
async fn empty_id_falls_back_to_list() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(format!("{}?id=&clusters=1", server.study_url()))
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;

    assert_eq!(res.json::<Value>().await?, json!({ "studies": [] }));
    Ok(())
}

#[tokio::test]
async fn other_users_study_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = common::create_study(&server, &server.alice, "Private").await?;

    for extra in [None, Some(("clusters", "1"))] {
        let mut query = vec![("id", id.as_str())];
        query.extend(extra);
        let res = server
            .client
            .get(server.study_url())
            .query(&query)
            .header("Authorization", server.bob.bearer())
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
    Ok(())
}

#[tokio::test]
async fn repeated_id_uses_the_first_value() -> Result<()> {
    let server = common::spawn_server().await?;
    let first = common::create_study(&server, &server.alice, "First").await?;
    let second = common::create_study(&server, &server.alice, "Second").await?;

    let res = server
        .client
        .get(format!("{}?id={}&id={}", server.study_url(), first, second))
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["study"]["id"], first.as_str());
    assert_eq!(body["study"]["title"], "First");
    Ok(())
}

#[tokio::test]
async fn repeated_flags_never_bypass_the_json_envelope() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(format!("{}?id=missing&id=other&clusters=1&clusters=0", server.study_url()))
        .header("Authorization", server.alice.bearer())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}
